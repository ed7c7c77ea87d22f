//! Final plan emission: walks the ordered batches, turns each into a
//! `Submission`, and detects cross-queue hand-offs by tracking each
//! resource's last-known queue. A hand-off mints a fresh timeline value on
//! the source queue, attaches a release descriptor (and matching signal) to
//! the source submission, and an acquire descriptor (and matching wait) to
//! the destination submission.

use std::collections::HashMap;

use gpu_device::{ImageLayout, MemoryAccess, PipelineStage, QueueFamily};

use crate::compiler::batching::Batch;
use crate::compiler::liveness::LiveSet;
use crate::compiler::plan::{
    CompiledPlan, OwnershipTransfer, PlanResource, PlanResourceOrigin, QueueConfiguration, ScheduledAccess,
    ScheduledPass, Submission, TimelineRef,
};
use crate::pass::PassEntry;
use crate::resource::{ResourceEntry, ResourceSource};

#[derive(Clone, Copy)]
struct LastUsage {
    queue: QueueFamily,
    stages: PipelineStage,
    access: MemoryAccess,
    layout: ImageLayout,
    submission_idx: usize,
}

/// A forward pre-pass over the batches: for every `(resource, queue)` pair,
/// the union of stage/access masks every pass on that queue ever uses the
/// resource with, and the layout of the first such use. Used to give a
/// hand-off's destination side the full picture of what the other queue will
/// do with the resource, rather than only the single access that triggered
/// the hand-off.
fn future_usage(passes: &[PassEntry], batches: &[Batch]) -> HashMap<(u64, QueueFamily), (PipelineStage, MemoryAccess, ImageLayout)> {
    let mut map: HashMap<(u64, QueueFamily), (PipelineStage, MemoryAccess, ImageLayout)> = HashMap::new();

    for batch in batches {
        for &idx in &batch.passes {
            for access in &passes[idx].accesses {
                let key = (access.handle.handle_id, batch.queue);
                map.entry(key)
                    .and_modify(|(stages, mask, _layout)| {
                        *stages |= access.stages;
                        *mask |= access.access;
                    })
                    .or_insert((access.stages, access.access, access.layout));
            }
        }
    }

    map
}

pub(crate) fn build_execution_plan(
    resources: Vec<ResourceEntry>,
    mut passes: Vec<PassEntry>,
    live: LiveSet,
    batches: Vec<Batch>,
    queue_config: QueueConfiguration,
) -> CompiledPlan {
    let future = future_usage(&passes, &batches);

    let mut timelines: HashMap<QueueFamily, u64> = HashMap::new();
    let mut last_usage: HashMap<u64, LastUsage> = HashMap::new();
    let mut submissions: Vec<Submission> = Vec::with_capacity(batches.len());

    for batch in &batches {
        let mut submission = Submission {
            queue: batch.queue,
            queue_index: 0,
            passes: Vec::with_capacity(batch.passes.len()),
            waits: Vec::new(),
            signals: Vec::new(),
            released_resources: Vec::new(),
            acquired_resources: Vec::new(),
        };
        let submission_idx = submissions.len();

        for &idx in &batch.passes {
            let pass = &mut passes[idx];
            let mut scheduled_accesses = Vec::with_capacity(pass.accesses.len());

            for access in &pass.accesses {
                let handle_id = access.handle.handle_id;

                if let Some(prev) = last_usage.get(&handle_id).copied() {
                    if prev.queue != batch.queue {
                        let signal_value = timelines.entry(prev.queue).or_insert(0);
                        *signal_value += 1;
                        let signal_value = *signal_value;

                        let (dst_stages, dst_access, dst_layout) = future
                            .get(&(handle_id, batch.queue))
                            .copied()
                            .unwrap_or((access.stages, access.access, access.layout));

                        let transfer = OwnershipTransfer {
                            handle: access.handle,
                            src_queue: prev.queue,
                            dst_queue: batch.queue,
                            src_stages: prev.stages,
                            src_access: prev.access,
                            dst_stages,
                            dst_access,
                            src_layout: prev.layout,
                            dst_layout,
                            signal_value,
                        };

                        submissions[prev.submission_idx].released_resources.push(transfer);
                        submissions[prev.submission_idx].signals.push(TimelineRef {
                            queue: prev.queue,
                            queue_index: 0,
                            value: signal_value,
                            stages: prev.stages,
                        });

                        submission.acquired_resources.push(transfer);
                        submission.waits.push(TimelineRef {
                            queue: prev.queue,
                            queue_index: 0,
                            value: signal_value,
                            stages: dst_stages,
                        });

                        last_usage.insert(
                            handle_id,
                            LastUsage { queue: batch.queue, stages: dst_stages, access: dst_access, layout: dst_layout, submission_idx },
                        );
                    } else {
                        let merged = LastUsage {
                            queue: batch.queue,
                            stages: prev.stages | access.stages,
                            access: prev.access | access.access,
                            layout: access.layout,
                            submission_idx,
                        };
                        last_usage.insert(handle_id, merged);
                    }
                } else {
                    last_usage.insert(
                        handle_id,
                        LastUsage { queue: batch.queue, stages: access.stages, access: access.access, layout: access.layout, submission_idx },
                    );
                }

                scheduled_accesses.push(ScheduledAccess {
                    handle: access.handle,
                    mode: access.mode,
                    stages: access.stages,
                    access: access.access,
                    layout: access.layout,
                });
            }

            submission.passes.push(ScheduledPass {
                name: pass.name.clone(),
                kind: pass.kind,
                accesses: scheduled_accesses,
                callable: pass.callable.take(),
            });
        }

        submissions.push(submission);
    }

    let plan_resources = resources
        .into_iter()
        .filter(|r| live.resources.contains(&r.handle.handle_id))
        .map(|r| PlanResource {
            handle: r.handle,
            name: r.name,
            origin: match r.source {
                ResourceSource::ExternalBuffer(h) => PlanResourceOrigin::ExternalBuffer(h),
                ResourceSource::ExternalImage(h) => PlanResourceOrigin::ExternalImage(h),
                ResourceSource::ExternalSurface(h) => PlanResourceOrigin::ExternalSurface(h),
                ResourceSource::InternalBuffer(desc) => PlanResourceOrigin::InternalBuffer(desc),
                ResourceSource::InternalImage(desc) => PlanResourceOrigin::InternalImage(desc),
            },
            per_frame: r.per_frame,
            temporal: r.temporal,
            render_target: r.render_target,
            presentable: r.presentable,
        })
        .collect();

    CompiledPlan { resources: plan_resources, submissions, queue_config }
}
