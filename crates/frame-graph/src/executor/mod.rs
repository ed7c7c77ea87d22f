//! Per-frame graph executor: drives a compiled plan against a device,
//! deriving barriers from runtime resource state, submitting each batch in
//! order, and orchestrating swapchain acquire/present around it.

pub mod state;

mod barriers;
mod resources;
mod swapchain;

pub use state::{ExecutorState, SurfaceSlot};
pub(crate) use swapchain::AcquiredSurface;

use std::collections::HashMap;

use gpu_device::{
    BufferBarrier, Device, ImageBarrier, ImageHandle, MemoryAccess, PipelineStage, QueueFamily, QueueOwnership,
    SubmitInfo, SurfaceHandle, TimelineOp, TimelineSemaphoreHandle, WorkQueue,
};

use crate::compiler::plan::{CompiledPlan, OwnershipTransfer, PlanResourceOrigin, Submission, TimelineRef};
use crate::context::{ComputeContext, GraphicsContext, ResourceLookup, TransferContext};
use crate::error::RuntimeError;
use crate::pass::ExecutionCallable;
use crate::resource::ResourceKind;
use barriers::{derive_barrier, BarrierNeed};
use resources::ResolvedResources;
use state::ResourceRuntimeState;

/// Outcome of one call to [`execute`]. Surfaces that failed to present are
/// queued for recreation next frame.
pub enum ExecuteOutcome {
    Presented { recreated: Vec<SurfaceHandle> },
}

/// Drives one frame of `plan` against `device`. `state` is the caller-owned,
/// cross-frame executor state: timelines, fences, temporal resource
/// bookkeeping, and tracked surfaces (add/remove entries in
/// `state.surfaces` as windows open and close). Pass callables are consumed
/// from `plan` as they run, so a `CompiledPlan` executes at most once.
pub fn execute<D: Device>(state: &mut ExecutorState, device: &D, plan: &mut CompiledPlan, frames_in_flight: u32) -> Result<ExecuteOutcome, RuntimeError> {
    let frame_index = state.frame_index;
    state.frame_index += 1;
    let slot = (frame_index % frames_in_flight as u64) as usize;

    let families_in_plan = distinct_families(plan);

    // 1. frame-complete wait: recycle the fences/pools this slot last used.
    for &family in &families_in_plan {
        ensure_fence_slot(state, device, family, frames_in_flight)?;
        let fence = state.family_fences[&family][slot];
        device.wait_fences(&[fence])?;
        device.reset_fences(&[fence])?;
        device.reset_command_pool(family, 0)?;
    }
    device.release_resources();

    // 2. swapchain acquire.
    let acquired = swapchain::acquire_all(device, &mut state.surfaces);

    let mut surface_images: HashMap<u64, (ImageHandle, SurfaceHandle, u32)> = HashMap::new();
    for resource in &plan.resources {
        if let PlanResourceOrigin::ExternalSurface(handle) = &resource.origin {
            if let Some(a) = acquired.iter().find(|a| a.surface == *handle) {
                surface_images.insert(resource.handle.handle_id, (a.image, a.surface, a.image_index));
            }
        }
    }

    let resolved = resources::resolve(state, device, plan, frame_index, frames_in_flight)?;

    // Only force the primary family into the fan-in set when there is an
    // actual acquire to fan in; otherwise an idle frame with no submissions
    // and nothing to present would still submit an empty fan-in command.
    let primary = swapchain::primary_family();
    let mut families: Vec<QueueFamily> = families_in_plan.clone();
    if !acquired.is_empty() && !families.contains(&primary) {
        families.push(primary);
    }
    for &family in &families {
        ensure_timeline(state, device, family)?;
    }

    // base[family]: the last actual timeline value signalled for that
    // family before this frame. Everything the compiler minted this compile
    // is a relative count (1, 2, 3...) that gets rebased onto this.
    let base: HashMap<QueueFamily, u64> = families.iter().map(|&f| (f, state.timeline_values.get(&f).copied().unwrap_or(0))).collect();

    // 3. acquire-to-timeline fan-in: bump every family's timeline by one so
    // later submissions regardless of family can order after the acquire.
    let fan_in_bumps: Vec<TimelineOp> = base
        .iter()
        .map(|(&family, &b)| TimelineOp { semaphore: state.timeline_semaphores[&family], queue: family, queue_index: 0, value: b + 1, stages: PipelineStage::TOP_OF_PIPE })
        .collect();

    let primary_queue = device.queue(primary, 0);
    swapchain::fan_in(primary_queue, &acquired, fan_in_bumps).map_err(RuntimeError::Device)?;

    // 4. submission loop.
    let mut working_state = state.begin_frame(plan);

    let mut last_submission_per_family: HashMap<QueueFamily, usize> = HashMap::new();
    let mut present_transitions: HashMap<usize, Vec<u64>> = HashMap::new();
    {
        let presentable_ids: std::collections::HashSet<u64> =
            plan.resources.iter().filter(|r| r.presentable).map(|r| r.handle.handle_id).collect();
        let mut last_use: HashMap<u64, usize> = HashMap::new();
        for (idx, submission) in plan.submissions.iter().enumerate() {
            last_submission_per_family.insert(submission.queue, idx);
            for pass in &submission.passes {
                for access in &pass.accesses {
                    if presentable_ids.contains(&access.handle.handle_id) {
                        last_use.insert(access.handle.handle_id, idx);
                    }
                }
            }
        }
        for (handle_id, idx) in last_use {
            present_transitions.entry(idx).or_default().push(handle_id);
        }
    }

    for (idx, submission) in plan.submissions.iter_mut().enumerate() {
        let family = submission.queue;
        let own_semaphore = state.timeline_semaphores[&family];
        let fence = state.family_fences.get(&family).map(|f| f[slot]);
        run_submission(
            device,
            submission,
            &resolved,
            &surface_images,
            &mut working_state,
            &base,
            &state.timeline_semaphores,
            own_semaphore,
            primary,
            last_submission_per_family[&family] == idx,
            fence,
            present_transitions.get(&idx).map(Vec::as_slice).unwrap_or(&[]),
        )
        .map_err(RuntimeError::Device)?;
    }

    state.end_frame(plan, working_state);

    // advance each family's persisted base past everything minted this frame.
    for &family in base.keys() {
        let max_relative = max_relative_value(plan, family);
        state.timeline_values.insert(family, base[&family] + 1 + max_relative);
    }

    // 5. present fan-out.
    let waits: Vec<TimelineOp> = base
        .keys()
        .map(|&family| TimelineOp {
            semaphore: state.timeline_semaphores[&family],
            queue: family,
            queue_index: 0,
            value: state.timeline_values[&family],
            stages: PipelineStage::BOTTOM_OF_PIPE,
        })
        .collect();

    let present_results = swapchain::fan_out_and_present(device, primary_queue, &acquired, waits);

    let mut recreated = Vec::new();
    for (surface, result) in present_results {
        match result {
            Ok(()) => {}
            Err(err @ (gpu_device::PresentError::OutOfDate | gpu_device::PresentError::Suboptimal)) => {
                glog::warn!("surface {surface:?} {err}, recreating next frame");
                if let Some(slot) = state.surfaces.get_mut(&surface) {
                    slot.needs_recreate = true;
                }
                recreated.push(surface);
            }
            Err(err) => {
                glog::error!("present failed for surface {surface:?}: {err}, evicting from live set");
                state.surfaces.remove(&surface);
                recreated.push(surface);
            }
        }
    }

    Ok(ExecuteOutcome::Presented { recreated })
}

fn distinct_families(plan: &CompiledPlan) -> Vec<QueueFamily> {
    let mut seen = Vec::new();
    for submission in &plan.submissions {
        if !seen.contains(&submission.queue) {
            seen.push(submission.queue);
        }
    }
    seen
}

fn max_relative_value(plan: &CompiledPlan, family: QueueFamily) -> u64 {
    plan.submissions.iter().flat_map(|s| s.signals.iter()).filter(|t| t.queue == family).map(|t| t.value).max().unwrap_or(0)
}

fn ensure_timeline<D: Device>(state: &mut ExecutorState, device: &D, family: QueueFamily) -> Result<(), RuntimeError> {
    if state.timeline_semaphores.contains_key(&family) {
        return Ok(());
    }
    let sem = device.create_timeline_semaphore(0)?;
    state.timeline_semaphores.insert(family, sem);
    state.timeline_values.insert(family, 0);
    Ok(())
}

fn ensure_fence_slot<D: Device>(state: &mut ExecutorState, device: &D, family: QueueFamily, frames_in_flight: u32) -> Result<(), RuntimeError> {
    let fences = state.family_fences.entry(family).or_default();
    while (fences.len() as u32) < frames_in_flight {
        fences.push(device.create_fence(true)?);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_submission<D: Device>(
    device: &D,
    submission: &mut Submission,
    resolved: &ResolvedResources,
    surface_images: &HashMap<u64, (ImageHandle, SurfaceHandle, u32)>,
    working_state: &mut HashMap<u64, ResourceRuntimeState>,
    base: &HashMap<QueueFamily, u64>,
    semaphores: &HashMap<QueueFamily, TimelineSemaphoreHandle>,
    own_semaphore: TimelineSemaphoreHandle,
    primary: QueueFamily,
    is_last_for_family: bool,
    fence: Option<gpu_device::FenceHandle>,
    present_transitions: &[u64],
) -> anyhow::Result<()> {
    let queue = device.queue(submission.queue, submission.queue_index);
    let cmd = queue.get_next_command_list();
    queue.begin_command_list(cmd)?;

    if !submission.acquired_resources.is_empty() {
        let (images, buffers) = ownership_barriers(&submission.acquired_resources, resolved, surface_images);
        if !images.is_empty() || !buffers.is_empty() {
            queue.pipeline_barriers(cmd, &images, &buffers);
        }
        for transfer in &submission.acquired_resources {
            working_state.entry(transfer.handle.handle_id).or_default().observe_ownership_transfer(transfer);
        }
    }

    for pass in &mut submission.passes {
        let mut image_barriers = Vec::new();
        let mut buffer_barriers = Vec::new();

        for access in &pass.accesses {
            let rstate = working_state.entry(access.handle.handle_id).or_default();
            match derive_barrier(rstate, access.handle.kind, submission.queue, access) {
                Some(BarrierNeed::Image { old_layout, new_layout, src_stages, src_access, dst_stages, dst_access }) => {
                    if let Some(image) = lookup_image(access.handle.handle_id, resolved, surface_images) {
                        image_barriers.push(ImageBarrier { image, old_layout, new_layout, src_stages, src_access, dst_stages, dst_access, src_queue: None, dst_queue: None });
                    }
                }
                Some(BarrierNeed::Buffer { src_stages, src_access, dst_stages, dst_access }) => {
                    if let Some(&buffer) = resolved.buffers.get(&access.handle.handle_id) {
                        buffer_barriers.push(BufferBarrier { buffer, src_stages, src_access, dst_stages, dst_access, src_queue: None, dst_queue: None, offset: 0, size: u64::MAX });
                    }
                }
                None => {}
            }
        }

        if !image_barriers.is_empty() || !buffer_barriers.is_empty() {
            queue.pipeline_barriers(cmd, &image_barriers, &buffer_barriers);
        }

        if let Some(callable) = pass.callable.take() {
            let lookup = ResourceLookup { buffers: &resolved.buffers, images: &resolved.images, surface_images, per_frame_offsets: &resolved.per_frame_offsets };
            queue.begin_debug_region(cmd, &pass.name);
            let result = match callable {
                ExecutionCallable::Graphics(f) => f(&mut GraphicsContext { queue, cmd, resources: lookup }),
                ExecutionCallable::Compute(f) => f(&mut ComputeContext { queue, cmd, resources: lookup }),
                ExecutionCallable::Transfer(f) => f(&mut TransferContext { queue, cmd, resources: lookup }),
            };
            queue.end_debug_region(cmd);
            result?;
        }
    }

    if !present_transitions.is_empty() {
        let mut image_barriers = Vec::with_capacity(present_transitions.len());
        for &handle_id in present_transitions {
            let rstate = working_state.entry(handle_id).or_default();
            if rstate.layout == gpu_device::ImageLayout::Present {
                continue;
            }
            if let Some(image) = lookup_image(handle_id, resolved, surface_images) {
                image_barriers.push(ImageBarrier {
                    image,
                    old_layout: rstate.layout,
                    new_layout: gpu_device::ImageLayout::Present,
                    src_stages: rstate.last_write_stages | rstate.synced_read_stages,
                    src_access: rstate.last_write_access,
                    dst_stages: PipelineStage::BOTTOM_OF_PIPE,
                    dst_access: MemoryAccess::empty(),
                    src_queue: None,
                    dst_queue: None,
                });
            }
            rstate.observe_write(submission.queue, PipelineStage::BOTTOM_OF_PIPE, MemoryAccess::empty(), gpu_device::ImageLayout::Present);
        }
        if !image_barriers.is_empty() {
            queue.pipeline_barriers(cmd, &image_barriers, &[]);
        }
    }

    if !submission.released_resources.is_empty() {
        let (images, buffers) = ownership_barriers(&submission.released_resources, resolved, surface_images);
        if !images.is_empty() || !buffers.is_empty() {
            queue.pipeline_barriers(cmd, &images, &buffers);
        }
    }

    queue.end_command_list(cmd)?;

    let mut waits = merge_waits(&submission.waits, base, semaphores);
    if submission.queue != primary {
        waits.push(TimelineOp {
            semaphore: semaphores[&primary],
            queue: primary,
            queue_index: 0,
            value: base.get(&primary).copied().unwrap_or(0) + 1,
            stages: PipelineStage::TOP_OF_PIPE,
        });
    }

    let signals: Vec<TimelineOp> = submission
        .signals
        .iter()
        .map(|t| TimelineOp { semaphore: own_semaphore, queue: t.queue, queue_index: t.queue_index, value: base.get(&t.queue).copied().unwrap_or(0) + 1 + t.value, stages: t.stages })
        .collect();

    queue.submit(SubmitInfo { command_lists: vec![cmd], waits, signals, fence: if is_last_for_family { fence } else { None }, ..Default::default() })
}

fn merge_waits(waits: &[TimelineRef], base: &HashMap<QueueFamily, u64>, semaphores: &HashMap<QueueFamily, TimelineSemaphoreHandle>) -> Vec<TimelineOp> {
    let mut merged: HashMap<QueueFamily, (u64, PipelineStage)> = HashMap::new();
    for wait in waits {
        let actual = base.get(&wait.queue).copied().unwrap_or(0) + 1 + wait.value;
        merged.entry(wait.queue).and_modify(|(value, stages)| { *value = (*value).max(actual); *stages |= wait.stages; }).or_insert((actual, wait.stages));
    }
    merged.into_iter().filter_map(|(queue, (value, stages))| semaphores.get(&queue).map(|&semaphore| TimelineOp { semaphore, queue, queue_index: 0, value, stages })).collect()
}

fn ownership_barriers(transfers: &[OwnershipTransfer], resolved: &ResolvedResources, surface_images: &HashMap<u64, (ImageHandle, SurfaceHandle, u32)>) -> (Vec<ImageBarrier>, Vec<BufferBarrier>) {
    let mut images = Vec::new();
    let mut buffers = Vec::new();

    for transfer in transfers {
        let src_owner = QueueOwnership { family: transfer.src_queue, queue_index: 0 };
        let dst_owner = QueueOwnership { family: transfer.dst_queue, queue_index: 0 };

        match transfer.handle.kind {
            ResourceKind::Buffer => {
                if let Some(&buffer) = resolved.buffers.get(&transfer.handle.handle_id) {
                    buffers.push(BufferBarrier {
                        buffer,
                        src_stages: transfer.src_stages,
                        src_access: transfer.src_access,
                        dst_stages: transfer.dst_stages,
                        dst_access: transfer.dst_access,
                        src_queue: Some(src_owner),
                        dst_queue: Some(dst_owner),
                        offset: 0,
                        size: u64::MAX,
                    });
                }
            }
            ResourceKind::Image | ResourceKind::RenderSurface => {
                if let Some(image) = lookup_image(transfer.handle.handle_id, resolved, surface_images) {
                    images.push(ImageBarrier {
                        image,
                        old_layout: transfer.src_layout,
                        new_layout: transfer.dst_layout,
                        src_stages: transfer.src_stages,
                        src_access: transfer.src_access,
                        dst_stages: transfer.dst_stages,
                        dst_access: transfer.dst_access,
                        src_queue: Some(src_owner),
                        dst_queue: Some(dst_owner),
                    });
                }
            }
        }
    }

    (images, buffers)
}

fn lookup_image(handle_id: u64, resolved: &ResolvedResources, surface_images: &HashMap<u64, (ImageHandle, SurfaceHandle, u32)>) -> Option<ImageHandle> {
    resolved.images.get(&handle_id).copied().or_else(|| surface_images.get(&handle_id).map(|(image, ..)| *image))
}
