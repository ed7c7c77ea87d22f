//! Graph compiler: turns a builder's resource and pass declarations into an
//! execution plan. Runs in six stages — liveness, dependency graph, topo
//! sort, queue assignment, submit batching, plan emission — each grounded
//! on its own module below.

pub mod plan;

mod batching;
mod dependency;
mod emit;
mod liveness;
mod queue_assign;
mod topo;

use std::collections::{HashMap, HashSet};

use crate::error::CompileError;
use crate::pass::PassEntry;
use crate::resource::ResourceEntry;
use plan::{CompiledPlan, QueueConfiguration};

pub(crate) fn compile(
    resources: Vec<ResourceEntry>,
    passes: Vec<PassEntry>,
    queue_config: QueueConfiguration,
) -> Result<CompiledPlan, CompileError> {
    if queue_config.is_empty() {
        return Err(CompileError::EmptyQueueConfig);
    }

    validate_handles(&resources, &passes)?;

    let live = liveness::gather_live_set(&resources, &passes);
    let dep_graph = dependency::build_dependency_graph(&passes, &live);
    let topo_order = topo::topo_sort(&dep_graph.live_order, &dep_graph.adjacency, &dep_graph.in_degree, &passes)?;

    let queue_of: HashMap<usize, gpu_device::QueueFamily> =
        topo_order.iter().map(|&idx| (idx, queue_assign::assign_queue(&passes[idx], &queue_config))).collect();

    let batches = batching::create_submit_batches(&topo_order, &passes, &queue_of);

    let plan = emit::build_execution_plan(resources, passes, live, batches, queue_config);
    glog::debug!(
        "compiled graph: {} resources, {} passes, {} submissions",
        plan.resources.len(),
        plan.submissions.iter().map(|s| s.passes.len()).sum::<usize>(),
        plan.submissions.len(),
    );
    Ok(plan)
}

fn validate_handles(resources: &[ResourceEntry], passes: &[PassEntry]) -> Result<(), CompileError> {
    let known: HashSet<u64> = resources.iter().map(|r| r.handle.handle_id).collect();
    for pass in passes {
        for access in &pass.accesses {
            if !known.contains(&access.handle.handle_id) {
                return Err(CompileError::UnknownHandle { pass: pass.name.clone(), handle: access.handle });
            }
        }
    }
    Ok(())
}
