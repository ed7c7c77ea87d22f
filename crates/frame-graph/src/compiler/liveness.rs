//! Liveness pass: seeds with every escaping resource (imported, presentable,
//! temporal, or an explicit render target — anything whose effect outlives
//! this compile) and every pass with no write access of its own (a terminal
//! consumer has no downstream reader to justify it by, so it is assumed to
//! have a side effect, e.g. a readback or a debug visualization), then
//! expands by fixpoint so only resources and passes reachable from one of
//! those roots survive compilation.

use std::collections::HashSet;

use crate::access::AccessMode;
use crate::pass::PassEntry;
use crate::resource::ResourceEntry;

pub(crate) struct LiveSet {
    pub(crate) resources: HashSet<u64>,
    pub(crate) passes: HashSet<usize>,
}

fn escapes(resource: &ResourceEntry) -> bool {
    resource.is_external() || resource.presentable || resource.temporal || resource.render_target
}

pub(crate) fn gather_live_set(resources: &[ResourceEntry], passes: &[PassEntry]) -> LiveSet {
    let mut live_resources: HashSet<u64> = HashSet::new();
    let mut live_passes: HashSet<usize> = HashSet::new();
    let mut worklist: Vec<usize> = Vec::new();

    for resource in resources.iter().filter(|r| escapes(r)) {
        live_resources.insert(resource.handle.handle_id);
    }

    for (idx, pass) in passes.iter().enumerate() {
        let writes_live = pass
            .accesses
            .iter()
            .any(|a| a.mode == AccessMode::Write && live_resources.contains(&a.handle.handle_id));
        let is_terminal_consumer = !pass.accesses.iter().any(|a| a.mode == AccessMode::Write);
        if (writes_live || is_terminal_consumer) && live_passes.insert(idx) {
            worklist.push(idx);
        }
    }

    while let Some(idx) = worklist.pop() {
        let accessed_ids: Vec<u64> = passes[idx].accesses.iter().map(|a| a.handle.handle_id).collect();
        for handle_id in accessed_ids {
            live_resources.insert(handle_id);

            for (j, producer) in passes.iter().enumerate() {
                if j == idx {
                    continue;
                }
                let produces = producer
                    .accesses
                    .iter()
                    .any(|a| a.mode == AccessMode::Write && a.handle.handle_id == handle_id);
                if produces && live_passes.insert(j) {
                    worklist.push(j);
                }
            }
        }
    }

    for resource in resources {
        if !live_resources.contains(&resource.handle.handle_id) {
            glog::trace!("liveness: pruned resource `{}`", resource.name);
        }
    }
    for (idx, pass) in passes.iter().enumerate() {
        if !live_passes.contains(&idx) {
            glog::trace!("liveness: pruned pass `{}`", pass.name);
        }
    }

    LiveSet { resources: live_resources, passes: live_passes }
}
