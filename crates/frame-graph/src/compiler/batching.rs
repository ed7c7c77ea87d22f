//! Submit batch grouping: consecutive topo-order passes on the same queue
//! share a batch, split wherever a pass touches a resource last accessed on
//! a different queue (an ownership-transfer boundary) or changes queue.

use std::collections::HashMap;

use gpu_device::QueueFamily;

use crate::pass::PassEntry;

pub(crate) struct Batch {
    pub(crate) queue: QueueFamily,
    pub(crate) passes: Vec<usize>,
}

pub(crate) fn create_submit_batches(
    topo_order: &[usize],
    passes: &[PassEntry],
    queue_of: &HashMap<usize, QueueFamily>,
) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut resource_queue: HashMap<u64, QueueFamily> = HashMap::new();
    let mut current: Option<Batch> = None;

    for &idx in topo_order {
        let queue = queue_of[&idx];
        let pass = &passes[idx];

        let crosses_boundary = pass
            .accesses
            .iter()
            .any(|a| resource_queue.get(&a.handle.handle_id).is_some_and(|&prev| prev != queue));

        let must_split = match &current {
            None => false,
            Some(batch) => batch.queue != queue || crosses_boundary,
        };

        if must_split {
            batches.push(current.take().expect("must_split implies a batch is open"));
        }

        let batch = current.get_or_insert_with(|| Batch { queue, passes: Vec::new() });
        batch.passes.push(idx);

        for access in &pass.accesses {
            resource_queue.insert(access.handle.handle_id, queue);
        }
    }

    if let Some(batch) = current {
        batches.push(batch);
    }

    batches
}
