//! Producer → consumer dependency graph construction.

use std::collections::{HashMap, HashSet};

use crate::access::AccessMode;
use crate::compiler::liveness::LiveSet;
use crate::pass::PassEntry;

pub(crate) struct DependencyGraph {
    pub(crate) live_order: Vec<usize>,
    pub(crate) adjacency: HashMap<usize, Vec<usize>>,
    pub(crate) in_degree: HashMap<usize, usize>,
}

pub(crate) fn build_dependency_graph(passes: &[PassEntry], live: &LiveSet) -> DependencyGraph {
    let live_order: Vec<usize> = (0..passes.len()).filter(|i| live.passes.contains(i)).collect();

    let mut edges: HashSet<(usize, usize)> = HashSet::new();

    for (pos, &consumer_idx) in live_order.iter().enumerate() {
        let consumer = &passes[consumer_idx];

        let written_here: HashSet<u64> = consumer
            .accesses
            .iter()
            .filter(|a| a.mode == AccessMode::Write)
            .map(|a| a.handle.handle_id)
            .collect();

        for access in &consumer.accesses {
            // a write-edge from an earlier producer already orders this access;
            // a same-pass write subsumes its own read of the same resource.
            if access.mode == AccessMode::Read && written_here.contains(&access.handle.handle_id) {
                continue;
            }

            for &producer_idx in &live_order[..pos] {
                let producer = &passes[producer_idx];
                let produces = producer
                    .accesses
                    .iter()
                    .any(|a| a.mode == AccessMode::Write && a.handle.handle_id == access.handle.handle_id);
                if produces {
                    edges.insert((producer_idx, consumer_idx));
                }
            }
        }

        for dep_name in &consumer.explicit_deps {
            if let Some(&producer_idx) = live_order.iter().find(|&&i| &passes[i].name == dep_name) {
                edges.insert((producer_idx, consumer_idx));
            }
        }
    }

    let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut in_degree: HashMap<usize, usize> = live_order.iter().map(|&i| (i, 0)).collect();

    for (producer, consumer) in edges {
        adjacency.entry(producer).or_default().push(consumer);
        *in_degree.entry(consumer).or_insert(0) += 1;
    }

    DependencyGraph { live_order, adjacency, in_degree }
}
