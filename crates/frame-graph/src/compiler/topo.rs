//! Deterministic topological sort: Kahn's algorithm with ties broken by
//! original declaration order, so two otherwise-independent passes always
//! schedule in the order the caller declared them.

use std::collections::{BTreeSet, HashMap};

use crate::error::CompileError;
use crate::pass::PassEntry;

pub(crate) fn topo_sort(
    live_order: &[usize],
    adjacency: &HashMap<usize, Vec<usize>>,
    in_degree: &HashMap<usize, usize>,
    passes: &[PassEntry],
) -> Result<Vec<usize>, CompileError> {
    let mut in_degree = in_degree.clone();
    let mut ready: BTreeSet<usize> = live_order.iter().copied().filter(|i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(live_order.len());

    while let Some(&idx) = ready.iter().next() {
        ready.remove(&idx);
        order.push(idx);

        if let Some(consumers) = adjacency.get(&idx) {
            for &consumer in consumers {
                let deg = in_degree.get_mut(&consumer).expect("consumer present in in_degree map");
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(consumer);
                }
            }
        }
    }

    if order.len() != live_order.len() {
        let scheduled: std::collections::HashSet<usize> = order.iter().copied().collect();
        let stuck: Vec<String> = live_order
            .iter()
            .filter(|i| !scheduled.contains(i))
            .map(|&i| passes[i].name.clone())
            .collect();
        return Err(CompileError::Cycle(stuck));
    }

    Ok(order)
}
