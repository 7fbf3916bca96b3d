//! As-Late-As-Possible (ALAP) latest-finish analysis (spec §4.2).
//!
//! Nodes are visited in reverse topological order, ties broken
//! lexicographically by task id — this determinism matters because the
//! priority queue's popping order depends on it. We get that order by
//! running Kahn's algorithm forward (smallest-id-first among ready nodes)
//! and then reversing the result, mirroring the source's
//! `reversed(lexicographical_topological_sort(graph))`.
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graph::NodeIndex;

use crate::graph::TaskGraph;
use crate::task::TaskId;

pub struct AlapResult {
    pub alap: HashMap<NodeIndex, i64>,
    pub ub: u64,
}

fn lexicographical_topo_order(graph: &TaskGraph) -> Vec<NodeIndex> {
    let mut indegree: HashMap<NodeIndex, usize> = HashMap::with_capacity(graph.node_count());
    for idx in graph.node_indices() {
        indegree.insert(idx, graph.predecessors(idx).len());
    }

    let mut ready: BinaryHeap<Reverse<(TaskId, NodeIndex)>> = BinaryHeap::new();
    for idx in graph.node_indices() {
        if indegree[&idx] == 0 {
            ready.push(Reverse((graph.id_of(idx), idx)));
        }
    }

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse((_, idx))) = ready.pop() {
        order.push(idx);
        for succ in graph.successors(idx) {
            let remaining = indegree.get_mut(&succ).expect("successor must be indexed");
            *remaining -= 1;
            if *remaining == 0 {
                ready.push(Reverse((graph.id_of(succ), succ)));
            }
        }
    }
    order
}

/// Computes ALAP latest-finish values and the upper bound UB (sum of all
/// durations). Assumes `graph` is already validated acyclic.
pub fn compute(graph: &TaskGraph) -> AlapResult {
    let mut order = lexicographical_topo_order(graph);
    order.reverse();

    let mut alap: HashMap<NodeIndex, i64> = HashMap::with_capacity(graph.node_count());
    let mut ub: u64 = 0;

    for idx in order {
        let duration = graph.duration(idx);
        ub += duration as u64;

        let mut successors = graph.successors(idx).peekable();
        let value = if successors.peek().is_none() {
            -(duration as i64)
        } else {
            successors
                .map(|succ| alap[&succ] - duration as i64)
                .min()
                .expect("non-empty successor iterator yields a minimum")
        };
        alap.insert(idx, value);
    }

    AlapResult { alap, ub }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskSpec;

    fn spec(id: TaskId, duration: u32, preds: &[TaskId]) -> TaskSpec {
        TaskSpec {
            id,
            duration,
            memory: 0,
            predecessors: preds.to_vec(),
        }
    }

    #[test]
    fn chain_of_three() {
        let specs = vec![spec(0, 5, &[]), spec(1, 3, &[0]), spec(2, 2, &[1])];
        let graph = TaskGraph::from_tasks(&specs).unwrap();
        let result = compute(&graph);
        assert_eq!(result.ub, 10);
        let a = graph.index_of(0).unwrap();
        let b = graph.index_of(1).unwrap();
        let c = graph.index_of(2).unwrap();
        assert_eq!(result.alap[&c], -2);
        assert_eq!(result.alap[&b], -5);
        assert_eq!(result.alap[&a], -10);
    }

    #[test]
    fn fork_join() {
        // A -> B, A -> C, B -> D, C -> D; durations 4,2,2,3
        let specs = vec![
            spec(0, 4, &[]),
            spec(1, 2, &[0]),
            spec(2, 2, &[0]),
            spec(3, 3, &[1, 2]),
        ];
        let graph = TaskGraph::from_tasks(&specs).unwrap();
        let result = compute(&graph);
        assert_eq!(result.ub, 11);
        let a = graph.index_of(0).unwrap();
        let b = graph.index_of(1).unwrap();
        let c = graph.index_of(2).unwrap();
        let d = graph.index_of(3).unwrap();
        assert_eq!(result.alap[&d], -3);
        assert_eq!(result.alap[&b], -5);
        assert_eq!(result.alap[&c], -5);
        assert_eq!(result.alap[&a], -9);
    }

    #[test]
    fn is_deterministic_across_repeated_calls() {
        let specs = vec![spec(0, 4, &[]), spec(1, 2, &[0]), spec(2, 2, &[0])];
        let graph = TaskGraph::from_tasks(&specs).unwrap();
        let first = compute(&graph);
        let second = compute(&graph);
        for idx in graph.node_indices() {
            assert_eq!(first.alap[&idx], second.alap[&idx]);
        }
        assert_eq!(first.ub, second.ub);
    }

    #[test]
    fn empty_graph_has_zero_ub() {
        let graph = TaskGraph::from_tasks(&[]).unwrap();
        let result = compute(&graph);
        assert_eq!(result.ub, 0);
        assert!(result.alap.is_empty());
    }
}
