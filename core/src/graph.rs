//! Task graph model: a labeled DAG with per-node duration and memory, plus
//! explicit insertion-ordered adjacency for deterministic locality choices.
//!
//! Petgraph's own adjacency iteration order is not the input document's
//! order (it is, for `Graph`, closer to reverse insertion order), and Tier 1
//! locality selection depends on picking the *first* placed predecessor in
//! document order. We therefore keep a side table of ordered predecessor
//! indices built at construction time, following the pattern the teacher
//! crate uses for other DAG book-keeping layered on top of `petgraph::Graph`.
use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::Direction::Outgoing;

use crate::error::SchedulerError;
use crate::task::{TaskId, TaskSpec};

/// Per-node payload carried by the underlying petgraph DAG.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub id: TaskId,
    pub duration: u32,
    pub memory: u32,
}

/// A validated, acyclic task graph.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    graph: Graph<NodeData, ()>,
    index_of: HashMap<TaskId, NodeIndex>,
    predecessors: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl TaskGraph {
    /// Builds a graph from task records, validating durations, predecessor
    /// references, and acyclicity (spec §4.1, §7 — "Invalid graph").
    pub fn from_tasks(tasks: &[TaskSpec]) -> Result<Self, SchedulerError> {
        let mut graph = Graph::<NodeData, ()>::new();
        let mut index_of = HashMap::with_capacity(tasks.len());

        for task in tasks {
            if task.duration == 0 {
                return Err(SchedulerError::InvalidGraph {
                    reason: format!("task {} has non-positive duration", task.id),
                });
            }
            if index_of.contains_key(&task.id) {
                return Err(SchedulerError::InvalidGraph {
                    reason: format!("task id {} is duplicated", task.id),
                });
            }
            let idx = graph.add_node(NodeData {
                id: task.id,
                duration: task.duration,
                memory: task.memory,
            });
            index_of.insert(task.id, idx);
        }

        let mut predecessors: HashMap<NodeIndex, Vec<NodeIndex>> =
            HashMap::with_capacity(tasks.len());
        for task in tasks {
            let this_idx = index_of[&task.id];
            let mut ordered_preds = Vec::with_capacity(task.predecessors.len());
            for pred_id in &task.predecessors {
                let pred_idx = *index_of.get(pred_id).ok_or_else(|| SchedulerError::InvalidGraph {
                    reason: format!("task {} depends on undefined task {}", task.id, pred_id),
                })?;
                graph.add_edge(pred_idx, this_idx, ());
                ordered_preds.push(pred_idx);
            }
            predecessors.insert(this_idx, ordered_preds);
        }

        if toposort(&graph, None).is_err() {
            return Err(SchedulerError::InvalidGraph {
                reason: "task graph contains a cycle".to_string(),
            });
        }

        Ok(Self {
            graph,
            index_of,
            predecessors,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn id_of(&self, idx: NodeIndex) -> TaskId {
        self.graph[idx].id
    }

    pub fn index_of(&self, id: TaskId) -> Option<NodeIndex> {
        self.index_of.get(&id).copied()
    }

    pub fn duration(&self, idx: NodeIndex) -> u32 {
        self.graph[idx].duration
    }

    pub fn memory(&self, idx: NodeIndex) -> u32 {
        self.graph[idx].memory
    }

    /// Predecessors in input-document order — not petgraph's internal order.
    pub fn predecessors(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.predecessors
            .get(&idx)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn successors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Outgoing)
    }
}
