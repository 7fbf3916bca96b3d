//! Warm-start binding: a prior run's saved priority order and UB, fed back
//! in to skip ALAP recomputation (spec §4.7).
use std::collections::HashSet;

use crate::error::SchedulerError;
use crate::graph::TaskGraph;
use crate::priority::PriorityQueue;
use crate::task::TaskId;

#[derive(Debug, Clone)]
pub struct WarmStart {
    pub order: Vec<(i64, TaskId)>,
    pub ub: u64,
}

impl WarmStart {
    pub fn new(order: Vec<(i64, TaskId)>, ub: u64) -> Self {
        Self { order, ub }
    }

    /// Validates the binding against `graph` and builds the heap it seeds
    /// (spec §7 — "Malformed warm-start", reported before any placement).
    pub fn into_queue(self, graph: &TaskGraph) -> Result<(PriorityQueue, u64), SchedulerError> {
        if self.ub == 0 {
            return Err(SchedulerError::MalformedWarmStart {
                reason: "ub must be positive".to_string(),
            });
        }

        let mut seen: HashSet<TaskId> = HashSet::with_capacity(self.order.len());
        for (_, id) in &self.order {
            if !seen.insert(*id) {
                return Err(SchedulerError::MalformedWarmStart {
                    reason: format!("order lists task {id} more than once"),
                });
            }
        }

        let expected: HashSet<TaskId> = graph.node_indices().map(|idx| graph.id_of(idx)).collect();
        if seen != expected {
            return Err(SchedulerError::MalformedWarmStart {
                reason: "order does not cover exactly the current graph's node set".to_string(),
            });
        }

        Ok((PriorityQueue::from_pairs(self.order), self.ub))
    }
}
