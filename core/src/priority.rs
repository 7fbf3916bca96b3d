//! Priority queue: a min-heap over `(alap, id)` pairs (spec §4.3). Smaller
//! ALAP pops first; ties are broken by ascending id via the tuple's natural
//! ordering. There is no decrease-key — entries are never modified after
//! insertion.
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::task::TaskId;

#[derive(Debug, Clone, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<Reverse<(i64, TaskId)>>,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, priority: i64, id: TaskId) {
        self.heap.push(Reverse((priority, id)));
    }

    pub fn pop(&mut self) -> Option<(i64, TaskId)> {
        self.heap.pop().map(|Reverse(pair)| pair)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Snapshot of the current contents, for producing `saved_order` before
    /// consumption. The snapshot's own ordering carries no meaning — feeding
    /// it back through [`PriorityQueue::from_pairs`] rebuilds an equivalent
    /// heap regardless of the order the pairs are listed in.
    pub fn snapshot(&self) -> Vec<(i64, TaskId)> {
        self.heap.iter().map(|Reverse(pair)| *pair).collect()
    }

    /// Rebuilds a heap from a previously saved order (spec §4.7 warm start).
    pub fn from_pairs(pairs: Vec<(i64, TaskId)>) -> Self {
        Self {
            heap: pairs.into_iter().map(Reverse).collect(),
        }
    }
}
