//! Fatal failure kinds the core surfaces. Every run either produces a
//! complete schedule or none at all — there is no partial result.
use thiserror::Error;

use crate::task::TaskId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// A cycle, a dangling predecessor id, or a non-positive duration.
    /// Reported before any placement occurs.
    #[error("invalid task graph: {reason}")]
    InvalidGraph { reason: String },

    /// At Tier 3, no active processor was memory-compatible with the task.
    #[error("task {task} is infeasible: no memory-compatible processor is active")]
    InfeasibleMemoryClass { task: TaskId },

    /// The supplied warm-start binding does not cover exactly the current
    /// graph's node set, or its upper bound is non-positive.
    #[error("malformed warm-start binding: {reason}")]
    MalformedWarmStart { reason: String },
}
