//! Modified-Critical-Path scheduler for heterogeneous, memory-limited,
//! time-varying processor pools.
//!
//! The public surface is [`schedule`] (fresh ALAP run) and
//! [`schedule_with_warm_start`] (resumes from a prior run's saved priority
//! order). Both return a [`task::ScheduleResult`] whose `saved_order` can be
//! fed back into the latter on a later call.
pub mod alap;
pub mod availability;
pub mod error;
pub mod graph;
pub mod io;
pub mod placement;
pub mod priority;
pub mod task;
pub mod warm_start;

use log::info;

pub use availability::{AvailabilityTimeline, AvailabilityWindow};
pub use error::SchedulerError;
pub use graph::TaskGraph;
pub use task::{PlacedTask, ScheduleResult, TaskId, TaskSpec};
pub use warm_start::WarmStart;

/// Builds a graph from `tasks`, computes ALAP priorities, and runs placement.
pub fn schedule(
    tasks: &[TaskSpec],
    timeline: &AvailabilityTimeline,
    memory_limit: u32,
) -> Result<ScheduleResult, SchedulerError> {
    let graph = TaskGraph::from_tasks(tasks)?;
    info!("scheduling {} tasks across {} timeline windows", graph.node_count(), timeline.len());

    let alap::AlapResult { alap, ub } = alap::compute(&graph);
    let mut queue = priority::PriorityQueue::new();
    for idx in graph.node_indices() {
        queue.push(alap[&idx], graph.id_of(idx));
    }

    placement::run(&graph, timeline, memory_limit, queue, ub)
}

/// Builds a graph from `tasks` and runs placement using a previously saved
/// priority order and upper bound instead of recomputing ALAP.
pub fn schedule_with_warm_start(
    tasks: &[TaskSpec],
    timeline: &AvailabilityTimeline,
    memory_limit: u32,
    warm_start: WarmStart,
) -> Result<ScheduleResult, SchedulerError> {
    let graph = TaskGraph::from_tasks(tasks)?;
    info!(
        "warm-starting {} tasks across {} timeline windows",
        graph.node_count(),
        timeline.len()
    );

    let (queue, ub) = warm_start.into_queue(&graph)?;
    placement::run(&graph, timeline, memory_limit, queue, ub)
}
