//! The MCP placement engine (spec §4.4–§4.6): pops tasks in priority order,
//! computes each task's earliest feasible start from its predecessors and
//! processor readiness, picks a processor via the three-tier rule, and
//! records the placement.
use std::collections::HashMap;
use std::collections::HashSet;

use log::{debug, trace, warn};
use petgraph::graph::NodeIndex;

use crate::availability::{AvailabilityTimeline, AvailabilityWindow};
use crate::error::SchedulerError;
use crate::graph::TaskGraph;
use crate::priority::PriorityQueue;
use crate::task::{PlacedTask, ProcessorId, ScheduleResult, TaskId};

/// Communication cost charged once when a task starts on a processor other
/// than the one a locality-preferred predecessor ran on. Canonical value
/// per spec §4.4 step 4 / §9's resolved open question.
pub const COMMUNICATION_PENALTY: u64 = 1;

/// Runs the MCP placement loop to completion.
///
/// `queue` must already contain every node in `graph` exactly once, keyed
/// by priority (spec §3's "Priority ordering" invariant) — the caller is
/// responsible for that, whether via fresh ALAP computation or a validated
/// warm-start binding.
pub fn run(
    graph: &TaskGraph,
    timeline: &AvailabilityTimeline,
    memory_limit: u32,
    mut queue: PriorityQueue,
    ub: u64,
) -> Result<ScheduleResult, SchedulerError> {
    let saved_order = queue.snapshot();

    if timeline.is_empty() {
        // Nothing to place against — only valid when there is also nothing
        // to place (spec §8 boundary: empty graph -> empty schedule).
        if queue.is_empty() {
            return Ok(ScheduleResult {
                schedule: Vec::new(),
                makespan: 0,
                saved_order,
                ub,
            });
        }
    }

    let mut window_index = 0usize;
    let mut window: AvailabilityWindow = timeline.window(window_index).clone();
    let mut readiness: HashMap<ProcessorId, u64> = window.all().map(|p| (p, 0u64)).collect();
    let mut retired: HashSet<ProcessorId> = HashSet::new();

    let mut schedule: Vec<PlacedTask> = Vec::with_capacity(queue.len());
    let mut placed: HashMap<NodeIndex, PlacedTask> = HashMap::with_capacity(queue.len());

    while let Some((_, task_id)) = queue.pop() {
        let idx = graph
            .index_of(task_id)
            .expect("priority order references a task present in the graph");

        let duration = graph.duration(idx) as u64;
        let memory = graph.memory(idx);
        let high_only = memory > memory_limit;

        let predecessors = graph.predecessors(idx);
        // All predecessors are already placed: ALAP-priority respects
        // topological order (spec §4.4 step 1).
        let l_dep = predecessors
            .iter()
            .map(|p| placed[p].end_time())
            .max()
            .unwrap_or(0);
        let preferred: Option<ProcessorId> = predecessors
            .iter()
            .find_map(|p| placed.get(p).map(|t| t.processor));

        let chosen = choose_processor(&window, &readiness, high_only, preferred, l_dep, task_id)?;

        let mut start_time = l_dep;
        if let Some(pi) = preferred {
            if chosen != pi {
                start_time += COMMUNICATION_PENALTY;
            }
        }
        start_time = start_time.max(readiness[&chosen]);

        debug!(
            "task {task_id} -> processor {chosen} at {start_time} (preferred={preferred:?})"
        );

        let task = PlacedTask {
            id: task_id,
            duration: duration as u32,
            start_time,
            processor: chosen,
        };
        readiness.insert(chosen, task.end_time());
        placed.insert(idx, task);
        schedule.push(task);

        // §4.5 — recompute min readiness over the *currently active* set
        // and advance the timeline at most one threshold per placement.
        let min_active_readiness = window
            .all()
            .map(|p| readiness[&p])
            .min()
            .unwrap_or(min_sentinel_if_empty(ub));

        if window_index + 1 < timeline.thresholds().len() {
            let next_threshold = timeline.thresholds()[window_index + 1];
            if min_active_readiness >= next_threshold {
                let old_window = window.clone();
                window_index += 1;
                window = timeline.window(window_index).clone();

                for p in old_window.all() {
                    if !window.contains(p) {
                        readiness.insert(p, ub);
                        retired.insert(p);
                    }
                }
                for p in window.all() {
                    if !old_window.contains(p) {
                        readiness.insert(p, min_active_readiness);
                        retired.remove(&p);
                    }
                }
                warn!(
                    "availability transitioned at threshold {next_threshold}: low={:?} high={:?}",
                    window.low, window.high
                );
                trace!("readiness after transition: {readiness:?}");
            }
        }
    }

    schedule.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));

    let makespan = readiness
        .iter()
        .filter(|(p, _)| !retired.contains(p))
        .map(|(_, &r)| r)
        .max()
        .unwrap_or(0);

    Ok(ScheduleResult {
        schedule,
        makespan,
        saved_order,
        ub,
    })
}

fn min_sentinel_if_empty(ub: u64) -> u64 {
    ub
}

/// Three-tier processor selection (spec §4.4 step 3).
///
/// Tier 1's memory/class clause is read as: the preferred processor must be
/// memory-compatible with *this* task (the high set when memory exceeds the
/// limit, any active processor otherwise) — see DESIGN.md for why this
/// reading, rather than "only ever prefer locality for over-limit tasks",
/// is the one that produces the locality behavior the worked examples in
/// the specification describe for ordinary (non-memory-exceeding) tasks.
fn choose_processor(
    window: &AvailabilityWindow,
    readiness: &HashMap<ProcessorId, u64>,
    high_only: bool,
    preferred: Option<ProcessorId>,
    l_dep: u64,
    task_id: TaskId,
) -> Result<ProcessorId, SchedulerError> {
    let mut compatible: Vec<ProcessorId> = if high_only {
        window.high.iter().copied().collect()
    } else {
        window.all().collect()
    };
    compatible.sort_unstable();

    if compatible.is_empty() {
        return Err(SchedulerError::InfeasibleMemoryClass { task: task_id });
    }

    // Tier 1: preferred processor, if memory-compatible and ready in time.
    if let Some(pi) = preferred {
        if compatible.binary_search(&pi).is_ok() && readiness[&pi] <= l_dep + COMMUNICATION_PENALTY
        {
            return Ok(pi);
        }
    }

    // Tier 2: any idle compatible processor, ascending id.
    if let Some(&p) = compatible.iter().find(|p| readiness[p] <= l_dep) {
        return Ok(p);
    }

    // Tier 3: earliest-free compatible processor, ties by ascending id.
    compatible
        .into_iter()
        .min_by_key(|p| (readiness[p], *p))
        .ok_or(SchedulerError::InfeasibleMemoryClass { task: task_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alap;
    use crate::task::TaskSpec;
    use std::collections::BTreeSet;

    fn set(ids: &[u32]) -> BTreeSet<u32> {
        ids.iter().copied().collect()
    }

    fn task(id: TaskId, duration: u32, memory: u32, preds: &[TaskId]) -> TaskSpec {
        TaskSpec {
            id,
            duration,
            memory,
            predecessors: preds.to_vec(),
        }
    }

    fn run_fresh(
        specs: &[TaskSpec],
        timeline: AvailabilityTimeline,
        memory_limit: u32,
    ) -> ScheduleResult {
        let graph = TaskGraph::from_tasks(specs).unwrap();
        let alap::AlapResult { alap, ub } = alap::compute(&graph);
        let mut queue = PriorityQueue::new();
        for idx in graph.node_indices() {
            queue.push(alap[&idx], graph.id_of(idx));
        }
        run(&graph, &timeline, memory_limit, queue, ub).unwrap()
    }

    fn entry<'a>(result: &'a ScheduleResult, id: TaskId) -> &'a PlacedTask {
        result.schedule.iter().find(|t| t.id == id).unwrap()
    }

    #[test]
    fn chain_of_three_keeps_locality_and_serial_makespan() {
        let specs = vec![task(0, 5, 0, &[]), task(1, 3, 0, &[0]), task(2, 2, 0, &[1])];
        let timeline = AvailabilityTimeline::new(vec![(0, set(&[0, 1]), set(&[]))]);
        let result = run_fresh(&specs, timeline, 1);

        assert_eq!(entry(&result, 0).processor, 0);
        assert_eq!(entry(&result, 0).start_time, 0);
        assert_eq!(entry(&result, 1).processor, 0);
        assert_eq!(entry(&result, 1).start_time, 5);
        assert_eq!(entry(&result, 2).processor, 0);
        assert_eq!(entry(&result, 2).start_time, 8);
        assert_eq!(result.makespan, 10);
        assert_eq!(result.ub, 10);
    }

    #[test]
    fn fork_join_pays_communication_for_the_non_local_branch() {
        // A -> B, A -> C, B -> D, C -> D; durations 4,2,2,3; memory 0.
        let specs = vec![
            task(0, 4, 0, &[]),
            task(1, 2, 0, &[0]),
            task(2, 2, 0, &[0]),
            task(3, 3, 0, &[1, 2]),
        ];
        let timeline = AvailabilityTimeline::new(vec![(0, set(&[0, 1]), set(&[]))]);
        let result = run_fresh(&specs, timeline, 1);

        let a = entry(&result, 0);
        let b = entry(&result, 1);
        let c = entry(&result, 2);
        let d = entry(&result, 3);

        assert_eq!((a.processor, a.start_time), (0, 0));
        assert_eq!((b.processor, b.start_time), (0, 4));
        // C cannot stay with A (proc 0 busy until 6, past l_dep + C = 5), so
        // it pays the communication penalty to take the idle processor 1.
        assert_eq!(c.processor, 1);
        assert_eq!(c.start_time, 5);
        // D follows its locality-preferred predecessor B back onto proc 0.
        assert_eq!(d.processor, 0);
        assert_eq!(d.start_time, 7);
        assert_eq!(result.makespan, 10);
        assert!(result.makespan <= result.ub);
    }

    #[test]
    fn memory_gated_tasks_are_split_by_class() {
        let specs = vec![task(0, 4, 100, &[]), task(1, 4, 10, &[])];
        let timeline = AvailabilityTimeline::new(vec![(0, set(&[0]), set(&[1]))]);
        let result = run_fresh(&specs, timeline, 50);

        let high_mem = entry(&result, 0);
        let low_mem = entry(&result, 1);
        assert_eq!(high_mem.processor, 1);
        assert_eq!(low_mem.processor, 0);
        assert_eq!(high_mem.start_time, 0);
        assert_eq!(low_mem.start_time, 0);
    }

    #[test]
    fn timeline_transition_does_not_fire_before_the_threshold() {
        // A's readiness (30) never reaches the threshold (50), so the sole
        // active processor must never be retired. If it were wrongly
        // retired, the makespan would collapse to 0 (max over an empty,
        // all-retired set) instead of 30.
        let specs = vec![task(0, 30, 0, &[])];
        let timeline = AvailabilityTimeline::new(vec![
            (0, set(&[0]), set(&[])),
            (50, set(&[1]), set(&[])),
        ]);
        let result = run_fresh(&specs, timeline, 1);

        let x = entry(&result, 0);
        assert_eq!(x.processor, 0);
        assert_eq!(x.start_time, 0);
        assert_eq!(result.makespan, 30);
    }

    #[test]
    fn timeline_transition_fires_immediately_after_the_placement_that_crosses_it() {
        // A's readiness (60) crosses the threshold (50) the moment A is
        // placed. The transition must be observed in that same iteration,
        // before B is placed, or B would wrongly still see processor 0 as
        // active and land there instead of on the newly active processor 1.
        let specs = vec![task(0, 60, 0, &[]), task(1, 5, 0, &[])];
        let timeline = AvailabilityTimeline::new(vec![
            (0, set(&[0]), set(&[])),
            (50, set(&[1]), set(&[])),
        ]);
        let result = run_fresh(&specs, timeline, 1);

        let a = entry(&result, 0);
        let b = entry(&result, 1);
        assert_eq!(a.processor, 0);
        assert_eq!(a.start_time, 0);
        assert_eq!(b.processor, 1);
        assert_eq!(b.start_time, 60);
        assert_eq!(result.makespan, 65);
    }

    #[test]
    fn timeline_retirement_excludes_retired_processor_from_makespan() {
        let specs = vec![task(0, 60, 0, &[]), task(1, 60, 0, &[])];
        let timeline = AvailabilityTimeline::new(vec![
            (0, set(&[0, 1]), set(&[])),
            (50, set(&[1]), set(&[])),
        ]);
        let result = run_fresh(&specs, timeline, 1);

        assert_eq!(entry(&result, 0).processor, 0);
        assert_eq!(entry(&result, 1).processor, 1);
        // Processor 0 is retired once both tasks finish and its readiness
        // (60) crosses the threshold (50); its sentinel value must not leak
        // into the makespan.
        assert_eq!(result.makespan, 60);
    }

    #[test]
    fn infeasible_when_high_set_is_empty_everywhere() {
        let specs = vec![task(0, 1, 100, &[])];
        let timeline = AvailabilityTimeline::new(vec![(0, set(&[0, 1]), set(&[]))]);
        let graph = TaskGraph::from_tasks(&specs).unwrap();
        let alap::AlapResult { alap, ub } = alap::compute(&graph);
        let mut queue = PriorityQueue::new();
        for idx in graph.node_indices() {
            queue.push(alap[&idx], graph.id_of(idx));
        }
        let err = run(&graph, &timeline, 50, queue, ub).unwrap_err();
        assert_eq!(err, SchedulerError::InfeasibleMemoryClass { task: 0 });
    }

    #[test]
    fn empty_graph_yields_empty_schedule() {
        let specs: Vec<TaskSpec> = vec![];
        let timeline = AvailabilityTimeline::new(vec![(0, set(&[0]), set(&[]))]);
        let result = run_fresh(&specs, timeline, 1);
        assert!(result.schedule.is_empty());
        assert_eq!(result.makespan, 0);
    }

    #[test]
    fn single_node_boundary() {
        let specs = vec![task(0, 7, 0, &[])];
        let timeline = AvailabilityTimeline::new(vec![(0, set(&[0, 1]), set(&[]))]);
        let result = run_fresh(&specs, timeline, 1);
        let t = entry(&result, 0);
        assert_eq!(t.start_time, 0);
        assert_eq!(t.processor, 0);
        assert_eq!(result.makespan, 7);
    }

    #[test]
    fn warm_start_reproduces_identical_placements() {
        let specs = vec![
            task(0, 4, 0, &[]),
            task(1, 2, 0, &[0]),
            task(2, 2, 0, &[0]),
            task(3, 3, 0, &[1, 2]),
        ];
        let timeline = AvailabilityTimeline::new(vec![(0, set(&[0, 1]), set(&[]))]);
        let graph = TaskGraph::from_tasks(&specs).unwrap();

        let alap::AlapResult { alap, ub } = alap::compute(&graph);
        let mut queue = PriorityQueue::new();
        for idx in graph.node_indices() {
            queue.push(alap[&idx], graph.id_of(idx));
        }
        let first = run(&graph, &timeline, 1, queue, ub).unwrap();

        let warm_queue = PriorityQueue::from_pairs(first.saved_order.clone());
        let second = run(&graph, &timeline, 1, warm_queue, first.ub).unwrap();

        assert_eq!(first.makespan, second.makespan);
        for t in &first.schedule {
            let other = second.schedule.iter().find(|o| o.id == t.id).unwrap();
            assert_eq!(t.start_time, other.start_time);
            assert_eq!(t.processor, other.processor);
        }
    }
}
