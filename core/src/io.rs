//! JSON wire types (spec §6) and their conversions to/from the domain model.
//! These are the only types in the core crate that know about serde — the
//! placement engine and graph model operate entirely on [`crate::task`]
//! types, never on these documents directly.
use std::collections::{BTreeMap, HashMap};

use serde_derive::{Deserialize, Serialize};

use crate::availability::AvailabilityTimeline;
use crate::task::{PlacedTask, ProcessorId, ScheduleResult, TaskId, TaskSpec};
use crate::warm_start::WarmStart;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: u32,
    pub duration: u32,
    pub memory: u32,
    #[serde(default)]
    pub dependencies: Vec<u32>,
}

impl From<&TaskRecord> for TaskSpec {
    fn from(record: &TaskRecord) -> Self {
        TaskSpec {
            id: record.id,
            duration: record.duration,
            memory: record.memory,
            predecessors: record.dependencies.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGraphDocument {
    pub tasks: Vec<TaskRecord>,
}

impl TaskGraphDocument {
    pub fn to_specs(&self) -> Vec<TaskSpec> {
        self.tasks.iter().map(TaskSpec::from).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmStartDocument {
    pub order: Vec<(i64, u32)>,
    pub ub: u64,
}

impl From<WarmStartDocument> for WarmStart {
    fn from(doc: WarmStartDocument) -> Self {
        WarmStart::new(doc.order, doc.ub)
    }
}

impl From<&WarmStart> for WarmStartDocument {
    fn from(ws: &WarmStart) -> Self {
        WarmStartDocument {
            order: ws.order.clone(),
            ub: ws.ub,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEntry {
    pub task: TaskId,
    pub start_time: u64,
    pub duration: u32,
}

impl From<&PlacedTask> for ScheduledEntry {
    fn from(task: &PlacedTask) -> Self {
        ScheduledEntry {
            task: task.id,
            start_time: task.start_time,
            duration: task.duration,
        }
    }
}

/// A single `core_<id>` key per processor referenced anywhere in the
/// timeline, even processors that never received a task — spec §6's
/// "every processor id appears" rule.
pub fn schedule_output(
    result: &ScheduleResult,
    timeline: &AvailabilityTimeline,
) -> BTreeMap<String, Vec<ScheduledEntry>> {
    let mut by_processor: HashMap<ProcessorId, Vec<ScheduledEntry>> = HashMap::new();
    for p in timeline.all_processor_ids() {
        by_processor.insert(p, Vec::new());
    }
    for task in &result.schedule {
        by_processor
            .entry(task.processor)
            .or_default()
            .push(ScheduledEntry::from(task));
    }

    by_processor
        .into_iter()
        .map(|(p, mut entries)| {
            entries.sort_by_key(|e| (e.start_time, e.task));
            (format!("core_{p}"), entries)
        })
        .collect()
}

/// Reconstructs the [`AvailabilityTimeline`] the CLI's `--window` flags
/// describe, given already-parsed `(threshold, low, high)` triples.
pub fn build_timeline(
    windows: Vec<(u64, Vec<ProcessorId>, Vec<ProcessorId>)>,
) -> AvailabilityTimeline {
    AvailabilityTimeline::new(
        windows
            .into_iter()
            .map(|(t, low, high)| (t, low.into_iter().collect(), high.into_iter().collect()))
            .collect(),
    )
}
