//! Input and output task types shared by the graph, placement, and io modules.

/// Stable task identifier.
pub type TaskId = u32;

/// Stable processor identifier.
pub type ProcessorId = u32;

/// A task as given by the caller: duration, memory demand, and predecessors
/// in the order they appeared in the input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub id: TaskId,
    pub duration: u32,
    pub memory: u32,
    pub predecessors: Vec<TaskId>,
}

/// A task once the engine has committed it to a processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTask {
    pub id: TaskId,
    pub duration: u32,
    pub start_time: u64,
    pub processor: ProcessorId,
}

impl PlacedTask {
    pub fn end_time(&self) -> u64 {
        self.start_time + self.duration as u64
    }
}

/// The output of a complete scheduling run: the placements, the makespan,
/// the priority order as it stood before consumption (for warm-starting a
/// later run), and the upper bound used as the retirement sentinel.
#[derive(Debug, Clone)]
pub struct ScheduleResult {
    pub schedule: Vec<PlacedTask>,
    pub makespan: u64,
    pub saved_order: Vec<(i64, TaskId)>,
    pub ub: u64,
}
