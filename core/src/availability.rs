//! Piecewise-constant processor availability timeline (spec §3, §4.5).
//!
//! This is an in-process configuration value, not part of the JSON wire
//! contract (spec §6) — callers build it directly, the way the teacher's
//! `HomogeneousProcessor` is constructed in-process rather than parsed.
use std::collections::BTreeSet;

use crate::task::ProcessorId;

/// The active low- and high-memory-capable processor sets for one interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub low: BTreeSet<ProcessorId>,
    pub high: BTreeSet<ProcessorId>,
}

impl AvailabilityWindow {
    pub fn new(low: BTreeSet<ProcessorId>, high: BTreeSet<ProcessorId>) -> Self {
        Self { low, high }
    }

    /// All active processors, low then high, each in ascending id order.
    pub fn all(&self) -> impl Iterator<Item = ProcessorId> + '_ {
        self.low.iter().copied().chain(self.high.iter().copied())
    }

    pub fn contains(&self, p: ProcessorId) -> bool {
        self.low.contains(&p) || self.high.contains(&p)
    }
}

/// A mapping from non-decreasing threshold times to the processor sets
/// active from that threshold until the next one.
#[derive(Debug, Clone)]
pub struct AvailabilityTimeline {
    thresholds: Vec<u64>,
    windows: Vec<AvailabilityWindow>,
}

impl AvailabilityTimeline {
    /// Builds a timeline from `(threshold, low, high)` triples. The smallest
    /// threshold must be 0; entries are sorted by threshold. Low and high
    /// sets within a single window are assumed disjoint, as the spec
    /// requires of the caller-supplied configuration.
    pub fn new(mut entries: Vec<(u64, BTreeSet<ProcessorId>, BTreeSet<ProcessorId>)>) -> Self {
        entries.sort_by_key(|(t, _, _)| *t);
        debug_assert!(
            entries.first().map(|(t, ..)| *t) == Some(0),
            "availability timeline must start at threshold 0"
        );
        debug_assert!(
            entries.iter().all(|(_, low, high)| low.is_disjoint(high)),
            "low and high processor sets must be disjoint within a window"
        );

        let mut thresholds = Vec::with_capacity(entries.len());
        let mut windows = Vec::with_capacity(entries.len());
        for (t, low, high) in entries {
            thresholds.push(t);
            windows.push(AvailabilityWindow::new(low, high));
        }
        Self { thresholds, windows }
    }

    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }

    pub fn window(&self, index: usize) -> &AvailabilityWindow {
        &self.windows[index]
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// All processor ids referenced anywhere in the timeline, ascending.
    pub fn all_processor_ids(&self) -> BTreeSet<ProcessorId> {
        let mut ids = BTreeSet::new();
        for window in &self.windows {
            ids.extend(window.low.iter().copied());
            ids.extend(window.high.iter().copied());
        }
        ids
    }
}
