//! Engine output types: the combined state vector and consolidated intervals.

use serde::{Deserialize, Serialize};

/// Frequency and idle depth of one core. `None` means not yet sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoreState {
    pub freq: Option<i64>,
    pub idle: Option<i64>,
}

impl CoreState {
    pub fn new(freq: i64, idle: i64) -> Self {
        Self {
            freq: Some(freq),
            idle: Some(idle),
        }
    }
}

/// Snapshot of every track's value at one instant.
///
/// Equality compares every component, with null distinct from any number, so
/// the vector can be used directly as a grouping key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateVector {
    pub cores: Vec<CoreState>,
    pub suspended: bool,
}

impl StateVector {
    /// All-null state for `cores` cores, not suspended.
    pub fn unknown(cores: usize) -> Self {
        Self {
            cores: vec![CoreState::default(); cores],
            suspended: false,
        }
    }

    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    pub fn freq(&self, core: usize) -> Option<i64> {
        self.cores.get(core).and_then(|c| c.freq)
    }

    pub fn idle(&self, core: usize) -> Option<i64> {
        self.cores.get(core).and_then(|c| c.idle)
    }
}

/// One span of constant state with the counter activity consumed inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedInterval {
    pub ts: i64,
    pub dur: i64,
    pub hit_delta: Option<i64>,
    pub miss_delta: Option<i64>,
    pub state: StateVector,
}

impl ConsolidatedInterval {
    /// Exclusive end timestamp.
    pub fn end(&self) -> i64 {
        self.ts.saturating_add(self.dur)
    }
}

/// Add two optional counts; null only when both sides are null.
pub(crate) fn add_counts(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.saturating_add(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}
