//! Caller-side reduction of a consolidated sequence.
//!
//! Groups intervals by their full [`StateVector`] and sums duration and
//! counter deltas, the way downstream power models bucket residency. The
//! engine never calls this; it operates on the engine's output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::{ConsolidatedInterval, StateVector, add_counts};

/// Total residency and counter activity of one distinct state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSummary {
    pub duration: i64,
    pub hit_count: Option<i64>,
    pub miss_count: Option<i64>,
    pub intervals: usize,
    pub state: StateVector,
}

/// Group by state vector, order by total duration descending.
///
/// Ties keep the order in which each state first appeared. `limit` caps the
/// number of rows returned.
pub fn summarize_by_state(
    intervals: &[ConsolidatedInterval],
    limit: Option<usize>,
) -> Vec<StateSummary> {
    let mut index: HashMap<&StateVector, usize> = HashMap::new();
    let mut rows: Vec<StateSummary> = Vec::new();

    for iv in intervals {
        let slot = *index.entry(&iv.state).or_insert_with(|| {
            rows.push(StateSummary {
                duration: 0,
                hit_count: None,
                miss_count: None,
                intervals: 0,
                state: iv.state.clone(),
            });
            rows.len() - 1
        });
        let row = &mut rows[slot];
        row.duration = row.duration.saturating_add(iv.dur);
        row.hit_count = add_counts(row.hit_count, iv.hit_delta);
        row.miss_count = add_counts(row.miss_count, iv.miss_delta);
        row.intervals += 1;
    }

    // Stable sort preserves first-appearance order among equal durations.
    rows.sort_by(|a, b| b.duration.cmp(&a.duration));
    if let Some(n) = limit {
        rows.truncate(n);
    }
    rows
}
