//! Window clipper: intersect an interval sequence with one time window.

use serde::{Deserialize, Serialize};

use crate::state::ConsolidatedInterval;

/// A half-open window `[start, start + dur)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub dur: i64,
}

impl TimeWindow {
    pub fn new(start: i64, dur: i64) -> Self {
        Self { start, dur }
    }

    pub fn end(&self) -> i64 {
        self.start.saturating_add(self.dur)
    }

    /// A window with non-positive duration contains nothing.
    pub fn is_empty(&self) -> bool {
        self.dur <= 0
    }

    /// Whether `[ts, end)` shares any time with the window.
    pub fn overlaps(&self, ts: i64, end: i64) -> bool {
        !self.is_empty() && ts < self.end() && end > self.start
    }
}

/// Restrict `intervals` to `[window_start, window_start + window_dur)`.
///
/// Intervals straddling an edge are shortened; their state is kept as is.
/// Counter deltas are NOT prorated: a truncated interval still reports the
/// delta of its full original span, because the engine has no sub-interval
/// count resolution. Callers summing deltas over a clipped sequence should
/// expect the edge intervals to over-attribute.
pub fn clip(
    intervals: &[ConsolidatedInterval],
    window_start: i64,
    window_dur: i64,
) -> Vec<ConsolidatedInterval> {
    clip_to(intervals, TimeWindow::new(window_start, window_dur))
}

/// [`clip`] taking a [`TimeWindow`].
pub fn clip_to(intervals: &[ConsolidatedInterval], window: TimeWindow) -> Vec<ConsolidatedInterval> {
    if window.is_empty() {
        return Vec::new();
    }
    let window_end = window.end();

    // Intervals are sorted and contiguous: skip straight to the first one
    // ending after the window start.
    let first = intervals.partition_point(|iv| iv.end() <= window.start);
    intervals[first..]
        .iter()
        .take_while(|iv| iv.ts < window_end)
        .filter_map(|iv| {
            let ts = iv.ts.max(window.start);
            let end = iv.end().min(window_end);
            (end > ts).then(|| ConsolidatedInterval {
                ts,
                dur: end - ts,
                ..iv.clone()
            })
        })
        .collect()
}
