//! The consolidation pipeline.
//!
//! validate → sweep (counters + suspend overlay) → optional coalesce →
//! optional window clip.

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::state::{ConsolidatedInterval, add_counts};
use crate::sweep::SweepMerger;
use crate::track::TrackSet;
use crate::window::{TimeWindow, clip_to};

/// Knobs for one consolidation run.
#[derive(Debug, Clone)]
pub struct ConsolidateConfig {
    /// Number of per-core columns. `None` derives it from the tracks.
    pub cores: Option<usize>,
    /// Freeze per-core state during suspend.
    pub suspend_overlay: bool,
    /// Merge adjacent intervals whose state vectors are equal.
    pub coalesce: bool,
    /// Clip the result to this window.
    pub window: Option<TimeWindow>,
}

impl Default for ConsolidateConfig {
    fn default() -> Self {
        Self {
            cores: None,
            suspend_overlay: true,
            coalesce: false,
            window: None,
        }
    }
}

/// Run the full pipeline over `tracks`.
///
/// Any invalid track aborts the run; no partial output is returned.
pub fn consolidate(
    tracks: &TrackSet,
    config: &ConsolidateConfig,
) -> Result<Vec<ConsolidatedInterval>> {
    tracks.validate()?;

    let derived = tracks.core_count();
    let cores = match config.cores {
        Some(n) if n < derived => {
            return Err(Error::InvalidConfig(format!(
                "{n} cores configured but tracks reference {derived}"
            )));
        }
        Some(n) => n,
        None => derived,
    };

    let Some((first, last)) = tracks.span() else {
        info!("no samples in {} tracks; nothing to consolidate", tracks.len());
        return Ok(Vec::new());
    };
    debug!("trace span [{first}, {last}), {cores} cores");

    let mut merger = SweepMerger::new(tracks, cores)?;
    if config.suspend_overlay {
        merger = merger.with_suspend_overlay();
    }
    let mut intervals = merger.run()?;

    if config.coalesce {
        intervals = coalesce(intervals);
    }

    if let Some(window) = config.window {
        if !window.overlaps(first, last) {
            warn!(
                "window [{}, {}) does not intersect trace span [{first}, {last})",
                window.start,
                window.end()
            );
        }
        intervals = clip_to(&intervals, window);
    }

    info!(
        "consolidated {} tracks ({} samples) into {} intervals",
        tracks.len(),
        tracks.total_samples(),
        intervals.len()
    );
    Ok(intervals)
}

/// Merge runs of adjacent intervals with identical state, summing deltas.
pub fn coalesce(intervals: Vec<ConsolidatedInterval>) -> Vec<ConsolidatedInterval> {
    let mut out: Vec<ConsolidatedInterval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match out.last_mut() {
            Some(prev) if prev.end() == iv.ts && prev.state == iv.state => {
                prev.dur = prev.dur.saturating_add(iv.dur);
                prev.hit_delta = add_counts(prev.hit_delta, iv.hit_delta);
                prev.miss_delta = add_counts(prev.miss_delta, iv.miss_delta);
            }
            _ => out.push(iv),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{Track, TrackId};

    fn tracks() -> TrackSet {
        TrackSet::from_tracks([
            Track::from_pairs(TrackId::frequency(0), &[(0, 300), (100, 500)]),
            Track::from_pairs(TrackId::idle(0), &[(0, -1), (50, 1), (100, -1)]),
            Track::from_pairs(TrackId::cache_hits(), &[(0, 0), (20, 10), (70, 15), (100, 40)]),
            Track::from_pairs(TrackId::suspend(), &[(0, 0), (60, 1), (80, 0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_consolidate_defaults() {
        let out = consolidate(&tracks(), &ConsolidateConfig::default()).unwrap();
        let spans: Vec<(i64, i64)> = out.iter().map(|iv| (iv.ts, iv.dur)).collect();
        assert_eq!(
            spans,
            vec![(0, 20), (20, 30), (50, 10), (60, 10), (70, 10), (80, 20)]
        );
        // Suspended spans inherit the state of [50, 60).
        assert_eq!(out[3].state.cores, out[2].state.cores);
        assert_eq!(out[4].state.cores, out[2].state.cores);
    }

    #[test]
    fn test_consolidate_rejects_malformed_track() {
        let bad = TrackSet::from_tracks([Track::from_pairs(
            TrackId::frequency(0),
            &[(10, 1), (5, 2)],
        )])
        .unwrap();
        assert!(matches!(
            consolidate(&bad, &ConsolidateConfig::default()),
            Err(Error::MalformedTrack { .. })
        ));
    }

    #[test]
    fn test_consolidate_empty_is_ok() {
        let out = consolidate(&TrackSet::new(), &ConsolidateConfig::default()).unwrap();
        assert!(out.is_empty());

        let empty_tracks =
            TrackSet::from_tracks([Track::new(TrackId::frequency(0), Vec::new())]).unwrap();
        assert!(
            consolidate(&empty_tracks, &ConsolidateConfig::default())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_consolidate_too_few_cores() {
        let config = ConsolidateConfig {
            cores: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            consolidate(&tracks(), &config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_consolidate_with_window() {
        let config = ConsolidateConfig {
            window: Some(TimeWindow::new(10, 45)),
            ..Default::default()
        };
        let out = consolidate(&tracks(), &config).unwrap();
        let spans: Vec<(i64, i64)> = out.iter().map(|iv| (iv.ts, iv.dur)).collect();
        assert_eq!(spans, vec![(10, 10), (20, 30), (50, 5)]);
    }

    #[test]
    fn test_consolidate_window_outside_span() {
        let config = ConsolidateConfig {
            window: Some(TimeWindow::new(1_000, 10)),
            ..Default::default()
        };
        assert!(consolidate(&tracks(), &config).unwrap().is_empty());
    }

    #[test]
    fn test_coalesce_merges_equal_neighbours() {
        let out = consolidate(
            &tracks(),
            &ConsolidateConfig {
                coalesce: true,
                ..Default::default()
            },
        )
        .unwrap();
        let spans: Vec<(i64, i64)> = out.iter().map(|iv| (iv.ts, iv.dur)).collect();
        // [0,20) and [20,50) share a state; so do [60,70) and [70,80).
        assert_eq!(spans, vec![(0, 50), (50, 10), (60, 20), (80, 20)]);
        assert_eq!(out[0].hit_delta, Some(10));
        for pair in out.windows(2) {
            assert_ne!(pair[0].state, pair[1].state);
        }
    }
}
