//! Input tracks: independently sampled, step-held time series.
//!
//! A [`Track`] holds the samples of one signal (one core's frequency, one
//! core's idle depth, one cache counter, or the suspend flag). Each sample's
//! value holds from its timestamp until the next sample on the same track.
//! A [`TrackSet`] is the keyed collection handed to the engine.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Highest number of per-core columns a track set may describe.
pub const MAX_CORES: usize = 4096;

/// The signal a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Per-core clock frequency in Hz.
    Frequency,
    /// Per-core idle-state depth; `-1` means active.
    Idle,
    /// Cumulative shared-cache hit counter.
    CacheHitCount,
    /// Cumulative shared-cache miss counter.
    CacheMissCount,
    /// Whole-system suspend flag (0 or 1).
    Suspend,
}

impl TrackKind {
    /// All kinds, in column order.
    pub const ALL: [TrackKind; 5] = [
        Self::Frequency,
        Self::Idle,
        Self::CacheHitCount,
        Self::CacheMissCount,
        Self::Suspend,
    ];

    /// Whether samples on this track are cumulative totals.
    pub fn is_counter(self) -> bool {
        matches!(self, Self::CacheHitCount | Self::CacheMissCount)
    }

    /// Whether the track index names a CPU core.
    pub fn is_per_core(self) -> bool {
        matches!(self, Self::Frequency | Self::Idle)
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frequency => write!(f, "frequency"),
            Self::Idle => write!(f, "idle"),
            Self::CacheHitCount => write!(f, "cache_hit_count"),
            Self::CacheMissCount => write!(f, "cache_miss_count"),
            Self::Suspend => write!(f, "suspend"),
        }
    }
}

impl FromStr for TrackKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "frequency" | "freq" => Ok(Self::Frequency),
            "idle" => Ok(Self::Idle),
            "cache_hit_count" | "l3_hit_count" => Ok(Self::CacheHitCount),
            "cache_miss_count" | "l3_miss_count" => Ok(Self::CacheMissCount),
            "suspend" | "suspended" => Ok(Self::Suspend),
            other => {
                let known: Vec<String> = Self::ALL.iter().map(ToString::to_string).collect();
                Err(format!(
                    "unknown track kind '{other}' (expected one of {})",
                    known.join(", ")
                ))
            }
        }
    }
}

/// Identity of a track: its kind plus an index (the core for per-core kinds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackId {
    pub kind: TrackKind,
    pub index: usize,
}

impl TrackId {
    pub fn new(kind: TrackKind, index: usize) -> Self {
        Self { kind, index }
    }

    pub fn frequency(core: usize) -> Self {
        Self::new(TrackKind::Frequency, core)
    }

    pub fn idle(core: usize) -> Self {
        Self::new(TrackKind::Idle, core)
    }

    pub fn cache_hits() -> Self {
        Self::new(TrackKind::CacheHitCount, 0)
    }

    pub fn cache_misses() -> Self {
        Self::new(TrackKind::CacheMissCount, 0)
    }

    pub fn suspend() -> Self {
        Self::new(TrackKind::Suspend, 0)
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.kind, self.index)
    }
}

/// One timestamped observation. `value == None` means "not sampled".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub ts: i64,
    pub value: Option<i64>,
}

impl Sample {
    pub fn new(ts: i64, value: i64) -> Self {
        Self {
            ts,
            value: Some(value),
        }
    }

    pub fn null(ts: i64) -> Self {
        Self { ts, value: None }
    }
}

/// A timestamp-sorted sequence of samples for one signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub samples: Vec<Sample>,
}

impl Track {
    pub fn new(id: TrackId, samples: Vec<Sample>) -> Self {
        Self { id, samples }
    }

    /// Build a track from `(ts, value)` pairs.
    pub fn from_pairs(id: TrackId, pairs: &[(i64, i64)]) -> Self {
        Self::new(id, pairs.iter().map(|&(ts, v)| Sample::new(ts, v)).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check the track invariants: strictly increasing timestamps, and for
    /// counter tracks, values that never decrease.
    pub fn validate(&self) -> Result<()> {
        for (position, pair) in self.samples.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            if next.ts <= prev.ts {
                return Err(Error::MalformedTrack {
                    track: self.id,
                    position: position + 1,
                    previous: prev.ts,
                    ts: next.ts,
                });
            }
        }

        if self.id.kind.is_counter() {
            let mut first: Option<i64> = None;
            let mut last: Option<i64> = None;
            for sample in &self.samples {
                let Some(value) = sample.value else {
                    continue;
                };
                match last {
                    Some(previous) if value < previous => {
                        return Err(Error::CounterRegression {
                            track: self.id,
                            ts: sample.ts,
                            previous,
                            value,
                        });
                    }
                    _ => {}
                }
                // Non-decreasing, so every partial delta fits once the total does.
                let base = *first.get_or_insert(value);
                if value.checked_sub(base).is_none() {
                    return Err(Error::CounterOverflow {
                        track: self.id,
                        ts: sample.ts,
                    });
                }
                last = Some(value);
            }
        }
        Ok(())
    }

    /// Value of the most recent sample at or before `ts`.
    ///
    /// The outer `Option` is `None` when no sample precedes `ts`; the inner one
    /// is the sample's own (possibly null) value.
    pub fn value_at(&self, ts: i64) -> Option<Option<i64>> {
        let idx = self.samples.partition_point(|s| s.ts <= ts);
        idx.checked_sub(1).map(|i| self.samples[i].value)
    }
}

/// The complete keyed input for one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSet {
    tracks: BTreeMap<TrackId, Track>,
}

impl TrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track; a second track with the same id is rejected, as is a
    /// per-core track at or beyond [`MAX_CORES`].
    pub fn insert(&mut self, track: Track) -> Result<()> {
        check_core_index(track.id)?;
        if self.tracks.contains_key(&track.id) {
            return Err(Error::DuplicateTrack(track.id));
        }
        self.tracks.insert(track.id, track);
        Ok(())
    }

    /// Build a set from a list of tracks, rejecting duplicate ids.
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Result<Self> {
        let mut set = Self::new();
        for track in tracks {
            set.insert(track)?;
        }
        Ok(set)
    }

    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.get(id)
    }

    /// Tracks in `(kind, index)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Tracks of one kind, in index order.
    pub fn of_kind(&self, kind: TrackKind) -> impl Iterator<Item = &Track> {
        self.tracks.values().filter(move |t| t.id.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Number of per-core columns needed: one past the highest core index of
    /// any frequency or idle track.
    pub fn core_count(&self) -> usize {
        self.tracks
            .keys()
            .filter(|id| id.kind.is_per_core())
            .map(|id| id.index.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Total number of samples across all tracks.
    pub fn total_samples(&self) -> usize {
        self.tracks.values().map(Track::len).sum()
    }

    /// `(first, last)` sample timestamp across all tracks.
    pub fn span(&self) -> Option<(i64, i64)> {
        let first = self
            .tracks
            .values()
            .filter_map(|t| t.samples.first())
            .map(|s| s.ts)
            .min()?;
        let last = self
            .tracks
            .values()
            .filter_map(|t| t.samples.last())
            .map(|s| s.ts)
            .max()?;
        Some((first, last))
    }

    /// Validate every track, the core indexes and the overall span.
    pub fn validate(&self) -> Result<()> {
        for track in self.tracks.values() {
            check_core_index(track.id)?;
            track.validate()?;
        }
        if let Some((start, end)) = self.span() {
            if end.checked_sub(start).is_none() {
                return Err(Error::SpanOverflow { start, end });
            }
        }
        Ok(())
    }
}

fn check_core_index(id: TrackId) -> Result<()> {
    if id.kind.is_per_core() && id.index >= MAX_CORES {
        return Err(Error::InvalidConfig(format!(
            "track {id} names a core beyond the supported {MAX_CORES}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // TrackKind
    // -----------------------------------------------------------------------

    #[test]
    fn test_kind_display_roundtrips_through_from_str() {
        for kind in TrackKind::ALL {
            assert_eq!(kind.to_string().parse::<TrackKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!("l3_hit_count".parse::<TrackKind>(), Ok(TrackKind::CacheHitCount));
        assert_eq!("suspended".parse::<TrackKind>(), Ok(TrackKind::Suspend));
        let err = "voltage".parse::<TrackKind>().unwrap_err();
        assert!(err.contains("voltage"));
        assert!(err.contains("cache_miss_count"));
    }

    #[test]
    fn test_kind_classification() {
        assert!(TrackKind::CacheHitCount.is_counter());
        assert!(TrackKind::CacheMissCount.is_counter());
        assert!(!TrackKind::Frequency.is_counter());
        assert!(TrackKind::Idle.is_per_core());
        assert!(!TrackKind::Suspend.is_per_core());
    }

    #[test]
    fn test_track_id_display() {
        assert_eq!(TrackId::frequency(3).to_string(), "frequency[3]");
        assert_eq!(TrackId::suspend().to_string(), "suspend[0]");
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_validate_accepts_sorted_track() {
        let t = Track::from_pairs(TrackId::frequency(0), &[(0, 300_000), (10, 574_000)]);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_equal_timestamps() {
        let t = Track::from_pairs(TrackId::idle(1), &[(0, 1), (5, -1), (5, 0)]);
        match t.validate() {
            Err(Error::MalformedTrack {
                track,
                position,
                previous,
                ts,
            }) => {
                assert_eq!(track, TrackId::idle(1));
                assert_eq!(position, 2);
                assert_eq!((previous, ts), (5, 5));
            }
            other => panic!("expected MalformedTrack, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_counter_regression() {
        let t = Track::from_pairs(TrackId::cache_hits(), &[(0, 10), (5, 20), (9, 15)]);
        assert!(matches!(
            t.validate(),
            Err(Error::CounterRegression {
                ts: 9,
                previous: 20,
                value: 15,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_counter_skips_null_samples() {
        let t = Track::new(
            TrackId::cache_misses(),
            vec![Sample::new(0, 10), Sample::null(5), Sample::new(9, 12)],
        );
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_counter_span_beyond_i64() {
        let big = 9 * 10_i64.pow(18);
        let t = Track::from_pairs(TrackId::cache_hits(), &[(0, -big), (10, 0), (20, big)]);
        assert!(matches!(
            t.validate(),
            Err(Error::CounterOverflow { ts: 20, .. })
        ));
    }

    #[test]
    fn test_decreasing_non_counter_is_fine() {
        let t = Track::from_pairs(TrackId::frequency(0), &[(0, 900), (5, 100)]);
        assert!(t.validate().is_ok());
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    #[test]
    fn test_value_at_step_hold() {
        let t = Track::new(
            TrackId::frequency(0),
            vec![Sample::new(10, 1), Sample::null(20), Sample::new(30, 3)],
        );
        assert_eq!(t.value_at(9), None);
        assert_eq!(t.value_at(10), Some(Some(1)));
        assert_eq!(t.value_at(19), Some(Some(1)));
        assert_eq!(t.value_at(25), Some(None));
        assert_eq!(t.value_at(1_000), Some(Some(3)));
    }

    // -----------------------------------------------------------------------
    // TrackSet
    // -----------------------------------------------------------------------

    #[test]
    fn test_track_set_rejects_duplicates() {
        let a = Track::from_pairs(TrackId::frequency(0), &[(0, 1)]);
        let err = TrackSet::from_tracks([a.clone(), a]).unwrap_err();
        assert!(matches!(err, Error::DuplicateTrack(id) if id == TrackId::frequency(0)));
    }

    #[test]
    fn test_track_set_core_count_and_span() {
        let set = TrackSet::from_tracks([
            Track::from_pairs(TrackId::frequency(0), &[(5, 1)]),
            Track::from_pairs(TrackId::idle(6), &[(2, 1), (40, 0)]),
            Track::from_pairs(TrackId::cache_hits(), &[(1, 0), (50, 9)]),
        ])
        .unwrap();
        assert_eq!(set.core_count(), 7);
        assert_eq!(set.total_samples(), 5);
        assert_eq!(set.span(), Some((1, 50)));
    }

    #[test]
    fn test_track_set_rejects_huge_core_index() {
        for index in [MAX_CORES, 1_000_000_000_000, usize::MAX] {
            let track = Track::from_pairs(TrackId::new(TrackKind::Idle, index), &[(0, 1)]);
            assert!(matches!(
                TrackSet::from_tracks([track]),
                Err(Error::InvalidConfig(_))
            ));
        }
        // Counter indexes are labels, not cores.
        let counter = Track::from_pairs(TrackId::new(TrackKind::CacheHitCount, usize::MAX), &[(0, 1)]);
        assert!(TrackSet::from_tracks([counter]).is_ok());
    }

    #[test]
    fn test_track_set_rejects_span_beyond_i64() {
        let set = TrackSet::from_tracks([
            Track::from_pairs(TrackId::frequency(0), &[(i64::MIN, 1)]),
            Track::from_pairs(TrackId::idle(0), &[(i64::MAX, 0)]),
        ])
        .unwrap();
        assert!(matches!(
            set.validate(),
            Err(Error::SpanOverflow {
                start: i64::MIN,
                end: i64::MAX
            })
        ));
    }

    #[test]
    fn test_empty_track_set() {
        let set = TrackSet::new();
        assert_eq!(set.core_count(), 0);
        assert_eq!(set.span(), None);
        assert!(set.validate().is_ok());
    }
}
