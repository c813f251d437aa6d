//! Count accumulator: turns cumulative counter tracks into per-interval deltas.
//!
//! Cache hit/miss tracks carry running totals. For an interval `[b_k, b_k+1)`
//! the reported delta is `value_at(b_k+1) - value_at(b_k)` using the same
//! step-hold lookup as every other track. A counter that has not produced a
//! sample by `b_k`, or whose final sample is at or before `b_k`, reports null
//! rather than zero: it is not sampling, which is not the same as idle.

use crate::error::{Error, Result};
use crate::track::{Track, TrackId};

#[derive(Debug, Clone)]
struct CounterSlot {
    id: TrackId,
    /// Value as of the most recently applied boundary.
    current: Option<i64>,
    /// Value as of the start of the open interval.
    mark: Option<i64>,
    /// The track has delivered its last sample.
    finished: bool,
}

/// Streaming delta computation for every counter track of one kind.
///
/// The sweep applies samples with [`update`](Self::update) and calls
/// [`close`](Self::close) once per boundary; each `close` returns the summed
/// delta for the interval that ends at that boundary.
#[derive(Debug, Clone, Default)]
pub struct CountAccumulator {
    slots: Vec<CounterSlot>,
}

impl CountAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a counter track and return its slot.
    pub fn register(&mut self, id: TrackId) -> usize {
        self.slots.push(CounterSlot {
            id,
            current: None,
            mark: None,
            finished: false,
        });
        self.slots.len() - 1
    }

    /// Record a new raw counter sample for `slot`.
    pub fn update(&mut self, slot: usize, value: Option<i64>) {
        self.slots[slot].current = value;
    }

    /// Mark `slot` as having delivered its final sample. The interval closing
    /// at that sample still gets its delta; every later one is null.
    pub fn finish(&mut self, slot: usize) {
        self.slots[slot].finished = true;
    }

    /// Close the interval ending at `boundary` and open the next one.
    ///
    /// Returns the sum of non-null per-track deltas, or null when no track
    /// had a value at both ends.
    pub fn close(&mut self, boundary: i64) -> Result<Option<i64>> {
        let mut total: Option<i64> = None;
        for slot in &mut self.slots {
            if let (Some(start), Some(end)) = (slot.mark, slot.current) {
                if end < start {
                    return Err(Error::CounterRegression {
                        track: slot.id,
                        ts: boundary,
                        previous: start,
                        value: end,
                    });
                }
                let track = slot.id;
                let overflow = || Error::CounterOverflow {
                    track,
                    ts: boundary,
                };
                let delta = end.checked_sub(start).ok_or_else(overflow)?;
                total = Some(match total {
                    Some(sum) => sum.checked_add(delta).ok_or_else(overflow)?,
                    None => delta,
                });
            }
            slot.mark = if slot.finished { None } else { slot.current };
        }
        Ok(total)
    }
}

/// Per-interval deltas of a single counter track over explicit boundaries.
///
/// `boundaries` must be sorted; the result has one entry per consecutive pair.
/// This is the direct, lookup-based form of what [`CountAccumulator`] computes
/// incrementally during the sweep.
pub fn deltas_over(track: &Track, boundaries: &[i64]) -> Result<Vec<Option<i64>>> {
    let last_ts = track.samples.last().map(|s| s.ts);
    boundaries
        .windows(2)
        .map(|pair| {
            if last_ts.is_none_or(|last| pair[0] >= last) {
                return Ok(None);
            }
            let start = track.value_at(pair[0]).flatten();
            let end = track.value_at(pair[1]).flatten();
            match (start, end) {
                (Some(s), Some(e)) if e < s => Err(Error::CounterRegression {
                    track: track.id,
                    ts: pair[1],
                    previous: s,
                    value: e,
                }),
                (Some(s), Some(e)) => e.checked_sub(s).map(Some).ok_or(Error::CounterOverflow {
                    track: track.id,
                    ts: pair[1],
                }),
                _ => Ok(None),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Sample;

    #[test]
    fn test_first_close_is_null() {
        let mut acc = CountAccumulator::new();
        let slot = acc.register(TrackId::cache_hits());
        acc.update(slot, Some(100));
        assert_eq!(acc.close(0).unwrap(), None);
    }

    #[test]
    fn test_delta_between_boundaries() {
        let mut acc = CountAccumulator::new();
        let slot = acc.register(TrackId::cache_hits());
        acc.update(slot, Some(100));
        acc.close(0).unwrap();
        acc.update(slot, Some(140));
        assert_eq!(acc.close(10).unwrap(), Some(40));
        // No new sample but more to come: carried forward, zero activity.
        assert_eq!(acc.close(20).unwrap(), Some(0));
    }

    #[test]
    fn test_null_after_final_sample() {
        let mut acc = CountAccumulator::new();
        let slot = acc.register(TrackId::cache_hits());
        acc.update(slot, Some(0));
        acc.close(0).unwrap();
        acc.update(slot, Some(50));
        acc.finish(slot);
        assert_eq!(acc.close(10).unwrap(), Some(50));
        assert_eq!(acc.close(20).unwrap(), None);
        assert_eq!(acc.close(30).unwrap(), None);
    }

    #[test]
    fn test_finished_slot_does_not_hide_live_one() {
        let mut acc = CountAccumulator::new();
        let a = acc.register(TrackId::new(crate::TrackKind::CacheMissCount, 0));
        let b = acc.register(TrackId::new(crate::TrackKind::CacheMissCount, 1));
        acc.update(a, Some(1));
        acc.update(b, Some(1));
        acc.finish(a);
        acc.close(0).unwrap();
        acc.update(b, Some(4));
        assert_eq!(acc.close(10).unwrap(), Some(3));
    }

    #[test]
    fn test_overflowing_delta_is_an_error() {
        let mut acc = CountAccumulator::new();
        let slot = acc.register(TrackId::cache_hits());
        acc.update(slot, Some(i64::MIN + 1));
        acc.close(0).unwrap();
        acc.update(slot, Some(i64::MAX));
        assert!(matches!(
            acc.close(10),
            Err(Error::CounterOverflow { ts: 10, .. })
        ));
    }

    #[test]
    fn test_overflowing_sum_is_an_error() {
        let mut acc = CountAccumulator::new();
        let a = acc.register(TrackId::new(crate::TrackKind::CacheHitCount, 0));
        let b = acc.register(TrackId::new(crate::TrackKind::CacheHitCount, 1));
        acc.update(a, Some(0));
        acc.update(b, Some(0));
        acc.close(0).unwrap();
        acc.update(a, Some(i64::MAX));
        acc.update(b, Some(i64::MAX));
        assert!(matches!(acc.close(5), Err(Error::CounterOverflow { .. })));
    }

    #[test]
    fn test_null_until_counter_starts() {
        let mut acc = CountAccumulator::new();
        let slot = acc.register(TrackId::cache_misses());
        assert_eq!(acc.close(0).unwrap(), None);
        // The sample at the closing boundary alone does not produce a delta.
        acc.update(slot, Some(7));
        assert_eq!(acc.close(5).unwrap(), None);
        acc.update(slot, Some(9));
        assert_eq!(acc.close(8).unwrap(), Some(2));
    }

    #[test]
    fn test_multiple_tracks_are_summed() {
        let mut acc = CountAccumulator::new();
        let a = acc.register(TrackId::new(crate::TrackKind::CacheHitCount, 0));
        let b = acc.register(TrackId::new(crate::TrackKind::CacheHitCount, 1));
        acc.update(a, Some(10));
        acc.close(0).unwrap();
        acc.update(a, Some(15));
        acc.update(b, Some(1_000));
        // `b` has no value at the interval start, so only `a` contributes.
        assert_eq!(acc.close(5).unwrap(), Some(5));
        acc.update(b, Some(1_010));
        assert_eq!(acc.close(9).unwrap(), Some(10));
    }

    #[test]
    fn test_regression_is_an_error() {
        let mut acc = CountAccumulator::new();
        let slot = acc.register(TrackId::cache_hits());
        acc.update(slot, Some(50));
        acc.close(0).unwrap();
        acc.update(slot, Some(49));
        assert!(matches!(
            acc.close(3),
            Err(Error::CounterRegression {
                ts: 3,
                previous: 50,
                value: 49,
                ..
            })
        ));
    }

    #[test]
    fn test_deltas_over_matches_formula() {
        let track = Track::new(
            TrackId::cache_hits(),
            vec![Sample::new(10, 5), Sample::new(20, 9), Sample::new(40, 30)],
        );
        let deltas = deltas_over(&track, &[0, 10, 20, 30, 40, 50]).unwrap();
        // [40, 50) starts at the final sample: no longer sampling.
        assert_eq!(deltas, vec![None, Some(4), Some(0), Some(21), None]);
    }
}
