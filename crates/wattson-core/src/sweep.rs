//! Sweep merger: one k-way pass over every track's change points.
//!
//! Each track gets a cursor into its own sample slice. A min-heap keyed by
//! the cursor's next timestamp yields the global timeline in order without
//! sorting all samples together. Every distinct timestamp is a boundary; the
//! span between two consecutive boundaries becomes one interval whose state
//! is the step-held value of every track at the span's start.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::trace;

use crate::counter::CountAccumulator;
use crate::error::{Error, Result};
use crate::state::{ConsolidatedInterval, StateVector};
use crate::suspend::SuspendOverlay;
use crate::track::{MAX_CORES, Sample, TrackKind, TrackSet};

/// Where a track's current value lands in the running state.
#[derive(Debug, Clone, Copy)]
enum Target {
    Freq(usize),
    Idle(usize),
    Hits(usize),
    Misses(usize),
    Suspend(usize),
}

struct Cursor<'a> {
    samples: &'a [Sample],
    next: usize,
    target: Target,
}

/// Streaming merger over a borrowed [`TrackSet`].
pub struct SweepMerger<'a> {
    cursors: Vec<Cursor<'a>>,
    heap: BinaryHeap<Reverse<(i64, usize)>>,
    state: StateVector,
    suspend_flags: Vec<bool>,
    hits: CountAccumulator,
    misses: CountAccumulator,
    overlay: Option<SuspendOverlay>,
    capacity: usize,
}

impl<'a> SweepMerger<'a> {
    /// Prepare a merge producing `cores` per-core columns.
    ///
    /// Fails if a frequency or idle track names a core outside `0..cores`,
    /// or if `cores` exceeds [`MAX_CORES`].
    pub fn new(tracks: &'a TrackSet, cores: usize) -> Result<Self> {
        if cores > MAX_CORES {
            return Err(Error::InvalidConfig(format!(
                "{cores} cores requested, at most {MAX_CORES} supported"
            )));
        }
        let mut hits = CountAccumulator::new();
        let mut misses = CountAccumulator::new();
        let mut suspend_flags = Vec::new();
        let mut cursors = Vec::with_capacity(tracks.len());

        for track in tracks.iter() {
            let id = track.id;
            if id.kind.is_per_core() && id.index >= cores {
                return Err(Error::InvalidConfig(format!(
                    "track {id} is outside the {cores} configured cores"
                )));
            }
            let target = match id.kind {
                TrackKind::Frequency => Target::Freq(id.index),
                TrackKind::Idle => Target::Idle(id.index),
                TrackKind::CacheHitCount => Target::Hits(hits.register(id)),
                TrackKind::CacheMissCount => Target::Misses(misses.register(id)),
                TrackKind::Suspend => {
                    suspend_flags.push(false);
                    Target::Suspend(suspend_flags.len() - 1)
                }
            };
            cursors.push(Cursor {
                samples: &track.samples,
                next: 0,
                target,
            });
        }

        let mut heap = BinaryHeap::with_capacity(cursors.len());
        for (slot, cursor) in cursors.iter().enumerate() {
            if let Some(first) = cursor.samples.first() {
                heap.push(Reverse((first.ts, slot)));
            }
        }

        Ok(Self {
            cursors,
            heap,
            state: StateVector::unknown(cores),
            suspend_flags,
            hits,
            misses,
            overlay: None,
            capacity: tracks.total_samples(),
        })
    }

    /// Thread a [`SuspendOverlay`] through the pass.
    pub fn with_suspend_overlay(mut self) -> Self {
        self.overlay = Some(SuspendOverlay::new());
        self
    }

    /// Run the sweep to completion.
    pub fn run(mut self) -> Result<Vec<ConsolidatedInterval>> {
        let mut out = Vec::with_capacity(self.capacity);
        let mut open: Option<(i64, StateVector)> = None;

        while let Some(&Reverse((boundary, _))) = self.heap.peek() {
            while let Some(&Reverse((ts, slot))) = self.heap.peek() {
                if ts != boundary {
                    break;
                }
                self.heap.pop();
                self.advance(slot);
            }
            self.state.suspended = self.suspend_flags.iter().any(|&s| s);

            let hit_delta = self.hits.close(boundary)?;
            let miss_delta = self.misses.close(boundary)?;

            if let Some((start, state)) = open.take() {
                let dur = boundary.checked_sub(start).ok_or(Error::SpanOverflow {
                    start,
                    end: boundary,
                })?;
                let mut interval = ConsolidatedInterval {
                    ts: start,
                    dur,
                    hit_delta,
                    miss_delta,
                    state,
                };
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.apply(&mut interval);
                }
                out.push(interval);
            }
            open = Some((boundary, self.state.clone()));
        }

        trace!("sweep produced {} intervals", out.len());
        Ok(out)
    }

    /// Consume the next sample of `slot` and requeue the cursor.
    fn advance(&mut self, slot: usize) {
        let cursor = &mut self.cursors[slot];
        let sample = cursor.samples[cursor.next];
        cursor.next += 1;
        let exhausted = match cursor.samples.get(cursor.next) {
            Some(next) => {
                self.heap.push(Reverse((next.ts, slot)));
                false
            }
            None => true,
        };

        match cursor.target {
            Target::Freq(core) => self.state.cores[core].freq = sample.value,
            Target::Idle(core) => self.state.cores[core].idle = sample.value,
            Target::Hits(i) => {
                self.hits.update(i, sample.value);
                if exhausted {
                    self.hits.finish(i);
                }
            }
            Target::Misses(i) => {
                self.misses.update(i, sample.value);
                if exhausted {
                    self.misses.finish(i);
                }
            }
            Target::Suspend(i) => self.suspend_flags[i] = sample.value.is_some_and(|v| v != 0),
        }
    }
}

/// Merge every track into consecutive intervals, one per pair of adjacent
/// distinct sample timestamps.
///
/// No suspend overlay is applied; see [`crate::consolidate`] for the full
/// pipeline.
pub fn merge(tracks: &TrackSet) -> Result<Vec<ConsolidatedInterval>> {
    SweepMerger::new(tracks, tracks.core_count())?.run()
}
