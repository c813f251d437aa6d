//! # wattson-core
//!
//! **One timeline for everything that costs power.**
//!
//! `wattson-core` turns independently sampled hardware state tracks (per-core
//! CPU frequency, per-core idle depth, shared-cache hit/miss counters and the
//! system suspend flag) into a single chronological sequence of
//! non-overlapping intervals. Within each interval the combined state of
//! every track is constant and fully known, which is what a power model needs
//! to attribute energy.
//!
//! ## Quick Start
//!
//! ```
//! use wattson_core::{ConsolidateConfig, Track, TrackId, TrackSet, consolidate};
//!
//! let tracks = TrackSet::from_tracks([
//!     Track::from_pairs(TrackId::frequency(0), &[(0, 300_000), (100, 574_000)]),
//!     Track::from_pairs(TrackId::idle(0), &[(0, 1), (40, -1), (150, 1)]),
//!     Track::from_pairs(TrackId::cache_hits(), &[(0, 0), (150, 1_200)]),
//! ])
//! .unwrap();
//!
//! let intervals = consolidate(&tracks, &ConsolidateConfig::default()).unwrap();
//! assert_eq!(intervals.len(), 3);
//! assert_eq!(intervals[1].state.freq(0), Some(300_000));
//! assert_eq!(intervals[1].state.idle(0), Some(-1));
//! ```
//!
//! ## Architecture
//!
//! Tracks → Sweep merger (+ count accumulator, + suspend overlay) → intervals
//! → optional window clip → caller-side grouping.
//!
//! - [`sweep`]: k-way merge over per-track cursors; every distinct sample
//!   timestamp is a boundary and every track is step-held between samples.
//! - [`counter`]: cumulative counters become per-interval deltas; null until
//!   a counter has produced its first sample.
//! - [`suspend`]: while suspended, per-core state freezes at the last value
//!   seen while active.
//! - [`window`]: intersect the sequence with `[start, start + dur)`.
//!
//! The engine is a pure, synchronous transform over in-memory data. It does
//! not interpret frequency or idle values, and it never decodes raw captures;
//! [`trace_file`] is the JSON hand-off format used by the CLI and server.

pub mod counter;
pub mod device;
pub mod engine;
pub mod error;
pub mod export;
pub mod state;
pub mod summary;
pub mod suspend;
pub mod sweep;
pub mod trace_file;
pub mod track;
pub mod window;

pub use counter::{CountAccumulator, deltas_over};
pub use device::{TraceMetadata, device_name};
pub use engine::{ConsolidateConfig, coalesce, consolidate};
pub use error::{Error, Result};
pub use export::{write_intervals_csv, write_summary_csv};
pub use state::{ConsolidatedInterval, CoreState, StateVector};
pub use summary::{StateSummary, summarize_by_state};
pub use suspend::{SuspendOverlay, SuspendPhase, apply_suspend_overlay};
pub use sweep::{SweepMerger, merge};
pub use trace_file::{RawValue, TraceFile, TrackRecord};
pub use track::{MAX_CORES, Sample, Track, TrackId, TrackKind, TrackSet};
pub use window::{TimeWindow, clip, clip_to};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
