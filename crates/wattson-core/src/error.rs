//! Error type shared by every stage of the consolidation pipeline.

use std::path::PathBuf;

use crate::track::TrackId;

/// Everything that can stop a consolidation run.
///
/// Invariant violations in the input are fatal for the invocation: the engine
/// never returns partial output alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "track {track}: sample {position} at ts={ts} does not follow previous ts={previous}"
    )]
    MalformedTrack {
        track: TrackId,
        position: usize,
        previous: i64,
        ts: i64,
    },

    #[error("track {track}: counter went from {previous} to {value} at ts={ts}")]
    CounterRegression {
        track: TrackId,
        ts: i64,
        previous: i64,
        value: i64,
    },

    #[error("track {track}: counter delta does not fit in 64 bits at ts={ts}")]
    CounterOverflow { track: TrackId, ts: i64 },

    #[error("span from ts={start} to ts={end} does not fit in 64 bits")]
    SpanOverflow { start: i64, end: i64 },

    #[error("track {0} was supplied more than once")]
    DuplicateTrack(TrackId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
