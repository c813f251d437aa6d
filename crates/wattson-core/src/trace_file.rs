//! On-disk form of already-decoded tracks.
//!
//! Decoding a raw capture into tracks happens upstream. This module reads and
//! writes the JSON hand-off format:
//!
//! ```json
//! { "metadata": { "android_soc_model": "monaco" },
//!   "tracks": [ { "kind": "frequency", "index": 0, "samples": [[100, 300000], [250, null]] },
//!               { "kind": "suspend", "samples": [[100, false], [900, true]] } ] }
//! ```
//!
//! Paths ending in `.gz` are gzip-compressed.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::device::TraceMetadata;
use crate::error::{Error, Result};
use crate::track::{Sample, Track, TrackId, TrackKind, TrackSet};

/// A sample value as written in the file: integer, boolean, or null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
}

impl RawValue {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Bool(b) => i64::from(b),
            Self::Int(v) => v,
        }
    }
}

/// One track as stored in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub kind: TrackKind,
    #[serde(default)]
    pub index: usize,
    pub samples: Vec<(i64, Option<RawValue>)>,
}

impl TrackRecord {
    pub fn to_track(&self) -> Track {
        let samples = self
            .samples
            .iter()
            .map(|&(ts, value)| Sample {
                ts,
                value: value.map(RawValue::as_i64),
            })
            .collect();
        Track::new(TrackId::new(self.kind, self.index), samples)
    }

    pub fn from_track(track: &Track) -> Self {
        Self {
            kind: track.id.kind,
            index: track.id.index,
            samples: track
                .samples
                .iter()
                .map(|s| (s.ts, s.value.map(RawValue::Int)))
                .collect(),
        }
    }
}

/// Decoded tracks plus trace metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFile {
    #[serde(default)]
    pub metadata: TraceMetadata,
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
}

impl TraceFile {
    pub fn new(metadata: TraceMetadata, tracks: &TrackSet) -> Self {
        Self {
            metadata,
            tracks: tracks.iter().map(TrackRecord::from_track).collect(),
        }
    }

    /// Read a trace file, decompressing `.gz` paths.
    pub fn load(path: &Path) -> Result<Self> {
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let reader: Box<dyn Read> = if is_gzip(path) {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        let trace: TraceFile = serde_json::from_reader(reader).map_err(|source| {
            // Decompression failures surface through serde as I/O errors.
            if source.is_io() {
                Error::Io {
                    path: path.to_path_buf(),
                    source: source.into(),
                }
            } else {
                Error::Json {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        debug!(
            "loaded {} tracks from {}",
            trace.tracks.len(),
            path.display()
        );
        Ok(trace)
    }

    /// Write the trace as JSON, compressing `.gz` paths.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let json_err = |source| Error::Json {
            path: path.to_path_buf(),
            source,
        };
        if is_gzip(path) {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            serde_json::to_writer(&mut encoder, self).map_err(json_err)?;
            encoder.finish().map_err(io_err)?.flush().map_err(io_err)?;
        } else {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, self).map_err(json_err)?;
            writer.flush().map_err(io_err)?;
        }
        Ok(())
    }

    /// Build the engine input, rejecting duplicate track ids.
    pub fn to_track_set(&self) -> Result<TrackSet> {
        TrackSet::from_tracks(self.tracks.iter().map(TrackRecord::to_track))
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}
