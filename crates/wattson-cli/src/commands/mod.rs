pub mod device;
pub mod serve;
pub mod states;
pub mod summary;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use wattson_core::{ConsolidateConfig, Error, Result, TimeWindow, TraceFile, TrackSet};

/// Engine flags shared by every command that consolidates a trace.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Trace file (JSON, or gzip-compressed JSON ending in .gz)
    pub trace: PathBuf,

    /// Clip output to a window starting here (same units as the trace)
    #[arg(long, requires = "window_dur", allow_hyphen_values = true)]
    pub window_start: Option<i64>,

    /// Window length; non-positive yields no intervals
    #[arg(long, requires = "window_start", allow_hyphen_values = true)]
    pub window_dur: Option<i64>,

    /// Fixed number of per-core columns (default: derived from the tracks)
    #[arg(long)]
    pub cores: Option<usize>,

    /// Report raw per-core samples while suspended
    #[arg(long)]
    pub no_suspend_overlay: bool,

    /// Merge adjacent intervals with identical state
    #[arg(long)]
    pub coalesce: bool,
}

impl EngineArgs {
    pub fn config(&self) -> ConsolidateConfig {
        ConsolidateConfig {
            cores: self.cores,
            suspend_overlay: !self.no_suspend_overlay,
            coalesce: self.coalesce,
            window: self
                .window_start
                .zip(self.window_dur)
                .map(|(start, dur)| TimeWindow::new(start, dur)),
        }
    }
}

/// Map `-v` occurrences to a default log filter.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialise `env_logger`; `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(verbose)))
        .format_timestamp_millis()
        .init();
}

/// Load a trace file and build its track set.
pub fn load_trace(path: &Path) -> Result<(TraceFile, TrackSet)> {
    let trace = TraceFile::load(path)?;
    let tracks = trace.to_track_set()?;
    log::info!(
        "{}: {} tracks, {} samples",
        path.display(),
        tracks.len(),
        tracks.total_samples()
    );
    Ok((trace, tracks))
}

/// Buffered writer to `path`, or stdout when absent.
pub fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) => {
            let file = File::create(p).map_err(|source| Error::Io {
                path: PathBuf::from(p),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Wrap an output error with the destination it was written to.
pub fn output_error(path: Option<&str>) -> impl Fn(io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: PathBuf::from(path.unwrap_or("<stdout>")),
        source,
    }
}
