//! `wattson states`: print the consolidated interval sequence.

use std::io::Write;

use wattson_core::{ConsolidatedInterval, Result, consolidate, write_intervals_csv};

use super::{EngineArgs, load_trace, open_output, output_error};

pub struct StatesCommandConfig<'a> {
    pub engine: &'a EngineArgs,
    pub format: &'a str,
    pub desc: bool,
    pub limit: Option<usize>,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: StatesCommandConfig<'_>) -> Result<()> {
    let (_, tracks) = load_trace(&cfg.engine.trace)?;
    let config = cfg.engine.config();
    let intervals = consolidate(&tracks, &config)?;
    let selected = select(intervals, cfg.desc, cfg.limit);

    let mut out = open_output(cfg.output_path)?;
    write_states(&mut out, &selected, cfg.format, config.cores)
        .and_then(|()| out.flush())
        .map_err(output_error(cfg.output_path))?;

    if let Some(path) = cfg.output_path {
        eprintln!("Wrote {} intervals to {path}", selected.len());
    }
    Ok(())
}

/// Apply ordering and limit.
fn select(
    mut intervals: Vec<ConsolidatedInterval>,
    desc: bool,
    limit: Option<usize>,
) -> Vec<ConsolidatedInterval> {
    if desc {
        intervals.reverse();
    }
    if let Some(n) = limit {
        intervals.truncate(n);
    }
    intervals
}

fn write_states(
    out: &mut dyn Write,
    intervals: &[ConsolidatedInterval],
    format: &str,
    cores: Option<usize>,
) -> std::io::Result<()> {
    match format {
        "json" => {
            serde_json::to_writer_pretty(&mut *out, intervals)?;
            writeln!(out)
        }
        _ => write_intervals_csv(out, intervals, cores),
    }
}
