//! Tabular output of intervals and state summaries.
//!
//! The CSV layout mirrors the system-state table consumed by power models:
//! `ts,dur,l3_hit_count,l3_miss_count,freq_0,idle_0,...,suspended`, with
//! nulls written as `[NULL]` and `suspended` as 0/1.

use std::io::{self, Write};

use crate::state::{ConsolidatedInterval, StateVector};
use crate::summary::StateSummary;

/// Marker written for a null value.
pub const NULL: &str = "[NULL]";

fn opt(v: Option<i64>) -> String {
    v.map_or_else(|| NULL.to_string(), |v| v.to_string())
}

fn state_header(cores: usize) -> String {
    let mut cols: Vec<String> = Vec::with_capacity(cores * 2 + 1);
    for core in 0..cores {
        cols.push(format!("\"freq_{core}\""));
        cols.push(format!("\"idle_{core}\""));
    }
    cols.push("\"suspended\"".to_string());
    cols.join(",")
}

fn state_row(state: &StateVector) -> String {
    let mut cols: Vec<String> = Vec::with_capacity(state.cores.len() * 2 + 1);
    for core in &state.cores {
        cols.push(opt(core.freq));
        cols.push(opt(core.idle));
    }
    cols.push(u8::from(state.suspended).to_string());
    cols.join(",")
}

/// Write intervals as CSV with a header row.
///
/// `cores` fixes the number of per-core column pairs; `None` takes it from
/// the first interval.
pub fn write_intervals_csv<W: Write + ?Sized>(
    out: &mut W,
    intervals: &[ConsolidatedInterval],
    cores: Option<usize>,
) -> io::Result<()> {
    let cores = cores
        .or_else(|| intervals.first().map(|iv| iv.state.core_count()))
        .unwrap_or(0);
    writeln!(
        out,
        "\"ts\",\"dur\",\"l3_hit_count\",\"l3_miss_count\",{}",
        state_header(cores)
    )?;
    for iv in intervals {
        writeln!(
            out,
            "{},{},{},{},{}",
            iv.ts,
            iv.dur,
            opt(iv.hit_delta),
            opt(iv.miss_delta),
            state_row(&iv.state)
        )?;
    }
    Ok(())
}

/// Write grouped summaries as CSV with a header row.
pub fn write_summary_csv<W: Write + ?Sized>(
    out: &mut W,
    rows: &[StateSummary],
    cores: Option<usize>,
) -> io::Result<()> {
    let cores = cores
        .or_else(|| rows.first().map(|r| r.state.core_count()))
        .unwrap_or(0);
    writeln!(
        out,
        "\"duration\",\"l3_hit_count\",\"l3_miss_count\",{}",
        state_header(cores)
    )?;
    for row in rows {
        writeln!(
            out,
            "{},{},{},{}",
            row.duration,
            opt(row.hit_count),
            opt(row.miss_count),
            state_row(&row.state)
        )?;
    }
    Ok(())
}
