//! `wattson summary`: residency and cache activity per distinct state.

use std::io::Write;

use wattson_core::{Result, StateSummary, consolidate, summarize_by_state, write_summary_csv};

use super::{EngineArgs, load_trace, open_output, output_error};

pub fn run(engine: &EngineArgs, format: &str, limit: usize, output_path: Option<&str>) -> Result<()> {
    let (_, tracks) = load_trace(&engine.trace)?;
    let config = engine.config();
    let intervals = consolidate(&tracks, &config)?;
    let rows = summarize_by_state(&intervals, (limit > 0).then_some(limit));
    log::info!(
        "{} intervals reduced to {} distinct states",
        intervals.len(),
        rows.len()
    );

    let mut out = open_output(output_path)?;
    write_rows(&mut out, &rows, format, config.cores)
        .and_then(|()| out.flush())
        .map_err(output_error(output_path))?;
    Ok(())
}

fn write_rows(
    out: &mut dyn Write,
    rows: &[StateSummary],
    format: &str,
    cores: Option<usize>,
) -> std::io::Result<()> {
    match format {
        "json" => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)
        }
        _ => write_summary_csv(out, rows, cores),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wattson_core::TraceFile;

    #[test]
    fn test_summary_groups_trace() {
        let tmp = tempfile::tempdir().unwrap();
        let trace_path = tmp.path().join("trace.json.gz");
        let trace: TraceFile = serde_json::from_str(
            r#"{"tracks": [
                {"kind": "frequency", "index": 0, "samples": [[0, 100], [10, 200], [20, 100], [50, 100]]},
                {"kind": "idle", "index": 0, "samples": [[0, 1]]}
            ]}"#,
        )
        .unwrap();
        trace.save(&trace_path).unwrap();

        let engine = EngineArgs {
            trace: trace_path,
            window_start: None,
            window_dur: None,
            cores: Some(2),
            no_suspend_overlay: false,
            coalesce: false,
        };
        let out_path = tmp.path().join("summary.json");
        run(&engine, "json", 0, out_path.to_str()).unwrap();

        let rows: Vec<StateSummary> =
            serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].duration, 40);
        assert_eq!(rows[0].state.freq(0), Some(100));
        assert_eq!(rows[0].state.core_count(), 2);
        assert_eq!(rows[1].duration, 10);
    }

    #[test]
    fn test_write_rows_csv_header() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[], "csv", Some(1)).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap().trim_end(),
            "\"duration\",\"l3_hit_count\",\"l3_miss_count\",\"freq_0\",\"idle_0\",\"suspended\""
        );
    }
}
