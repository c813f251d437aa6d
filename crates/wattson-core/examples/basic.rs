//! Basic consolidation example.
//!
//! Builds a two-core trace with a suspend period, consolidates it, clips it
//! to a window and prints both as CSV.
//!
//! Run: `cargo run --example basic`

use wattson_core::{
    ConsolidateConfig, Track, TrackId, TrackSet, clip, consolidate, summarize_by_state,
    write_intervals_csv, write_summary_csv,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tracks = TrackSet::from_tracks([
        Track::from_pairs(TrackId::frequency(0), &[(0, 614_400), (400, 1_708_800), (900, 614_400)]),
        Track::from_pairs(TrackId::frequency(1), &[(0, 614_400), (650, 1_363_200)]),
        Track::from_pairs(TrackId::idle(0), &[(0, 1), (300, -1), (1_000, 0)]),
        Track::from_pairs(TrackId::idle(1), &[(0, 0), (500, -1)]),
        Track::from_pairs(TrackId::cache_hits(), &[(100, 0), (500, 4_000), (1_000, 9_000)]),
        Track::from_pairs(TrackId::cache_misses(), &[(100, 0), (500, 900), (1_000, 2_100)]),
        Track::from_pairs(TrackId::suspend(), &[(0, 0), (600, 1), (800, 0)]),
    ])?;

    let intervals = consolidate(&tracks, &ConsolidateConfig::default())?;
    let mut stdout = std::io::stdout().lock();

    println!("All intervals:");
    write_intervals_csv(&mut stdout, &intervals, None)?;

    println!("\nClipped to [250, 750):");
    write_intervals_csv(&mut stdout, &clip(&intervals, 250, 500), None)?;

    println!("\nResidency by state:");
    write_summary_csv(&mut stdout, &summarize_by_state(&intervals, Some(5)), None)?;
    Ok(())
}
