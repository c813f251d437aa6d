//! `wattson device`: device name from trace metadata.

use std::path::Path;

use wattson_core::{Result, TraceFile, device_name};

pub fn run(trace: &str) -> Result<()> {
    let trace = TraceFile::load(Path::new(trace))?;
    match device_name(&trace.metadata) {
        Some(name) => println!("{name}"),
        None => {
            log::warn!("trace metadata carries no SoC model or build fingerprint");
            println!("unknown");
        }
    }
    Ok(())
}
