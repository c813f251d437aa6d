//! `wattson serve`: HTTP adapter over the engine.

use std::path::PathBuf;

use wattson_core::{Error, Result};

pub fn run(host: &str, port: u16) -> Result<()> {
    let base = format!("http://{host}:{port}");

    println!("wattson server v{}", wattson_core::VERSION);
    println!("   {base}");
    println!();
    println!("   Endpoints:");
    println!("     GET  /health     Liveness check");
    println!("     POST /states     Consolidated intervals for a trace");
    println!("     POST /summary    Intervals grouped by state");
    println!("     POST /device     Device name from trace metadata");
    println!();
    println!("   Example:");
    println!("     curl -X POST {base}/states -H 'content-type: application/json' \\");
    println!("          -d '{{\"trace\": {{\"tracks\": []}}}}'");
    println!();

    let io_err = |source| Error::Io {
        path: PathBuf::from(&base),
        source,
    };
    let rt = tokio::runtime::Runtime::new().map_err(io_err)?;
    rt.block_on(wattson_server::run_server(host, port))
        .map_err(io_err)
}
