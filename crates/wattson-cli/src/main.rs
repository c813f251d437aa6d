//! CLI for wattson: one power-state timeline from many hardware tracks.

mod commands;

use clap::{Parser, Subcommand};

use commands::EngineArgs;

#[derive(Parser)]
#[command(name = "wattson")]
#[command(about = "wattson: consolidate CPU frequency, idle, cache and suspend tracks into one timeline")]
#[command(version = wattson_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the consolidated interval sequence
    States {
        #[command(flatten)]
        engine: EngineArgs,

        /// Output format
        #[arg(long, default_value = "csv", value_parser = ["csv", "json"])]
        format: String,

        /// Newest intervals first
        #[arg(long)]
        desc: bool,

        /// Maximum number of intervals to print
        #[arg(long)]
        limit: Option<usize>,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Group intervals by full state and total their duration and cache activity
    Summary {
        #[command(flatten)]
        engine: EngineArgs,

        /// Output format
        #[arg(long, default_value = "csv", value_parser = ["csv", "json"])]
        format: String,

        /// Maximum number of states to print (0 = all)
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Print the device name recorded in the trace metadata
    Device {
        /// Trace file (JSON, or gzip-compressed JSON ending in .gz)
        trace: String,
    },

    /// Start an HTTP server exposing the engine over JSON
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8043")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::States {
            engine,
            format,
            desc,
            limit,
            output,
        } => commands::states::run(commands::states::StatesCommandConfig {
            engine: &engine,
            format: &format,
            desc,
            limit,
            output_path: output.as_deref(),
        }),
        Commands::Summary {
            engine,
            format,
            limit,
            output,
        } => commands::summary::run(&engine, &format, limit, output.as_deref()),
        Commands::Device { trace } => commands::device::run(&trace),
        Commands::Serve { port, host } => commands::serve::run(&host, port),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
