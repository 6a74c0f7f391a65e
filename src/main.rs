//! # Main — CLI Entry Point
//!
//! Parses the flag set, routes `--validate` to the self-test harness, and
//! otherwise runs the exhaustive sweep. Exit codes are part of the
//! interface: 0 means the range is clear, 42 means at least one primitive
//! counterexample was found, anything else is an error.

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "bealhunt",
    version,
    about = "Exhaustive modular-sieve search for Beal conjecture counterexamples"
)]
pub struct Cli {
    /// Exponent x (must be >= 3)
    #[arg(long, required_unless_present = "validate")]
    x: Option<u32>,

    /// Exponent y (must be >= 3)
    #[arg(long, required_unless_present = "validate")]
    y: Option<u32>,

    /// Exponent z (must be >= 3)
    #[arg(long, required_unless_present = "validate")]
    z: Option<u32>,

    /// Maximum A value
    #[arg(long = "Amax", default_value_t = 1000)]
    a_max: u64,

    /// Maximum B value
    #[arg(long = "Bmax", default_value_t = 1000)]
    b_max: u64,

    /// Maximum C value
    #[arg(long = "Cmax", default_value_t = 10_000_000)]
    c_max: u64,

    /// Starting A value
    #[arg(long = "Astart", default_value_t = 1)]
    a_start: u64,

    /// Starting B value
    #[arg(long = "Bstart", default_value_t = 1)]
    b_start: u64,

    /// Number of worker threads (0 = all cores)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// JSONL log file path (default: search_<x>_<y>_<z>_<epoch>.jsonl)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Seconds between progress checkpoints
    #[arg(long, default_value_t = 1)]
    progress: u64,

    /// Run self-validation tests and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if cli.validate {
        return if bealhunt::validate::run() == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    match cli::run_search(&cli) {
        Ok(results) if results.primitive_hits > 0 => ExitCode::from(42),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
