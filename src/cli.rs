//! # CLI Execution
//!
//! Extracted from `main.rs` to keep the entry point slim: argument
//! resolution into [`SearchParams`], default log path construction, the
//! search run itself, and the human-readable summary.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::info;

use bealhunt::logging::JsonlLogger;
use bealhunt::results::SearchResults;
use bealhunt::search::{self, SearchParams};

use super::Cli;

/// Resolve CLI arguments into validated search parameters.
pub fn build_params(cli: &Cli) -> Result<SearchParams> {
    let params = SearchParams {
        x: cli.x.context("--x is required")?,
        y: cli.y.context("--y is required")?,
        z: cli.z.context("--z is required")?,
        a_start: cli.a_start,
        a_max: cli.a_max,
        b_start: cli.b_start,
        b_max: cli.b_max,
        c_max: cli.c_max,
        threads: cli.threads,
        checkpoint_interval_secs: cli.progress,
    };
    params.validate()?;
    Ok(params)
}

/// The default JSONL path: `search_<x>_<y>_<z>_<epoch>.jsonl`.
fn default_log_path(params: &SearchParams) -> PathBuf {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!(
        "search_{}_{}_{}_{}.jsonl",
        params.x, params.y, params.z, epoch
    ))
}

/// Run the search subcommand end to end and print the summary.
pub fn run_search(cli: &Cli) -> Result<SearchResults> {
    let params = build_params(cli)?;
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| default_log_path(&params));
    let logger = JsonlLogger::new(&log_path);

    let results = search::run(&params, &logger)?;

    // Terminate the in-place progress line before the summary block.
    eprintln!();
    print_summary(&params, &results);
    info!(log = %log_path.display(), "run log written");
    Ok(results)
}

fn print_summary(params: &SearchParams, r: &SearchResults) {
    let pct = |n: u64| {
        if r.total_pairs > 0 {
            100.0 * n as f64 / r.total_pairs as f64
        } else {
            0.0
        }
    };
    println!("\nSearch complete");
    println!("===============");
    println!("Signature:       ({}, {}, {})", params.x, params.y, params.z);
    println!("Total pairs:     {}", r.total_pairs);
    println!("GCD filtered:    {} ({:.2}%)", r.gcd_filtered, pct(r.gcd_filtered));
    println!("Sieve filtered:  {} ({:.2}%)", r.mod_filtered, pct(r.mod_filtered));
    println!("Exact checks:    {} ({:.6}%)", r.exact_checks, pct(r.exact_checks));
    println!("Power hits:      {}", r.power_hits);
    println!("Primitive hits:  {}", r.primitive_hits);
    println!("Runtime:         {:.2} seconds", r.runtime_seconds);
    println!("Throughput:      {:.0} pairs/sec", r.rate_pairs_per_sec);

    if r.primitive_hits > 0 {
        println!("\n*** COUNTEREXAMPLES FOUND ***");
        for h in r.hits.iter().filter(|h| h.is_primitive()) {
            println!("  {}^{} + {}^{} = {}^{}", h.a, h.x, h.b, h.y, h.c, h.z);
        }
    } else {
        println!("\nResult: CLEAR - no counterexamples found.");
    }
}
