//! # Search — Parallel A×B Sweep Driver
//!
//! Owns the whole search lifecycle: build tables, emit START, sweep the
//! rectangle, aggregate, emit COMPLETE, return the frozen results.
//!
//! ## Work distribution
//!
//! The outer A axis is spread across a scoped Rayon pool with per-row work
//! stealing (`with_max_len(1)`), which balances the variance in gcd and
//! sieve hit rates along A. One parallel region covers the entire sweep;
//! with one thread the engine degrades to a sequential pass producing
//! bit-identical counters and digest.
//!
//! ## Per-pair pipeline
//!
//! For each A row, B runs in blocks of eight through the lane sieve:
//! count → gcd skip → survivor-mask check → exact verification. Row-local
//! counters flush into the shared atomics once per A; verified hits go
//! into a fold-carried buffer that spills under the shared lock only when
//! full, with remainders flushed when a worker's chain of rows ends. The
//! hot path takes no locks and performs no allocation.
//!
//! ## Progress
//!
//! Any worker that notices the wall clock passing the throttle interval
//! takes the report lock, re-checks (two workers can race to the same
//! tick), rewrites the in-place stderr progress line, and appends a
//! CHECKPOINT record. Counter reads are per-atomic snapshots; COMPLETE
//! carries the authoritative totals.

use std::io::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use tracing::info;

use crate::logging::{CheckpointSnapshot, JsonlLogger};
use crate::modmath::gcd64;
use crate::precompute::PrecomputedTables;
use crate::results::{BealHit, RowCounts, SearchCounters, SearchResults};
use crate::{expected_pairs, sieve, verify};

/// Hits buffered per worker before spilling to the shared list.
const HIT_BUFFER: usize = 64;

/// Immutable search configuration.
#[derive(Clone, Debug)]
pub struct SearchParams {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub a_start: u64,
    pub a_max: u64,
    pub b_start: u64,
    pub b_max: u64,
    pub c_max: u64,
    /// Worker count; 0 selects the platform's available parallelism.
    pub threads: usize,
    /// Seconds between progress checkpoints.
    pub checkpoint_interval_secs: u64,
}

impl SearchParams {
    /// Reject unusable configurations before any work happens.
    pub fn validate(&self) -> Result<()> {
        if self.x < 3 || self.y < 3 || self.z < 3 {
            bail!("exponents x, y, z must all be >= 3 (got {}, {}, {})", self.x, self.y, self.z);
        }
        if self.a_start < 1 || self.b_start < 1 {
            bail!("Astart and Bstart must be >= 1");
        }
        if self.a_max < self.a_start || self.b_max < self.b_start {
            bail!("range maxima must be >= their start values");
        }
        if self.c_max < 1 {
            bail!("Cmax must be >= 1");
        }
        Ok(())
    }

    /// The worker count this configuration resolves to.
    pub fn resolved_workers(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// Shared per-run context for the throttled reporter.
struct SweepCtx<'a> {
    params: &'a SearchParams,
    logger: &'a JsonlLogger,
    counters: &'a SearchCounters,
    run_id: u64,
    started: Instant,
    pairs_expected: u64,
    chunks_total: u64,
    interval_ms: u64,
    /// Milliseconds since `started` of the last emitted checkpoint.
    last_report_ms: AtomicU64,
    /// The global critical section: checkpoint emission, hit spills, and
    /// the counterexample announcement all serialize here.
    report_lock: Mutex<()>,
}

/// Run the exhaustive sweep described by `params`, emitting lifecycle
/// records through `logger`.
pub fn run(params: &SearchParams, logger: &JsonlLogger) -> Result<SearchResults> {
    params.validate()?;

    let workers = params.resolved_workers();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("failed to build worker pool")?;

    info!(
        signature = format_args!("({}, {}, {})", params.x, params.y, params.z),
        a = format_args!("[{}, {}]", params.a_start, params.a_max),
        b = format_args!("[{}, {}]", params.b_start, params.b_max),
        c_max = params.c_max,
        workers,
        "starting search"
    );

    let precompute_started = Instant::now();
    let tables = PrecomputedTables::build(params.x, params.y, params.z, params.a_max, params.b_max)?;
    info!(
        elapsed_ms = precompute_started.elapsed().as_millis() as u64,
        "residue tables ready"
    );

    let run_id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    logger.start(params, run_id, workers);

    let counters = SearchCounters::new();
    let ctx = SweepCtx {
        params,
        logger,
        counters: &counters,
        run_id,
        started: Instant::now(),
        pairs_expected: expected_pairs(params.a_start, params.a_max, params.b_start, params.b_max),
        chunks_total: params.a_max - params.a_start + 1,
        interval_ms: params.checkpoint_interval_secs.max(1) * 1000,
        last_report_ms: AtomicU64::new(0),
        report_lock: Mutex::new(()),
    };

    // usize row index: table construction already guarantees the row
    // count fits in memory, hence in usize.
    let rows = (params.a_max - params.a_start + 1) as usize;
    pool.install(|| {
        (0..rows)
            .into_par_iter()
            .with_max_len(1)
            .fold(
                || Vec::with_capacity(HIT_BUFFER),
                |mut hit_buf, i| {
                    sweep_row(params.a_start + i as u64, &tables, &ctx, &mut hit_buf);
                    hit_buf
                },
            )
            .for_each(|hit_buf| flush_hits(&ctx, &hit_buf));
    });

    let runtime = ctx.started.elapsed().as_secs_f64();
    let results = counters.finalize(runtime, workers);
    logger.complete(params, run_id, &results);

    info!(
        total_pairs = results.total_pairs,
        power_hits = results.power_hits,
        primitive_hits = results.primitive_hits,
        runtime_seconds = format_args!("{:.2}", results.runtime_seconds),
        "search complete"
    );
    Ok(results)
}

/// Sweep one A row: lane sieve over B blocks, gcd skip, exact checks.
fn sweep_row(a: u64, tables: &PrecomputedTables, ctx: &SweepCtx<'_>, hit_buf: &mut Vec<BealHit>) {
    let params = ctx.params;
    let mut row = RowCounts::default();

    let mut block = params.b_start;
    loop {
        let survivors = sieve::survives8(a, block, tables);

        for lane in 0..8u64 {
            let b = block + lane;
            if b > params.b_max {
                break;
            }
            row.tested += 1;

            if gcd64(a, b) > 1 {
                row.gcd_skips += 1;
                continue;
            }
            if survivors & (1u8 << lane) == 0 {
                row.mod_skips += 1;
                continue;
            }

            row.exact += 1;
            if let Some(hit) =
                verify::check_beal_hit(a, b, params.x, params.y, params.z, params.c_max)
            {
                if hit_buf.len() == HIT_BUFFER {
                    flush_hits(ctx, hit_buf);
                    hit_buf.clear();
                }
                hit_buf.push(hit);
                if hit.is_primitive() {
                    announce_counterexample(ctx, &hit);
                }
            }
        }

        block = match block.checked_add(8) {
            Some(next) if next <= params.b_max => next,
            _ => break,
        };
    }

    ctx.counters.add_row(row);
    ctx.counters.rows_done.fetch_add(1, Ordering::Relaxed);
    maybe_checkpoint(ctx);
}

/// Spill a worker's hit buffer into the shared list and the log.
fn flush_hits(ctx: &SweepCtx<'_>, hits: &[BealHit]) {
    if hits.is_empty() {
        return;
    }
    let _guard = ctx.report_lock.lock().unwrap();
    ctx.counters.push_hits(hits);
    for hit in hits {
        ctx.logger.power_hit(hit);
    }
}

/// The immediate, human-visible discovery notice. The search keeps going
/// so the run still produces complete statistics.
fn announce_counterexample(ctx: &SweepCtx<'_>, hit: &BealHit) {
    let _guard = ctx.report_lock.lock().unwrap();
    eprintln!(
        "\nCOUNTEREXAMPLE: {}^{} + {}^{} = {}^{} (gcd=1)",
        hit.a, hit.x, hit.b, hit.y, hit.c, hit.z
    );
}

/// Emit at most one checkpoint per interval, whichever worker gets there
/// first. The cheap load keeps the hot path unsynchronized; the re-check
/// under the lock stops racing workers from emitting a burst.
fn maybe_checkpoint(ctx: &SweepCtx<'_>) {
    let now_ms = ctx.started.elapsed().as_millis() as u64;
    if now_ms.saturating_sub(ctx.last_report_ms.load(Ordering::Relaxed)) < ctx.interval_ms {
        return;
    }

    let _guard = ctx.report_lock.lock().unwrap();
    if now_ms.saturating_sub(ctx.last_report_ms.load(Ordering::Relaxed)) < ctx.interval_ms {
        return;
    }
    ctx.last_report_ms.store(now_ms, Ordering::Relaxed);

    let snap = ctx.counters.snapshot();
    let elapsed = ctx.started.elapsed().as_secs_f64();
    let percent = if ctx.pairs_expected > 0 {
        snap.tested as f64 / ctx.pairs_expected as f64 * 100.0
    } else {
        0.0
    };
    let rate_m = if elapsed > 0.0 {
        snap.tested as f64 / elapsed / 1e6
    } else {
        0.0
    };

    let mut err = std::io::stderr().lock();
    let _ = write!(
        err,
        "\r[bealhunt] {:6.2}% | rate: {:7.2}M pairs/s | exact checks: {}",
        percent, rate_m, snap.exact
    );
    let _ = err.flush();
    drop(err);

    ctx.logger.checkpoint(
        ctx.run_id,
        &CheckpointSnapshot {
            pairs_completed: snap.tested,
            pairs_expected: ctx.pairs_expected,
            gcd_skips: snap.gcd_skips,
            mod_skips: snap.mod_skips,
            exact_checks: snap.exact,
            elapsed_seconds: elapsed,
            chunks_done: ctx.counters.rows_done.load(Ordering::Relaxed),
            chunks_total: ctx.chunks_total,
        },
    );
}
