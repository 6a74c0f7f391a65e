//! # Results — Counters, Hits, and Final Statistics
//!
//! Thread-safe aggregation shared between sweep workers and the reporting
//! path. The four pipeline counters are lock-free atomics updated with one
//! `fetch_add` batch per completed A row; the hit list sits behind a mutex
//! because hits are rare enough (usually zero per run) that contention is
//! not a concern. Counters are monotonic for the lifetime of the search and
//! frozen into a [`SearchResults`] snapshot at finalization.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;

/// A verified power match: A^x + B^y = C^z with C within bounds.
///
/// `gcd` is gcd(A, gcd(B, C)). A hit with gcd = 1 is a primitive
/// counterexample to the Beal Conjecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BealHit {
    pub a: u64,
    pub b: u64,
    pub c: u64,
    pub gcd: u64,
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl BealHit {
    /// True iff gcd(A, B, C) = 1 — a genuine counterexample.
    #[inline]
    pub fn is_primitive(&self) -> bool {
        self.gcd == 1
    }
}

/// Per-row counter deltas, accumulated locally and flushed in one batch.
#[derive(Clone, Copy, Debug, Default)]
pub struct RowCounts {
    pub tested: u64,
    pub gcd_skips: u64,
    pub mod_skips: u64,
    pub exact: u64,
}

/// Live aggregation state for one search run.
pub struct SearchCounters {
    pub total_pairs: AtomicU64,
    pub gcd_filtered: AtomicU64,
    pub mod_filtered: AtomicU64,
    pub exact_checks: AtomicU64,
    /// Completed A rows — the checkpoint's chunk counter.
    pub rows_done: AtomicU64,
    hits: Mutex<Vec<BealHit>>,
}

impl Default for SearchCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCounters {
    pub fn new() -> Self {
        SearchCounters {
            total_pairs: AtomicU64::new(0),
            gcd_filtered: AtomicU64::new(0),
            mod_filtered: AtomicU64::new(0),
            exact_checks: AtomicU64::new(0),
            rows_done: AtomicU64::new(0),
            hits: Mutex::new(Vec::with_capacity(64)),
        }
    }

    /// Fold one finished row's local counters into the shared atomics.
    /// Called once per A, bounding contention to once per row.
    pub fn add_row(&self, row: RowCounts) {
        self.total_pairs.fetch_add(row.tested, Ordering::Relaxed);
        self.gcd_filtered.fetch_add(row.gcd_skips, Ordering::Relaxed);
        self.mod_filtered.fetch_add(row.mod_skips, Ordering::Relaxed);
        self.exact_checks.fetch_add(row.exact, Ordering::Relaxed);
    }

    /// Append a batch of hits under the shared lock. The buffer grows
    /// geometrically; appends stay rare.
    pub fn push_hits(&self, hits: &[BealHit]) {
        if hits.is_empty() {
            return;
        }
        self.hits.lock().unwrap().extend_from_slice(hits);
    }

    /// A point-in-time read of the pipeline counters. Each atomic is read
    /// independently; checkpoint skew across counters is acceptable.
    pub fn snapshot(&self) -> RowCounts {
        RowCounts {
            tested: self.total_pairs.load(Ordering::Relaxed),
            gcd_skips: self.gcd_filtered.load(Ordering::Relaxed),
            mod_skips: self.mod_filtered.load(Ordering::Relaxed),
            exact: self.exact_checks.load(Ordering::Relaxed),
        }
    }

    /// Freeze the counters into the final results structure.
    pub fn finalize(self, runtime_seconds: f64, workers_used: usize) -> SearchResults {
        let hits = self.hits.into_inner().unwrap();
        let total_pairs = self.total_pairs.load(Ordering::Relaxed);
        let power_hits = hits.len() as u64;
        let primitive_hits = hits.iter().filter(|h| h.is_primitive()).count() as u64;
        SearchResults {
            total_pairs,
            gcd_filtered: self.gcd_filtered.load(Ordering::Relaxed),
            mod_filtered: self.mod_filtered.load(Ordering::Relaxed),
            exact_checks: self.exact_checks.load(Ordering::Relaxed),
            power_hits,
            primitive_hits,
            runtime_seconds,
            rate_pairs_per_sec: if runtime_seconds > 0.0 {
                total_pairs as f64 / runtime_seconds
            } else {
                0.0
            },
            workers_used,
            hits,
        }
    }
}

/// Final, immutable statistics for a completed search.
#[derive(Clone, Debug)]
pub struct SearchResults {
    pub total_pairs: u64,
    pub gcd_filtered: u64,
    pub mod_filtered: u64,
    pub exact_checks: u64,
    pub power_hits: u64,
    pub primitive_hits: u64,
    pub runtime_seconds: f64,
    pub rate_pairs_per_sec: f64,
    pub workers_used: usize,
    pub hits: Vec<BealHit>,
}
