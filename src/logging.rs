//! # Logging — JSONL Lifecycle Records
//!
//! Emits the machine-readable run log: one UTF-8 JSON object per line, in
//! four record kinds — START (once, truncating), CHECKPOINT (throttled),
//! POWER_HIT (per verified hit), COMPLETE (once, with the authoritative
//! totals and an integrity digest).
//!
//! The sink is opened, appended, and closed on every record. Logging must
//! never block or abort the search: any I/O or serialization failure drops
//! that record silently and the run continues — the digest in COMPLETE
//! still reflects the true counters.
//!
//! ## Integrity digest
//!
//! A 64-bit FNV-1a over exactly these fields in exactly this order, each
//! absorbed as a 64-bit quantity: x, y, z, A_start, A_max, B_start, B_max,
//! C_max, total_pairs, gcd_filtered, mod_filtered, exact_checks,
//! power_hits, primitive_hits. Rendered as 16 lowercase hex digits. Any
//! change to the order or the field set changes the digest — which is the
//! point: equal digests mean comparable runs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::results::{BealHit, SearchResults};
use crate::search::SearchParams;
use crate::{expected_pairs, SIEVE_PRIMES};

const FNV_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// FNV-1a over a sequence of 64-bit fields.
pub fn fnv1a64(fields: &[u64]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &f in fields {
        hash ^= f;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// The run digest: params then counters, in canonical order, as 16
/// lowercase hex digits.
pub fn integrity_digest(params: &SearchParams, results: &SearchResults) -> String {
    let digest = fnv1a64(&[
        params.x as u64,
        params.y as u64,
        params.z as u64,
        params.a_start,
        params.a_max,
        params.b_start,
        params.b_max,
        params.c_max,
        results.total_pairs,
        results.gcd_filtered,
        results.mod_filtered,
        results.exact_checks,
        results.power_hits,
        results.primitive_hits,
    ]);
    format!("{:016x}", digest)
}

/// Current UTC time as ISO 8601 with a Z suffix.
fn timestamp_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// System hostname, falling back to "unknown".
fn hostname() -> String {
    std::process::Command::new("hostname")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

// Record shapes. Field order in the emitted JSON is declaration order.

#[derive(Serialize)]
struct SystemInfo {
    hostname: String,
    platform: String,
    cpu_count: usize,
    engine: &'static str,
}

#[derive(Serialize)]
struct StartRecord {
    ts: String,
    event: &'static str,
    run_id: u64,
    mode: &'static str,
    signature: [u32; 3],
    #[serde(rename = "Astart")]
    a_start: u64,
    #[serde(rename = "Amax")]
    a_max: u64,
    #[serde(rename = "Bstart")]
    b_start: u64,
    #[serde(rename = "Bmax")]
    b_max: u64,
    #[serde(rename = "Cmax")]
    c_max: u64,
    expected_pairs: u64,
    system: SystemInfo,
    sieve_primes: [u32; 20],
}

#[derive(Serialize)]
struct CheckpointRecord {
    ts: String,
    event: &'static str,
    run_id: u64,
    pairs_completed: u64,
    pairs_expected: u64,
    percent_complete: f64,
    gcd_skips: u64,
    mod_skips: u64,
    exact_checks: u64,
    elapsed_seconds: f64,
    rate_pairs_per_sec: f64,
    chunks_done: u64,
    chunks_total: u64,
}

#[derive(Serialize)]
struct HitRecord {
    ts: String,
    event: &'static str,
    #[serde(rename = "A")]
    a: u64,
    #[serde(rename = "B")]
    b: u64,
    #[serde(rename = "C")]
    c: u64,
    gcd: u64,
    x: u32,
    y: u32,
    z: u32,
}

#[derive(Serialize)]
struct SearchBounds {
    #[serde(rename = "A")]
    a: [u64; 2],
    #[serde(rename = "B")]
    b: [u64; 2],
    #[serde(rename = "C")]
    c: [u64; 2],
}

#[derive(Serialize)]
struct ResultsSection {
    total_pairs: u64,
    gcd_filtered: u64,
    mod_filtered: u64,
    exact_checks: u64,
    power_hits: u64,
    primitive_counterexamples: u64,
}

#[derive(Serialize)]
struct PerformanceSection {
    runtime_seconds: f64,
    avg_rate_pairs_per_sec: f64,
    workers_used: usize,
}

#[derive(Serialize)]
struct VerificationSection {
    status: &'static str,
    integrity_hash: String,
}

#[derive(Serialize)]
struct CompleteRecord {
    ts: String,
    event: &'static str,
    run_id: u64,
    signature: [u32; 3],
    search_bounds: SearchBounds,
    results: ResultsSection,
    performance: PerformanceSection,
    verification: VerificationSection,
}

/// Checkpoint field bundle, assembled by the driver's throttled reporter.
pub struct CheckpointSnapshot {
    pub pairs_completed: u64,
    pub pairs_expected: u64,
    pub gcd_skips: u64,
    pub mod_skips: u64,
    pub exact_checks: u64,
    pub elapsed_seconds: f64,
    pub chunks_done: u64,
    pub chunks_total: u64,
}

/// Append-only JSONL sink. A `None` path disables all output (the records
/// are still assembled cheaply enough not to matter off the hot path).
pub struct JsonlLogger {
    path: Option<PathBuf>,
}

impl JsonlLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonlLogger {
            path: Some(path.into()),
        }
    }

    /// A logger that drops everything. Used by tests and library callers
    /// that only want the returned results.
    pub fn disabled() -> Self {
        JsonlLogger { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Serialize and append one record; open/append/close per call.
    /// `truncate` starts the file fresh (START only). Errors are dropped.
    fn emit<T: Serialize>(&self, record: &T, truncate: bool) {
        let Some(path) = &self.path else { return };
        let Ok(line) = serde_json::to_string(record) else {
            return;
        };
        let file = if truncate {
            OpenOptions::new().create(true).write(true).truncate(true).open(path)
        } else {
            OpenOptions::new().create(true).append(true).open(path)
        };
        if let Ok(mut f) = file {
            let _ = writeln!(f, "{}", line);
        }
    }

    pub fn start(&self, params: &SearchParams, run_id: u64, workers: usize) {
        self.emit(
            &StartRecord {
                ts: timestamp_iso(),
                event: "START",
                run_id,
                mode: "search",
                signature: [params.x, params.y, params.z],
                a_start: params.a_start,
                a_max: params.a_max,
                b_start: params.b_start,
                b_max: params.b_max,
                c_max: params.c_max,
                expected_pairs: expected_pairs(
                    params.a_start,
                    params.a_max,
                    params.b_start,
                    params.b_max,
                ),
                system: SystemInfo {
                    hostname: hostname(),
                    platform: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
                    cpu_count: workers,
                    engine: "bealhunt",
                },
                sieve_primes: SIEVE_PRIMES,
            },
            true,
        );
    }

    pub fn checkpoint(&self, run_id: u64, snap: &CheckpointSnapshot) {
        let percent = if snap.pairs_expected > 0 {
            snap.pairs_completed as f64 / snap.pairs_expected as f64 * 100.0
        } else {
            0.0
        };
        let rate = if snap.elapsed_seconds > 0.0 {
            snap.pairs_completed as f64 / snap.elapsed_seconds
        } else {
            0.0
        };
        self.emit(
            &CheckpointRecord {
                ts: timestamp_iso(),
                event: "CHECKPOINT",
                run_id,
                pairs_completed: snap.pairs_completed,
                pairs_expected: snap.pairs_expected,
                percent_complete: percent,
                gcd_skips: snap.gcd_skips,
                mod_skips: snap.mod_skips,
                exact_checks: snap.exact_checks,
                elapsed_seconds: snap.elapsed_seconds,
                rate_pairs_per_sec: rate,
                chunks_done: snap.chunks_done,
                chunks_total: snap.chunks_total,
            },
            false,
        );
    }

    pub fn power_hit(&self, hit: &BealHit) {
        self.emit(
            &HitRecord {
                ts: timestamp_iso(),
                event: "POWER_HIT",
                a: hit.a,
                b: hit.b,
                c: hit.c,
                gcd: hit.gcd,
                x: hit.x,
                y: hit.y,
                z: hit.z,
            },
            false,
        );
    }

    pub fn complete(&self, params: &SearchParams, run_id: u64, results: &SearchResults) {
        let status = if results.primitive_hits > 0 {
            "COUNTEREXAMPLE_FOUND"
        } else {
            "CLEAR"
        };
        self.emit(
            &CompleteRecord {
                ts: timestamp_iso(),
                event: "COMPLETE",
                run_id,
                signature: [params.x, params.y, params.z],
                search_bounds: SearchBounds {
                    a: [params.a_start, params.a_max],
                    b: [params.b_start, params.b_max],
                    c: [1, params.c_max],
                },
                results: ResultsSection {
                    total_pairs: results.total_pairs,
                    gcd_filtered: results.gcd_filtered,
                    mod_filtered: results.mod_filtered,
                    exact_checks: results.exact_checks,
                    power_hits: results.power_hits,
                    primitive_counterexamples: results.primitive_hits,
                },
                performance: PerformanceSection {
                    runtime_seconds: results.runtime_seconds,
                    avg_rate_pairs_per_sec: results.rate_pairs_per_sec,
                    workers_used: results.workers_used,
                },
                verification: VerificationSection {
                    status,
                    integrity_hash: integrity_digest(params, results),
                },
            },
            false,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchParams;

    // ── FNV-1a ─────────────────────────────────────────────────────────

    /// Known-answer vectors computed independently from the FNV-1a
    /// definition with offset 0xCBF29CE484222325 and prime 0x100000001B3.
    #[test]
    fn fnv_known_vectors() {
        assert_eq!(fnv1a64(&[]), FNV_OFFSET_BASIS);
        assert_eq!(format!("{:016x}", fnv1a64(&[0u64; 14])), "8df352d4f9fa3add");
        let seq: Vec<u64> = (1..=14).collect();
        assert_eq!(format!("{:016x}", fnv1a64(&seq)), "2aab373878fd97d2");
    }

    fn params() -> SearchParams {
        SearchParams {
            x: 3,
            y: 4,
            z: 5,
            a_start: 1,
            a_max: 100,
            b_start: 1,
            b_max: 100,
            c_max: 10_000_000,
            threads: 1,
            checkpoint_interval_secs: 1,
        }
    }

    fn results() -> SearchResults {
        SearchResults {
            total_pairs: 10_000,
            gcd_filtered: 3_913,
            mod_filtered: 6_084,
            exact_checks: 3,
            power_hits: 0,
            primitive_hits: 0,
            runtime_seconds: 0.5,
            rate_pairs_per_sec: 20_000.0,
            workers_used: 1,
            hits: Vec::new(),
        }
    }

    /// The digest over the canonical S5 run (signature (3, 4, 5) on
    /// [1, 100]², C_max 10^7) with its true counter values.
    #[test]
    fn digest_for_canonical_small_sweep() {
        assert_eq!(integrity_digest(&params(), &results()), "6532c6ae1eaa1241");
    }

    /// Any single field change must move the digest.
    #[test]
    fn digest_is_sensitive_to_every_counter() {
        let base = integrity_digest(&params(), &results());
        let mut r = results();
        r.exact_checks += 1;
        assert_ne!(integrity_digest(&params(), &r), base);

        let mut p = params();
        p.c_max += 1;
        assert_ne!(integrity_digest(&p, &results()), base);
    }

    /// Digest is 16 lowercase hex digits, always.
    #[test]
    fn digest_formatting() {
        let d = integrity_digest(&params(), &results());
        assert_eq!(d.len(), 16);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    // ── Record Emission ────────────────────────────────────────────────

    #[test]
    fn disabled_logger_writes_nothing() {
        let logger = JsonlLogger::disabled();
        logger.start(&params(), 1, 1);
        logger.complete(&params(), 1, &results());
        assert!(logger.path().is_none());
    }

    #[test]
    fn records_round_trip_as_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let logger = JsonlLogger::new(&path);

        logger.start(&params(), 42, 2);
        logger.checkpoint(
            42,
            &CheckpointSnapshot {
                pairs_completed: 5_000,
                pairs_expected: 10_000,
                gcd_skips: 2_000,
                mod_skips: 2_999,
                exact_checks: 1,
                elapsed_seconds: 0.5,
                chunks_done: 50,
                chunks_total: 100,
            },
        );
        logger.power_hit(&BealHit {
            a: 2,
            b: 2,
            c: 2,
            gcd: 2,
            x: 6,
            y: 6,
            z: 7,
        });
        logger.complete(&params(), 42, &results());

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);

        let records: Vec<serde_json::Value> = lines
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records[0]["event"], "START");
        assert_eq!(records[0]["mode"], "search");
        assert_eq!(records[0]["signature"], serde_json::json!([3, 4, 5]));
        assert_eq!(records[0]["Amax"], 100);
        assert_eq!(records[0]["expected_pairs"], 10_000);
        assert_eq!(records[0]["sieve_primes"][19], 71);
        assert_eq!(records[0]["system"]["engine"], "bealhunt");

        assert_eq!(records[1]["event"], "CHECKPOINT");
        assert_eq!(records[1]["percent_complete"], 50.0);
        assert_eq!(records[1]["rate_pairs_per_sec"], 10_000.0);
        assert_eq!(records[1]["chunks_done"], 50);

        assert_eq!(records[2]["event"], "POWER_HIT");
        assert_eq!(records[2]["A"], 2);
        assert_eq!(records[2]["gcd"], 2);

        assert_eq!(records[3]["event"], "COMPLETE");
        assert_eq!(records[3]["verification"]["status"], "CLEAR");
        assert_eq!(
            records[3]["verification"]["integrity_hash"],
            "6532c6ae1eaa1241"
        );
        assert_eq!(records[3]["results"]["primitive_counterexamples"], 0);
        assert_eq!(records[3]["search_bounds"]["C"], serde_json::json!([1, 10_000_000]));
    }

    /// START truncates: a stale log from a previous run at the same path
    /// does not leak records into the new one.
    #[test]
    fn start_truncates_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        std::fs::write(&path, "{\"event\":\"STALE\"}\n").unwrap();

        let logger = JsonlLogger::new(&path);
        logger.start(&params(), 7, 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"event\":\"START\""));
    }

    /// An unwritable sink must be tolerated silently.
    #[test]
    fn io_failure_is_dropped() {
        let logger = JsonlLogger::new("/nonexistent-dir/for/sure/run.jsonl");
        logger.start(&params(), 1, 1);
        logger.complete(&params(), 1, &results());
        // Nothing to assert beyond "did not panic or abort".
    }

    /// COUNTEREXAMPLE_FOUND status when primitive hits exist.
    #[test]
    fn complete_reports_counterexample_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let logger = JsonlLogger::new(&path);

        let mut r = results();
        r.power_hits = 1;
        r.primitive_hits = 1;
        logger.complete(&params(), 1, &r);

        let text = std::fs::read_to_string(&path).unwrap();
        let rec: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(rec["verification"]["status"], "COUNTEREXAMPLE_FOUND");
    }
}
