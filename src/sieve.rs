//! # Sieve — Two-Path Modular Survivor Filter
//!
//! Decides, from precomputed tables alone, whether a pair (A, B) can
//! possibly satisfy A^x + B^y = C^z. If A^x + B^y = C^z holds over the
//! integers it holds modulo every prime, so if (A^x + B^y) mod p is not a
//! z-th-power residue for even one sieve prime, no integer C exists and the
//! pair is killed. The filter is sound — it can never kill a true solution —
//! and lossy: survivors still require exact verification.
//!
//! Two code paths produce bitwise-identical decisions:
//!
//! - [`survives`] — scalar, one B at a time, short-circuiting on the first
//!   killing prime. The reference semantics.
//! - [`survives8`] — eight consecutive B values at once, returning a
//!   survivor bitmask. At a fixed A each prime contributes one broadcast
//!   scalar from the A-major table and eight consecutive bytes from the
//!   prime-major table, a shape the compiler can turn into vector loads.
//!
//! The reduction (a + b) mod p for a, b < p is a compare-and-subtract, not
//! a division: the sum is below 2p.

use crate::modmath::gcd64;
use crate::precompute::PrecomputedTables;
use crate::{NUM_SIEVE_PRIMES, SIEVE_PRIMES};

/// Scalar sieve check: does (A, B) survive all 20 primes?
///
/// Requires `a <= tables.a_max()` and `b <= tables.b_max()`.
#[inline]
pub fn survives(a: u64, b: u64, tables: &PrecomputedTables) -> bool {
    let ax = tables.ax_row(a);
    for i in 0..NUM_SIEVE_PRIMES {
        let p = SIEVE_PRIMES[i];
        let mut sum = ax[i] as u32 + tables.by_row(i)[b as usize] as u32;
        if sum >= p {
            sum -= p;
        }
        if !tables.residue_mask_at(i).get(sum) {
            return false;
        }
    }
    true
}

/// Batched sieve check for the eight B values `b_start .. b_start + 8` at a
/// fixed A. Bit `l` of the result is set iff (A, b_start + l) survives.
///
/// Lanes past `tables.b_max()` are cleared. Exits early once every lane is
/// dead. Decisions are bitwise-identical to [`survives`] lane by lane.
pub fn survives8(a: u64, b_start: u64, tables: &PrecomputedTables) -> u8 {
    let mut survivors: u8 = 0xFF;

    // Clear lanes that fall outside the B range before touching the tables.
    for lane in 0..8u64 {
        if b_start + lane > tables.b_max() {
            survivors &= !(1u8 << lane);
        }
    }
    if survivors == 0 {
        return 0;
    }

    let ax = tables.ax_row(a);
    for i in 0..NUM_SIEVE_PRIMES {
        let p = SIEVE_PRIMES[i];
        let axv = ax[i] as u32;
        let by = tables.by_row(i);
        let mask = tables.residue_mask_at(i);

        // Eight consecutive bytes of the prime-major row.
        for lane in 0..8u32 {
            if survivors & (1u8 << lane) == 0 {
                continue;
            }
            let b = b_start + lane as u64;
            let mut sum = axv + by[b as usize] as u32;
            if sum >= p {
                sum -= p;
            }
            if !mask.get(sum) {
                survivors &= !(1u8 << lane);
            }
        }

        if survivors == 0 {
            break;
        }
    }

    survivors
}

/// Count coprime pairs that survive the sieve in an inclusive sub-range.
/// Used by the self-validation harness and tests; not on the hot path.
pub fn count_survivors(
    a_start: u64,
    a_end: u64,
    b_start: u64,
    b_end: u64,
    tables: &PrecomputedTables,
) -> u64 {
    let mut count = 0;
    for a in a_start..=a_end {
        for b in b_start..=b_end {
            if gcd64(a, b) == 1 && survives(a, b, tables) {
                count += 1;
            }
        }
    }
    count
}
