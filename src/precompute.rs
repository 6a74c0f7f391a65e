//! # Precompute — Residue Masks and Modular Power Tables
//!
//! Builds the three lookup structures the sieve reads on every pair, once
//! per run, immutable afterwards and shared read-only across workers:
//!
//! 1. **Residue masks**: for each sieve prime p, the set
//!    { s^z mod p : s ∈ [0, p) } as a 128-bit bitmap. Membership of
//!    (A^x + B^y) mod p in this set is the sieve's survival condition.
//! 2. **`ax_mod`** — A-major table of A^x mod p: the 20 residues for a
//!    fixed A are contiguous, so a row sweep broadcasts one scalar per
//!    prime.
//! 3. **`by_mod`** — prime-major table of B^y mod p: the residues for a
//!    fixed prime are contiguous across B, so an 8-wide B block reads
//!    eight consecutive bytes. This layout split is what makes the lane
//!    path vectorizable.
//!
//! Memory: (A_max + 1) × 20 + 20 × (B_max + 1) bytes — ~40 MB at
//! A_max = B_max = 10^6, small enough that the two hot rows of a B sweep
//! stay cache-resident.
//!
//! Table sizes are computed with checked arithmetic and reserved with
//! `try_reserve_exact`, so a range too large for memory surfaces as an
//! error instead of an abort, and no partially built handle escapes.

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::modmath::{pow_mod, Mask128};
use crate::{NUM_SIEVE_PRIMES, SIEVE_PRIMES};

/// The z-th-power residue set modulo `p`, as a 128-bit bitmap.
///
/// Bit r is set iff some s ∈ [0, p) has s^z ≡ r (mod p). Never empty:
/// 0^z ≡ 0 and 1^z ≡ 1 always contribute bits 0 and 1.
pub fn residue_mask(p: u32, z: u32) -> Mask128 {
    let mut mask = Mask128::new();
    for s in 0..p {
        mask.set(pow_mod(s as u64, z as u64, p as u64) as u32);
    }
    mask
}

/// Immutable lookup tables for one signature and search range.
pub struct PrecomputedTables {
    x: u32,
    y: u32,
    z: u32,
    a_max: u64,
    b_max: u64,
    residue_masks: [Mask128; NUM_SIEVE_PRIMES],
    /// A-major: ax_mod[A * 20 + i] = A^x mod SIEVE_PRIMES[i].
    ax_mod: Vec<u8>,
    /// Prime-major: by_mod[i * (b_max + 1) + B] = B^y mod SIEVE_PRIMES[i].
    by_mod: Vec<u8>,
}

impl PrecomputedTables {
    /// Build all tables for the signature (x, y, z) over A ∈ [0, a_max],
    /// B ∈ [0, b_max].
    pub fn build(x: u32, y: u32, z: u32, a_max: u64, b_max: u64) -> Result<Self> {
        let a_rows = usize::try_from(a_max.checked_add(1).context("A range overflows")?)
            .ok()
            .context("A range exceeds addressable memory")?;
        let b_cols = usize::try_from(b_max.checked_add(1).context("B range overflows")?)
            .ok()
            .context("B range exceeds addressable memory")?;
        let ax_len = a_rows
            .checked_mul(NUM_SIEVE_PRIMES)
            .context("A^x table size overflows")?;
        let by_len = b_cols
            .checked_mul(NUM_SIEVE_PRIMES)
            .context("B^y table size overflows")?;

        let mut residue_masks = [Mask128::new(); NUM_SIEVE_PRIMES];
        for (i, &p) in SIEVE_PRIMES.iter().enumerate() {
            residue_masks[i] = residue_mask(p, z);
        }

        let mut ax_mod = Vec::new();
        ax_mod
            .try_reserve_exact(ax_len)
            .context("failed to allocate A^x residue table")?;
        ax_mod.resize(ax_len, 0u8);
        ax_mod
            .par_chunks_mut(NUM_SIEVE_PRIMES)
            .enumerate()
            .for_each(|(a, row)| {
                for (i, &p) in SIEVE_PRIMES.iter().enumerate() {
                    row[i] = pow_mod(a as u64, x as u64, p as u64) as u8;
                }
            });

        let mut by_mod = Vec::new();
        by_mod
            .try_reserve_exact(by_len)
            .context("failed to allocate B^y residue table")?;
        by_mod.resize(by_len, 0u8);
        by_mod
            .par_chunks_mut(b_cols)
            .enumerate()
            .for_each(|(i, row)| {
                let p = SIEVE_PRIMES[i] as u64;
                for (b, slot) in row.iter_mut().enumerate() {
                    *slot = pow_mod(b as u64, y as u64, p) as u8;
                }
            });

        Ok(PrecomputedTables {
            x,
            y,
            z,
            a_max,
            b_max,
            residue_masks,
            ax_mod,
            by_mod,
        })
    }

    /// The 20 residues A^x mod p_i for a fixed A, contiguous by prime index.
    #[inline]
    pub fn ax_row(&self, a: u64) -> &[u8] {
        let start = a as usize * NUM_SIEVE_PRIMES;
        &self.ax_mod[start..start + NUM_SIEVE_PRIMES]
    }

    /// The residues B^y mod p_i for a fixed prime index, contiguous by B.
    #[inline]
    pub fn by_row(&self, prime_idx: usize) -> &[u8] {
        let cols = self.b_max as usize + 1;
        let start = prime_idx * cols;
        &self.by_mod[start..start + cols]
    }

    /// The z-th-power residue mask for a prime index.
    #[inline]
    pub fn residue_mask_at(&self, prime_idx: usize) -> &Mask128 {
        &self.residue_masks[prime_idx]
    }

    #[inline]
    pub fn a_max(&self) -> u64 {
        self.a_max
    }

    #[inline]
    pub fn b_max(&self) -> u64 {
        self.b_max
    }

    #[inline]
    pub fn signature(&self) -> (u32, u32, u32) {
        (self.x, self.y, self.z)
    }
}
