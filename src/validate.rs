//! # Validate — Known-Answer Self-Tests
//!
//! The `--validate` harness: a fixed battery of checks over the arithmetic
//! primitives, residue masks, the exact verifier, and a small sieve sweep.
//! Prints a PASS/FAIL report and returns the failure count so the caller
//! can map it onto the exit code. Runs in well under a second — cheap
//! enough to execute on every deployment before committing to a long sweep.

use crate::modmath::{gcd64, pow_mod};
use crate::precompute::{residue_mask, PrecomputedTables};
use crate::sieve::count_survivors;
use crate::verify::check_beal_hit;

/// Run the full self-validation battery. Returns the number of failures.
pub fn run() -> usize {
    println!("bealhunt self-validation");
    println!("=======================");
    let mut errors = 0;

    // 1. Residue masks, including the 128-bit upper-word regression.
    println!("\n[1] residue masks");
    let cubes_mod_7 = residue_mask(7, 3);
    if cubes_mod_7.words() == [(1u64 << 0) | (1 << 1) | (1 << 6), 0] {
        println!("    PASS: cubes mod 7 = {{0, 1, 6}}");
    } else {
        println!("    FAIL: cubes mod 7 = {:x?}", cubes_mod_7.words());
        errors += 1;
    }

    let fifths_mod_11 = residue_mask(11, 5);
    if fifths_mod_11.words() == [(1u64 << 0) | (1 << 1) | (1 << 10), 0] {
        println!("    PASS: 5th powers mod 11 = {{0, 1, 10}}");
    } else {
        println!("    FAIL: 5th powers mod 11 = {:x?}", fifths_mod_11.words());
        errors += 1;
    }

    // 70^3 ≡ 70 (mod 71): bit 70 lives in the upper mask word.
    if residue_mask(71, 3).get(70) {
        println!("    PASS: bit 70 set for cubes mod 71 (upper-word shift)");
    } else {
        println!("    FAIL: bit 70 NOT set for cubes mod 71");
        errors += 1;
    }

    // 2. Binary GCD.
    println!("\n[2] gcd64");
    let gcd_cases: [(u64, u64, u64); 6] = [
        (12, 8, 4),
        (17, 13, 1),
        (100, 25, 25),
        (0, 5, 5),
        (7, 0, 7),
        (1, 1, 1),
    ];
    let mut gcd_ok = true;
    for (a, b, want) in gcd_cases {
        let got = gcd64(a, b);
        if got != want {
            println!("    FAIL: gcd({}, {}) = {}, expected {}", a, b, got, want);
            gcd_ok = false;
            errors += 1;
        }
    }
    if gcd_ok {
        println!("    PASS: all gcd cases");
    }

    // 3. Modular exponentiation.
    println!("\n[3] pow_mod");
    if pow_mod(2, 10, 1000) == 24 && pow_mod(3, 4, 7) == 4 && pow_mod(5, 3, 13) == 8 {
        println!("    PASS: known powers");
    } else {
        println!("    FAIL: pow_mod known answers incorrect");
        errors += 1;
    }

    // 4. Exact verifier, true and false cases.
    println!("\n[4] exact verifier");
    match check_beal_hit(2, 2, 6, 6, 7, 1000) {
        Some(hit) if hit.c == 2 && hit.gcd == 2 => {
            println!("    PASS: 2^6 + 2^6 = 2^7 (gcd=2, non-primitive)")
        }
        other => {
            println!("    FAIL: 2^6 + 2^6 = 2^7 not detected: {:?}", other);
            errors += 1;
        }
    }
    if check_beal_hit(2, 3, 3, 3, 3, 1000).is_none() {
        println!("    PASS: 2^3 + 3^3 = 35 rejected (not a cube)");
    } else {
        println!("    FAIL: 2^3 + 3^3 reported as a hit");
        errors += 1;
    }

    // 5. Sieve on a small range.
    println!("\n[5] sieve sweep");
    match PrecomputedTables::build(3, 4, 5, 100, 100) {
        Ok(tables) => {
            let survivors = count_survivors(1, 100, 1, 100, &tables);
            println!("    survivors in [1,100]x[1,100] for (3,4,5): {}", survivors);
            if survivors <= 10 {
                println!("    PASS: survivor count in expected range");
            } else {
                println!("    FAIL: survivor count unexpectedly high");
                errors += 1;
            }
        }
        Err(e) => {
            println!("    FAIL: table construction failed: {}", e);
            errors += 1;
        }
    }

    println!("\n=======================");
    if errors == 0 {
        println!("all validation tests PASSED");
    } else {
        println!("{} validation test(s) FAILED", errors);
    }
    errors
}
