// src/oracle/enumerate.rs

//! Exhaustive enumeration of balanced oracles.
//!
//! Balanced truth tables are produced directly as combinations of
//! `2^(n-1)` one-positions out of `2^n` inputs, so only valid tables are ever
//! visited.

use super::{check_bits, Domain, OracleSpec};
use crate::core::Result;

/// Every valid quantum balanced mask for `n` inputs, `1..=2^n - 1`.
pub fn balanced_masks(n: u32) -> Result<impl Iterator<Item = OracleSpec>> {
    check_bits(n, Domain::Quantum)?;
    Ok((1u64..(1u64 << n)).filter_map(move |mask| OracleSpec::balanced_from_mask(n, mask).ok()))
}

/// Number of balanced truth tables over `n` inputs, `C(2^n, 2^(n-1))`.
///
/// Returns `None` for `n = 0` and for `n > 7`, where the count no longer fits a `u128`.
pub fn count_balanced_tables(n: u32) -> Option<u128> {
    if n < 1 || n > 7 {
        return None;
    }
    let total = 1u128 << n;
    let half = total / 2;
    let mut count: u128 = 1;
    for i in 0..half {
        // C(total, i + 1) = C(total, i) * (total - i) / (i + 1). Cancelling the
        // common factor first keeps every intermediate at most C(total, i + 1).
        let g = gcd(count, i + 1);
        let divisor = (i + 1) / g;
        count = (count / g).checked_mul((total - i) / divisor)?;
    }
    Some(count)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Lexicographic iterator over all balanced truth tables for `n` inputs.
#[derive(Debug, Clone)]
pub struct BalancedTables {
    n: u32,
    size: usize,
    /// Sorted positions of the ones in the next table to emit.
    positions: Vec<usize>,
    exhausted: bool,
}

impl BalancedTables {
    pub fn new(n: u32) -> Result<Self> {
        check_bits(n, Domain::Classical)?;
        let size = 1usize << n;
        Ok(Self {
            n,
            size,
            positions: (0..size / 2).collect(),
            exhausted: false,
        })
    }

    /// Moves `positions` to the next combination; returns false after the last one.
    fn advance(&mut self) -> bool {
        let k = self.positions.len();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.positions[i] < self.size - k + i {
                self.positions[i] += 1;
                for j in i + 1..k {
                    self.positions[j] = self.positions[j - 1] + 1;
                }
                return true;
            }
        }
        false
    }
}

impl Iterator for BalancedTables {
    type Item = OracleSpec;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let mut bits = vec![0u8; self.size];
        for &p in &self.positions {
            bits[p] = 1;
        }
        if !self.advance() {
            self.exhausted = true;
        }
        OracleSpec::balanced_from_table(self.n, bits).ok()
    }
}
