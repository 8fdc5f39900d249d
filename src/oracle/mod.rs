// src/oracle/mod.rs

//! Constant and balanced oracle specifications for the classical and quantum
//! domains.
//!
//! An oracle is never a closure here. It is an [`OracleSpec`] carrying a
//! tagged [`OracleParameter`], and [`OracleSpec::evaluate`] is a pure function
//! dispatched on that tag. All randomness comes from the `Rng` the caller
//! passes in.

mod enumerate;

pub use enumerate::{balanced_masks, count_balanced_tables, BalancedTables};

use crate::core::{DjError, Result, MAX_CLASSICAL_BITS, MAX_QUANTUM_BITS};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two promise classes of a Deutsch-Jozsa oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    /// Same output for every input.
    Constant,
    /// Output 1 for exactly half of the inputs.
    Balanced,
}

impl OracleKind {
    /// Lower-case name, as used in result records.
    pub fn as_str(self) -> &'static str {
        match self {
            OracleKind::Constant => "constant",
            OracleKind::Balanced => "balanced",
        }
    }
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which execution model an oracle is generated for.
///
/// Classical balanced oracles carry a full truth table; quantum balanced
/// oracles carry a CNOT mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Classical,
    Quantum,
}

/// A balanced truth table: `2^n` output bits, exactly half of them ones.
///
/// Only constructible through validation, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TruthTable {
    bits: Vec<u8>,
}

impl TruthTable {
    /// Validates that `bits` has length `2^n`, holds only 0/1, and is balanced.
    pub fn new(n: u32, bits: Vec<u8>) -> Result<Self> {
        check_bits(n, Domain::Classical)?;
        let expected = 1usize << n;
        if bits.len() != expected {
            return Err(DjError::config(format!(
                "Truth table for n={} must have {} entries, got {}",
                n,
                expected,
                bits.len()
            )));
        }
        if let Some(bad) = bits.iter().find(|b| **b > 1) {
            return Err(DjError::config(format!("Truth table entries must be 0 or 1, found {}", bad)));
        }
        let ones = bits.iter().filter(|b| **b == 1).count();
        if ones != expected / 2 {
            return Err(DjError::config(format!(
                "Truth table is not balanced: {} ones out of {} entries",
                ones, expected
            )));
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of inputs mapping to 1.
    pub fn ones(&self) -> usize {
        self.bits.iter().filter(|b| **b == 1).count()
    }

    /// Number of inputs mapping to 0.
    pub fn zeros(&self) -> usize {
        self.bits.len() - self.ones()
    }
}

/// The tagged oracle parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleParameter {
    /// Constant oracle returning `output` (0 or 1) for every input.
    Constant { output: u8 },
    /// Classical balanced oracle given by its truth table.
    Table(TruthTable),
    /// Quantum balanced oracle: bit `i` set means a CNOT from input `i` to the
    /// ancilla. Always in `[1, 2^n - 1]`.
    Mask(u64),
}

/// An immutable oracle specification over `n` input bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OracleSpec {
    n: u32,
    parameter: OracleParameter,
}

impl OracleSpec {
    /// A constant oracle with an explicit output bit.
    pub fn constant(n: u32, output: u8) -> Result<Self> {
        check_bits(n, Domain::Quantum)?;
        if output > 1 {
            return Err(DjError::config(format!("Constant oracle output must be 0 or 1, got {}", output)));
        }
        Ok(Self { n, parameter: OracleParameter::Constant { output } })
    }

    /// A quantum balanced oracle from an explicit CNOT mask.
    ///
    /// A zero mask would be a constant oracle in disguise and is rejected.
    pub fn balanced_from_mask(n: u32, mask: u64) -> Result<Self> {
        check_bits(n, Domain::Quantum)?;
        let upper = (1u64 << n) - 1;
        if mask == 0 || mask > upper {
            return Err(DjError::config(format!(
                "Balanced oracle mask must be in [1, {}] for n={}, got {}",
                upper, n, mask
            )));
        }
        Ok(Self { n, parameter: OracleParameter::Mask(mask) })
    }

    /// A classical balanced oracle from an explicit truth table.
    pub fn balanced_from_table(n: u32, bits: Vec<u8>) -> Result<Self> {
        let table = TruthTable::new(n, bits)?;
        Ok(Self { n, parameter: OracleParameter::Table(table) })
    }

    /// Number of input bits.
    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn parameter(&self) -> &OracleParameter {
        &self.parameter
    }

    pub fn kind(&self) -> OracleKind {
        match self.parameter {
            OracleParameter::Constant { .. } => OracleKind::Constant,
            OracleParameter::Table(_) | OracleParameter::Mask(_) => OracleKind::Balanced,
        }
    }

    /// Number of distinct inputs, `2^n`.
    pub fn domain_size(&self) -> u64 {
        1u64 << self.n
    }

    /// Evaluates the oracle on input `x`.
    ///
    /// Mask oracles compute the parity of the input bits selected by the mask.
    pub fn evaluate(&self, x: u64) -> Result<u8> {
        if x >= self.domain_size() {
            return Err(DjError::config(format!(
                "Oracle input {} out of range for n={}",
                x, self.n
            )));
        }
        Ok(match &self.parameter {
            OracleParameter::Constant { output } => *output,
            OracleParameter::Table(table) => table.bits[x as usize],
            OracleParameter::Mask(mask) => ((x & mask).count_ones() & 1) as u8,
        })
    }

    /// The truth table this oracle computes over all `2^n` inputs.
    ///
    /// Only available for `n <= MAX_CLASSICAL_BITS`.
    pub fn to_table(&self) -> Result<Vec<u8>> {
        check_bits(self.n, Domain::Classical)?;
        (0..self.domain_size()).map(|x| self.evaluate(x)).collect()
    }
}

impl fmt::Display for OracleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parameter {
            OracleParameter::Constant { output } => write!(f, "Constant(n={}, f={})", self.n, output),
            OracleParameter::Table(table) => write!(f, "Balanced(n={}, table[{}])", self.n, table.len()),
            OracleParameter::Mask(mask) => write!(f, "Balanced(n={}, mask={:#b})", self.n, mask),
        }
    }
}

/// Rejects `n < 1` and sizes beyond what the domain can represent.
pub fn check_bits(n: u32, domain: Domain) -> Result<()> {
    if n < 1 {
        return Err(DjError::config("Number of input bits must be at least 1"));
    }
    let limit = match domain {
        Domain::Classical => MAX_CLASSICAL_BITS,
        Domain::Quantum => MAX_QUANTUM_BITS,
    };
    if n > limit {
        return Err(DjError::config(format!(
            "n={} exceeds the {:?} domain limit of {}",
            n, domain, limit
        )));
    }
    Ok(())
}

/// Creates a constant oracle; a missing output bit is drawn uniformly from {0, 1}.
pub fn create_constant<R: Rng + ?Sized>(n: u32, output: Option<u8>, rng: &mut R) -> Result<OracleSpec> {
    let output = match output {
        Some(bit) => bit,
        None => rng.random_range(0..=1u8),
    };
    OracleSpec::constant(n, output)
}

/// Creates a random balanced oracle for the given domain.
///
/// Classical tables are balanced by construction: `2^(n-1)` ones are laid
/// out and the whole table is shuffled. Quantum masks are drawn uniformly
/// from `[1, 2^n - 1]`, each selecting a nonempty parity which is balanced.
pub fn create_balanced<R: Rng + ?Sized>(n: u32, domain: Domain, rng: &mut R) -> Result<OracleSpec> {
    check_bits(n, domain)?;
    match domain {
        Domain::Classical => {
            let size = 1usize << n;
            let mut bits = vec![0u8; size];
            bits[..size / 2].fill(1);
            bits.shuffle(rng);
            OracleSpec::balanced_from_table(n, bits)
        }
        Domain::Quantum => {
            let mask = rng.random_range(1..(1u64 << n));
            OracleSpec::balanced_from_mask(n, mask)
        }
    }
}

/// Creates a random oracle of the requested kind.
pub fn create<R: Rng + ?Sized>(kind: OracleKind, n: u32, domain: Domain, rng: &mut R) -> Result<OracleSpec> {
    match kind {
        OracleKind::Constant => {
            check_bits(n, domain)?;
            create_constant(n, None, rng)
        }
        OracleKind::Balanced => create_balanced(n, domain, rng),
    }
}
