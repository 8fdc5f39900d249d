// src/operations/mod.rs

//! The gate set needed by Deutsch-Jozsa circuits.

use crate::core::QubitId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single circuit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum Gate {
    /// Bit flip, used to prepare the ancilla in `|1>`.
    X { target: QubitId },
    /// Hadamard.
    H { target: QubitId },
    /// Phase flip, the constant-one oracle.
    Z { target: QubitId },
    /// Controlled-NOT, the building block of balanced oracles.
    Cnot { control: QubitId, target: QubitId },
    /// Computational-basis measurement of `qubit` into classical bit `clbit`.
    Measure { qubit: QubitId, clbit: u32 },
}

/// Gate families that noise channels are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateClass {
    SingleQubit,
    TwoQubit,
    Measurement,
}

impl Gate {
    /// Qubits the gate acts on, control first for `Cnot`.
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::X { target } | Gate::H { target } | Gate::Z { target } => vec![*target],
            Gate::Cnot { control, target } => vec![*control, *target],
            Gate::Measure { qubit, .. } => vec![*qubit],
        }
    }

    pub fn class(&self) -> GateClass {
        match self {
            Gate::X { .. } | Gate::H { .. } | Gate::Z { .. } => GateClass::SingleQubit,
            Gate::Cnot { .. } => GateClass::TwoQubit,
            Gate::Measure { .. } => GateClass::Measurement,
        }
    }

    /// Short gate symbol as used in circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::X { .. } => "X",
            Gate::H { .. } => "H",
            Gate::Z { .. } => "Z",
            Gate::Cnot { .. } => "CX",
            Gate::Measure { .. } => "M",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Cnot { control, target } => write!(f, "CX({}, {})", control, target),
            Gate::Measure { qubit, clbit } => write!(f, "M({} -> c{})", qubit, clbit),
            Gate::X { target } | Gate::H { target } | Gate::Z { target } => {
                write!(f, "{}({})", self.symbol(), target)
            }
        }
    }
}
