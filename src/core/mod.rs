// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;

pub use error::{DjError, QubitId};
pub use state::StateVector;

pub mod constants;
pub use constants::limits::{MAX_CLASSICAL_BITS, MAX_QUANTUM_BITS, MAX_SIMULATED_QUBITS};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DjError>;
