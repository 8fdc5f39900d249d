//! Error handling logic

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Index of a qubit within a circuit register.
///
/// Deutsch-Jozsa circuits over `n` input bits use qubits `0..n` as inputs
/// and qubit `n` as the ancilla.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Position of this qubit as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Errors raised anywhere in the evaluation pipeline.
///
/// Configuration problems are detected before a trial runs; simulator
/// failures are normally captured per trial by the runner instead of
/// propagating out of a sweep.
#[derive(Debug, Error)]
pub enum DjError {
    /// Invalid qubit count, oracle parameter, noise level, ratio, threshold
    /// or other user-supplied setting.
    #[error("Configuration Error: {message}")]
    Configuration {
        /// Description of the rejected setting
        message: String,
    },

    /// A noise-channel name that does not map to a known channel family.
    #[error("Unsupported Noise Type: '{name}'")]
    UnsupportedNoiseType {
        /// The name that failed to parse
        name: String,
    },

    /// Too few samples to fit a model with a positive number of degrees of freedom.
    #[error("Insufficient Data: need at least {required} samples, got {actual}")]
    InsufficientData {
        /// Minimum number of samples
        required: usize,
        /// Number of samples supplied
        actual: usize,
    },

    /// The simulator collaborator failed to produce counts.
    #[error("Simulation Process Error: {message}")]
    Simulation {
        /// Simulation failure message
        message: String,
    },

    /// A result record could not be serialized or a config could not be parsed.
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing a result record failed.
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}

impl DjError {
    /// Shorthand for [`DjError::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        DjError::Configuration { message: message.into() }
    }

    /// Shorthand for [`DjError::Simulation`].
    pub fn simulation(message: impl Into<String>) -> Self {
        DjError::Simulation { message: message.into() }
    }
}
