// src/core/state.rs

use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

/// Amplitude vector of an `n`-qubit register in the computational basis.
///
/// Basis index `k` encodes qubit `q` in bit `q` of `k` (qubit 0 is the least
/// significant bit), matching the little-endian convention used for
/// measurement bitstrings.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    amplitudes: Vec<Complex<f64>>,
    num_qubits: usize,
}

impl StateVector {
    /// The `|0...0>` state over `num_qubits` qubits.
    pub(crate) fn zero_state(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex::zero(); 1usize << num_qubits];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Self { amplitudes, num_qubits }
    }

    /// Wraps an explicit amplitude vector. The length must be `2^num_qubits`.
    #[cfg(test)]
    pub(crate) fn from_amplitudes(amplitudes: Vec<Complex<f64>>, num_qubits: usize) -> Self {
        debug_assert_eq!(amplitudes.len(), 1usize << num_qubits);
        Self { amplitudes, num_qubits }
    }

    /// Read-only access to the amplitudes.
    pub fn amplitudes(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    pub(crate) fn amplitudes_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.amplitudes
    }

    /// Number of basis states (`2^n`).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Number of qubits represented.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Sum of squared amplitude magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Rescales the vector to unit norm. A zero vector is left untouched.
    pub(crate) fn renormalize(&mut self) {
        let norm = self.norm_sqr().sqrt();
        if norm > 0.0 {
            for amp in &mut self.amplitudes {
                *amp /= norm;
            }
        }
    }

    /// Born-rule probabilities for every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
