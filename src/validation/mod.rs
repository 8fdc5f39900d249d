// src/validation/mod.rs

//! Consistency checks on simulator state and simulator output.

use crate::core::{DjError, Result, StateVector};
use crate::simulation::MeasurementCounts;

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Checks that the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `1e-9`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(DjError::Simulation)` otherwise.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq = state.norm_sqr();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(DjError::simulation(format!(
            "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
            norm_sq, effective_tolerance
        )))
    } else {
        Ok(())
    }
}

/// Checks that counts returned by a simulator honour the contract: every key
/// is a `num_bits`-wide string of `0`/`1`, and the total equals `shots`.
pub fn validate_counts(counts: &MeasurementCounts, num_bits: usize, shots: u32) -> Result<()> {
    for (bits, _) in counts.iter() {
        if bits.len() != num_bits || !bits.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(DjError::simulation(format!(
                "Outcome '{}' is not a {}-bit string",
                bits, num_bits
            )));
        }
    }
    let total = counts.total();
    if total != u64::from(shots) {
        return Err(DjError::simulation(format!(
            "Counts total {} does not match {} shots",
            total, shots
        )));
    }
    Ok(())
}
