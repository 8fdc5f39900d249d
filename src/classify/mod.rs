// src/classify/mod.rs

//! Turns measurement counts into a constant/balanced verdict.
//!
//! An ideal Deutsch-Jozsa run measures the all-zero string with certainty for
//! a constant oracle and never for a balanced one. Under noise the counts
//! spread out, so the decision rule is configurable.

use crate::core::{DjError, Result};
use crate::oracle::OracleKind;
use crate::simulation::MeasurementCounts;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision rule applied to a counts histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Constant iff the only observed outcome is the all-zero string.
    Strict,
    /// Constant iff the all-zero share strictly exceeds `threshold`.
    Threshold {
        #[serde(default = "ClassificationMode::default_threshold")]
        threshold: f64,
    },
    /// Constant iff the all-zero string was observed at all.
    AnyZero,
}

impl ClassificationMode {
    /// Zero-fraction threshold used when none is given.
    pub const fn default_threshold() -> f64 {
        0.5
    }

    /// Threshold mode with a validated threshold.
    pub fn threshold(t: f64) -> Result<Self> {
        let mode = ClassificationMode::Threshold { threshold: t };
        mode.validate()?;
        Ok(mode)
    }

    /// Rejects thresholds outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if let ClassificationMode::Threshold { threshold } = self {
            if !threshold.is_finite() || !(0.0..=1.0).contains(threshold) {
                return Err(DjError::config(format!(
                    "Classification threshold must be in [0, 1], got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}

impl Default for ClassificationMode {
    fn default() -> Self {
        ClassificationMode::Threshold { threshold: Self::default_threshold() }
    }
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationMode::Strict => write!(f, "strict"),
            ClassificationMode::Threshold { threshold } => write!(f, "threshold({})", threshold),
            ClassificationMode::AnyZero => write!(f, "any_zero"),
        }
    }
}

/// Classifies `counts` over `n` measured bits.
///
/// Empty counts carry no evidence of constancy and classify as balanced.
pub fn classify(counts: &MeasurementCounts, n: usize, mode: ClassificationMode) -> Result<OracleKind> {
    mode.validate()?;
    let zeros = counts.zero_count(n);
    let constant = match mode {
        ClassificationMode::Strict => counts.len() == 1 && zeros > 0,
        ClassificationMode::Threshold { threshold } => counts.zero_fraction(n).is_some_and(|f| f > threshold),
        ClassificationMode::AnyZero => zeros > 0,
    };
    Ok(if constant { OracleKind::Constant } else { OracleKind::Balanced })
}
