// src/stats/mod.rs

//! Statistical reduction of trial outcomes.
//!
//! Everything here is derived from a finite set of values or trial records
//! and recomputed on demand. Empty inputs produce explicit "no data" results
//! instead of dividing by zero.

use crate::oracle::OracleKind;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation with the `n - 1` denominator.
///
/// A single value has zero spread; an empty slice has none.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Population standard deviation (`n` denominator).
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    Some((ss / values.len() as f64).sqrt())
}

/// Accuracy statistics across independent repetitions of one configuration point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregateStats {
    /// No repetition produced a defined accuracy.
    NoData,
    Estimate {
        mean_accuracy: f64,
        /// Sample standard deviation of the per-run accuracies.
        sample_std_dev: f64,
        /// `sample_std_dev / sqrt(repetitions)`.
        standard_error: f64,
        repetitions: usize,
    },
}

impl AggregateStats {
    /// Reduces per-run accuracies to mean, spread and standard error.
    pub fn from_accuracies(accuracies: &[f64]) -> Self {
        match (mean(accuracies), sample_std_dev(accuracies)) {
            (Some(mean_accuracy), Some(sd)) => AggregateStats::Estimate {
                mean_accuracy,
                sample_std_dev: sd,
                standard_error: sd / (accuracies.len() as f64).sqrt(),
                repetitions: accuracies.len(),
            },
            _ => AggregateStats::NoData,
        }
    }

    pub fn mean_accuracy(&self) -> Option<f64> {
        match self {
            AggregateStats::NoData => None,
            AggregateStats::Estimate { mean_accuracy, .. } => Some(*mean_accuracy),
        }
    }

    pub fn sample_std_dev(&self) -> Option<f64> {
        match self {
            AggregateStats::NoData => None,
            AggregateStats::Estimate { sample_std_dev, .. } => Some(*sample_std_dev),
        }
    }

    pub fn standard_error(&self) -> Option<f64> {
        match self {
            AggregateStats::NoData => None,
            AggregateStats::Estimate { standard_error, .. } => Some(*standard_error),
        }
    }

    /// `[mean - sd, mean + sd]` clamped to `[0, 1]`.
    pub fn accuracy_band(&self) -> Option<(f64, f64)> {
        match self {
            AggregateStats::NoData => None,
            AggregateStats::Estimate { mean_accuracy, sample_std_dev, .. } => Some((
                (mean_accuracy - sample_std_dev).max(0.0),
                (mean_accuracy + sample_std_dev).min(1.0),
            )),
        }
    }
}

/// 2x2 confusion matrix, predicted kind against actual kind.
///
/// Merging two matrices is plain addition, so per-worker matrices can be
/// reduced in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Actual constant, predicted constant.
    pub constant_correct: u64,
    /// Actual constant, predicted balanced.
    pub constant_as_balanced: u64,
    /// Actual balanced, predicted balanced.
    pub balanced_correct: u64,
    /// Actual balanced, predicted constant.
    pub balanced_as_constant: u64,
}

/// Precision and recall for one class. `None` where the denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub kind: OracleKind,
    pub true_positives: u64,
    pub false_negatives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one classified trial.
    pub fn record(&mut self, actual: OracleKind, predicted: OracleKind) {
        match (actual, predicted) {
            (OracleKind::Constant, OracleKind::Constant) => self.constant_correct += 1,
            (OracleKind::Constant, OracleKind::Balanced) => self.constant_as_balanced += 1,
            (OracleKind::Balanced, OracleKind::Balanced) => self.balanced_correct += 1,
            (OracleKind::Balanced, OracleKind::Constant) => self.balanced_as_constant += 1,
        }
    }

    /// Number of cells `(predicted, actual)`.
    pub fn cell(&self, predicted: OracleKind, actual: OracleKind) -> u64 {
        match (actual, predicted) {
            (OracleKind::Constant, OracleKind::Constant) => self.constant_correct,
            (OracleKind::Constant, OracleKind::Balanced) => self.constant_as_balanced,
            (OracleKind::Balanced, OracleKind::Balanced) => self.balanced_correct,
            (OracleKind::Balanced, OracleKind::Constant) => self.balanced_as_constant,
        }
    }

    /// Trials whose actual kind is `kind`.
    pub fn actual_total(&self, kind: OracleKind) -> u64 {
        self.cell(OracleKind::Constant, kind) + self.cell(OracleKind::Balanced, kind)
    }

    /// Trials predicted as `kind`.
    pub fn predicted_total(&self, kind: OracleKind) -> u64 {
        self.cell(kind, OracleKind::Constant) + self.cell(kind, OracleKind::Balanced)
    }

    pub fn total(&self) -> u64 {
        self.constant_correct + self.constant_as_balanced + self.balanced_correct + self.balanced_as_constant
    }

    pub fn correct(&self) -> u64 {
        self.constant_correct + self.balanced_correct
    }

    /// Pooled accuracy over all recorded trials.
    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.correct(), self.total())
    }

    /// One-vs-rest metrics treating `kind` as the positive class.
    pub fn metrics(&self, kind: OracleKind) -> ClassMetrics {
        let other = match kind {
            OracleKind::Constant => OracleKind::Balanced,
            OracleKind::Balanced => OracleKind::Constant,
        };
        let tp = self.cell(kind, kind);
        let fn_ = self.cell(other, kind);
        let fp = self.cell(kind, other);
        let tn = self.cell(other, other);
        ClassMetrics {
            kind,
            true_positives: tp,
            false_negatives: fn_,
            false_positives: fp,
            true_negatives: tn,
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
        }
    }
}

impl Add for ConfusionMatrix {
    type Output = ConfusionMatrix;

    fn add(mut self, rhs: ConfusionMatrix) -> ConfusionMatrix {
        self += rhs;
        self
    }
}

impl AddAssign for ConfusionMatrix {
    fn add_assign(&mut self, rhs: ConfusionMatrix) {
        self.constant_correct += rhs.constant_correct;
        self.constant_as_balanced += rhs.constant_as_balanced;
        self.balanced_correct += rhs.balanced_correct;
        self.balanced_as_constant += rhs.balanced_as_constant;
    }
}

fn ratio(num: u64, den: u64) -> Option<f64> {
    if den == 0 { None } else { Some(num as f64 / den as f64) }
}
