// src/report/mod.rs

//! Persisted experiment records.
//!
//! An [`ExperimentRecord`] captures one configuration point: the settings,
//! every trial with its counts and verdict, and the summary statistics. It
//! serializes to JSON; where the JSON goes is the caller's business.

use crate::classify::ClassificationMode;
use crate::core::Result;
use crate::noise::NoiseConfig;
use crate::oracle::{OracleKind, OracleParameter};
use crate::simulation::MeasurementCounts;
use crate::stats::ConfusionMatrix;
use crate::trials::{Evidence, PointSummary, SweepConfig, TrialOutcome, TrialRecord};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordConfiguration {
    pub n: u32,
    pub shots: u32,
    pub repetitions: usize,
    pub total_trials: usize,
    pub constant_trials: usize,
    pub balanced_trials: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<NoiseConfig>,
    pub classification: ClassificationMode,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordTrial {
    /// 1-based position in the record.
    pub trial: usize,
    pub run: usize,
    pub kind: OracleKind,
    pub oracle_parameter: OracleParameter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<MeasurementCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queries: Option<u64>,
    pub classification: Option<OracleKind>,
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeros_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// A value per oracle kind plus the overall figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerKind<T> {
    pub constant: T,
    pub balanced: T,
    pub total: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    /// Per-class precision; `total` is the overall accuracy.
    pub precision: PerKind<Option<f64>>,
    /// Per-class recall; `total` is the overall accuracy.
    pub recall: PerKind<Option<f64>>,
    pub hits: PerKind<u64>,
    pub misses: PerKind<u64>,
    pub totals: PerKind<u64>,
    pub confusion_matrix: ConfusionMatrix,
    pub failures: usize,
}

/// The full record of one configuration point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentRecord {
    pub configuration: RecordConfiguration,
    pub trials: Vec<RecordTrial>,
    pub summary: RecordSummary,
}

impl ExperimentRecord {
    /// Builds the record of `summary`, a point run under `config`.
    pub fn from_point(config: &SweepConfig, summary: &PointSummary) -> Self {
        let cm = summary.confusion;
        let per_kind = |kind: OracleKind| summary.trials.records().iter().filter(|r| r.oracle.kind() == kind).count();
        let constant_trials = per_kind(OracleKind::Constant);
        let balanced_trials = per_kind(OracleKind::Balanced);

        let configuration = RecordConfiguration {
            n: config.n,
            shots: config.shots,
            repetitions: config.repetitions,
            total_trials: summary.trials.len(),
            constant_trials,
            balanced_trials,
            noise: summary.point.noise().copied(),
            classification: config.classification,
            seed: config.seed,
        };

        let trials = summary
            .trials
            .records()
            .iter()
            .enumerate()
            .map(|(i, record)| record_trial(i + 1, record))
            .collect();

        let constant = cm.metrics(OracleKind::Constant);
        let balanced = cm.metrics(OracleKind::Balanced);
        let accuracy = cm.accuracy();
        let summary = RecordSummary {
            precision: PerKind { constant: constant.precision, balanced: balanced.precision, total: accuracy },
            recall: PerKind { constant: constant.recall, balanced: balanced.recall, total: accuracy },
            hits: PerKind { constant: cm.constant_correct, balanced: cm.balanced_correct, total: cm.correct() },
            misses: PerKind {
                constant: cm.constant_as_balanced,
                balanced: cm.balanced_as_constant,
                total: cm.total() - cm.correct(),
            },
            totals: PerKind {
                constant: cm.actual_total(OracleKind::Constant),
                balanced: cm.actual_total(OracleKind::Balanced),
                total: cm.total(),
            },
            confusion_matrix: cm,
            failures: summary.failures,
        };

        Self { configuration, trials, summary }
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes pretty-printed JSON followed by a newline.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn record_trial(position: usize, record: &TrialRecord) -> RecordTrial {
    let width = record.oracle.n() as usize;
    let mut entry = RecordTrial {
        trial: position,
        run: record.run,
        kind: record.oracle.kind(),
        oracle_parameter: record.oracle.parameter().clone(),
        counts: None,
        queries: None,
        classification: None,
        correct: false,
        zeros_fraction: None,
        failure: None,
    };
    match &record.outcome {
        TrialOutcome::Completed { evidence, classification, correct } => {
            entry.classification = Some(*classification);
            entry.correct = *correct;
            match evidence {
                Evidence::Counts(counts) => {
                    entry.zeros_fraction = counts.zero_fraction(width);
                    entry.counts = Some(counts.clone());
                }
                Evidence::Queries(q) => entry.queries = Some(*q),
            }
        }
        TrialOutcome::Failed { reason } => entry.failure = Some(reason.clone()),
    }
    entry
}
