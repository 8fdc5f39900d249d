// src/trials/mod.rs

//! Batches of randomized Deutsch-Jozsa trials and their aggregation.
//!
//! A sweep visits each configuration point (noise type and level, or the
//! single classical point) and executes `repetitions` independent runs of
//! the scheduled trials. Each run draws from its own RNG, seeded from the
//! sweep seed and the point and run indices, so any run can be reproduced
//! in isolation. A simulator failure marks that trial as failed and the
//! sweep carries on.

mod config;
mod observer;

pub use config::{ExecutionPath, Remainder, SweepConfig, SweepPoint, TrialSchedule};
pub use observer::{NullObserver, SweepObserver, TracingObserver};

use crate::circuits::dj_circuit;
use crate::classical::{ClassicalEvaluator, QueryBound};
use crate::classify::{classify, ClassificationMode};
use crate::core::{DjError, Result};
use crate::noise::{NoiseConfig, NoiseModel, NoiseType};
use crate::oracle::{create, Domain, OracleKind, OracleSpec};
use crate::simulation::{MeasurementCounts, Simulator};
use crate::stats::{AggregateStats, ClassMetrics, ConfusionMatrix};
use crate::validation::validate_counts;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, info_span, warn};

/// What a completed trial observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    /// Measurement counts from a simulated circuit.
    Counts(MeasurementCounts),
    /// Number of classical oracle queries made.
    Queries(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialOutcome {
    Completed { evidence: Evidence, classification: OracleKind, correct: bool },
    Failed { reason: String },
}

/// One executed trial. Never modified after it is logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    /// Position within its run.
    pub index: usize,
    pub run: usize,
    pub oracle: OracleSpec,
    pub noise: Option<NoiseConfig>,
    pub outcome: TrialOutcome,
}

impl TrialRecord {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, TrialOutcome::Completed { .. })
    }

    /// Whether the trial completed with the right verdict.
    pub fn is_correct(&self) -> bool {
        matches!(self.outcome, TrialOutcome::Completed { correct: true, .. })
    }

    pub fn classification(&self) -> Option<OracleKind> {
        match &self.outcome {
            TrialOutcome::Completed { classification, .. } => Some(*classification),
            TrialOutcome::Failed { .. } => None,
        }
    }

    pub fn counts(&self) -> Option<&MeasurementCounts> {
        match &self.outcome {
            TrialOutcome::Completed { evidence: Evidence::Counts(counts), .. } => Some(counts),
            _ => None,
        }
    }
}

/// Append-only sequence of trial records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrialLog {
    records: Vec<TrialRecord>,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: TrialRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn completed(&self) -> usize {
        self.records.iter().filter(|r| r.is_completed()).count()
    }

    pub fn failures(&self) -> usize {
        self.records.len() - self.completed()
    }

    /// Confusion matrix over the completed trials.
    pub fn confusion(&self) -> ConfusionMatrix {
        let mut matrix = ConfusionMatrix::new();
        for record in &self.records {
            if let Some(predicted) = record.classification() {
                matrix.record(record.oracle.kind(), predicted);
            }
        }
        matrix
    }

    /// Correct share of completed trials, `None` if none completed.
    pub fn accuracy(&self) -> Option<f64> {
        self.confusion().accuracy()
    }
}

/// Everything measured at one configuration point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSummary {
    pub point: SweepPoint,
    pub stats: AggregateStats,
    pub confusion: ConfusionMatrix,
    /// Accuracy of every run that completed at least one trial.
    pub run_accuracies: Vec<f64>,
    pub completed: usize,
    pub failures: usize,
    pub trials: TrialLog,
}

impl PointSummary {
    /// Precision and recall for the constant and balanced classes.
    pub fn metrics(&self) -> [ClassMetrics; 2] {
        [self.confusion.metrics(OracleKind::Constant), self.confusion.metrics(OracleKind::Balanced)]
    }
}

/// Results of a whole sweep, in point order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub config: SweepConfig,
    pub points: Vec<PointSummary>,
}

impl SweepReport {
    pub fn total_failures(&self) -> usize {
        self.points.iter().map(|p| p.failures).sum()
    }

    /// `(level, stats)` pairs of one noise type, in sweep order.
    pub fn accuracy_curve(&self, kind: NoiseType) -> Vec<(f64, AggregateStats)> {
        self.points
            .iter()
            .filter_map(|p| match p.point.noise() {
                Some(noise) if noise.kind() == kind => Some((noise.level(), p.stats)),
                _ => None,
            })
            .collect()
    }
}

/// Executes trials for a validated [`SweepConfig`] against a simulator.
pub struct TrialRunner<'a> {
    config: SweepConfig,
    points: Vec<SweepPoint>,
    schedule: TrialSchedule,
    simulator: &'a dyn Simulator,
}

impl<'a> TrialRunner<'a> {
    /// Validates `config`; configuration errors surface here, before any trial.
    pub fn new(config: &SweepConfig, simulator: &'a dyn Simulator) -> Result<Self> {
        config.validate()?;
        Ok(Self { points: config.points()?, schedule: config.schedule()?, config: config.clone(), simulator })
    }

    /// Overrides the ratio-derived schedule with fixed per-kind counts.
    pub fn with_schedule(mut self, schedule: TrialSchedule) -> Result<Self> {
        if schedule.total() == 0 {
            return Err(DjError::config("A trial schedule needs at least one trial"));
        }
        self.schedule = schedule;
        Ok(self)
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn schedule(&self) -> TrialSchedule {
        self.schedule
    }

    /// Runs every point in order.
    pub fn run_sweep(&self, observer: &mut dyn SweepObserver) -> Result<SweepReport> {
        info!(
            n = self.config.n,
            points = self.points.len(),
            repetitions = self.config.repetitions,
            trials = self.schedule.total(),
            seed = self.config.seed,
            "starting sweep"
        );
        let mut points = Vec::with_capacity(self.points.len());
        for index in 0..self.points.len() {
            points.push(self.run_point(index, &mut *observer)?);
        }
        let report = SweepReport { config: self.config.clone(), points };
        info!(failures = report.total_failures(), "sweep finished");
        Ok(report)
    }

    /// Runs all repetitions of the point at `index`.
    pub fn run_point(&self, index: usize, observer: &mut dyn SweepObserver) -> Result<PointSummary> {
        let point = *self.points.get(index).ok_or_else(|| {
            DjError::config(format!("Point {} out of range for {} points", index, self.points.len()))
        })?;
        let _span = info_span!("sweep_point", index, %point).entered();
        observer.point_started(index, &point);

        let mut log = TrialLog::new();
        let mut run_accuracies = Vec::with_capacity(self.config.repetitions);
        for run in 0..self.config.repetitions {
            let mut rng = StdRng::seed_from_u64(derive_seed(self.config.seed, index, run));
            let mut run_log = TrialLog::new();
            for (i, kind) in self.schedule.kinds(self.config.shuffle_schedule, &mut rng).into_iter().enumerate() {
                let record = self.run_trial(&point, kind, run, i, &mut rng)?;
                observer.trial_finished(index, &record);
                run_log.push(record);
            }
            let accuracy = run_log.accuracy();
            observer.run_finished(index, run, accuracy);
            run_accuracies.extend(accuracy);
            log.records.extend(run_log.records);
        }

        let summary = PointSummary {
            point,
            stats: AggregateStats::from_accuracies(&run_accuracies),
            confusion: log.confusion(),
            run_accuracies,
            completed: log.completed(),
            failures: log.failures(),
            trials: log,
        };
        observer.point_finished(index, &summary);
        Ok(summary)
    }

    /// Generates, executes and classifies a single trial.
    ///
    /// Only oracle generation can fail the whole sweep; execution failures
    /// become [`TrialOutcome::Failed`].
    fn run_trial(
        &self,
        point: &SweepPoint,
        kind: OracleKind,
        run: usize,
        index: usize,
        rng: &mut StdRng,
    ) -> Result<TrialRecord> {
        let n = self.config.n;
        let (oracle, noise, executed) = match point {
            SweepPoint::Quantum { noise } => {
                let oracle = create(kind, n, Domain::Quantum, rng)?;
                let executed = self.execute_quantum(&oracle, noise, self.config.classification, rng);
                (oracle, Some(*noise), executed)
            }
            SweepPoint::Classical { bound } => {
                let oracle = create(kind, n, Domain::Classical, rng)?;
                let executed = execute_classical(&oracle, *bound);
                (oracle, None, executed)
            }
        };

        let outcome = match executed {
            Ok((evidence, classification)) => {
                TrialOutcome::Completed { evidence, classification, correct: classification == kind }
            }
            Err(err) => {
                warn!(run, trial = index, oracle = %oracle, error = %err, "trial failed");
                TrialOutcome::Failed { reason: err.to_string() }
            }
        };
        Ok(TrialRecord { index, run, oracle, noise, outcome })
    }

    fn execute_quantum(
        &self,
        oracle: &OracleSpec,
        noise: &NoiseConfig,
        mode: ClassificationMode,
        rng: &mut StdRng,
    ) -> Result<(Evidence, OracleKind)> {
        let circuit = dj_circuit(oracle)?;
        let noisy = NoiseModel::attach(&circuit, noise);
        let counts = self.simulator.run_noisy(&noisy, self.config.shots, rng)?;
        let width = oracle.n() as usize;
        validate_counts(&counts, width, self.config.shots)?;
        let classification = classify(&counts, width, mode)?;
        Ok((Evidence::Counts(counts), classification))
    }
}

fn execute_classical(oracle: &OracleSpec, bound: QueryBound) -> Result<(Evidence, OracleKind)> {
    let outcome = ClassicalEvaluator::new(bound).run(oracle)?;
    Ok((Evidence::Queries(outcome.queries), outcome.verdict))
}

/// Convenience wrapper: validates `config` and runs the whole sweep.
pub fn run_sweep(
    config: &SweepConfig,
    simulator: &dyn Simulator,
    observer: &mut dyn SweepObserver,
) -> Result<SweepReport> {
    TrialRunner::new(config, simulator)?.run_sweep(observer)
}

/// Seed of the run at `(point, run)`, mixed with SplitMix64 so neighbouring
/// indices give unrelated streams.
pub fn derive_seed(seed: u64, point: usize, run: usize) -> u64 {
    let a = splitmix64(seed);
    let b = splitmix64(a ^ point as u64);
    splitmix64(b ^ (run as u64).rotate_left(32))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
