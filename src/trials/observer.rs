// src/trials/observer.rs

use super::{PointSummary, SweepPoint, TrialOutcome, TrialRecord};
use tracing::{debug, info, trace};

/// Progress callbacks from a running sweep. Every method defaults to a no-op.
pub trait SweepObserver {
    fn point_started(&mut self, _index: usize, _point: &SweepPoint) {}

    fn trial_finished(&mut self, _point: usize, _record: &TrialRecord) {}

    /// `accuracy` is `None` when no trial of the run completed.
    fn run_finished(&mut self, _point: usize, _run: usize, _accuracy: Option<f64>) {}

    fn point_finished(&mut self, _index: usize, _summary: &PointSummary) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SweepObserver for NullObserver {}

/// Reports progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SweepObserver for TracingObserver {
    fn point_started(&mut self, index: usize, point: &SweepPoint) {
        info!(index, %point, "sweep point started");
    }

    fn trial_finished(&mut self, point: usize, record: &TrialRecord) {
        match &record.outcome {
            TrialOutcome::Completed { classification, correct, .. } => {
                trace!(point, run = record.run, trial = record.index, %classification, correct, "trial finished");
            }
            TrialOutcome::Failed { reason } => {
                trace!(point, run = record.run, trial = record.index, reason = %reason, "trial failed");
            }
        }
    }

    fn run_finished(&mut self, point: usize, run: usize, accuracy: Option<f64>) {
        debug!(point, run, ?accuracy, "run finished");
    }

    fn point_finished(&mut self, index: usize, summary: &PointSummary) {
        info!(
            index,
            point = %summary.point,
            mean_accuracy = ?summary.stats.mean_accuracy(),
            standard_error = ?summary.stats.standard_error(),
            failures = summary.failures,
            "sweep point finished"
        );
    }
}
