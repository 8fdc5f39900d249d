// src/trials/config.rs

//! Sweep configuration, loadable from JSON and validated before any trial runs.

use crate::classical::QueryBound;
use crate::classify::ClassificationMode;
use crate::core::{DjError, Result, MAX_CLASSICAL_BITS, MAX_SIMULATED_QUBITS};
use crate::noise::NoiseConfig;
use crate::oracle::OracleKind;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens to the trial left over when the split is not exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remainder {
    /// Every trial not assigned to the constant kind is balanced.
    #[default]
    Balanced,
    /// Each kind gets `floor(trials * share)`; leftover trials are not run.
    Drop,
}

/// Which evaluator the trials exercise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionPath {
    /// Deutsch-Jozsa circuits on a simulator, one point per noise setting.
    #[default]
    Quantum,
    /// Bounded sequential queries; a single point with no noise.
    Classical {
        #[serde(default)]
        bound: QueryBound,
    },
}

/// A full accuracy sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Number of oracle input bits.
    pub n: u32,
    pub trials_per_repetition: usize,
    /// Independent runs per point.
    pub repetitions: usize,
    /// Share of trials using a constant oracle.
    pub constant_ratio: f64,
    pub remainder: Remainder,
    pub noise_levels: Vec<f64>,
    /// Channel names, parsed at validation time.
    pub noise_types: Vec<String>,
    pub shots: u32,
    pub classification: ClassificationMode,
    pub seed: u64,
    /// Randomize the order of constant and balanced trials within a run.
    pub shuffle_schedule: bool,
    pub path: ExecutionPath,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            n: 4,
            trials_per_repetition: 100,
            repetitions: 10,
            constant_ratio: 0.5,
            remainder: Remainder::default(),
            noise_levels: vec![0.0],
            noise_types: vec!["depolarizing".to_string()],
            shots: 1,
            classification: ClassificationMode::default(),
            seed: 42,
            shuffle_schedule: true,
            path: ExecutionPath::default(),
        }
    }
}

/// One configuration point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum SweepPoint {
    Quantum { noise: NoiseConfig },
    Classical { bound: QueryBound },
}

impl SweepPoint {
    /// Noise setting of a quantum point.
    pub fn noise(&self) -> Option<&NoiseConfig> {
        match self {
            SweepPoint::Quantum { noise } => Some(noise),
            SweepPoint::Classical { .. } => None,
        }
    }
}

impl fmt::Display for SweepPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepPoint::Quantum { noise } => write!(f, "{}", noise),
            SweepPoint::Classical { bound } => write!(f, "classical({:?})", bound),
        }
    }
}

/// Number of trials of each oracle kind in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSchedule {
    pub constant: usize,
    pub balanced: usize,
}

impl TrialSchedule {
    pub fn new(constant: usize, balanced: usize) -> Self {
        Self { constant, balanced }
    }

    /// Splits `trials` by `constant_ratio`. The constant share is
    /// `floor(trials * ratio)`; `remainder` decides the balanced share.
    pub fn from_ratio(trials: usize, constant_ratio: f64, remainder: Remainder) -> Result<Self> {
        if !constant_ratio.is_finite() || !(0.0..=1.0).contains(&constant_ratio) {
            return Err(DjError::config(format!("Constant ratio must be in [0, 1], got {}", constant_ratio)));
        }
        // small epsilon so that e.g. 100 * 0.29 does not floor to 28
        let share = |r: f64| ((trials as f64) * r + 1e-9).floor() as usize;
        let constant = share(constant_ratio).min(trials);
        let balanced = match remainder {
            Remainder::Balanced => trials - constant,
            Remainder::Drop => share(1.0 - constant_ratio).min(trials - constant),
        };
        Ok(Self { constant, balanced })
    }

    pub fn total(&self) -> usize {
        self.constant + self.balanced
    }

    pub fn count(&self, kind: OracleKind) -> usize {
        match kind {
            OracleKind::Constant => self.constant,
            OracleKind::Balanced => self.balanced,
        }
    }

    /// The oracle kinds of one run, constants first unless shuffled.
    pub fn kinds<R: Rng + ?Sized>(&self, shuffle: bool, rng: &mut R) -> Vec<OracleKind> {
        let mut kinds: Vec<OracleKind> = std::iter::repeat_n(OracleKind::Constant, self.constant)
            .chain(std::iter::repeat_n(OracleKind::Balanced, self.balanced))
            .collect();
        if shuffle {
            kinds.shuffle(rng);
        }
        kinds
    }
}

impl SweepConfig {
    /// Parses a JSON configuration and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SweepConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every setting; nothing runs on an invalid configuration.
    pub fn validate(&self) -> Result<()> {
        self.points()?;
        self.schedule()?;
        if self.repetitions == 0 {
            return Err(DjError::config("At least one repetition is required"));
        }
        if self.shots == 0 {
            return Err(DjError::config("At least one shot is required"));
        }
        self.classification.validate()
    }

    /// Per-run trial counts.
    pub fn schedule(&self) -> Result<TrialSchedule> {
        if self.trials_per_repetition == 0 {
            return Err(DjError::config("At least one trial per repetition is required"));
        }
        let schedule = TrialSchedule::from_ratio(self.trials_per_repetition, self.constant_ratio, self.remainder)?;
        if schedule.total() == 0 {
            return Err(DjError::config(format!(
                "Splitting {} trials by ratio {} leaves no trials to run",
                self.trials_per_repetition, self.constant_ratio
            )));
        }
        Ok(schedule)
    }

    /// Configuration points in sweep order: every level of the first noise
    /// type, then every level of the next. The classical path has one point.
    pub fn points(&self) -> Result<Vec<SweepPoint>> {
        if self.n < 1 {
            return Err(DjError::config("Number of input bits must be at least 1"));
        }
        match self.path {
            ExecutionPath::Classical { bound } => {
                if self.n > MAX_CLASSICAL_BITS {
                    return Err(DjError::config(format!(
                        "n={} exceeds the classical limit of {}",
                        self.n, MAX_CLASSICAL_BITS
                    )));
                }
                bound.resolve(self.n)?;
                Ok(vec![SweepPoint::Classical { bound }])
            }
            ExecutionPath::Quantum => {
                if self.n + 1 > MAX_SIMULATED_QUBITS {
                    return Err(DjError::config(format!(
                        "n={} needs {} qubits, above the simulator limit of {}",
                        self.n,
                        self.n + 1,
                        MAX_SIMULATED_QUBITS
                    )));
                }
                if self.noise_types.is_empty() || self.noise_levels.is_empty() {
                    return Err(DjError::config("A quantum sweep needs at least one noise type and one noise level"));
                }
                let mut points = Vec::with_capacity(self.noise_types.len() * self.noise_levels.len());
                for name in &self.noise_types {
                    for level in &self.noise_levels {
                        points.push(SweepPoint::Quantum { noise: NoiseConfig::parse(name, *level)? });
                    }
                }
                Ok(points)
            }
        }
    }
}
