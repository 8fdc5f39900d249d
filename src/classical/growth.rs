// src/classical/growth.rs

//! Randomized experiments over the classical evaluator: mean query growth as a
//! function of `n`, and the distribution of query counts at a fixed `n`.

use super::{ClassicalEvaluator, QueryBound};
use crate::core::{DjError, Result};
use crate::oracle::{create, Domain, OracleKind};
use crate::stats::{mean, population_std_dev, sample_std_dev};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Mean number of classical queries observed at one value of `n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthSample {
    pub n: u32,
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator) of the per-trial query counts.
    pub std_dev: f64,
    /// `std_dev / sqrt(trials)`.
    pub standard_error: f64,
    pub trials: usize,
}

/// Measures mean query counts for every `n` in `ns`.
///
/// Each trial draws a constant oracle with probability `constant_ratio` and
/// a balanced classical oracle otherwise, then runs the evaluator on it.
pub fn query_growth<R, I>(
    ns: I,
    trials_per_n: usize,
    constant_ratio: f64,
    bound: QueryBound,
    rng: &mut R,
) -> Result<Vec<GrowthSample>>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = u32>,
{
    if trials_per_n == 0 {
        return Err(DjError::config("query_growth needs at least one trial per n"));
    }
    if !(0.0..=1.0).contains(&constant_ratio) {
        return Err(DjError::config(format!("Constant ratio must be in [0, 1], got {}", constant_ratio)));
    }
    let evaluator = ClassicalEvaluator::new(bound);
    let mut samples = Vec::new();
    for n in ns {
        let mut queries = Vec::with_capacity(trials_per_n);
        for _ in 0..trials_per_n {
            let kind = if rng.random_bool(constant_ratio) { OracleKind::Constant } else { OracleKind::Balanced };
            let spec = create(kind, n, Domain::Classical, rng)?;
            queries.push(evaluator.evaluate(&spec)? as f64);
        }
        let mu = mean(&queries).unwrap_or(0.0);
        let sd = sample_std_dev(&queries).unwrap_or(0.0);
        let se = sd / (trials_per_n as f64).sqrt();
        debug!(n, mean = mu, standard_error = se, "classical query growth sample");
        samples.push(GrowthSample { n, mean: mu, std_dev: sd, standard_error: se, trials: trials_per_n });
    }
    Ok(samples)
}

/// Query-count distribution for one oracle kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindHistogram {
    pub kind: OracleKind,
    pub trials: usize,
    /// Number of trials that used exactly `k` queries, keyed by `k`.
    pub counts: BTreeMap<u64, usize>,
    pub mean: Option<f64>,
    /// Population standard deviation of the query counts.
    pub std_dev: Option<f64>,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl KindHistogram {
    fn from_queries(kind: OracleKind, queries: &[u64]) -> Self {
        let mut counts = BTreeMap::new();
        for q in queries {
            *counts.entry(*q).or_insert(0) += 1;
        }
        let as_f64: Vec<f64> = queries.iter().map(|q| *q as f64).collect();
        Self {
            kind,
            trials: queries.len(),
            counts,
            mean: mean(&as_f64),
            std_dev: population_std_dev(&as_f64),
            min: queries.iter().copied().min(),
            max: queries.iter().copied().max(),
        }
    }
}

/// Query-count histograms for a mixed population of constant and balanced oracles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationHistogram {
    pub n: u32,
    pub total_trials: usize,
    pub bound: u64,
    pub constant: KindHistogram,
    pub balanced: KindHistogram,
}

impl EvaluationHistogram {
    /// Fraction of *all* trials that were of `kind` and used exactly `queries` queries.
    pub fn probability(&self, kind: OracleKind, queries: u64) -> f64 {
        if self.total_trials == 0 {
            return 0.0;
        }
        let hist = match kind {
            OracleKind::Constant => &self.constant,
            OracleKind::Balanced => &self.balanced,
        };
        hist.counts.get(&queries).copied().unwrap_or(0) as f64 / self.total_trials as f64
    }

    /// Ratio of balanced to constant mean query counts, when both are defined.
    pub fn mean_ratio(&self) -> Option<f64> {
        match (self.balanced.mean, self.constant.mean) {
            (Some(b), Some(c)) if c > 0.0 => Some(b / c),
            _ => None,
        }
    }
}

/// Runs `total_trials` evaluations at fixed `n` in a shuffled constant/balanced mix.
///
/// `total_trials / 2` trials are constant and the rest balanced, so an odd
/// total gives the extra trial to the balanced kind.
pub fn evaluation_histogram<R: Rng + ?Sized>(
    n: u32,
    total_trials: usize,
    bound: QueryBound,
    rng: &mut R,
) -> Result<EvaluationHistogram> {
    let evaluator = ClassicalEvaluator::new(bound);
    let budget = bound.resolve(n)?;
    let num_constant = total_trials / 2;
    let mut schedule: Vec<OracleKind> = std::iter::repeat_n(OracleKind::Constant, num_constant)
        .chain(std::iter::repeat_n(OracleKind::Balanced, total_trials - num_constant))
        .collect();
    schedule.shuffle(rng);

    let mut constant_queries = Vec::with_capacity(num_constant);
    let mut balanced_queries = Vec::with_capacity(total_trials - num_constant);
    for kind in schedule {
        let spec = create(kind, n, Domain::Classical, rng)?;
        let queries = evaluator.evaluate(&spec)?;
        match kind {
            OracleKind::Constant => constant_queries.push(queries),
            OracleKind::Balanced => balanced_queries.push(queries),
        }
    }

    Ok(EvaluationHistogram {
        n,
        total_trials,
        bound: budget,
        constant: KindHistogram::from_queries(OracleKind::Constant, &constant_queries),
        balanced: KindHistogram::from_queries(OracleKind::Balanced, &balanced_queries),
    })
}
