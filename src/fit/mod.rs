// src/fit/mod.rs

//! Exponential growth fits for `(n, mean evaluations)` data.
//!
//! Two models are supported:
//!
//! * `y = a * 2^(b n)`, fitted by ordinary least squares on `log2 y`;
//! * `y = a * 2^n` with the exponent fixed, fitted by least squares in
//!   linear space. That model is linear in `a`, so the normal equation gives
//!   the exact minimizer and no iterative solver is involved.
//!
//! Goodness-of-fit figures (R², Pearson r, reduced χ²) are always computed
//! on the original scale, observed `y` against fitted `y`.

use crate::classical::GrowthSample;
use crate::core::{DjError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;

/// Minimum number of samples for any fit.
pub const MIN_FIT_SAMPLES: usize = 3;

/// Result of fitting `y = a * 2^(b n)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogLinearFit {
    pub a: f64,
    pub b: f64,
    /// Standard error of `b` from the log-scale regression.
    pub slope_std_error: f64,
    /// Two-sided p-value for `b = 0` (Student t, `N - 2` degrees of freedom).
    pub p_value: f64,
    pub r_squared: f64,
    /// `None` when observed or fitted values have zero variance.
    pub pearson_r: Option<f64>,
    /// `SS_res / (N - 2)`.
    pub reduced_chi_squared: f64,
    pub samples: usize,
}

impl LogLinearFit {
    pub fn predict(&self, n: f64) -> f64 {
        self.a * (self.b * n).exp2()
    }

    pub fn quality(&self) -> FitQuality {
        FitQuality::from_r_squared(self.r_squared)
    }

    pub fn significance(&self) -> Significance {
        Significance::from_p_value(self.p_value)
    }
}

/// Result of fitting `y = a * 2^n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledExponentialFit {
    pub a: f64,
    /// Standard error of `a` from the parameter covariance.
    pub a_std_error: f64,
    pub r_squared: f64,
    pub pearson_r: Option<f64>,
    /// `SS_res / (N - 1)`.
    pub reduced_chi_squared: f64,
    pub samples: usize,
}

impl ScaledExponentialFit {
    pub fn predict(&self, n: f64) -> f64 {
        self.a * n.exp2()
    }

    pub fn quality(&self) -> FitQuality {
        FitQuality::from_r_squared(self.r_squared)
    }
}

/// Verbal rating of R².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitQuality {
    Excellent,
    VeryGood,
    Good,
    Fair,
}

impl FitQuality {
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared > 0.99 {
            FitQuality::Excellent
        } else if r_squared > 0.95 {
            FitQuality::VeryGood
        } else if r_squared > 0.90 {
            FitQuality::Good
        } else {
            FitQuality::Fair
        }
    }
}

impl fmt::Display for FitQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FitQuality::Excellent => "excellent",
            FitQuality::VeryGood => "very good",
            FitQuality::Good => "good",
            FitQuality::Fair => "fair",
        })
    }
}

/// Significance bands of a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    /// p < 0.001
    Highly,
    /// p < 0.01
    Very,
    /// p < 0.05
    Significant,
    NotSignificant,
}

impl Significance {
    pub fn from_p_value(p: f64) -> Self {
        if p < 0.001 {
            Significance::Highly
        } else if p < 0.01 {
            Significance::Very
        } else if p < 0.05 {
            Significance::Significant
        } else {
            Significance::NotSignificant
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Significance::Highly => "p < 0.001",
            Significance::Very => "p < 0.01",
            Significance::Significant => "p < 0.05",
            Significance::NotSignificant => "not significant",
        })
    }
}

/// Spread of the samples relative to their means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variability {
    /// Mean coefficient of variation below 10 %.
    Low,
    /// Below 25 %.
    Moderate,
    High,
}

impl Variability {
    pub fn from_cv_percent(cv: f64) -> Self {
        if cv < 10.0 {
            Variability::Low
        } else if cv < 25.0 {
            Variability::Moderate
        } else {
            Variability::High
        }
    }
}

/// `(n, mean)` pairs of growth samples, ready for fitting.
pub fn growth_points(samples: &[GrowthSample]) -> Vec<(f64, f64)> {
    samples.iter().map(|s| (f64::from(s.n), s.mean)).collect()
}

/// Mean of `standard_error / mean` over the samples, in percent.
///
/// Samples with a zero mean are skipped; `None` if none remain.
pub fn mean_coefficient_of_variation(samples: &[GrowthSample]) -> Option<f64> {
    let ratios: Vec<f64> = samples.iter().filter(|s| s.mean != 0.0).map(|s| s.standard_error / s.mean).collect();
    crate::stats::mean(&ratios).map(|m| m * 100.0)
}

/// Fits `y = a * 2^(b n)` by least squares on `log2 y`.
///
/// Every `y` must be positive and finite.
pub fn fit_log_linear(points: &[(f64, f64)]) -> Result<LogLinearFit> {
    check_points(points)?;
    if let Some((x, y)) = points.iter().find(|(_, y)| *y <= 0.0) {
        return Err(DjError::config(format!("Log fit needs positive values, got y={} at n={}", y, x)));
    }
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let log_ys: Vec<f64> = points.iter().map(|p| p.1.log2()).collect();
    let count = points.len() as f64;

    let x_mean = xs.iter().sum::<f64>() / count;
    let ly_mean = log_ys.iter().sum::<f64>() / count;
    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if sxx == 0.0 {
        return Err(DjError::config("Log fit needs at least two distinct n values"));
    }
    let sxy: f64 = xs.iter().zip(&log_ys).map(|(x, ly)| (x - x_mean) * (ly - ly_mean)).sum();
    let slope = sxy / sxx;
    let intercept = ly_mean - slope * x_mean;

    // residuals of the log-scale regression drive the slope uncertainty
    let log_dof = count - 2.0;
    let log_ss_res: f64 = xs.iter().zip(&log_ys).map(|(x, ly)| (ly - (intercept + slope * x)).powi(2)).sum();
    let slope_std_error = (log_ss_res / log_dof / sxx).sqrt();
    let p_value = two_sided_p(slope, slope_std_error, log_dof)?;

    let a = intercept.exp2();
    let fitted: Vec<f64> = xs.iter().map(|x| a * (slope * x).exp2()).collect();
    let observed: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (r_squared, ss_res) = r_squared_and_residual(&observed, &fitted);

    Ok(LogLinearFit {
        a,
        b: slope,
        slope_std_error,
        p_value,
        r_squared,
        pearson_r: pearson(&observed, &fitted),
        reduced_chi_squared: ss_res / log_dof,
        samples: points.len(),
    })
}

/// Fits `y = a * 2^n` by linear-space least squares.
pub fn fit_scaled_exponential(points: &[(f64, f64)]) -> Result<ScaledExponentialFit> {
    check_points(points)?;
    let basis: Vec<f64> = points.iter().map(|p| p.0.exp2()).collect();
    let observed: Vec<f64> = points.iter().map(|p| p.1).collect();

    let s_bb: f64 = basis.iter().map(|b| b * b).sum();
    let s_by: f64 = basis.iter().zip(&observed).map(|(b, y)| b * y).sum();
    let a = s_by / s_bb;

    let fitted: Vec<f64> = basis.iter().map(|b| a * b).collect();
    let (r_squared, ss_res) = r_squared_and_residual(&observed, &fitted);
    let dof = (points.len() - 1) as f64;
    let sigma_sq = ss_res / dof;

    Ok(ScaledExponentialFit {
        a,
        a_std_error: (sigma_sq / s_bb).sqrt(),
        r_squared,
        pearson_r: pearson(&observed, &fitted),
        reduced_chi_squared: sigma_sq,
        samples: points.len(),
    })
}

fn check_points(points: &[(f64, f64)]) -> Result<()> {
    if points.len() < MIN_FIT_SAMPLES {
        return Err(DjError::InsufficientData { required: MIN_FIT_SAMPLES, actual: points.len() });
    }
    if let Some((x, y)) = points.iter().find(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(DjError::config(format!("Non-finite fit sample ({}, {})", x, y)));
    }
    Ok(())
}

/// Returns `(R², SS_res)`. A constant series scores 1 only if fitted exactly.
fn r_squared_and_residual(observed: &[f64], fitted: &[f64]) -> (f64, f64) {
    let ss_res: f64 = observed.iter().zip(fitted).map(|(y, f)| (y - f).powi(2)).sum();
    let y_mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let ss_tot: f64 = observed.iter().map(|y| (y - y_mean).powi(2)).sum();
    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res <= f64::EPSILON {
        1.0
    } else {
        0.0
    };
    (r2, ss_res)
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let count = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / count;
    let y_mean = ys.iter().sum::<f64>() / count;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - x_mean) * (y - y_mean);
        sxx += (x - x_mean).powi(2);
        syy += (y - y_mean).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 { None } else { Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)) }
}

/// Two-sided p-value of `estimate / std_error` under Student t.
fn two_sided_p(estimate: f64, std_error: f64, dof: f64) -> Result<f64> {
    if std_error == 0.0 {
        return Ok(if estimate == 0.0 { 1.0 } else { 0.0 });
    }
    let t = (estimate / std_error).abs();
    let dist = StudentsT::new(0.0, 1.0, dof)
        .map_err(|e| DjError::config(format!("Invalid Student t with {} degrees of freedom: {}", dof, e)))?;
    Ok((2.0 * (1.0 - dist.cdf(t))).clamp(0.0, 1.0))
}
