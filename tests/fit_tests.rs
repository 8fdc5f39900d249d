// tests/fit_tests.rs

use djsim::classical::{evaluation_histogram, query_growth};
use djsim::fit::{growth_points, mean_coefficient_of_variation, FitQuality, Variability};
use djsim::{fit_log_linear, fit_scaled_exponential, DjError, OracleKind, QueryBound};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_constant_only_growth_is_exactly_half_domain() -> Result<(), DjError> {
    let mut rng = StdRng::seed_from_u64(42);
    let samples = query_growth(2..=10, 30, 1.0, QueryBound::HalfDomainPlusOne, &mut rng)?;
    for sample in &samples {
        assert_eq!(sample.mean, f64::from(sample.n - 1).exp2() + 1.0);
        assert_eq!(sample.standard_error, 0.0);
    }
    assert_eq!(mean_coefficient_of_variation(&samples), Some(0.0));

    let scaled = fit_scaled_exponential(&growth_points(&samples))?;
    assert!((scaled.a - 0.5).abs() < 0.01, "a = {}", scaled.a);
    assert!(scaled.r_squared > 0.999);

    let log = fit_log_linear(&growth_points(&samples))?;
    assert!((log.b - 1.0).abs() < 0.1, "b = {}", log.b);
    Ok(())
}

#[test]
fn test_mixed_growth_is_exponential() -> Result<(), DjError> {
    let mut rng = StdRng::seed_from_u64(7);
    let samples = query_growth(4..=12, 200, 0.5, QueryBound::HalfDomainPlusOne, &mut rng)?;
    let points = growth_points(&samples);

    // balanced oracles stop after a handful of queries, so half the budget is spent on average
    let scaled = fit_scaled_exponential(&points)?;
    assert!(scaled.a > 0.2 && scaled.a < 0.3, "a = {}", scaled.a);
    assert!(matches!(scaled.quality(), FitQuality::Excellent | FitQuality::VeryGood));

    let log = fit_log_linear(&points)?;
    assert!(log.b > 0.8 && log.b < 1.1, "b = {}", log.b);
    assert!(log.p_value < 0.001);

    let cv = mean_coefficient_of_variation(&samples).unwrap_or(f64::NAN);
    assert!(cv.is_finite() && cv > 0.0);
    assert_ne!(Variability::from_cv_percent(cv), Variability::High);
    Ok(())
}

#[test]
fn test_too_few_samples() -> Result<(), DjError> {
    let mut rng = StdRng::seed_from_u64(1);
    let samples = query_growth(3..=4, 10, 0.5, QueryBound::HalfDomainPlusOne, &mut rng)?;
    let result = fit_log_linear(&growth_points(&samples));
    assert!(matches!(result, Err(DjError::InsufficientData { required: 3, actual: 2 })));
    let result = fit_scaled_exponential(&growth_points(&samples));
    assert!(matches!(result, Err(DjError::InsufficientData { .. })));
    Ok(())
}

#[test]
fn test_histogram_at_four_bits() -> Result<(), DjError> {
    let mut rng = StdRng::seed_from_u64(42);
    let histogram = evaluation_histogram(4, 300, QueryBound::HalfDomainPlusOne, &mut rng)?;
    assert_eq!(histogram.bound, 9);
    assert_eq!(histogram.constant.trials, 150);
    assert_eq!(histogram.balanced.trials, 150);
    assert_eq!(histogram.constant.counts.get(&9), Some(&150));
    assert_eq!(histogram.probability(OracleKind::Constant, 9), 0.5);

    let (min, max) = (histogram.balanced.min.unwrap_or(0), histogram.balanced.max.unwrap_or(0));
    assert!(min >= 2 && max <= 9);
    assert!(histogram.mean_ratio().is_some_and(|r| r < 1.0));
    Ok(())
}
