// demos/classical_growth.rs

use djsim::classical::{evaluation_histogram, query_growth};
use djsim::fit::{growth_points, mean_coefficient_of_variation, Variability};
use djsim::{fit_log_linear, fit_scaled_exponential, DjError, QueryBound};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), DjError> {
    tracing_subscriber::fmt::init();

    let mut rng = StdRng::seed_from_u64(42);
    let bound = QueryBound::HalfDomainPlusOne;

    let samples = query_growth(1..=12, 500, 0.5, bound, &mut rng)?;
    println!("{:>3} {:>10} {:>10}", "n", "mean", "se");
    for s in &samples {
        println!("{:>3} {:>10.2} {:>10.3}", s.n, s.mean, s.standard_error);
    }

    let points = growth_points(&samples);
    let log = fit_log_linear(&points)?;
    println!(
        "\ny = {:.4} * 2^({:.4} n)  R^2 = {:.4} ({})  p = {:.2e} ({})",
        log.a,
        log.b,
        log.r_squared,
        log.quality(),
        log.p_value,
        log.significance()
    );

    let scaled = fit_scaled_exponential(&points)?;
    println!(
        "y = {:.4} * 2^n  (+/- {:.4})  R^2 = {:.4} ({})",
        scaled.a,
        scaled.a_std_error,
        scaled.r_squared,
        scaled.quality()
    );

    if let Some(cv) = mean_coefficient_of_variation(&samples) {
        println!("mean CV = {:.2}% ({:?})", cv, Variability::from_cv_percent(cv));
    }

    let histogram = evaluation_histogram(4, 300, bound, &mut rng)?;
    println!("\nn = 4, bound = {}", histogram.bound);
    for (kind, hist) in [("constant", &histogram.constant), ("balanced", &histogram.balanced)] {
        println!("  {} ({} trials): {:?}", kind, hist.trials, hist.counts);
    }
    Ok(())
}
