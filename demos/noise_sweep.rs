// demos/noise_sweep.rs
//
// Run with `RUST_LOG=djsim=debug cargo run --example noise_sweep` for per-run progress.

use djsim::{
    run_sweep, DjError, ExperimentRecord, NoiseType, StateVectorSimulator, SweepConfig, TracingObserver,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), DjError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("djsim=info")))
        .init();

    let config = SweepConfig {
        n: 3,
        trials_per_repetition: 50,
        repetitions: 5,
        noise_levels: vec![0.0, 0.01, 0.05, 0.1, 0.2, 0.5],
        noise_types: vec!["depolarizing".into(), "dephasing".into(), "amplitude_damping".into()],
        seed: 42,
        ..SweepConfig::default()
    };

    let simulator = StateVectorSimulator::new();
    let report = run_sweep(&config, &simulator, &mut TracingObserver)?;

    for kind in NoiseType::ALL {
        println!("{}:", kind);
        for (level, stats) in report.accuracy_curve(kind) {
            match (stats.mean_accuracy(), stats.standard_error()) {
                (Some(mean), Some(se)) => println!("  p = {:<5} accuracy {:.3} +/- {:.3}", level, mean, se),
                _ => println!("  p = {:<5} no data", level),
            }
        }
    }

    // full record of the noisiest depolarizing point
    let noisiest = report
        .points
        .iter()
        .rev()
        .find(|p| p.point.noise().is_some_and(|n| n.kind() == NoiseType::Depolarizing));
    if let Some(summary) = noisiest {
        let record = ExperimentRecord::from_point(&config, summary);
        println!("{}", serde_json::to_string_pretty(&record.summary)?);
    }
    Ok(())
}
