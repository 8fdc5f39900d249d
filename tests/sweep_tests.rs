// tests/sweep_tests.rs

use djsim::circuits::Circuit;
use djsim::noise::NoiseModel;
use djsim::trials::{ExecutionPath, SweepPoint, TrialOutcome};
use djsim::{
    run_sweep, ClassificationMode, DjError, MeasurementCounts, NoiseType, NullObserver, OracleKind, QueryBound,
    Simulator, StateVectorSimulator, SweepConfig, SweepObserver, TrialRunner,
};
use rand::RngCore;

fn small_config() -> SweepConfig {
    SweepConfig {
        n: 2,
        trials_per_repetition: 20,
        repetitions: 3,
        noise_levels: vec![0.0, 0.3],
        noise_types: vec!["depolarizing".into(), "amplitude_damping".into()],
        seed: 7,
        ..SweepConfig::default()
    }
}

/// Fails every other call.
struct FlakySimulator {
    inner: StateVectorSimulator,
    calls: std::cell::Cell<usize>,
}

impl Simulator for FlakySimulator {
    fn run(
        &self,
        circuit: &Circuit,
        shots: u32,
        noise: Option<&NoiseModel>,
        rng: &mut dyn RngCore,
    ) -> djsim::Result<MeasurementCounts> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if call % 2 == 1 {
            return Err(DjError::simulation("backend unavailable"));
        }
        self.inner.run(circuit, shots, noise, rng)
    }
}

#[derive(Default)]
struct Tally {
    points: usize,
    runs: usize,
    trials: usize,
}

impl SweepObserver for Tally {
    fn point_started(&mut self, _index: usize, _point: &SweepPoint) {
        self.points += 1;
    }

    fn trial_finished(&mut self, _point: usize, _record: &djsim::trials::TrialRecord) {
        self.trials += 1;
    }

    fn run_finished(&mut self, _point: usize, _run: usize, _accuracy: Option<f64>) {
        self.runs += 1;
    }
}

#[test]
fn test_same_seed_same_report() -> Result<(), DjError> {
    let config = small_config();
    let sim = StateVectorSimulator::new();
    let first = run_sweep(&config, &sim, &mut NullObserver)?;
    let second = run_sweep(&config, &sim, &mut NullObserver)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_points_follow_type_major_order() -> Result<(), DjError> {
    let report = run_sweep(&small_config(), &StateVectorSimulator::new(), &mut NullObserver)?;
    let order: Vec<(NoiseType, f64)> = report
        .points
        .iter()
        .filter_map(|p| p.point.noise().map(|n| (n.kind(), n.level())))
        .collect();
    assert_eq!(
        order,
        vec![
            (NoiseType::Depolarizing, 0.0),
            (NoiseType::Depolarizing, 0.3),
            (NoiseType::AmplitudeDamping, 0.0),
            (NoiseType::AmplitudeDamping, 0.3),
        ]
    );
    Ok(())
}

#[test]
fn test_confusion_rows_match_schedule() -> Result<(), DjError> {
    let config = small_config();
    let report = run_sweep(&config, &StateVectorSimulator::new(), &mut NullObserver)?;
    for summary in &report.points {
        let cm = summary.confusion;
        assert_eq!(cm.actual_total(OracleKind::Constant), 10 * 3);
        assert_eq!(cm.actual_total(OracleKind::Balanced), 10 * 3);
        assert_eq!(cm.total() as usize, summary.completed);
        assert_eq!(summary.run_accuracies.len(), 3);
    }
    Ok(())
}

#[test]
fn test_noiseless_point_is_perfect() -> Result<(), DjError> {
    let report = run_sweep(&small_config(), &StateVectorSimulator::new(), &mut NullObserver)?;
    for (level, stats) in report.accuracy_curve(NoiseType::Depolarizing) {
        if level == 0.0 {
            assert_eq!(stats.mean_accuracy(), Some(1.0));
            assert_eq!(stats.sample_std_dev(), Some(0.0));
        }
    }
    Ok(())
}

#[test]
fn test_full_depolarizing_is_a_coin_flip() -> Result<(), DjError> {
    let config = SweepConfig {
        n: 2,
        trials_per_repetition: 200,
        repetitions: 5,
        noise_levels: vec![1.0],
        seed: 11,
        ..SweepConfig::default()
    };
    let report = run_sweep(&config, &StateVectorSimulator::new(), &mut NullObserver)?;
    let accuracy = report.points[0].stats.mean_accuracy().unwrap_or_default();
    assert!((accuracy - 0.5).abs() < 0.1, "accuracy {}", accuracy);
    Ok(())
}

/// Sweeps every channel over the same levels at n = 2, one shot per trial.
fn channel_curves() -> Result<djsim::SweepReport, DjError> {
    let config = SweepConfig {
        n: 2,
        trials_per_repetition: 200,
        repetitions: 4,
        noise_levels: vec![0.0, 0.2, 0.5, 1.0],
        noise_types: vec!["depolarizing".into(), "dephasing".into(), "amplitude_damping".into()],
        seed: 2024,
        ..SweepConfig::default()
    };
    run_sweep(&config, &StateVectorSimulator::new(), &mut NullObserver)
}

#[test]
fn test_every_channel_decays_toward_chance() -> Result<(), DjError> {
    let report = channel_curves()?;
    // expected accuracy at levels 0.2 and 0.5 for n = 2
    let expected = [
        (NoiseType::Depolarizing, 0.716, 0.554),
        (NoiseType::Dephasing, 0.895, 0.748),
        (NoiseType::AmplitudeDamping, 0.779, 0.602),
    ];
    for (kind, at_low, at_mid) in expected {
        let curve: Vec<f64> = report
            .accuracy_curve(kind)
            .iter()
            .map(|(_, stats)| stats.mean_accuracy().unwrap_or(f64::NAN))
            .collect();
        assert_eq!(curve.len(), 4, "{}", kind);
        assert_eq!(curve[0], 1.0, "{} at level 0", kind);
        assert!((curve[1] - at_low).abs() < 0.07, "{} at 0.2: {}", kind, curve[1]);
        assert!((curve[2] - at_mid).abs() < 0.07, "{} at 0.5: {}", kind, curve[2]);
        assert!((curve[3] - 0.5).abs() < 0.07, "{} at 1.0: {}", kind, curve[3]);
        assert!(curve[0] > curve[1] && curve[1] > curve[2], "{} is not decreasing: {:?}", kind, curve);
    }
    Ok(())
}

#[test]
fn test_amplitude_damping_favours_constant_verdicts() -> Result<(), DjError> {
    let report = channel_curves()?;
    let summary = report
        .points
        .iter()
        .find(|p| p.point.noise().is_some_and(|n| n.kind() == NoiseType::AmplitudeDamping && n.level() == 0.5))
        .ok_or_else(|| DjError::config("missing amplitude damping point"))?;
    let [constant, balanced] = summary.metrics();
    let constant_recall = constant.recall.unwrap_or(f64::NAN);
    let balanced_recall = balanced.recall.unwrap_or(f64::NAN);
    // decay toward |0> pushes balanced oracles onto the all-zero string
    assert!((constant_recall - 0.859).abs() < 0.08, "constant recall {}", constant_recall);
    assert!((balanced_recall - 0.345).abs() < 0.08, "balanced recall {}", balanced_recall);
    Ok(())
}

#[test]
fn test_observer_sees_every_event() -> Result<(), DjError> {
    let config = small_config();
    let mut tally = Tally::default();
    run_sweep(&config, &StateVectorSimulator::new(), &mut tally)?;
    assert_eq!(tally.points, 4);
    assert_eq!(tally.runs, 4 * 3);
    assert_eq!(tally.trials, 4 * 3 * 20);
    Ok(())
}

#[test]
fn test_simulator_failures_are_recorded_not_fatal() -> Result<(), DjError> {
    let config = SweepConfig { n: 2, trials_per_repetition: 10, repetitions: 2, ..SweepConfig::default() };
    let sim = FlakySimulator { inner: StateVectorSimulator::new(), calls: std::cell::Cell::new(0) };
    let report = TrialRunner::new(&config, &sim)?.run_sweep(&mut NullObserver)?;
    let summary = &report.points[0];
    assert_eq!(summary.failures, 10);
    assert_eq!(summary.completed, 10);
    assert_eq!(summary.confusion.total(), 10);
    assert_eq!(report.total_failures(), 10);
    let failed = summary.trials.records().iter().filter(|r| matches!(r.outcome, TrialOutcome::Failed { .. }));
    assert_eq!(failed.count(), 10);
    Ok(())
}

#[test]
fn test_json_configuration() -> Result<(), DjError> {
    let config = SweepConfig::from_json_str(
        r#"{
            "n": 3,
            "trials_per_repetition": 12,
            "repetitions": 2,
            "noise_levels": [0.0, 0.05],
            "noise_types": ["dephasing"],
            "classification": { "mode": "strict" },
            "seed": 5
        }"#,
    )?;
    assert_eq!(config.classification, ClassificationMode::Strict);
    assert_eq!(config.shots, 1);
    assert_eq!(config.points()?.len(), 2);

    let report = run_sweep(&config, &StateVectorSimulator::new(), &mut NullObserver)?;
    assert_eq!(report.points.len(), 2);
    assert_eq!(report.points[0].stats.mean_accuracy(), Some(1.0));
    Ok(())
}

#[test]
fn test_invalid_configurations_are_rejected() -> Result<(), DjError> {
    assert!(matches!(SweepConfig::from_json_str(r#"{"n": 0}"#), Err(DjError::Configuration { .. })));
    assert!(matches!(SweepConfig::from_json_str(r#"{"shots": 0}"#), Err(DjError::Configuration { .. })));
    assert!(matches!(
        SweepConfig::from_json_str(r#"{"noise_levels": [1.5]}"#),
        Err(DjError::Configuration { .. })
    ));
    assert!(matches!(
        SweepConfig::from_json_str(r#"{"noise_types": ["bit_flip"]}"#),
        Err(DjError::UnsupportedNoiseType { .. })
    ));
    assert!(matches!(SweepConfig::from_json_str(r#"{"bogus": 1}"#), Err(DjError::Serialization(_))));
    Ok(())
}

#[test]
fn test_classical_path_never_misclassifies() -> Result<(), DjError> {
    let config = SweepConfig {
        n: 5,
        trials_per_repetition: 40,
        repetitions: 2,
        path: ExecutionPath::Classical { bound: QueryBound::HalfDomainPlusOne },
        ..SweepConfig::default()
    };
    let report = run_sweep(&config, &StateVectorSimulator::new(), &mut NullObserver)?;
    assert_eq!(report.points.len(), 1);
    let summary = &report.points[0];
    assert_eq!(summary.confusion.accuracy(), Some(1.0));
    for record in summary.trials.records() {
        assert!(record.counts().is_none());
        assert!(record.noise.is_none());
    }
    Ok(())
}
