// tests/simulation_tests.rs

use djsim::oracle::balanced_masks;
use djsim::{
    classify, dj_circuit, ClassificationMode, DjError, NoiseConfig, NoiseModel, NoiseType, OracleKind, OracleSpec,
    Simulator, StateVectorSimulator,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const TOLERANCE: f64 = 1e-9;

fn zeros(n: u32) -> String {
    "0".repeat(n as usize)
}

#[test]
fn test_constant_oracles_always_measure_zero() -> Result<(), DjError> {
    let sim = StateVectorSimulator::new();
    for n in 1..=6 {
        for output in [0, 1] {
            let circuit = dj_circuit(&OracleSpec::constant(n, output)?)?;
            let dist = sim.probabilities(&circuit)?;
            assert_eq!(dist.len(), 1, "n={} output={}", n, output);
            assert!((dist[&zeros(n)] - 1.0).abs() < TOLERANCE);
        }
    }
    Ok(())
}

#[test]
fn test_balanced_oracles_never_measure_zero() -> Result<(), DjError> {
    let sim = StateVectorSimulator::new();
    for n in 1..=5 {
        for spec in balanced_masks(n)? {
            let dist = sim.probabilities(&dj_circuit(&spec)?)?;
            assert!(!dist.contains_key(&zeros(n)), "{} produced the all-zero string", spec);
            let total: f64 = dist.values().sum();
            assert!((total - 1.0).abs() < TOLERANCE);
        }
    }
    Ok(())
}

#[test]
fn test_mask_is_read_back_exactly() -> Result<(), DjError> {
    // Ideal DJ on a parity oracle measures the mask itself.
    let sim = StateVectorSimulator::new();
    let spec = OracleSpec::balanced_from_mask(4, 0b1011)?;
    let mut rng = StdRng::seed_from_u64(3);
    let counts = sim.run(&dj_circuit(&spec)?, 20, None, &mut rng)?;
    assert_eq!(counts.get("1011"), 20);
    Ok(())
}

#[test]
fn test_two_bit_examples() -> Result<(), DjError> {
    let sim = StateVectorSimulator::new();
    let mode = ClassificationMode::default();

    let constant = OracleSpec::constant(2, 0)?;
    let mut rng = StdRng::seed_from_u64(42);
    let counts = sim.run(&dj_circuit(&constant)?, 1, None, &mut rng)?;
    assert_eq!(counts.to_string(), r#"{"00": 1}"#);
    assert_eq!(classify(&counts, 2, mode)?, OracleKind::Constant);

    let balanced = OracleSpec::balanced_from_mask(2, 3)?;
    let counts = sim.run(&dj_circuit(&balanced)?, 1, None, &mut rng)?;
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.get("00"), 0);
    assert_eq!(classify(&counts, 2, mode)?, OracleKind::Balanced);
    Ok(())
}

#[test]
fn test_zero_level_noise_matches_ideal() -> Result<(), DjError> {
    let sim = StateVectorSimulator::new();
    let circuit = dj_circuit(&OracleSpec::balanced_from_mask(3, 0b110)?)?;
    for kind in NoiseType::ALL {
        let noisy = NoiseModel::attach(&circuit, &NoiseConfig::new(kind, 0.0)?);
        assert!(noisy.is_ideal());
        let mut rng = StdRng::seed_from_u64(1);
        let counts = sim.run_noisy(&noisy, 50, &mut rng)?;
        assert_eq!(counts.get("110"), 50);
    }
    Ok(())
}

#[test]
fn test_full_depolarizing_spreads_outcomes() -> Result<(), DjError> {
    let sim = StateVectorSimulator::new();
    let circuit = dj_circuit(&OracleSpec::constant(2, 0)?)?;
    let noisy = NoiseModel::attach(&circuit, &NoiseConfig::new(NoiseType::Depolarizing, 1.0)?);
    let mut rng = StdRng::seed_from_u64(99);
    let counts = sim.run_noisy(&noisy, 4000, &mut rng)?;
    assert_eq!(counts.total(), 4000);
    // the last gate on each input is followed by a full depolarization
    for bits in ["00", "01", "10", "11"] {
        let share = counts.get(bits) as f64 / 4000.0;
        assert!((share - 0.25).abs() < 0.04, "{} -> {}", bits, share);
    }
    Ok(())
}

#[test]
fn test_amplitude_damping_is_biased_toward_zero() -> Result<(), DjError> {
    let sim = StateVectorSimulator::new();
    let circuit = dj_circuit(&OracleSpec::balanced_from_mask(2, 0b11)?)?;
    let noisy = NoiseModel::attach(&circuit, &NoiseConfig::new(NoiseType::AmplitudeDamping, 1.0)?);
    let mut rng = StdRng::seed_from_u64(5);
    let counts = sim.run_noisy(&noisy, 200, &mut rng)?;
    // every qubit is reset to |0> after each gate
    assert_eq!(counts.get("00"), 200);
    Ok(())
}

#[test]
fn test_register_limit() -> Result<(), DjError> {
    let circuit = dj_circuit(&OracleSpec::constant(24, 0)?)?;
    let mut rng = StdRng::seed_from_u64(0);
    let result = StateVectorSimulator::new().run(&circuit, 1, None, &mut rng);
    assert!(matches!(result, Err(DjError::Configuration { .. })));
    Ok(())
}
