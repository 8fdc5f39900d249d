// src/lib.rs

//! `djsim` - Deutsch-Jozsa oracle evaluation, classical and quantum
//!
//! Constant and balanced oracles are evaluated two ways: by a bounded
//! sequential-query classical scan, and by the Deutsch-Jozsa circuit run on a
//! state-vector simulator under configurable gate noise. Batches of
//! randomized trials are aggregated into accuracy statistics, and the
//! classical query growth can be fitted to an exponential model.

pub mod core;
pub mod oracle;
pub mod classical;
pub mod operations;
pub mod circuits;
pub mod noise;
pub mod simulation;
pub mod validation;
pub mod classify;
pub mod stats;
pub mod trials;
pub mod fit;
pub mod report;

// Re-export the most common types for easier top-level use
pub use crate::core::{DjError, QubitId, Result, StateVector};
pub use oracle::{OracleKind, OracleParameter, OracleSpec, Domain, TruthTable};
pub use classical::{ClassicalEvaluator, ClassicalOutcome, QueryBound, GrowthSample};
pub use operations::{Gate, GateClass};
pub use circuits::{dj_circuit, Circuit, CircuitBuilder};
pub use noise::{NoiseConfig, NoiseModel, NoiseType, NoisyCircuit};
pub use simulation::{MeasurementCounts, Simulator, StateVectorSimulator};
pub use validation::{check_normalization, validate_counts};
pub use classify::{classify, ClassificationMode};
pub use stats::{AggregateStats, ConfusionMatrix};
pub use trials::{
    run_sweep,
    NullObserver,
    PointSummary,
    SweepConfig,
    SweepObserver,
    SweepReport,
    TracingObserver,
    TrialRunner,
};
pub use fit::{fit_log_linear, fit_scaled_exponential, LogLinearFit, ScaledExponentialFit};
pub use report::ExperimentRecord;

// Example 1: Constant oracle, ideal single shot
// A constant oracle interferes back to the all-zero string with certainty.
/// ```
/// use djsim::{dj_circuit, classify, ClassificationMode, OracleKind, OracleSpec, Simulator, StateVectorSimulator};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let spec = OracleSpec::constant(2, 0)?;
/// let circuit = dj_circuit(&spec)?;
/// println!("Circuit:\n{}", circuit);
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let counts = StateVectorSimulator::new().run(&circuit, 1, None, &mut rng)?;
/// assert_eq!(counts.get("00"), 1);
/// assert_eq!(counts.total(), 1);
///
/// let verdict = classify(&counts, 2, ClassificationMode::default())?;
/// assert_eq!(verdict, OracleKind::Constant);
/// assert_eq!(verdict, spec.kind());
/// # Ok::<(), djsim::DjError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Balanced mask oracle
// CNOTs from both inputs into the ancilla; the all-zero string never appears.
/// ```
/// use djsim::{dj_circuit, classify, ClassificationMode, OracleKind, OracleSpec, Simulator, StateVectorSimulator};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let spec = OracleSpec::balanced_from_mask(2, 0b11)?;
/// let circuit = dj_circuit(&spec)?;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let counts = StateVectorSimulator::new().run(&circuit, 1, None, &mut rng)?;
/// assert_eq!(counts.len(), 1);
/// assert_eq!(counts.get("00"), 0);
/// assert_eq!(classify(&counts, 2, ClassificationMode::default())?, OracleKind::Balanced);
/// # Ok::<(), djsim::DjError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 3: Classical query count
// A constant oracle exhausts the whole query budget.
/// ```
/// use djsim::{ClassicalEvaluator, OracleSpec, QueryBound};
///
/// let evaluator = ClassicalEvaluator::new(QueryBound::HalfDomainPlusOne);
/// assert_eq!(evaluator.evaluate(&OracleSpec::constant(3, 1)?)?, 5);
///
/// // f(x) = x0 diverges from f(0) at the second query
/// assert_eq!(evaluator.evaluate(&OracleSpec::balanced_from_mask(3, 0b001)?)?, 2);
/// # Ok::<(), djsim::DjError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
