// src/simulation/mod.rs

//! Executes circuits and returns measurement counts.
//!
//! [`Simulator`] is the seam between the trial runner and whatever produces
//! counts. [`StateVectorSimulator`] is the in-process implementation: exact
//! state-vector evolution, with noise applied as stochastic Kraus branches
//! (one quantum trajectory per shot).

mod results;
pub(crate) mod engine;

pub use results::MeasurementCounts;

use crate::circuits::Circuit;
use crate::core::{DjError, Result, MAX_SIMULATED_QUBITS};
use crate::noise::{NoiseModel, NoisyCircuit};
use crate::operations::Gate;
use crate::validation::check_normalization;
use engine::SimulationEngine;
use rand::{Rng, RngCore};
use results::format_bits;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Anything that can execute a circuit under optional noise.
///
/// Implementations take `&self` and draw all randomness from `rng`, so the
/// same simulator can be shared across runs and seeded per run.
pub trait Simulator {
    /// Executes `circuit` `shots` times. `shots == 0` is a configuration error.
    fn run(
        &self,
        circuit: &Circuit,
        shots: u32,
        noise: Option<&NoiseModel>,
        rng: &mut dyn RngCore,
    ) -> Result<MeasurementCounts>;

    /// Runs a circuit together with the noise attached to it.
    fn run_noisy(&self, noisy: &NoisyCircuit<'_>, shots: u32, rng: &mut dyn RngCore) -> Result<MeasurementCounts> {
        self.run(noisy.circuit(), shots, noisy.noise(), rng)
    }
}

/// State-vector simulator for registers of up to 24 qubits.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateVectorSimulator;

impl StateVectorSimulator {
    pub fn new() -> Self {
        Self
    }

    /// Ideal outcome distribution over the measured bitstrings.
    ///
    /// Outcomes with probability below `1e-12` are omitted.
    pub fn probabilities(&self, circuit: &Circuit) -> Result<BTreeMap<String, f64>> {
        let layout = MeasurementLayout::of(circuit)?;
        let mut engine = SimulationEngine::init(circuit.num_qubits() as usize)?;
        for gate in circuit.gates() {
            engine.apply_gate(gate)?;
        }
        check_normalization(engine.state(), None)?;
        let mut distribution = BTreeMap::new();
        for (index, p) in engine.state().probabilities().into_iter().enumerate() {
            if p > 0.0 {
                *distribution.entry(layout.bitstring(index)).or_insert(0.0) += p;
            }
        }
        distribution.retain(|_, p| *p >= 1e-12);
        Ok(distribution)
    }
}

impl Simulator for StateVectorSimulator {
    fn run(
        &self,
        circuit: &Circuit,
        shots: u32,
        noise: Option<&NoiseModel>,
        rng: &mut dyn RngCore,
    ) -> Result<MeasurementCounts> {
        if shots == 0 {
            return Err(DjError::config("At least one shot is required"));
        }
        if circuit.num_qubits() > MAX_SIMULATED_QUBITS {
            return Err(DjError::config(format!(
                "{} qubits exceed the simulator limit of {}",
                circuit.num_qubits(),
                MAX_SIMULATED_QUBITS
            )));
        }
        let layout = MeasurementLayout::of(circuit)?;
        let mut counts = MeasurementCounts::new();

        match noise.filter(|model| !model.is_empty()) {
            None => {
                // One evolution, then repeated sampling of the final state.
                let mut engine = SimulationEngine::init(circuit.num_qubits() as usize)?;
                for gate in circuit.gates() {
                    engine.apply_gate(gate)?;
                }
                let cumulative = cumulative_distribution(engine.state().probabilities());
                for _ in 0..shots {
                    counts.record(layout.bitstring(sample_index(&cumulative, rng)), 1);
                }
            }
            Some(model) => {
                for shot in 0..shots {
                    let mut engine = SimulationEngine::init(circuit.num_qubits() as usize)?;
                    for gate in circuit.gates() {
                        engine.apply_gate(gate)?;
                        if let Some(channel) = model.channel(gate.class()) {
                            engine.apply_channel(channel, &gate.qubits(), rng)?;
                        }
                    }
                    let cumulative = cumulative_distribution(engine.state().probabilities());
                    let bits = layout.bitstring(sample_index(&cumulative, rng));
                    trace!(shot, outcome = %bits, "trajectory sampled");
                    counts.record(bits, 1);
                }
            }
        }
        Ok(counts)
    }
}

/// Which qubit feeds each classical bit.
struct MeasurementLayout {
    num_clbits: usize,
    sources: Vec<(usize, usize)>,
}

impl MeasurementLayout {
    /// Collects terminal measurements. A gate acting on an already measured
    /// qubit is not supported.
    fn of(circuit: &Circuit) -> Result<Self> {
        let mut measured = BTreeSet::new();
        let mut sources = Vec::new();
        for gate in circuit.gates() {
            match gate {
                Gate::Measure { qubit, clbit } => {
                    measured.insert(*qubit);
                    sources.push((*clbit as usize, qubit.index()));
                }
                other => {
                    if let Some(q) = other.qubits().into_iter().find(|q| measured.contains(q)) {
                        return Err(DjError::simulation(format!(
                            "Gate {} acts on {} after it was measured",
                            other, q
                        )));
                    }
                }
            }
        }
        Ok(Self { num_clbits: circuit.num_clbits() as usize, sources })
    }

    fn bitstring(&self, basis_index: usize) -> String {
        let mut value = 0u64;
        for &(clbit, qubit) in &self.sources {
            let bit = ((basis_index >> qubit) & 1) as u64;
            value = (value & !(1 << clbit)) | (bit << clbit);
        }
        format_bits(value, self.num_clbits)
    }
}

fn cumulative_distribution(probabilities: Vec<f64>) -> Vec<f64> {
    let mut acc = 0.0;
    probabilities
        .into_iter()
        .map(|p| {
            acc += p;
            acc
        })
        .collect()
}

fn sample_index<R: Rng + ?Sized>(cumulative: &[f64], rng: &mut R) -> usize {
    let total = cumulative.last().copied().unwrap_or(0.0);
    let draw = rng.random::<f64>() * total;
    cumulative.partition_point(|c| *c <= draw).min(cumulative.len().saturating_sub(1))
}
