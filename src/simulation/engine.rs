// src/simulation/engine.rs
use crate::core::{DjError, QubitId, Result, StateVector};
use crate::noise::{KrausChannel, Matrix2, Matrix4};
use crate::operations::Gate;
use num_complex::Complex;
use num_traits::{One, Zero};
use rand::Rng;
use std::f64::consts::FRAC_1_SQRT_2;

/// Evolves a single state vector gate by gate.
///
/// Qubit `q` is bit `q` of the basis index. Measurements are not applied
/// here; the caller samples the final state.
pub(crate) struct SimulationEngine {
    state: StateVector,
}

impl SimulationEngine {
    /// Starts in `|0...0>` over `num_qubits` qubits.
    pub(crate) fn init(num_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(DjError::simulation("Cannot initialize engine with zero qubits"));
        }
        Ok(Self { state: StateVector::zero_state(num_qubits) })
    }

    pub(crate) fn state(&self) -> &StateVector {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<()> {
        if state.num_qubits() != self.state.num_qubits() {
            return Err(DjError::simulation(format!(
                "State over {} qubits does not fit a {}-qubit engine",
                state.num_qubits(),
                self.state.num_qubits()
            )));
        }
        self.state = state;
        Ok(())
    }

    /// Applies the unitary part of `gate`. Measurements are a no-op.
    pub(crate) fn apply_gate(&mut self, gate: &Gate) -> Result<()> {
        match gate {
            Gate::X { target } => self.apply_single_qubit_gate(*target, &pauli_x()),
            Gate::H { target } => self.apply_single_qubit_gate(*target, &hadamard()),
            Gate::Z { target } => self.apply_single_qubit_gate(*target, &pauli_z()),
            Gate::Cnot { control, target } => self.apply_two_qubit_gate(*control, *target, &cnot()),
            Gate::Measure { .. } => Ok(()),
        }
    }

    /// Applies one Kraus operator of `channel`, drawn with probability
    /// `||K ψ||²`, and renormalizes.
    pub(crate) fn apply_channel<R: Rng + ?Sized>(
        &mut self,
        channel: &KrausChannel,
        qubits: &[QubitId],
        rng: &mut R,
    ) -> Result<()> {
        let candidates: Vec<StateVector> = match (channel, qubits) {
            (KrausChannel::Single(ops), [q]) => ops
                .iter()
                .map(|k| self.transformed(|e| e.apply_single_qubit_gate(*q, k)))
                .collect::<Result<_>>()?,
            (KrausChannel::Two(ops), [a, b]) => ops
                .iter()
                .map(|k| self.transformed(|e| e.apply_two_qubit_gate(*a, *b, k)))
                .collect::<Result<_>>()?,
            _ => {
                return Err(DjError::simulation(format!(
                    "{}-qubit channel cannot follow a gate on {} qubits",
                    channel.arity(),
                    qubits.len()
                )));
            }
        };

        let weights: Vec<f64> = candidates.iter().map(StateVector::norm_sqr).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Err(DjError::simulation(format!("Kraus branch weights sum to {}", total)));
        }
        let draw = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = None;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            cumulative += w;
            chosen = Some(i);
            if draw < cumulative {
                break;
            }
        }
        let index = chosen.ok_or_else(|| DjError::simulation("No Kraus branch has positive weight"))?;
        let mut next = candidates.into_iter().nth(index).ok_or_else(|| DjError::simulation("Kraus branch vanished"))?;
        next.renormalize();
        self.state = next;
        Ok(())
    }

    fn transformed<F>(&self, f: F) -> Result<StateVector>
    where
        F: FnOnce(&mut SimulationEngine) -> Result<()>,
    {
        let mut scratch = SimulationEngine { state: self.state.clone() };
        f(&mut scratch)?;
        Ok(scratch.state)
    }

    /// Applies a 2x2 matrix to `target`.
    fn apply_single_qubit_gate(&mut self, target: QubitId, matrix: &Matrix2) -> Result<()> {
        let k = self.check_qubit(target)?;
        let k_mask = 1usize << k;
        let lower_mask = k_mask - 1;
        let upper_mask = !lower_mask;

        let dim = self.state.dim();
        let amps = self.state.amplitudes_mut();
        // Iterate over pairs of basis states differing only at bit k: the bits of
        // `i` at and above k shift up one place to open a zero at k.
        for i in 0..dim / 2 {
            let i0 = ((i & upper_mask) << 1) | (i & lower_mask);
            let i1 = i0 | k_mask;
            let psi_0 = amps[i0];
            let psi_1 = amps[i1];
            amps[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            amps[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
        Ok(())
    }

    /// Applies a 4x4 matrix whose basis is `|first second>`, i.e. row index
    /// `2 * bit(first) + bit(second)`.
    fn apply_two_qubit_gate(&mut self, first: QubitId, second: QubitId, matrix: &Matrix4) -> Result<()> {
        let k1 = self.check_qubit(first)?;
        let k2 = self.check_qubit(second)?;
        if k1 == k2 {
            return Err(DjError::simulation("Target qubits for a two-qubit gate cannot be the same"));
        }
        let (m1, m2) = (1usize << k1, 1usize << k2);

        let dim = self.state.dim();
        let amps = self.state.amplitudes_mut();
        for base in 0..dim {
            if base & (m1 | m2) != 0 {
                continue;
            }
            let indices = [base, base | m2, base | m1, base | m1 | m2];
            let psi = indices.map(|i| amps[i]);
            for (row, &idx) in indices.iter().enumerate() {
                let mut acc: Complex<f64> = Complex::zero();
                for (col, amp) in psi.iter().enumerate() {
                    acc += matrix[row][col] * amp;
                }
                amps[idx] = acc;
            }
        }
        Ok(())
    }

    fn check_qubit(&self, qubit: QubitId) -> Result<usize> {
        let k = qubit.index();
        if k >= self.state.num_qubits() {
            return Err(DjError::simulation(format!(
                "{} is outside the {}-qubit register",
                qubit,
                self.state.num_qubits()
            )));
        }
        Ok(k)
    }
}

fn pauli_x() -> Matrix2 {
    [[Complex::zero(), Complex::one()], [Complex::one(), Complex::zero()]]
}

fn pauli_z() -> Matrix2 {
    [[Complex::one(), Complex::zero()], [Complex::zero(), -Complex::one()]]
}

fn hadamard() -> Matrix2 {
    let h = Complex::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

/// CNOT in the `|control target>` basis.
fn cnot() -> Matrix4 {
    let (o, l) = (Complex::zero(), Complex::one());
    [[l, o, o, o], [o, l, o, o], [o, o, o, l], [o, o, l, o]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    fn assert_complex_vec_approx_equal(actual: &[Complex<f64>], expected: &[Complex<f64>], context: &str) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < TEST_TOLERANCE * TEST_TOLERANCE,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, Context: {}",
                i,
                actual[i],
                expected[i],
                context
            );
        }
    }

    #[test]
    fn test_x_sets_little_endian_bit() -> Result<()> {
        let mut engine = SimulationEngine::init(3)?;
        engine.apply_gate(&Gate::X { target: q(1) })?;
        let mut expected = vec![Complex::zero(); 8];
        expected[0b010] = Complex::one();
        assert_complex_vec_approx_equal(engine.state().amplitudes(), &expected, "X on q1");
        Ok(())
    }

    #[test]
    fn test_x_flips_exactly_its_bit_from_every_basis_state() -> Result<()> {
        for target in 0..3u32 {
            for basis in 0..8usize {
                let mut amps = vec![Complex::zero(); 8];
                amps[basis] = Complex::one();
                let mut engine = SimulationEngine::init(3)?;
                engine.set_state(StateVector::from_amplitudes(amps, 3))?;
                engine.apply_gate(&Gate::X { target: q(target) })?;

                let mut expected = vec![Complex::zero(); 8];
                expected[basis ^ (1 << target)] = Complex::one();
                let context = format!("X on q{} from |{:03b}>", target, basis);
                assert_complex_vec_approx_equal(engine.state().amplitudes(), &expected, &context);
            }
        }
        Ok(())
    }

    #[test]
    fn test_hadamard_on_every_qubit_gives_uniform_superposition() -> Result<()> {
        let mut engine = SimulationEngine::init(3)?;
        for target in 0..3 {
            engine.apply_gate(&Gate::H { target: q(target) })?;
        }
        let amp = Complex::new(1.0 / 8f64.sqrt(), 0.0);
        assert_complex_vec_approx_equal(engine.state().amplitudes(), &vec![amp; 8], "H on all qubits");

        for target in 0..3 {
            engine.apply_gate(&Gate::H { target: q(target) })?;
        }
        let mut expected = vec![Complex::zero(); 8];
        expected[0] = Complex::one();
        assert_complex_vec_approx_equal(engine.state().amplitudes(), &expected, "H twice on all qubits");
        Ok(())
    }

    #[test]
    fn test_bell_pair() -> Result<()> {
        let mut engine = SimulationEngine::init(2)?;
        engine.apply_gate(&Gate::H { target: q(0) })?;
        engine.apply_gate(&Gate::Cnot { control: q(0), target: q(1) })?;
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        let expected = vec![h, Complex::zero(), Complex::zero(), h];
        assert_complex_vec_approx_equal(engine.state().amplitudes(), &expected, "H then CX");
        Ok(())
    }

    #[test]
    fn test_cnot_direction() -> Result<()> {
        // |q1 q0> = |01>: control q0 set, target q1 flips
        let mut engine = SimulationEngine::init(2)?;
        engine.apply_gate(&Gate::X { target: q(0) })?;
        engine.apply_gate(&Gate::Cnot { control: q(0), target: q(1) })?;
        assert!((engine.state().amplitudes()[0b11].norm_sqr() - 1.0).abs() < TEST_TOLERANCE);

        let mut engine = SimulationEngine::init(2)?;
        engine.apply_gate(&Gate::X { target: q(1) })?;
        engine.apply_gate(&Gate::Cnot { control: q(0), target: q(1) })?;
        assert!((engine.state().amplitudes()[0b10].norm_sqr() - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_phase_kickback() -> Result<()> {
        // H X |0> on the ancilla gives |->; a CNOT into it flips the control's phase.
        let mut engine = SimulationEngine::init(2)?;
        for gate in [
            Gate::X { target: q(1) },
            Gate::H { target: q(0) },
            Gate::H { target: q(1) },
            Gate::Cnot { control: q(0), target: q(1) },
            Gate::H { target: q(0) },
        ] {
            engine.apply_gate(&gate)?;
        }
        let p_control_one: f64 = [0b01usize, 0b11].iter().map(|i| engine.state().amplitudes()[*i].norm_sqr()).sum();
        assert!((p_control_one - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_full_amplitude_damping_resets_qubit() -> Result<()> {
        let mut engine = SimulationEngine::init(1)?;
        engine.apply_gate(&Gate::X { target: q(0) })?;
        let mut rng = StdRng::seed_from_u64(7);
        engine.apply_channel(&KrausChannel::amplitude_damping(1.0), &[q(0)], &mut rng)?;
        assert!((engine.state().amplitudes()[0].norm_sqr() - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_channel_keeps_norm() -> Result<()> {
        let mut engine = SimulationEngine::init(2)?;
        engine.apply_gate(&Gate::H { target: q(0) })?;
        engine.apply_gate(&Gate::Cnot { control: q(0), target: q(1) })?;
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            engine.apply_channel(&KrausChannel::depolarizing_pair(0.4), &[q(0), q(1)], &mut rng)?;
            engine.apply_channel(&KrausChannel::phase_damping(0.3), &[q(1)], &mut rng)?;
            assert!((engine.state().norm_sqr() - 1.0).abs() < TEST_TOLERANCE);
        }
        Ok(())
    }

    #[test]
    fn test_arity_mismatch_is_simulation_error() -> Result<()> {
        let mut engine = SimulationEngine::init(2)?;
        let mut rng = StdRng::seed_from_u64(0);
        let err = engine.apply_channel(&KrausChannel::depolarizing_pair(0.1), &[q(0)], &mut rng);
        assert!(matches!(err, Err(DjError::Simulation { .. })));
        Ok(())
    }

    #[test]
    fn test_set_state_checks_width() -> Result<()> {
        let mut engine = SimulationEngine::init(2)?;
        assert!(engine.set_state(StateVector::zero_state(3)).is_err());
        let amps = vec![Complex::zero(), Complex::one(), Complex::zero(), Complex::zero()];
        engine.set_state(StateVector::from_amplitudes(amps, 2))?;
        engine.apply_gate(&Gate::X { target: q(0) })?;
        assert!((engine.state().amplitudes()[0].norm_sqr() - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }
}
