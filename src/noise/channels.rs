// src/noise/channels.rs

//! Kraus-operator forms of the supported error channels.

use num_complex::Complex;
use num_traits::{One, Zero};

/// A 2x2 complex matrix acting on one qubit.
pub type Matrix2 = [[Complex<f64>; 2]; 2];
/// A 4x4 complex matrix acting on two qubits, basis `|a b>` with `a` the first qubit.
pub type Matrix4 = [[Complex<f64>; 4]; 4];

/// A completely positive, trace-preserving map given by its Kraus operators.
#[derive(Debug, Clone, PartialEq)]
pub enum KrausChannel {
    Single(Vec<Matrix2>),
    Two(Vec<Matrix4>),
}

fn c(re: f64) -> Complex<f64> {
    Complex::new(re, 0.0)
}

fn paulis() -> [Matrix2; 4] {
    let (o, l, i) = (Complex::zero(), Complex::one(), Complex::i());
    [
        [[l, o], [o, l]],
        [[o, l], [l, o]],
        [[o, -i], [i, o]],
        [[l, o], [o, -l]],
    ]
}

fn scale2(m: &Matrix2, s: f64) -> Matrix2 {
    let mut out = *m;
    for row in out.iter_mut() {
        for v in row.iter_mut() {
            *v *= s;
        }
    }
    out
}

/// Kronecker product `a ⊗ b`.
fn kron(a: &Matrix2, b: &Matrix2) -> Matrix4 {
    let mut out = [[Complex::zero(); 4]; 4];
    for i1 in 0..2 {
        for j1 in 0..2 {
            for i2 in 0..2 {
                for j2 in 0..2 {
                    out[i1 * 2 + i2][j1 * 2 + j2] = a[i1][j1] * b[i2][j2];
                }
            }
        }
    }
    out
}

fn is_zero2(m: &Matrix2) -> bool {
    m.iter().flatten().all(|v| v.norm_sqr() == 0.0)
}

fn is_zero4(m: &Matrix4) -> bool {
    m.iter().flatten().all(|v| v.norm_sqr() == 0.0)
}

fn independent_pair(ops: &[Matrix2]) -> Vec<Matrix4> {
    let mut out = Vec::with_capacity(ops.len() * ops.len());
    for a in ops {
        for b in ops {
            out.push(kron(a, b));
        }
    }
    out.retain(|m| !is_zero4(m));
    out
}

fn phase_damping_ops(lambda: f64) -> Vec<Matrix2> {
    let (o, l) = (Complex::zero(), Complex::one());
    let mut ops = vec![[[l, o], [o, c((1.0 - lambda).sqrt())]], [[o, o], [o, c(lambda.sqrt())]]];
    ops.retain(|m| !is_zero2(m));
    ops
}

fn amplitude_damping_ops(gamma: f64) -> Vec<Matrix2> {
    let (o, l) = (Complex::zero(), Complex::one());
    let mut ops = vec![[[l, o], [o, c((1.0 - gamma).sqrt())]], [[o, c(gamma.sqrt())], [o, o]]];
    ops.retain(|m| !is_zero2(m));
    ops
}

impl KrausChannel {
    /// `ρ → (1 - p) ρ + p I/2`, as Pauli operators with identity weight
    /// `1 - 3p/4` and weight `p/4` on each of X, Y, Z.
    pub fn depolarizing_single(p: f64) -> Self {
        let ps = paulis();
        let mut ops = Vec::with_capacity(4);
        for (k, pauli) in ps.iter().enumerate() {
            let weight = if k == 0 { 1.0 - p + p / 4.0 } else { p / 4.0 };
            if weight > 0.0 {
                ops.push(scale2(pauli, weight.sqrt()));
            }
        }
        KrausChannel::Single(ops)
    }

    /// Two-qubit depolarizing `ρ → (1 - p) ρ + p I/4`, built over all 16
    /// two-qubit Paulis rather than from two single-qubit channels.
    pub fn depolarizing_pair(p: f64) -> Self {
        let ps = paulis();
        let mut ops = Vec::with_capacity(16);
        for (a, pa) in ps.iter().enumerate() {
            for (b, pb) in ps.iter().enumerate() {
                let weight = if a == 0 && b == 0 { 1.0 - p + p / 16.0 } else { p / 16.0 };
                if weight > 0.0 {
                    ops.push(kron(&scale2(pa, weight.sqrt()), pb));
                }
            }
        }
        KrausChannel::Two(ops)
    }

    /// Phase damping with parameter `λ`.
    pub fn phase_damping(lambda: f64) -> Self {
        KrausChannel::Single(phase_damping_ops(lambda))
    }

    /// Independent phase damping on both qubits of a two-qubit gate.
    pub fn phase_damping_pair(lambda: f64) -> Self {
        KrausChannel::Two(independent_pair(&phase_damping_ops(lambda)))
    }

    /// Amplitude damping with decay probability `γ`, relaxing `|1>` toward `|0>`.
    pub fn amplitude_damping(gamma: f64) -> Self {
        KrausChannel::Single(amplitude_damping_ops(gamma))
    }

    /// Independent amplitude damping on both qubits of a two-qubit gate.
    pub fn amplitude_damping_pair(gamma: f64) -> Self {
        KrausChannel::Two(independent_pair(&amplitude_damping_ops(gamma)))
    }

    /// Number of qubits the channel acts on.
    pub fn arity(&self) -> usize {
        match self {
            KrausChannel::Single(_) => 1,
            KrausChannel::Two(_) => 2,
        }
    }

    pub fn num_operators(&self) -> usize {
        match self {
            KrausChannel::Single(ops) => ops.len(),
            KrausChannel::Two(ops) => ops.len(),
        }
    }

    /// Largest entry-wise deviation of `Σ K†K` from the identity.
    pub fn completeness_deviation(&self) -> f64 {
        fn deviation<const D: usize>(ops: &[[[Complex<f64>; D]; D]]) -> f64 {
            let mut worst: f64 = 0.0;
            for i in 0..D {
                for j in 0..D {
                    let mut sum: Complex<f64> = Complex::zero();
                    for k in ops {
                        for r in 0..D {
                            sum += k[r][i].conj() * k[r][j];
                        }
                    }
                    let target = if i == j { Complex::one() } else { Complex::zero() };
                    worst = worst.max((sum - target).norm());
                }
            }
            worst
        }
        match self {
            KrausChannel::Single(ops) => deviation(ops),
            KrausChannel::Two(ops) => deviation(ops),
        }
    }
}
