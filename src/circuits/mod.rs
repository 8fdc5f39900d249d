// src/circuits/mod.rs

//! Ordered, immutable gate sequences and the Deutsch-Jozsa circuit builder.
//!
//! A [`Circuit`] can only be produced by [`CircuitBuilder::build`], which
//! validates every qubit reference; afterwards it is read-only.

use crate::core::{DjError, QubitId, Result};
use crate::operations::{Gate, GateClass};
use crate::oracle::{OracleParameter, OracleSpec};
use std::collections::BTreeSet;
use std::fmt;

/// An ordered sequence of gates over a fixed register.
#[derive(Clone, PartialEq, Eq)]
pub struct Circuit {
    num_qubits: u32,
    num_clbits: u32,
    gates: Vec<Gate>,
}

impl Circuit {
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Width of the measurement bitstring.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// The distinct gate classes that occur in the circuit.
    pub fn gate_classes(&self) -> BTreeSet<GateClass> {
        self.gates.iter().map(Gate::class).collect()
    }

    /// Number of gates of the given class.
    pub fn count_class(&self, class: GateClass) -> usize {
        self.gates.iter().filter(|g| g.class() == class).count()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Method-chaining builder for [`Circuit`].
pub struct CircuitBuilder {
    num_qubits: u32,
    num_clbits: u32,
    gates: Vec<Gate>,
}

impl CircuitBuilder {
    /// Starts a circuit over `num_qubits` qubits and `num_clbits` classical bits.
    pub fn new(num_qubits: u32, num_clbits: u32) -> Self {
        Self { num_qubits, num_clbits, gates: Vec::new() }
    }

    pub fn add_op(mut self, gate: Gate) -> Self {
        self.gates.push(gate);
        self
    }

    pub fn add_ops<I>(mut self, gates: I) -> Self
    where
        I: IntoIterator<Item = Gate>,
    {
        self.gates.extend(gates);
        self
    }

    /// Validates qubit and classical-bit references and freezes the circuit.
    pub fn build(self) -> Result<Circuit> {
        if self.num_qubits == 0 {
            return Err(DjError::config("A circuit needs at least one qubit"));
        }
        for gate in &self.gates {
            for q in gate.qubits() {
                if q.0 >= self.num_qubits {
                    return Err(DjError::config(format!(
                        "Gate {} references {} outside a {}-qubit register",
                        gate, q, self.num_qubits
                    )));
                }
            }
            match gate {
                Gate::Cnot { control, target } if control == target => {
                    return Err(DjError::config(format!("Gate {} uses the same qubit as control and target", gate)));
                }
                Gate::Measure { clbit, .. } if *clbit >= self.num_clbits => {
                    return Err(DjError::config(format!(
                        "Gate {} writes outside a {}-bit classical register",
                        gate, self.num_clbits
                    )));
                }
                _ => {}
            }
        }
        Ok(Circuit { num_qubits: self.num_qubits, num_clbits: self.num_clbits, gates: self.gates })
    }
}

/// Builds the Deutsch-Jozsa circuit for a quantum oracle.
///
/// Qubits `0..n` are the inputs and qubit `n` the ancilla:
/// 1. `X` on the ancilla,
/// 2. `H` on all `n + 1` qubits,
/// 3. the oracle: `Z` on the ancilla for the constant-one oracle, or a
///    `CNOT(i -> ancilla)` for every set bit `i` of a balanced mask,
/// 4. `H` on the inputs,
/// 5. measurement of input `i` into classical bit `i`.
///
/// Truth-table oracles have no CNOT-pattern form and are rejected.
pub fn dj_circuit(spec: &OracleSpec) -> Result<Circuit> {
    let n = spec.n();
    let ancilla = QubitId(n);
    let inputs = (0..n).map(QubitId);

    let oracle: Vec<Gate> = match spec.parameter() {
        OracleParameter::Constant { output: 0 } => Vec::new(),
        OracleParameter::Constant { .. } => vec![Gate::Z { target: ancilla }],
        OracleParameter::Mask(mask) => (0..n)
            .filter(|i| (mask >> i) & 1 == 1)
            .map(|i| Gate::Cnot { control: QubitId(i), target: ancilla })
            .collect(),
        OracleParameter::Table(_) => {
            return Err(DjError::config(format!(
                "Oracle {} is a classical truth table; a quantum circuit needs a CNOT mask",
                spec
            )));
        }
    };

    CircuitBuilder::new(n + 1, n)
        .add_op(Gate::X { target: ancilla })
        .add_ops((0..=n).map(|q| Gate::H { target: QubitId(q) }))
        .add_ops(oracle)
        .add_ops(inputs.clone().map(|q| Gate::H { target: q }))
        .add_ops(inputs.map(|q| Gate::Measure { qubit: q, clbit: q.0 }))
        .build()
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gates.is_empty() {
            return writeln!(f, "Circuit[0 gates on {} qubits]", self.num_qubits);
        }

        let num_ops = self.gates.len();
        let num_rows = self.num_qubits as usize;
        let max_label_width = format!("{}", QubitId(self.num_qubits - 1)).len();
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_rows];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_rows];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, gate) in self.gates.iter().enumerate() {
            match gate {
                Gate::Cnot { control, target } => {
                    let (r_ctrl, r_tgt) = (control.index(), target.index());
                    op_grid[r_ctrl][t] = format_gate("@");
                    op_grid[r_tgt][t] = format_gate("X");
                    let r_min = r_ctrl.min(r_tgt);
                    let r_max = r_ctrl.max(r_tgt);
                    for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                        row_vec[t] = V_WIRE;
                    }
                }
                Gate::Measure { qubit, .. } => op_grid[qubit.index()][t] = format_gate("M"),
                Gate::X { target } | Gate::H { target } | Gate::Z { target } => {
                    op_grid[target.index()][t] = format_gate(gate.symbol());
                }
            }
        }

        writeln!(f, "Circuit[{} gates on {} qubits]", num_ops, self.num_qubits)?;
        for r in 0..num_rows {
            let label = format!("{}: ", QubitId(r as u32));
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_rows - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    #[test]
    fn test_constant_zero_layout() {
        let circuit = dj_circuit(&OracleSpec::constant(2, 0).unwrap()).unwrap();
        let expected = vec![
            Gate::X { target: q(2) },
            Gate::H { target: q(0) },
            Gate::H { target: q(1) },
            Gate::H { target: q(2) },
            Gate::H { target: q(0) },
            Gate::H { target: q(1) },
            Gate::Measure { qubit: q(0), clbit: 0 },
            Gate::Measure { qubit: q(1), clbit: 1 },
        ];
        assert_eq!(circuit.gates(), expected.as_slice());
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
    }

    #[test]
    fn test_constant_one_adds_phase_flip() {
        let circuit = dj_circuit(&OracleSpec::constant(3, 1).unwrap()).unwrap();
        assert_eq!(circuit.gates().iter().filter(|g| matches!(g, Gate::Z { .. })).count(), 1);
        assert!(circuit.gates().contains(&Gate::Z { target: q(3) }));
        assert_eq!(circuit.count_class(GateClass::TwoQubit), 0);
    }

    #[test]
    fn test_mask_selects_cnots() {
        let circuit = dj_circuit(&OracleSpec::balanced_from_mask(4, 0b1010).unwrap()).unwrap();
        let cnots: Vec<_> = circuit.gates().iter().filter(|g| g.class() == GateClass::TwoQubit).collect();
        assert_eq!(
            cnots,
            vec![
                &Gate::Cnot { control: q(1), target: q(4) },
                &Gate::Cnot { control: q(3), target: q(4) }
            ]
        );
        assert_eq!(circuit.count_class(GateClass::Measurement), 4);
        assert_eq!(circuit.count_class(GateClass::SingleQubit), 1 + 5 + 4);
    }

    #[test]
    fn test_table_oracle_rejected() {
        let spec = OracleSpec::balanced_from_table(1, vec![0, 1]).unwrap();
        assert!(matches!(dj_circuit(&spec), Err(DjError::Configuration { .. })));
    }

    #[test]
    fn test_builder_validates_references() {
        assert!(CircuitBuilder::new(2, 1).add_op(Gate::H { target: q(2) }).build().is_err());
        assert!(CircuitBuilder::new(2, 1).add_op(Gate::Cnot { control: q(1), target: q(1) }).build().is_err());
        assert!(CircuitBuilder::new(2, 1).add_op(Gate::Measure { qubit: q(0), clbit: 1 }).build().is_err());
        assert!(CircuitBuilder::new(0, 0).build().is_err());
    }

    #[test]
    fn test_display_draws_every_qubit() {
        let circuit = dj_circuit(&OracleSpec::balanced_from_mask(2, 0b11).unwrap()).unwrap();
        let drawn = circuit.to_string();
        assert!(drawn.starts_with("Circuit[10 gates on 3 qubits]"));
        assert!(drawn.contains("q0: "));
        assert!(drawn.contains("q2: "));
        assert!(drawn.contains('@'));
    }
}
