//! Size limits shared across the pipeline.

/// Hard limits on problem sizes.
pub mod limits {
    /// Largest `n` for which a classical truth table (`2^n` entries) is materialised.
    pub const MAX_CLASSICAL_BITS: u32 = 24;
    /// Largest `n` for which a CNOT mask fits in a `u64` with room for the ancilla.
    pub const MAX_QUANTUM_BITS: u32 = 62;
    /// Largest register (inputs plus ancilla) the state-vector simulator accepts.
    pub const MAX_SIMULATED_QUBITS: u32 = 24;
}
