// src/noise/mod.rs

//! Per-gate noise channels.
//!
//! A [`NoiseConfig`] (channel family plus level) is turned into Kraus operator
//! sets for single-qubit and two-qubit gates, and [`NoiseModel::attach`]
//! associates them with the gate classes present in a circuit. Measurements
//! are noiseless.

mod channels;

pub use channels::{KrausChannel, Matrix2, Matrix4};

use crate::circuits::Circuit;
use crate::core::{DjError, Result};
use crate::operations::GateClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Noise channel families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    /// Symmetric mixing toward the maximally mixed state.
    Depolarizing,
    /// Phase damping; loses coherence without exchanging energy.
    #[serde(alias = "phase_damping")]
    Dephasing,
    /// Energy relaxation toward `|0>`; not symmetric under bit flip.
    #[serde(alias = "damping")]
    AmplitudeDamping,
}

impl NoiseType {
    pub const ALL: [NoiseType; 3] = [NoiseType::Depolarizing, NoiseType::Dephasing, NoiseType::AmplitudeDamping];

    pub fn as_str(self) -> &'static str {
        match self {
            NoiseType::Depolarizing => "depolarizing",
            NoiseType::Dephasing => "dephasing",
            NoiseType::AmplitudeDamping => "amplitude_damping",
        }
    }
}

impl fmt::Display for NoiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseType {
    type Err = DjError;

    /// Parses a channel name. Unknown names are an error, never a default.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "depolarizing" | "depolarising" => Ok(NoiseType::Depolarizing),
            "dephasing" | "phase_damping" => Ok(NoiseType::Dephasing),
            "amplitude_damping" | "damping" => Ok(NoiseType::AmplitudeDamping),
            _ => Err(DjError::UnsupportedNoiseType { name: s.to_string() }),
        }
    }
}

/// A channel family and its strength. Level 0 is ideal execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoiseConfig {
    kind: NoiseType,
    level: f64,
}

impl NoiseConfig {
    pub fn new(kind: NoiseType, level: f64) -> Result<Self> {
        if !level.is_finite() || !(0.0..=1.0).contains(&level) {
            return Err(DjError::config(format!("Noise level must be in [0, 1], got {}", level)));
        }
        Ok(Self { kind, level })
    }

    /// Noiseless configuration of the given family.
    pub fn ideal(kind: NoiseType) -> Self {
        Self { kind, level: 0.0 }
    }

    /// Parses the channel name first, so unknown names fail as unsupported.
    pub fn parse(kind: &str, level: f64) -> Result<Self> {
        Self::new(kind.parse()?, level)
    }

    pub fn kind(&self) -> NoiseType {
        self.kind
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn is_ideal(&self) -> bool {
        self.level == 0.0
    }
}

impl fmt::Display for NoiseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:.3})", self.kind, self.level)
    }
}

/// Channels keyed by the gate class they follow.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseModel {
    config: NoiseConfig,
    channels: BTreeMap<GateClass, KrausChannel>,
}

impl NoiseModel {
    /// Channels for both gate classes, regardless of any circuit.
    pub fn for_config(config: &NoiseConfig) -> Self {
        let mut channels = BTreeMap::new();
        if !config.is_ideal() {
            for class in [GateClass::SingleQubit, GateClass::TwoQubit] {
                if let Some(channel) = channel_for(config, class) {
                    channels.insert(class, channel);
                }
            }
        }
        Self { config: *config, channels }
    }

    /// Associates a channel with every noisy gate class present in `circuit`.
    ///
    /// Level 0 attaches nothing and yields an ideal circuit.
    pub fn attach<'c>(circuit: &'c Circuit, config: &NoiseConfig) -> NoisyCircuit<'c> {
        if config.is_ideal() {
            return NoisyCircuit { circuit, model: None };
        }
        let channels: BTreeMap<GateClass, KrausChannel> = circuit
            .gate_classes()
            .into_iter()
            .filter_map(|class| channel_for(config, class).map(|ch| (class, ch)))
            .collect();
        let model = if channels.is_empty() { None } else { Some(Self { config: *config, channels }) };
        NoisyCircuit { circuit, model }
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Channel applied after gates of `class`, if any.
    pub fn channel(&self, class: GateClass) -> Option<&KrausChannel> {
        self.channels.get(&class)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// A circuit together with the noise attached to it.
#[derive(Debug, Clone)]
pub struct NoisyCircuit<'c> {
    circuit: &'c Circuit,
    model: Option<NoiseModel>,
}

impl<'c> NoisyCircuit<'c> {
    pub fn circuit(&self) -> &'c Circuit {
        self.circuit
    }

    /// The attached noise, `None` for ideal execution.
    pub fn noise(&self) -> Option<&NoiseModel> {
        self.model.as_ref()
    }

    pub fn is_ideal(&self) -> bool {
        self.model.is_none()
    }
}

fn channel_for(config: &NoiseConfig, class: GateClass) -> Option<KrausChannel> {
    let level = config.level;
    match (config.kind, class) {
        (_, GateClass::Measurement) => None,
        (NoiseType::Depolarizing, GateClass::SingleQubit) => Some(KrausChannel::depolarizing_single(level)),
        (NoiseType::Depolarizing, GateClass::TwoQubit) => Some(KrausChannel::depolarizing_pair(level)),
        (NoiseType::Dephasing, GateClass::SingleQubit) => Some(KrausChannel::phase_damping(level)),
        (NoiseType::Dephasing, GateClass::TwoQubit) => Some(KrausChannel::phase_damping_pair(level)),
        (NoiseType::AmplitudeDamping, GateClass::SingleQubit) => Some(KrausChannel::amplitude_damping(level)),
        (NoiseType::AmplitudeDamping, GateClass::TwoQubit) => Some(KrausChannel::amplitude_damping_pair(level)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::dj_circuit;
    use crate::oracle::OracleSpec;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("depolarizing".parse::<NoiseType>().unwrap(), NoiseType::Depolarizing);
        assert_eq!("Phase-Damping".parse::<NoiseType>().unwrap(), NoiseType::Dephasing);
        assert_eq!("damping".parse::<NoiseType>().unwrap(), NoiseType::AmplitudeDamping);
        assert_eq!(" amplitude_damping ".parse::<NoiseType>().unwrap(), NoiseType::AmplitudeDamping);
    }

    #[test]
    fn test_unknown_name_is_unsupported_not_defaulted() {
        match "thermal".parse::<NoiseType>() {
            Err(DjError::UnsupportedNoiseType { name }) => assert_eq!(name, "thermal"),
            other => panic!("expected UnsupportedNoiseType, got {:?}", other),
        }
        assert!(matches!(NoiseConfig::parse("bitflip", 0.1), Err(DjError::UnsupportedNoiseType { .. })));
    }

    #[test]
    fn test_level_range() {
        assert!(NoiseConfig::new(NoiseType::Dephasing, -0.01).is_err());
        assert!(NoiseConfig::new(NoiseType::Dephasing, 1.01).is_err());
        assert!(NoiseConfig::new(NoiseType::Dephasing, f64::NAN).is_err());
        assert!(NoiseConfig::new(NoiseType::Dephasing, 0.0).unwrap().is_ideal());
        assert!(NoiseConfig::new(NoiseType::Dephasing, 1.0).is_ok());
    }

    #[test]
    fn test_attach_ideal_has_no_channels() {
        let circuit = dj_circuit(&OracleSpec::balanced_from_mask(2, 3).unwrap()).unwrap();
        let noisy = NoiseModel::attach(&circuit, &NoiseConfig::ideal(NoiseType::Depolarizing));
        assert!(noisy.is_ideal());
        assert!(noisy.noise().is_none());
    }

    #[test]
    fn test_attach_only_present_classes() {
        let constant = dj_circuit(&OracleSpec::constant(2, 1).unwrap()).unwrap();
        let config = NoiseConfig::new(NoiseType::AmplitudeDamping, 0.2).unwrap();
        let noisy = NoiseModel::attach(&constant, &config);
        let model = noisy.noise().unwrap();
        assert!(model.channel(GateClass::SingleQubit).is_some());
        assert!(model.channel(GateClass::TwoQubit).is_none());
        assert!(model.channel(GateClass::Measurement).is_none());

        let balanced = dj_circuit(&OracleSpec::balanced_from_mask(2, 1).unwrap()).unwrap();
        let noisy = NoiseModel::attach(&balanced, &config);
        let two = noisy.noise().unwrap().channel(GateClass::TwoQubit).unwrap();
        assert_eq!(two.arity(), 2);
    }

    #[test]
    fn test_every_channel_is_trace_preserving() {
        for kind in NoiseType::ALL {
            for level in [0.05, 0.3, 0.75, 1.0] {
                let model = NoiseModel::for_config(&NoiseConfig::new(kind, level).unwrap());
                for class in [GateClass::SingleQubit, GateClass::TwoQubit] {
                    let channel = model.channel(class).unwrap();
                    assert!(
                        channel.completeness_deviation() < 1e-12,
                        "{} at {} is not trace preserving for {:?}",
                        kind,
                        level,
                        class
                    );
                }
            }
        }
    }
}
