// src/simulation/results.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Histogram of measured bitstrings.
///
/// Keys are written most significant classical bit first, so classical bit 0
/// is the rightmost character. The total over all keys equals the number of
/// shots that produced the histogram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementCounts {
    counts: BTreeMap<String, u64>,
}

impl MeasurementCounts {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` observations of `bitstring`.
    pub fn record(&mut self, bitstring: impl Into<String>, count: u64) {
        if count > 0 {
            *self.counts.entry(bitstring.into()).or_insert(0) += count;
        }
    }

    /// Observations of `bitstring`, zero if it never occurred.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of observations.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct bitstrings observed.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Observations of the all-zero string of width `num_bits`.
    pub fn zero_count(&self, num_bits: usize) -> u64 {
        self.get(&"0".repeat(num_bits))
    }

    /// Share of observations that were all-zero, `None` when empty.
    pub fn zero_fraction(&self, num_bits: usize) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.zero_count(num_bits) as f64 / total as f64),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for MeasurementCounts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = MeasurementCounts::new();
        for (bits, count) in iter {
            counts.record(bits, count);
        }
        counts
    }
}

impl fmt::Display for MeasurementCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (bits, count)) in self.counts.iter().enumerate() {
            write!(f, "{}\"{}\": {}", if i > 0 { ", " } else { "" }, bits, count)?;
        }
        write!(f, "}}")
    }
}

/// Formats the low `width` bits of `value`, most significant first.
pub(crate) fn format_bits(value: u64, width: usize) -> String {
    (0..width).rev().map(|b| if (value >> b) & 1 == 1 { '1' } else { '0' }).collect()
}
