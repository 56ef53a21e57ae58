//! Epoch: a versioned generation of a topic's synthesized content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative synthesis generation counter.
///
/// Raw inputs from loosely typed callers are clamped via [`Epoch::from_raw`]
/// (`max(0, floor(x))`) before entering any identifier derivation, so
/// `-3.4`, `0`, and `0.9` all denote epoch `0`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Epoch(u64);

impl Epoch {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Clamp an arbitrary numeric input to a valid epoch.
    ///
    /// Non-finite and negative values clamp to zero; fractional values floor.
    pub fn from_raw(value: f64) -> Self {
        if !value.is_finite() || value < 0.0 {
            return Self(0);
        }
        Self(value.floor() as u64)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
