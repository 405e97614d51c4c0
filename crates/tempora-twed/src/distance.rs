//! TWED distance newtype wrapper.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative TWED distance value.
///
/// Finite unless it is the [`TwedDistance::INFINITY`] sentinel returned by
/// early-abandoning queries.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TwedDistance(f64);

impl TwedDistance {
    /// Sentinel for a distance known to exceed the requested cutoff.
    pub const INFINITY: Self = Self(f64::INFINITY);

    /// Zero distance, the cost between identical sequences.
    pub const ZERO: Self = Self(0.0);

    pub(crate) fn new(value: f64) -> Self {
        debug_assert!(value >= 0.0, "negative TWED distance {value}");
        Self(value)
    }

    /// Return the raw distance value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return true unless this is the abandon sentinel.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for TwedDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl From<TwedDistance> for f64 {
    fn from(d: TwedDistance) -> Self {
        d.0
    }
}
