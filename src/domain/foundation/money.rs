//! Money in minor currency units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount in minor currency units (cents).
///
/// Prices are never represented as floats anywhere in the crate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(u64);

impl Cents {
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Formats as a major-unit amount with two decimals, e.g. `6.99`.
    pub fn display_major(&self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl From<u64> for Cents {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_major_pads_cents() {
        assert_eq!(Cents::new(699).display_major(), "6.99");
        assert_eq!(Cents::new(5).display_major(), "0.05");
        assert_eq!(Cents::new(1200).display_major(), "12.00");
    }

    #[test]
    fn serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&Cents::new(580)).unwrap(), "580");
    }
}
