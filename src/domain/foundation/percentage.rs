//! Percentage value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Cents, ValidationError};

/// A whole-number percentage between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// Fifty percent, the single-token discount.
    pub const HALF: Self = Self(50);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100);

    /// Creates a new Percentage, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a Percentage, returning error if out of range.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::out_of_range(
                "percentage",
                0,
                100,
                i64::from(value),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Applies this percentage as a discount to `base`.
    ///
    /// Integer round-half-up on minor units: `(base * (100 - p) + 50) / 100`.
    /// The same rule serves the promotion and single-token paths, so the
    /// amount shown always equals the amount sent to the payment processor.
    pub fn apply_discount(&self, base: Cents) -> Cents {
        let keep = u128::from(100 - self.0);
        let raw = (u128::from(base.value()) * keep + 50) / 100;
        Cents::new(u64::try_from(raw).unwrap_or(u64::MAX))
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<u8> for Percentage {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_new_clamps_to_100() {
        assert_eq!(Percentage::new(101).value(), 100);
        assert_eq!(Percentage::new(255).value(), 100);
    }

    #[test]
    fn percentage_try_new_rejects_over_100() {
        let err = Percentage::try_new(101).unwrap_err();
        assert_eq!(err, ValidationError::out_of_range("percentage", 0, 100, 101));
    }

    #[test]
    fn percentage_displays_with_percent_sign() {
        assert_eq!(format!("{}", Percentage::new(17)), "17%");
    }

    #[test]
    fn deserializing_out_of_range_percentage_fails() {
        let result: Result<Percentage, _> = serde_json::from_str("120");
        assert!(result.is_err());
        let ok: Percentage = serde_json::from_str("20").unwrap();
        assert_eq!(ok.value(), 20);
    }

    #[test]
    fn seventeen_percent_off_699_is_580() {
        // 699 * 0.83 = 580.17
        assert_eq!(Percentage::new(17).apply_discount(Cents::new(699)), Cents::new(580));
    }

    #[test]
    fn half_of_699_rounds_up_to_350() {
        // 349.5 rounds half-up
        assert_eq!(Percentage::HALF.apply_discount(Cents::new(699)), Cents::new(350));
    }

    #[test]
    fn zero_and_hundred_are_identity_and_free() {
        assert_eq!(Percentage::ZERO.apply_discount(Cents::new(999)), Cents::new(999));
        assert_eq!(Percentage::HUNDRED.apply_discount(Cents::new(999)), Cents::ZERO);
    }

    #[test]
    fn discount_of_one_cent_can_round_to_zero() {
        assert_eq!(Percentage::new(60).apply_discount(Cents::new(1)), Cents::ZERO);
        assert_eq!(Percentage::HALF.apply_discount(Cents::new(1)), Cents::new(1));
    }
}
