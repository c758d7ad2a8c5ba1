//! Money in integer minor units.
//!
//! All pricing runs in sen (1/100 of a ringgit) to avoid floating-point
//! drift in subtotals. Points earned from a booking are the integer
//! floor of the final paid amount in whole currency units.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// An amount of money in minor units (sen). Never negative in practice:
/// discounts saturate at zero.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(0);

    /// Construct from minor units (sen).
    pub fn from_sen(sen: i64) -> Self {
        Self(sen)
    }

    /// Construct from whole currency units.
    pub fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// The amount in minor units.
    pub fn sen(&self) -> i64 {
        self.0
    }

    /// The amount in whole currency units, floored. This is the points
    /// earn for a paid total (1 point per whole unit).
    pub fn whole_units(&self) -> i64 {
        self.0.div_euclid(100)
    }

    /// Subtract, flooring at zero. Used for voucher discounts, which are
    /// capped at the subtotal and never produce a negative total.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// The smaller of two amounts.
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, count: i64) -> Money {
        Money(self.0 * count)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RM{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let rate = Money::from_sen(1800);
        assert_eq!(rate * 2, Money::from_sen(3600));
        assert_eq!(rate + Money::from_sen(200), Money::from_sen(2000));
    }

    #[test]
    fn test_discount_floors_at_zero() {
        let subtotal = Money::from_sen(500);
        let discount = Money::from_units(10);
        assert_eq!(subtotal.saturating_sub(discount), Money::ZERO);
    }

    #[test]
    fn test_whole_units_floor() {
        assert_eq!(Money::from_sen(1899).whole_units(), 18);
        assert_eq!(Money::from_sen(1800).whole_units(), 18);
        assert_eq!(Money::ZERO.whole_units(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_sen(1850).to_string(), "RM18.50");
    }
}
