use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
///
/// Serialized as the raw cent count, so `6.60` travels as `660`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates an amount from whole units and a cents remainder, e.g. `(3, 30)` for `3.30`.
    pub fn from_units(units: i64, cents: i64) -> Self {
        Self {
            cents: units * 100 + cents,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn units(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after whole units).
    pub fn cents_part(&self) -> i64 {
        (self.cents % 100).abs()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Multiplies by a quantity, or `None` if the result leaves the `i64` cent range.
    pub fn checked_mul(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(quantity))
            .map(Money::from_cents)
    }

    /// Adds two amounts, or `None` on overflow.
    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.cents.checked_add(rhs.cents).map(Money::from_cents)
    }

    /// Sums amounts, or `None` if any partial sum overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.units(), self.cents_part())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_units_combines_parts() {
        let money = Money::from_units(3, 30);
        assert_eq!(money.cents(), 330);
        assert_eq!(money.units(), 3);
        assert_eq!(money.cents_part(), 30);
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::from_cents(660).to_string(), "6.60");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
    }

    #[test]
    fn multiply_and_sum() {
        let unit = Money::from_cents(330);
        assert_eq!(unit.checked_mul(2), Some(Money::from_cents(660)));

        let total = Money::checked_sum([Money::from_cents(100), Money::from_cents(250)]);
        assert_eq!(total, Some(Money::from_cents(350)));
        assert_eq!(Money::checked_sum([]), Some(Money::zero()));
    }

    #[test]
    fn overflow_is_reported_instead_of_wrapping() {
        assert_eq!(Money::from_cents(i64::MAX / 2 + 1).checked_mul(2), None);
        assert_eq!(
            Money::from_cents(i64::MAX - 10).checked_add(Money::from_cents(11)),
            None
        );
        assert_eq!(
            Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]),
            None
        );
    }

    #[test]
    fn sign_checks() {
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::zero().is_zero());
        assert!(!Money::from_cents(-1).is_positive());
    }

    #[test]
    fn serializes_as_cents() {
        assert_eq!(serde_json::to_string(&Money::from_cents(660)).unwrap(), "660");
    }
}
