//! Value objects for the checkout domain.

use serde::{Deserialize, Serialize};

/// Tax applied to every order amount, as a whole percentage.
pub const DEFAULT_TAX_PERCENT: u32 = 7;

/// Product identifier (SKU).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in minor units (satang) to avoid floating
/// point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in satang (e.g., 10000 = ฿100.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from minor units.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole-baht value.
    pub fn from_baht(baht: i64) -> Self {
        Self { cents: baht * 100 }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in minor units.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-baht portion.
    pub fn baht(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the minor-unit portion (remainder after whole baht).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }

    /// Applies a whole-percent tax rate, rounding half-up to the nearest
    /// minor unit.
    pub fn with_tax_percent(&self, percent: u32) -> Money {
        let scaled = self.cents as i128 * (100 + percent as i128);
        let rounded = (scaled + 50) / 100;
        Money {
            cents: rounded as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-฿{}.{:02}", self.baht().abs(), self.cents_part())
        } else {
            write!(f, "฿{}.{:02}", self.baht(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents -= rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_string_conversion() {
        let id = ProductId::new("SKU-001");
        assert_eq!(id.as_str(), "SKU-001");

        let id2: ProductId = "SKU-002".into();
        assert_eq!(id2.as_str(), "SKU-002");
    }

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.baht(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_from_baht() {
        let money = Money::from_baht(100);
        assert_eq!(money.cents(), 10000);
        assert_eq!(money.baht(), 100);
        assert_eq!(money.cents_part(), 0);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "฿12.34");
        assert_eq!(Money::from_cents(100).to_string(), "฿1.00");
        assert_eq!(Money::from_cents(5).to_string(), "฿0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-฿12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [100, 200, 300].map(Money::from_cents).into_iter().sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn test_tax_exact() {
        // ฿200.00 at 7% is exactly ฿214.00
        let amount = Money::from_baht(200).with_tax_percent(7);
        assert_eq!(amount.cents(), 21400);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 99 * 1.07 = 105.93, rounds to 106
        assert_eq!(Money::from_cents(99).with_tax_percent(7).cents(), 106);
        // 50 * 1.07 = 53.5, rounds up to 54
        assert_eq!(Money::from_cents(50).with_tax_percent(7).cents(), 54);
    }

    #[test]
    fn test_tax_zero_percent_is_identity() {
        let amount = Money::from_cents(12345);
        assert_eq!(amount.with_tax_percent(0), amount);
    }

    #[test]
    fn test_money_serialization_roundtrip() {
        let money = Money::from_cents(999);
        let json = serde_json::to_string(&money).unwrap();
        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(money, deserialized);
    }
}
