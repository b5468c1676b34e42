//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A discount engine re-runs during refunds. If the second run drifts     │
//! │  by a fraction of a cent, the refund no longer matches the sale.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every discount, subtotal and total is an i64 number of cents.        │
//! │    Percentages are basis points and round half-up exactly once.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vantage_core::money::Money;
//! use vantage_core::types::Rate;
//!
//! let line_total = Money::from_cents(5000);       // $50.00
//! let off = line_total.percentage(Rate::from_percent(15));
//! assert_eq!(off.cents(), 750);                    // $7.50
//!
//! // A discount can never take a line below zero
//! let requested = Money::from_cents(9000);
//! assert_eq!(requested.clamp_to(line_total), line_total);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for net refund amounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent serde**: Serializes as a bare integer of cents
///
/// ## Where Money Flows in the Discount Engine
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  LineItem.unit_price ──► line_total ──► evaluate_rule ──► discount      │
/// │                                              │                          │
/// │                                              ▼                          │
/// │                         LineItemResult.add_discount (clamped)           │
/// │                                              │                          │
/// │                                              ▼                          │
/// │  DiscountResult.final_total ──► Transaction.paid_amount (signed)        │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vantage_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use vantage_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1000);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 3000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Calculates `rate` of this amount, rounding half-up to the cent.
    ///
    /// ## Implementation
    /// Integer math only: `(cents * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use vantage_core::money::Money;
    /// use vantage_core::types::Rate;
    ///
    /// let total = Money::from_cents(999);
    /// // 999 × 12.5% = 124.875 → 125
    /// assert_eq!(total.percentage(Rate::from_bps(1250)).cents(), 125);
    /// ```
    pub fn percentage(&self, rate: Rate) -> Money {
        // i128 keeps large carts from overflowing the intermediate product
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Clamps this amount into `0..=ceiling`.
    ///
    /// Used wherever a discount must never exceed the value it discounts.
    /// A negative ceiling clamps to zero.
    ///
    /// ## Example
    /// ```rust
    /// use vantage_core::money::Money;
    ///
    /// let ceiling = Money::from_cents(100);
    /// assert_eq!(Money::from_cents(500).clamp_to(ceiling).cents(), 100);
    /// assert_eq!(Money::from_cents(-5).clamp_to(ceiling).cents(), 0);
    /// ```
    #[inline]
    pub fn clamp_to(self, ceiling: Money) -> Money {
        self.min(ceiling).max(Money::zero())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and discount descriptions. The storefront formats
/// amounts itself to handle localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations). Saturates like
/// [`Money::multiply_quantity`].
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_multiply_quantity_saturates() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.multiply_quantity(3).cents(), i64::MAX);
        assert_eq!((huge * 3).cents(), i64::MAX);
        assert_eq!(Money::from_cents(-2).multiply_quantity(i64::MAX).cents(), i64::MIN);
    }

    #[test]
    fn test_percentage_whole_percent() {
        let total = Money::from_cents(5000);
        assert_eq!(total.percentage(Rate::from_percent(15)).cents(), 750);
        assert_eq!(total.percentage(Rate::from_percent(100)).cents(), 5000);
        assert_eq!(total.percentage(Rate::zero()).cents(), 0);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 1010 × 2.5% = 25.25 → 25
        assert_eq!(Money::from_cents(1010).percentage(Rate::from_bps(250)).cents(), 25);
        // 1030 × 2.5% = 25.75 → 26
        assert_eq!(Money::from_cents(1030).percentage(Rate::from_bps(250)).cents(), 26);
        // 100 × 0.5% = 0.5 → 1
        assert_eq!(Money::from_cents(100).percentage(Rate::from_bps(50)).cents(), 1);
    }

    #[test]
    fn test_clamp_to() {
        let ceiling = Money::from_cents(100);
        assert_eq!(Money::from_cents(80).clamp_to(ceiling).cents(), 80);
        assert_eq!(Money::from_cents(500).clamp_to(ceiling).cents(), 100);
        assert_eq!(Money::from_cents(-1).clamp_to(ceiling).cents(), 0);
        assert_eq!(Money::from_cents(10).clamp_to(Money::from_cents(-3)).cents(), 0);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_cents(100), Money::from_cents(250)];
        let by_ref: Money = amounts.iter().sum();
        let by_value: Money = amounts.into_iter().sum();
        assert_eq!(by_ref.cents(), 350);
        assert_eq!(by_value.cents(), 350);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_serializes_as_bare_cents() {
        let json = serde_json::to_string(&Money::from_cents(1234)).unwrap();
        assert_eq!(json, "1234");
        let back: Money = serde_json::from_str("-50").unwrap();
        assert_eq!(back.cents(), -50);
    }
}
