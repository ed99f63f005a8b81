//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Order totals are sums over many items and many orders:                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ drifts across a full scan        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (para / cents)                       │
//! │    Operators type "1299.90" → stored as 129990                          │
//! │    Sums are exact; only averages are computed as f64 for display        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ledger_core::money::Money;
//!
//! let price = Money::from_cents(129990); // 1299.90
//! let line = price * 2_i64;
//! assert_eq!(line.cents(), 259980);
//!
//! // Operator input arrives as f64 major units and is guarded
//! assert_eq!(Money::from_major(12.5), Some(Money::from_cents(1250)));
//! assert_eq!(Money::from_major(f64::NAN), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units (1/100 of the ledger currency).
///
/// ## Design Decisions
/// - **i64 (signed)**: profit and transport-adjusted totals can go negative
/// - **No currency**: the ledger never converts currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts an operator-entered amount in major units.
    ///
    /// Returns `None` for NaN and infinities so callers decide whether to
    /// coerce (catalog-derived prices) or reject (manual overrides).
    ///
    /// ## Example
    /// ```rust
    /// use ledger_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(19.99), Some(Money::from_cents(1999)));
    /// assert_eq!(Money::from_major(f64::INFINITY), None);
    /// ```
    pub fn from_major(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value in major units as f64 (display and averages only).
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
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

    /// Multiplies a unit price by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use ledger_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Like [`Money::multiply_quantity`] but `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Takes a percentage of this amount, rounding half away from zero.
    ///
    /// Non-finite percentages yield zero.
    ///
    /// ## Example
    /// ```rust
    /// use ledger_core::money::Money;
    ///
    /// let profit = Money::from_cents(10000);
    /// assert_eq!(profit.percent(40.0).cents(), 4000);
    /// assert_eq!(Money::from_cents(-333).percent(50.0).cents(), -167);
    /// ```
    pub fn percent(&self, pct: f64) -> Money {
        if !pct.is_finite() {
            return Money::zero();
        }
        let share = (self.0 as f64 * pct / 100.0).round();
        if share.is_finite() {
            Money(share as i64)
        } else {
            Money::zero()
        }
    }

    /// Half of the amount, rounding half away from zero.
    ///
    /// Uses i128 so the `+ 1` never overflows on extreme values.
    pub fn half(&self) -> Money {
        let v = self.0 as i128;
        let halved = if v >= 0 { (v + 1) / 2 } else { (v - 1) / 2 };
        Money(halved as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Arithmetic saturates: aggregates over stored rows must never panic, and
// write paths bound line totals with `MAX_LINE_TOTAL` first.

/// Plain `major.minor` rendering. Localized formatting is a frontend concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
