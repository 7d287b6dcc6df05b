//! # Money Module
//!
//! Provides the `Money` and `Rate` types for fee arithmetic.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    1.005 × 1000 = 1004.9999999999999  → truncates to 1004, not 1005    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Naira × Basis Points                             │
//! │    (100 × 250 + 5000) / 10000 = 3   (exactly half-up, every time)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The marketplace prices everything in whole Naira, so the base unit here
//! is the Naira itself rather than kobo.
//!
//! ## Usage
//! ```rust
//! use unimart_core::money::{Money, Rate};
//!
//! let subtotal = Money::from_naira(500);
//! let fee = subtotal.apply_rate(Rate::from_bps(250)); // 2.5%
//! assert_eq!(fee.naira(), 13); // 12.5 rounds half-up
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 500 bps = 5% and 250 bps = 2.5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole Naira.
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values are representable so that invalid
///   input can be detected and rejected instead of wrapping
/// - **Single field tuple struct**: zero-cost over i64, serializes as a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole Naira.
    ///
    /// ## Example
    /// ```rust
    /// use unimart_core::money::Money;
    ///
    /// let price = Money::from_naira(2_500);
    /// assert_eq!(price.naira(), 2_500);
    /// ```
    #[inline]
    pub const fn from_naira(naira: i64) -> Self {
        Money(naira)
    }

    /// Returns the value in whole Naira.
    #[inline]
    pub const fn naira(&self) -> i64 {
        self.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a rate and rounds to the nearest Naira, halves away
    /// from zero.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000` on the magnitude, in
    /// i128 so large order totals cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use unimart_core::money::{Money, Rate};
    ///
    /// let amount = Money::from_naira(10_000);
    /// assert_eq!(amount.apply_rate(Rate::from_bps(800)).naira(), 800);
    /// assert_eq!(Money::from_naira(100).apply_rate(Rate::from_bps(250)).naira(), 3);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let magnitude = (self.0.unsigned_abs() as i128 * rate.bps() as i128 + 5000) / 10000;
        let signed = if self.0 < 0 { -magnitude } else { magnitude };
        Money(signed as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display, e.g. `₦1850` or `-₦20`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₦{}", sign, self.0.unsigned_abs())
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

// =============================================================================
// Unit Tests
// =============================================================================
