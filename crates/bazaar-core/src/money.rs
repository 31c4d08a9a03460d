//! # Money Module
//!
//! Provides the `Money` and `Rate` types for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many storefronts:                                                   │
//! │    10.00 / 3 = 3.33 (×3 = 9.99)  → Lost 0.01!                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    1000 / 3 = 333 minor units (×3 = 999)                               │
//! │    We KNOW we lost one unit, and handle it explicitly                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_minor(1099); // 10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                     // 21.98
//! let total = price + Money::from_minor(500);  // 15.99
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (minor units).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for discounts and corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.unit_price_minor ──┬──► LineSnapshot.unit_price ──► line total │
/// │                             │                                           │
/// │                             └──► Displayed as "10.99" by callers        │
/// │                                                                         │
/// │  Cart subtotal ──► Tax ──► Shipping ──► Coupon ──► Grand Total         │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

/// Clamps a widened intermediate back to minor units, saturating at the
/// i64 range.
///
/// Quantities are unbounded (stock 0 means unlimited), so every multiply
/// runs in i128 and clamps here instead of wrapping.
const fn clamp_minor(wide: i128) -> i64 {
    if wide > i64::MAX as i128 {
        i64::MAX
    } else if wide < i64::MIN as i128 {
        i64::MIN
    } else {
        wide as i64
    }
}

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // Represents 10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    ///
    /// ## Why Minor Units?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and views all use minor units.
    /// Only the caller converts to a decimal string for display.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units (smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let zero = Money::zero();
    /// assert_eq!(zero.minor(), 0);
    /// assert!(zero.is_zero());
    /// ```
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

    /// Calculates a percentage of this amount, rounding half away from zero.
    ///
    /// Every percentage in the engine routes through this function, so the
    /// rounding behavior is uniform across the cart.
    ///
    /// ## Implementation
    /// We use integer math: `(amount * rate + 5000) / 10000`
    /// The +5000 provides rounding (5000/10000 = 0.5)
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::{Money, Rate};
    ///
    /// let price = Money::from_minor(200_000); // 2000.00
    /// let rate = Rate::from_bps(1000);        // 10%
    ///
    /// // 2000.00 × 10% = 200.00
    /// assert_eq!(price.percent_of(rate).minor(), 20_000);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Unit price: 2000.00
    ///      │
    ///      ▼
    /// percent_of(10%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Discount: 200.00
    ///      │
    ///      ▼
    /// Charged price: 1800.00
    /// ```
    pub fn percent_of(&self, rate: Rate) -> Money {
        // Use i128 to prevent overflow on large amounts
        // rate.bps() is basis points: 825 = 8.25%
        // Formula: amount_minor * bps / 10000
        // With rounding: (amount_minor * bps + 5000) / 10000
        let part = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(clamp_minor(part))
    }

    /// Multiplies money by a quantity, saturating at the i64 limits.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(299); // 2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.minor(), 897); // 8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(clamp_minor(self.0 as i128 * qty as i128))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable decimal format.
///
/// ## Note
/// This is for debugging and logs. Use caller-side formatting for actual
/// UI display to handle currency symbols and localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values; saturates at the i64 limits.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

/// Subtraction of two Money values; saturates at the i64 limits.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        self.multiply_quantity(qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A percentage rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (a typical product discount)
/// 825 bps = 8.25% (a typical sales tax)
///
/// One type serves discounts, taxes, and coupons so percent math is
/// identical everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
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

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
