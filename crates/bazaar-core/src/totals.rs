//! # Cart Totals
//!
//! Aggregates stored cart lines into the money summary a cart page shows.
//!
//! ## Aggregation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    aggregate(lines, coupon)                             │
//! │                                                                         │
//! │  per line:  price × qty ─────────────► subtotal                        │
//! │             tax × qty ───────────────► tax                             │
//! │             shipping (as stored) ────► shipping                       │
//! │             live discount × qty ─────► line_discount (reported)        │
//! │             weight × qty ────────────► weight_grams                    │
//! │                                                                         │
//! │  coupon:    discount of subtotal ────► capped to [0, subtotal]         │
//! │                                                                         │
//! │  grand_total = subtotal + tax + shipping − coupon_discount  (≥ 0)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `line_discount` is informational. The stored line price already carries
//! the product discount from snapshot time, so the grand total never
//! subtracts `line_discount` again. The reported figure is recomputed from
//! the product's *current* discount against the *discounted* line subtotal,
//! so it can drift from the discount that was actually baked in. That
//! drift matches the behavior carts have always shown here and is kept
//! deliberately.

use serde::{Deserialize, Serialize};

use crate::coupon::Coupon;
use crate::money::Money;
use crate::types::Adjustment;

// =============================================================================
// Aggregate Line
// =============================================================================

/// One cart line as the aggregator consumes it: the stored snapshot plus
/// the live product attributes the summary needs.
///
/// The storage layer builds these from a line/product join; tests build
/// them directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateLine {
    pub quantity: i64,

    /// Snapshot unit price. `None` on legacy rows that predate price
    /// snapshots; aggregation falls back to `live_unit_price`.
    pub price: Option<Money>,

    /// Snapshot per-unit tax.
    pub tax: Money,

    /// Snapshot shipping for the whole line (already quantity-adjusted
    /// where the product called for it).
    pub shipping: Money,

    /// Coupon code attached to this line, if any.
    pub coupon_code: Option<String>,

    /// Whether that coupon was validated and applied.
    pub coupon_applied: bool,

    /// The product's current base unit price.
    pub live_unit_price: Money,

    /// The product's current discount, for the reported savings figure.
    pub live_discount: Option<Adjustment>,

    /// The product's current unit weight in grams.
    pub weight_grams: i64,
}

impl AggregateLine {
    /// Unit price used for totals: the snapshot, or the live price when
    /// the snapshot is missing.
    #[inline]
    pub fn effective_unit_price(&self) -> Money {
        self.price.unwrap_or(self.live_unit_price)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// The money summary for a whole cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of line price × quantity.
    pub subtotal: Money,

    /// Sum of line tax × quantity.
    pub tax: Money,

    /// Sum of line shipping.
    pub shipping: Money,

    /// Reported product-discount savings. Informational only; already
    /// baked into `subtotal` via the snapshot prices.
    pub line_discount: Money,

    /// Coupon discount actually subtracted from the grand total.
    /// Never negative, never more than `subtotal`.
    pub coupon_discount: Money,

    /// `subtotal + tax + shipping − coupon_discount`, floored at zero.
    pub grand_total: Money,

    /// Total shipment weight in grams.
    pub weight_grams: i64,
}

impl CartTotals {
    /// Totals of the empty cart: all zero.
    pub fn empty() -> Self {
        CartTotals {
            subtotal: Money::zero(),
            tax: Money::zero(),
            shipping: Money::zero(),
            line_discount: Money::zero(),
            coupon_discount: Money::zero(),
            grand_total: Money::zero(),
            weight_grams: 0,
        }
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Finds the coupon code the cart as a whole is redeeming.
///
/// The cart-wide coupon is whichever code the first coupon-bearing line
/// carries, in the order lines are given (storage orders by creation
/// time). Lines whose coupon was attached but never validated do not
/// count.
pub fn applied_coupon_code(lines: &[AggregateLine]) -> Option<&str> {
    lines
        .iter()
        .filter(|line| line.coupon_applied)
        .find_map(|line| line.coupon_code.as_deref())
}

/// Rolls cart lines up into [`CartTotals`].
///
/// `coupon` is the resolved coupon for [`applied_coupon_code`], or `None`
/// when the cart has no applied coupon or the code no longer resolves
/// (deleted coupons silently contribute nothing).
///
/// ## Coupon Capping
/// The coupon discount is clamped into `[0, subtotal]`: it can erase the
/// merchandise subtotal but never eats into tax or shipping, and a
/// negative subtotal yields no coupon discount at all.
pub fn aggregate(lines: &[AggregateLine], coupon: Option<&Coupon>) -> CartTotals {
    let mut subtotal = Money::zero();
    let mut tax = Money::zero();
    let mut shipping = Money::zero();
    let mut line_discount = Money::zero();
    let mut weight_grams: i64 = 0;

    for line in lines {
        let line_subtotal = line.effective_unit_price().multiply_quantity(line.quantity);
        subtotal += line_subtotal;
        tax += line.tax.multiply_quantity(line.quantity);
        shipping += line.shipping;
        weight_grams =
            weight_grams.saturating_add(line.weight_grams.saturating_mul(line.quantity));

        if let Some(discount) = line.live_discount {
            line_discount += match discount {
                Adjustment::Percent(rate) => line_subtotal.percent_of(rate),
                Adjustment::Flat(amount) => amount.multiply_quantity(line.quantity),
            };
        }
    }

    let coupon_discount = coupon
        .and_then(|c| c.discount())
        .map(|discount| discount.amount_of(subtotal))
        .map(|amount| amount.min(subtotal).max(Money::zero()))
        .unwrap_or_else(Money::zero);

    let grand_total = (subtotal + tax + shipping - coupon_discount).max(Money::zero());

    CartTotals {
        subtotal,
        tax,
        shipping,
        line_discount,
        coupon_discount,
        grand_total,
        weight_grams,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
