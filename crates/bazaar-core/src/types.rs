//! # Domain Types
//!
//! Core domain types used throughout the Bazaar cart engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │   Adjustment    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  Percent(Rate)  │       │
//! │  │  sku (business) │   │  user_id        │   │  Flat(Money)    │       │
//! │  │  unit_price     │   │  variation_sig  │   └─────────────────┘       │
//! │  │  discount/tax   │   │  price snapshot │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   StockPolicy   │   │   LineStatus    │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Unlimited      │   │  Active         │                             │
//! │  │  Limited(n)     │   │  Inactive       │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, coupon code, etc.) - human-readable, potentially mutable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};

// =============================================================================
// Adjustment
// =============================================================================

/// How an adjustment value is interpreted.
///
/// Products store discount and tax as a raw integer plus one of these kinds.
/// `Percent` values are basis points (1000 = 10%), `Flat` values are minor
/// units of currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Value is a rate in basis points, applied to a base amount.
    Percent,
    /// Value is a fixed amount in minor units.
    Flat,
}

/// A price adjustment attached to a product: either a percentage of some
/// base amount or a fixed amount of money.
///
/// Both discounts and taxes are adjustments; only the base they apply to
/// differs (discounts apply to the unit price, percent taxes apply to the
/// already-discounted price).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Adjustment {
    Percent(Rate),
    Flat(Money),
}

impl Adjustment {
    /// Builds an adjustment from its storage encoding.
    ///
    /// Returns `None` when `value` is zero or negative: a non-positive
    /// adjustment means "no adjustment configured", never a negative one.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::types::{Adjustment, AdjustmentKind};
    ///
    /// assert!(Adjustment::from_raw(1000, AdjustmentKind::Percent).is_some());
    /// assert!(Adjustment::from_raw(0, AdjustmentKind::Percent).is_none());
    /// assert!(Adjustment::from_raw(-500, AdjustmentKind::Flat).is_none());
    /// ```
    pub fn from_raw(value: i64, kind: AdjustmentKind) -> Option<Adjustment> {
        if value <= 0 {
            return None;
        }
        match kind {
            AdjustmentKind::Percent => Some(Adjustment::Percent(Rate::from_bps(value as u32))),
            AdjustmentKind::Flat => Some(Adjustment::Flat(Money::from_minor(value))),
        }
    }

    /// Resolves the adjustment against a base amount.
    ///
    /// Percent adjustments take their share of `base`; flat adjustments
    /// ignore `base` entirely.
    pub fn amount_of(&self, base: Money) -> Money {
        match self {
            Adjustment::Percent(rate) => base.percent_of(*rate),
            Adjustment::Flat(amount) => *amount,
        }
    }
}

// =============================================================================
// Stock Policy
// =============================================================================

/// How stock limits apply to a product.
///
/// Storage encodes this as a single integer where zero or less means the
/// product is not stock-tracked. The raw integer never travels past the
/// row mapping; everything downstream sees one of the two variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockPolicy {
    /// No stock tracking: any quantity may be ordered.
    Unlimited,
    /// At most this many units may be ordered.
    Limited(i64),
}

impl StockPolicy {
    /// Decodes the storage encoding: positive = limited, otherwise unlimited.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        if raw > 0 {
            StockPolicy::Limited(raw)
        } else {
            StockPolicy::Unlimited
        }
    }

    /// Whether `quantity` units can be ordered under this policy.
    #[inline]
    pub const fn allows(&self, quantity: i64) -> bool {
        match self {
            StockPolicy::Unlimited => true,
            StockPolicy::Limited(available) => quantity <= *available,
        }
    }

    /// The available units, if limited.
    #[inline]
    pub const fn available(&self) -> Option<i64> {
        match self {
            StockPolicy::Unlimited => None,
            StockPolicy::Limited(available) => Some(*available),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as the pricing engine sees it.
///
/// Fields carry the storage encoding (raw integers and kind tags); the
/// accessor methods below decode them into the typed forms the pricing
/// functions consume. Price-affecting attributes are read fresh from here
/// on every add and merge, so a line always re-snapshots current pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown in the cart.
    pub name: String,

    /// Base unit price in minor units.
    pub unit_price_minor: i64,

    /// Discount value: bps when percent, minor units when flat.
    pub discount_value: i64,

    /// How to interpret `discount_value`.
    pub discount_kind: AdjustmentKind,

    /// Tax value: bps when percent, minor units when flat.
    pub tax_value: i64,

    /// How to interpret `tax_value`.
    pub tax_kind: AdjustmentKind,

    /// Shipping cost in minor units.
    pub shipping_cost_minor: i64,

    /// Whether shipping cost multiplies by quantity.
    pub shipping_quantity_multiplied: bool,

    /// Current stock level. Zero or less means not stock-tracked.
    pub current_stock: i64,

    /// Unit weight in grams (carts report total shipment weight).
    pub weight_grams: i64,

    /// Whether the merchant has published the product.
    pub published: bool,

    /// Whether moderation has approved the product.
    pub approved: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_price_minor)
    }

    /// Returns the configured discount, if any.
    #[inline]
    pub fn discount(&self) -> Option<Adjustment> {
        Adjustment::from_raw(self.discount_value, self.discount_kind)
    }

    /// Returns the configured tax, if any.
    #[inline]
    pub fn tax(&self) -> Option<Adjustment> {
        Adjustment::from_raw(self.tax_value, self.tax_kind)
    }

    /// Returns the shipping cost as Money.
    #[inline]
    pub fn shipping_cost(&self) -> Money {
        Money::from_minor(self.shipping_cost_minor)
    }

    /// Returns the stock policy decoded from the raw stock level.
    #[inline]
    pub fn stock_policy(&self) -> StockPolicy {
        StockPolicy::from_raw(self.current_stock)
    }

    /// Checks if the product can be put in a cart at all.
    ///
    /// Both the merchant (published) and moderation (approved) must have
    /// signed off; stock is checked separately per requested quantity.
    #[inline]
    pub fn is_orderable(&self) -> bool {
        self.published && self.approved
    }
}

// =============================================================================
// Line Status
// =============================================================================

/// The lifecycle status of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    /// Line is in the shopper's open cart.
    Active,
    /// Line has left the cart (checked out or retired).
    Inactive,
}

impl Default for LineStatus {
    fn default() -> Self {
        LineStatus::Active
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One line of a shopper's cart.
///
/// Identity is the triple (user_id, product_id, variation_sig): adding the
/// same product with the same variation merges into the existing line
/// instead of creating a second one.
///
/// Pricing fields are a snapshot computed by the pricing module; they are
/// refreshed from current product data on every add and merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    /// Canonical JSON signature of the chosen variation (sorted keys).
    pub variation_sig: String,
    pub quantity: i64,
    /// Discounted unit price in minor units at snapshot time.
    /// `None` only on legacy rows; aggregation falls back to live price.
    pub price_minor: Option<i64>,
    /// Per-unit tax in minor units at snapshot time.
    pub tax_minor: i64,
    /// Shipping for the whole line in minor units at snapshot time.
    pub shipping_minor: i64,
    /// Coupon code attached to this line, if any.
    pub coupon_code: Option<String>,
    /// Whether the attached coupon has been validated and applied.
    pub coupon_applied: bool,
    pub status: LineStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartLine {
    /// Returns the snapshot unit price as Money, if present.
    #[inline]
    pub fn price(&self) -> Option<Money> {
        self.price_minor.map(Money::from_minor)
    }

    /// Returns the snapshot per-unit tax as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_minor(self.tax_minor)
    }

    /// Returns the snapshot line shipping as Money.
    #[inline]
    pub fn shipping(&self) -> Money {
        Money::from_minor(self.shipping_minor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_from_raw_percent() {
        let adj = Adjustment::from_raw(1000, AdjustmentKind::Percent);
        assert_eq!(adj, Some(Adjustment::Percent(Rate::from_bps(1000))));
    }

    #[test]
    fn test_adjustment_from_raw_flat() {
        let adj = Adjustment::from_raw(500, AdjustmentKind::Flat);
        assert_eq!(adj, Some(Adjustment::Flat(Money::from_minor(500))));
    }

    #[test]
    fn test_adjustment_from_raw_non_positive() {
        assert_eq!(Adjustment::from_raw(0, AdjustmentKind::Percent), None);
        assert_eq!(Adjustment::from_raw(-100, AdjustmentKind::Flat), None);
    }

    #[test]
    fn test_adjustment_amount_of() {
        let percent = Adjustment::Percent(Rate::from_bps(1000));
        assert_eq!(percent.amount_of(Money::from_minor(200_000)).minor(), 20_000);

        let flat = Adjustment::Flat(Money::from_minor(500));
        assert_eq!(flat.amount_of(Money::from_minor(200_000)).minor(), 500);
    }

    #[test]
    fn test_stock_policy_from_raw() {
        assert_eq!(StockPolicy::from_raw(0), StockPolicy::Unlimited);
        assert_eq!(StockPolicy::from_raw(-3), StockPolicy::Unlimited);
        assert_eq!(StockPolicy::from_raw(7), StockPolicy::Limited(7));
    }

    #[test]
    fn test_stock_policy_allows() {
        assert!(StockPolicy::Unlimited.allows(1_000_000));
        assert!(StockPolicy::Limited(5).allows(5));
        assert!(!StockPolicy::Limited(5).allows(6));
    }

    #[test]
    fn test_line_status_default() {
        assert_eq!(LineStatus::default(), LineStatus::Active);
    }
}
