//! # Line Pricing
//!
//! Computes the priced snapshot a cart line stores: discounted unit price,
//! per-unit tax, and line shipping.
//!
//! ## Snapshot Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  compute_line_snapshot(product, qty)                    │
//! │                                                                         │
//! │   requested qty ──► clamp to ≥ 1 ──► stock check ──► OutOfStock?       │
//! │                                          │                              │
//! │                                          ▼                              │
//! │   unit price ──► apply product discount ──► discounted unit price      │
//! │                                          │                              │
//! │                                          ▼                              │
//! │   tax rule ──► percent of discounted price, or flat ──► unit tax       │
//! │                                          │                              │
//! │                                          ▼                              │
//! │   shipping ──► × qty only when flagged ──► line shipping               │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                 LineSnapshot { price, tax, shipping, qty }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The snapshot is recomputed from current product data on every add and
//! every merge. A line never keeps yesterday's price once the shopper
//! touches it again.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Adjustment, Product};

// =============================================================================
// Line Snapshot
// =============================================================================

/// The priced state of one cart line, frozen at add/merge time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    /// Discounted unit price. May be negative when a flat discount
    /// exceeds the unit price; no floor is applied here.
    pub unit_price: Money,

    /// Tax per unit. Percent taxes are taken of the discounted price;
    /// flat taxes are the configured amount, never scaled.
    pub unit_tax: Money,

    /// Shipping for the whole line. Already multiplied by quantity when
    /// the product is flagged for per-unit shipping.
    pub shipping: Money,

    /// Clamped quantity the snapshot was computed for. Always ≥ 1.
    pub quantity: i64,
}

impl LineSnapshot {
    /// Total the line contributes to the cart:
    /// `(price + tax) × quantity + shipping`.
    ///
    /// Shipping is NOT multiplied here. It was either multiplied already
    /// (per-unit shipping) or applies once per line (flat shipping).
    pub fn line_total(&self) -> Money {
        (self.unit_price + self.unit_tax).multiply_quantity(self.quantity) + self.shipping
    }
}

// =============================================================================
// Snapshot Computation
// =============================================================================

/// Computes the priced snapshot for `product` at `requested_quantity`.
///
/// ## Rules
/// 1. Quantity below one is clamped to one, never rejected.
/// 2. Stock-tracked products fail with [`CoreError::OutOfStock`] when the
///    clamped quantity exceeds the available stock.
/// 3. The product discount reduces the unit price. The result is not
///    floored: a flat discount above the unit price produces a negative
///    price the merchant configured, not an error.
/// 4. Percent tax applies to the discounted price. Flat tax is a per-unit
///    amount and does not scale with price.
/// 5. Shipping multiplies by quantity only when the product says so.
///
/// ## Example
/// ```rust
/// use bazaar_core::pricing::compute_line_snapshot;
/// # use bazaar_core::types::{AdjustmentKind, Product};
/// # use chrono::Utc;
/// # let product = Product {
/// #     id: "p".into(), sku: "TEE".into(), name: "Tee".into(),
/// #     unit_price_minor: 200_000,
/// #     discount_value: 1000, discount_kind: AdjustmentKind::Percent,
/// #     tax_value: 500, tax_kind: AdjustmentKind::Percent,
/// #     shipping_cost_minor: 20_000, shipping_quantity_multiplied: false,
/// #     current_stock: 0, weight_grams: 300, published: true, approved: true,
/// #     created_at: Utc::now(), updated_at: Utc::now(),
/// # };
///
/// let snapshot = compute_line_snapshot(&product, 2).unwrap();
/// assert_eq!(snapshot.unit_price.minor(), 180_000); // 10% off 2000.00
/// assert_eq!(snapshot.unit_tax.minor(), 9_000);     // 5% of 1800.00
/// assert_eq!(snapshot.shipping.minor(), 20_000);    // flat, not × 2
/// ```
pub fn compute_line_snapshot(product: &Product, requested_quantity: i64) -> CoreResult<LineSnapshot> {
    // Rule 1: clamp before anything else so the stock check sees the
    // quantity that would actually be stored
    let quantity = requested_quantity.max(1);

    // Rule 2: stock check against the clamped quantity
    let policy = product.stock_policy();
    if !policy.allows(quantity) {
        return Err(CoreError::OutOfStock {
            sku: product.sku.clone(),
            available: policy.available().unwrap_or(0),
            requested: quantity,
        });
    }

    // Rule 3: discounted unit price, no floor
    let unit_price = match product.discount() {
        Some(discount) => product.unit_price() - discount.amount_of(product.unit_price()),
        None => product.unit_price(),
    };

    // Rule 4: tax off the discounted price (percent) or fixed (flat)
    let unit_tax = match product.tax() {
        Some(Adjustment::Percent(rate)) => unit_price.percent_of(rate),
        Some(Adjustment::Flat(amount)) => amount,
        None => Money::zero(),
    };

    // Rule 5: shipping scales with quantity only when flagged
    let shipping = if product.shipping_quantity_multiplied {
        product.shipping_cost().multiply_quantity(quantity)
    } else {
        product.shipping_cost()
    };

    Ok(LineSnapshot {
        unit_price,
        unit_tax,
        shipping,
        quantity,
    })
}

/// Merges an add into an existing line and reprices the whole line.
///
/// The combined quantity goes through [`compute_line_snapshot`]: the stock
/// check runs against the combined quantity, and price, tax, and shipping
/// are re-read from the product as it is now. Stale snapshots on the
/// existing line are overwritten, not preserved.
///
/// Adding zero re-snapshots the line without growing it. The delta itself
/// is never clamped; only the combined quantity is held to at least one
/// inside [`compute_line_snapshot`], so a degenerate sum cannot store an
/// empty line.
pub fn merge_quantity(
    existing_quantity: i64,
    product: &Product,
    added_quantity: i64,
) -> CoreResult<LineSnapshot> {
    compute_line_snapshot(product, existing_quantity.saturating_add(added_quantity))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AdjustmentKind;
    use chrono::Utc;

    fn product() -> Product {
        Product {
            id: "550e8400-e29b-41d4-a716-446655440000".into(),
            sku: "TEE-BLK-M".into(),
            name: "Black Tee (M)".into(),
            unit_price_minor: 200_000,
            discount_value: 0,
            discount_kind: AdjustmentKind::Percent,
            tax_value: 0,
            tax_kind: AdjustmentKind::Percent,
            shipping_cost_minor: 0,
            shipping_quantity_multiplied: false,
            current_stock: 0,
            weight_grams: 300,
            published: true,
            approved: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_plain_product_snapshot() {
        let snapshot = compute_line_snapshot(&product(), 1).unwrap();
        assert_eq!(snapshot.unit_price.minor(), 200_000);
        assert_eq!(snapshot.unit_tax.minor(), 0);
        assert_eq!(snapshot.shipping.minor(), 0);
        assert_eq!(snapshot.quantity, 1);
    }

    #[test]
    fn test_percent_discount() {
        let mut p = product();
        p.discount_value = 1000; // 10%
        let snapshot = compute_line_snapshot(&p, 1).unwrap();
        assert_eq!(snapshot.unit_price.minor(), 180_000);
    }

    #[test]
    fn test_flat_discount() {
        let mut p = product();
        p.discount_value = 15_000;
        p.discount_kind = AdjustmentKind::Flat;
        let snapshot = compute_line_snapshot(&p, 1).unwrap();
        assert_eq!(snapshot.unit_price.minor(), 185_000);
    }

    #[test]
    fn test_flat_discount_can_push_price_negative() {
        let mut p = product();
        p.unit_price_minor = 10_000;
        p.discount_value = 15_000;
        p.discount_kind = AdjustmentKind::Flat;
        let snapshot = compute_line_snapshot(&p, 1).unwrap();
        // No floor: the configured discount wins
        assert_eq!(snapshot.unit_price.minor(), -5_000);
    }

    #[test]
    fn test_percent_tax_applies_to_discounted_price() {
        let mut p = product();
        p.discount_value = 1000; // 10% → 180000
        p.tax_value = 500; // 5%
        let snapshot = compute_line_snapshot(&p, 1).unwrap();
        // 5% of 180000, not of 200000
        assert_eq!(snapshot.unit_tax.minor(), 9_000);
    }

    #[test]
    fn test_flat_tax_not_scaled() {
        let mut p = product();
        p.tax_value = 2_500;
        p.tax_kind = AdjustmentKind::Flat;
        let snapshot = compute_line_snapshot(&p, 4).unwrap();
        // Flat tax is per unit; the snapshot stores it unscaled
        assert_eq!(snapshot.unit_tax.minor(), 2_500);
        assert_eq!(snapshot.quantity, 4);
    }

    #[test]
    fn test_flat_shipping_not_multiplied() {
        let mut p = product();
        p.shipping_cost_minor = 20_000;
        let snapshot = compute_line_snapshot(&p, 2).unwrap();
        assert_eq!(snapshot.shipping.minor(), 20_000);
    }

    #[test]
    fn test_per_unit_shipping_multiplied() {
        let mut p = product();
        p.shipping_cost_minor = 20_000;
        p.shipping_quantity_multiplied = true;
        let snapshot = compute_line_snapshot(&p, 2).unwrap();
        assert_eq!(snapshot.shipping.minor(), 40_000);
    }

    #[test]
    fn test_quantity_clamped_to_one() {
        assert_eq!(compute_line_snapshot(&product(), 0).unwrap().quantity, 1);
        assert_eq!(compute_line_snapshot(&product(), -5).unwrap().quantity, 1);
    }

    #[test]
    fn test_zero_stock_means_unlimited() {
        let p = product(); // current_stock: 0
        assert!(compute_line_snapshot(&p, 1_000_000).is_ok());
    }

    #[test]
    fn test_out_of_stock() {
        let mut p = product();
        p.current_stock = 3;
        let err = compute_line_snapshot(&p, 5).unwrap_err();
        match err {
            CoreError::OutOfStock {
                sku,
                available,
                requested,
            } => {
                assert_eq!(sku, "TEE-BLK-M");
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("expected OutOfStock, got {other:?}"),
        }
    }

    #[test]
    fn test_stock_boundary_allows_exact() {
        let mut p = product();
        p.current_stock = 3;
        assert!(compute_line_snapshot(&p, 3).is_ok());
    }

    #[test]
    fn test_line_total_flat_shipping() {
        let mut p = product();
        p.discount_value = 1000; // price 180000
        p.tax_value = 500; // tax 9000
        p.shipping_cost_minor = 20_000;
        let snapshot = compute_line_snapshot(&p, 2).unwrap();
        // (180000 + 9000) × 2 + 20000
        assert_eq!(snapshot.line_total().minor(), 398_000);
    }

    #[test]
    fn test_merge_reprices_combined_quantity() {
        let mut p = product();
        p.discount_value = 1000;
        let snapshot = merge_quantity(1, &p, 1).unwrap();
        assert_eq!(snapshot.quantity, 2);
        assert_eq!(snapshot.unit_price.minor(), 180_000);
    }

    #[test]
    fn test_merge_zero_added_keeps_quantity() {
        let mut p = product();
        let snapshot = merge_quantity(3, &p, 0).unwrap();
        assert_eq!(snapshot.quantity, 3);

        // The quantity stands still but the snapshot is still re-read
        p.unit_price_minor = 150_000;
        let refreshed = merge_quantity(3, &p, 0).unwrap();
        assert_eq!(refreshed.quantity, 3);
        assert_eq!(refreshed.unit_price.minor(), 150_000);
    }

    #[test]
    fn test_merge_degenerate_sum_clamps_to_one() {
        // The delta is not clamped; the combined quantity is
        let snapshot = merge_quantity(1, &product(), -5).unwrap();
        assert_eq!(snapshot.quantity, 1);
    }

    #[test]
    fn test_merge_checks_stock_against_combined() {
        let mut p = product();
        p.current_stock = 3;
        let err = merge_quantity(2, &p, 2).unwrap_err();
        match err {
            CoreError::OutOfStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("expected OutOfStock, got {other:?}"),
        }
    }

    #[test]
    fn test_extreme_quantity_saturates() {
        let mut p = product();
        p.shipping_cost_minor = 20_000;
        p.shipping_quantity_multiplied = true;

        let snapshot = compute_line_snapshot(&p, i64::MAX / 2).unwrap();
        assert_eq!(snapshot.quantity, i64::MAX / 2);
        assert_eq!(snapshot.shipping.minor(), i64::MAX);
        assert_eq!(snapshot.line_total().minor(), i64::MAX);
    }

    #[test]
    fn test_merge_picks_up_current_price() {
        // The product changed since the line was created; merge re-reads it
        let mut p = product();
        let before = compute_line_snapshot(&p, 1).unwrap();
        assert_eq!(before.unit_price.minor(), 200_000);

        p.unit_price_minor = 150_000;
        let merged = merge_quantity(before.quantity, &p, 1).unwrap();
        assert_eq!(merged.unit_price.minor(), 150_000);
    }
}
