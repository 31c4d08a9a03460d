//! # Cart Views
//!
//! Serializable shapes returned to storefront callers.
//!
//! ## View Assembly
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    From Rows to Response                                │
//! │                                                                         │
//! │  bazaar-db                      bazaar-core            this module      │
//! │  ─────────                      ───────────            ───────────      │
//! │                                                                         │
//! │  CartLineWithProduct ──┬─────► AggregateLine ──┐                        │
//! │  CartLineWithProduct ──┤       AggregateLine ──┼──► aggregate()         │
//! │  CartLineWithProduct ──┘       AggregateLine ──┘         │              │
//! │          │                                               ▼              │
//! │          └────────────────► CartLineView ──────────► CartView           │
//! │                             (one per row)            { lines,           │
//! │                                                        couponCode,      │
//! │                                                        totals }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Notes
//! - All money fields are integer minor units, mirroring the domain types.
//! - `unitPriceMinor` is the **effective** price: the frozen snapshot, or
//!   the live product price for legacy rows that predate snapshotting.
//! - Field names are camelCase so the JSON needs no client-side mapping.

use serde::{Deserialize, Serialize};

use bazaar_core::{CartTotals, LineSnapshot, Money, Product, Variation};
use bazaar_db::CartLineWithProduct;

/// One cart line as the storefront sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    /// Line ID (UUID)
    pub id: String,

    /// Product ID (UUID), for navigation back to the product page
    pub product_id: String,

    /// SKU of the underlying product
    pub sku: String,

    /// Product name
    pub name: String,

    /// The chosen variation attributes (empty map for plain products)
    pub variation: Variation,

    /// Quantity in cart
    pub quantity: i64,

    /// Effective unit price in minor units (snapshot, or live fallback)
    pub unit_price_minor: i64,

    /// Per-unit tax in minor units, frozen at snapshot time
    pub unit_tax_minor: i64,

    /// Shipping for the whole line in minor units
    pub shipping_minor: i64,

    /// (price + tax) × quantity + shipping, in minor units
    pub line_total_minor: i64,

    /// Coupon code stamped on this line, if any
    pub coupon_code: Option<String>,
}

impl CartLineView {
    /// Builds a view from a stored line joined with its product.
    pub fn from_row(row: &CartLineWithProduct) -> Self {
        let unit_price = row
            .line
            .price()
            .unwrap_or(Money::from_minor(row.p_unit_price_minor));
        let line_total = (unit_price + row.line.tax()).multiply_quantity(row.line.quantity)
            + row.line.shipping();

        CartLineView {
            id: row.line.id.clone(),
            product_id: row.line.product_id.clone(),
            sku: row.p_sku.clone(),
            name: row.p_name.clone(),
            variation: Variation::from_signature(&row.line.variation_sig)
                .unwrap_or_else(Variation::new),
            quantity: row.line.quantity,
            unit_price_minor: unit_price.minor(),
            unit_tax_minor: row.line.tax().minor(),
            shipping_minor: row.line.shipping().minor(),
            line_total_minor: line_total.minor(),
            coupon_code: row.line.coupon_code.clone(),
        }
    }

    /// Builds a view from a freshly computed snapshot.
    ///
    /// Used by mutations, which already hold the product and the snapshot
    /// and should not re-read the row they just wrote.
    pub fn from_snapshot(
        line_id: &str,
        product: &Product,
        variation: &Variation,
        snapshot: &LineSnapshot,
        coupon_code: Option<String>,
    ) -> Self {
        CartLineView {
            id: line_id.to_string(),
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            variation: variation.clone(),
            quantity: snapshot.quantity,
            unit_price_minor: snapshot.unit_price.minor(),
            unit_tax_minor: snapshot.unit_tax.minor(),
            shipping_minor: snapshot.shipping.minor(),
            line_total_minor: snapshot.line_total().minor(),
            coupon_code,
        }
    }
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsView {
    /// Number of active lines
    pub item_count: u32,

    /// Sum of quantities across all lines
    pub total_quantity: i64,

    pub subtotal_minor: i64,
    pub tax_minor: i64,
    pub shipping_minor: i64,

    /// Product-level discount total. Reported for display only; the
    /// grand total already reflects discounted snapshot prices.
    pub line_discount_minor: i64,

    /// Coupon discount actually subtracted from the grand total
    pub coupon_discount_minor: i64,

    pub grand_total_minor: i64,

    /// Total shipment weight in grams
    pub weight_grams: i64,
}

/// The whole cart: lines plus the money summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// Active lines in insertion order
    pub lines: Vec<CartLineView>,

    /// The coupon the cart-level discount came from, if any
    pub coupon_code: Option<String>,

    /// Aggregated totals
    pub totals: TotalsView,
}

impl CartView {
    /// Assembles the response from per-line views and computed totals.
    pub fn new(lines: Vec<CartLineView>, coupon_code: Option<String>, totals: &CartTotals) -> Self {
        let totals = TotalsView {
            item_count: lines.len() as u32,
            total_quantity: lines.iter().fold(0i64, |sum, l| sum.saturating_add(l.quantity)),
            subtotal_minor: totals.subtotal.minor(),
            tax_minor: totals.tax.minor(),
            shipping_minor: totals.shipping.minor(),
            line_discount_minor: totals.line_discount.minor(),
            coupon_discount_minor: totals.coupon_discount.minor(),
            grand_total_minor: totals.grand_total.minor(),
            weight_grams: totals.weight_grams,
        };

        CartView {
            lines,
            coupon_code,
            totals,
        }
    }
}

/// Result of a cart mutation: the touched line plus the new line count.
///
/// Mutations return this instead of the whole cart so the storefront can
/// update its badge without paying for a full re-aggregation it may not
/// need. `GET /cart` (= [`view_cart`](crate::CartService::view_cart))
/// remains the one place totals come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutation {
    /// The line that was created or updated
    pub line: CartLineView,

    /// Number of active lines in the cart after the mutation
    pub item_count: u32,
}
