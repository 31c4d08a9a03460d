//! # Cart Service
//!
//! Orchestrates cart mutations and reads over the database layer.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Add-to-Cart Flow                                     │
//! │                                                                         │
//! │  add_to_cart(user, product, variation, qty)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Validate inputs ──► Load product (pool) ──► orderable?                 │
//! │       │                                          │                      │
//! │       │                                          ▼                      │
//! │       │                                 ┌─── BEGIN TX ───────────────┐  │
//! │       │                                 │ find_active(identity)      │  │
//! │       │                                 │   ├─ Some ─► merge + stock │  │
//! │       │                                 │   │          update row    │  │
//! │       │                                 │   └─ None ─► snapshot      │  │
//! │       │                                 │              insert row    │  │
//! │       │                                 └─── COMMIT ─────────────────┘  │
//! │       │                                          │                      │
//! │       ▼                                          ▼                      │
//! │  CartError ◄──────────────────────────── CartMutation { line, count }   │
//! │                                                                         │
//! │  NOTE: Product reads and the final line count run on the pool, never    │
//! │        while the transaction is open.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing Responsibility
//! This module never does money math. Snapshots come from
//! [`bazaar_core::pricing`], totals from [`bazaar_core::totals`]; the
//! service wires rows to those functions and persists the results.

use chrono::Utc;
use tracing::{debug, info, warn};

use bazaar_core::validation::{
    validate_coupon_code, validate_product_id, validate_user_id, validate_variation,
};
use bazaar_core::{
    aggregate, applied_coupon_code, compute_line_snapshot, merge_quantity, CartLine, CartTotals,
    CoreError, LineStatus, Variation,
};
use bazaar_db::repository::cart_line::generate_line_id;
use bazaar_db::{Database, DbError};

use crate::error::{CartError, CartResult};
use crate::view::{CartLineView, CartMutation, CartView};

/// The cart engine's public surface.
///
/// One instance per process; it is cheap to clone (the pool inside the
/// [`Database`] handle is reference-counted).
#[derive(Debug, Clone)]
pub struct CartService {
    db: Database,
}

impl CartService {
    /// Creates a new cart service over an initialized database.
    pub fn new(db: Database) -> Self {
        CartService { db }
    }

    /// Adds a product to a user's cart, merging into an existing line when
    /// the (user, product, variation) identity already has one.
    ///
    /// ## Behavior
    /// - A fresh line stores at least quantity 1, never rejecting the add
    /// - Merges add the requested amount as-is; adding zero re-snapshots
    ///   the line without growing it. Price, tax and shipping are re-read
    ///   from the product as it is now, and the stock check runs against
    ///   the combined quantity
    /// - Lookup, merge and write happen inside one transaction
    ///
    /// ## Returns
    /// The created or updated line plus the new active-line count.
    pub async fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        variation: &Variation,
        quantity: i64,
    ) -> CartResult<CartMutation> {
        validate_user_id(user_id).map_err(CoreError::from)?;
        validate_product_id(product_id).map_err(CoreError::from)?;
        validate_variation(variation).map_err(CoreError::from)?;

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CartError::product_unavailable(product_id))?;

        if !product.is_orderable() {
            warn!(product_id = %product_id, "Rejected add: product not orderable");
            return Err(CartError::product_unavailable(product_id));
        }

        let sig = variation.signature();
        let lines = self.db.cart_lines();

        let mut tx = self.db.begin().await?;

        let existing = lines.find_active(&mut tx, user_id, product_id, &sig).await?;

        let (line_id, coupon_code, snapshot) = match existing {
            Some(line) => {
                debug!(line_id = %line.id, "Merging into existing line");
                let snapshot = merge_quantity(line.quantity, &product, quantity)?;
                lines
                    .update_snapshot(
                        &mut tx,
                        &line.id,
                        snapshot.quantity,
                        snapshot.unit_price.minor(),
                        snapshot.unit_tax.minor(),
                        snapshot.shipping.minor(),
                    )
                    .await?;
                (line.id, line.coupon_code, snapshot)
            }
            None => {
                let snapshot = compute_line_snapshot(&product, quantity)?;
                let now = Utc::now();
                let line = CartLine {
                    id: generate_line_id(),
                    user_id: user_id.to_string(),
                    product_id: product_id.to_string(),
                    variation_sig: sig,
                    quantity: snapshot.quantity,
                    price_minor: Some(snapshot.unit_price.minor()),
                    tax_minor: snapshot.unit_tax.minor(),
                    shipping_minor: snapshot.shipping.minor(),
                    coupon_code: None,
                    coupon_applied: false,
                    status: LineStatus::Active,
                    created_at: now,
                    updated_at: now,
                };
                lines.insert(&mut tx, &line).await?;
                (line.id, None, snapshot)
            }
        };

        tx.commit().await.map_err(DbError::from)?;

        let item_count = lines.count_active(user_id).await? as u32;

        info!(
            user_id = %user_id,
            product_id = %product_id,
            quantity = snapshot.quantity,
            "Cart line upserted"
        );

        Ok(CartMutation {
            line: CartLineView::from_snapshot(&line_id, &product, variation, &snapshot, coupon_code),
            item_count,
        })
    }

    /// Sets the absolute quantity of an existing line.
    ///
    /// The snapshot is recomputed from the product's current attributes at
    /// the new quantity, with the same stock check as an add. Editing a
    /// line that does not exist is an `INVALID_INPUT` error.
    pub async fn update_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        variation: &Variation,
        quantity: i64,
    ) -> CartResult<CartMutation> {
        validate_user_id(user_id).map_err(CoreError::from)?;
        validate_product_id(product_id).map_err(CoreError::from)?;
        validate_variation(variation).map_err(CoreError::from)?;

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CartError::product_unavailable(product_id))?;

        let sig = variation.signature();
        let lines = self.db.cart_lines();

        let mut tx = self.db.begin().await?;

        let line = lines
            .find_active(&mut tx, user_id, product_id, &sig)
            .await?
            .ok_or_else(|| {
                CartError::invalid_input(format!("No active cart line for product {}", product_id))
            })?;

        let snapshot = compute_line_snapshot(&product, quantity)?;
        lines
            .update_snapshot(
                &mut tx,
                &line.id,
                snapshot.quantity,
                snapshot.unit_price.minor(),
                snapshot.unit_tax.minor(),
                snapshot.shipping.minor(),
            )
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        let item_count = lines.count_active(user_id).await? as u32;

        info!(
            user_id = %user_id,
            product_id = %product_id,
            quantity = snapshot.quantity,
            "Cart line quantity updated"
        );

        Ok(CartMutation {
            line: CartLineView::from_snapshot(
                &line.id,
                &product,
                variation,
                &snapshot,
                line.coupon_code.clone(),
            ),
            item_count,
        })
    }

    /// Removes one line, addressed by its (user, product, variation)
    /// identity. Removing a line that does not exist is an error.
    ///
    /// ## Returns
    /// The number of active lines remaining.
    pub async fn remove_line(
        &self,
        user_id: &str,
        product_id: &str,
        variation: &Variation,
    ) -> CartResult<u32> {
        validate_user_id(user_id).map_err(CoreError::from)?;
        validate_product_id(product_id).map_err(CoreError::from)?;
        validate_variation(variation).map_err(CoreError::from)?;

        let sig = variation.signature();
        let lines = self.db.cart_lines();

        let removed = lines.delete_active(user_id, product_id, &sig).await?;
        if removed == 0 {
            return Err(CartError::invalid_input(format!(
                "No active cart line for product {}",
                product_id
            )));
        }

        let item_count = lines.count_active(user_id).await? as u32;

        info!(user_id = %user_id, product_id = %product_id, "Cart line removed");

        Ok(item_count)
    }

    /// Deletes every active line for the user. Idempotent: clearing an
    /// empty cart succeeds with 0.
    ///
    /// ## Returns
    /// The number of lines removed.
    pub async fn clear_cart(&self, user_id: &str) -> CartResult<u64> {
        validate_user_id(user_id).map_err(CoreError::from)?;

        let removed = self.db.cart_lines().clear_for_user(user_id).await?;

        info!(user_id = %user_id, removed, "Cart cleared");

        Ok(removed)
    }

    /// Reads the whole cart: line views plus aggregated totals.
    ///
    /// ## Coupon Resolution
    /// The applied coupon is the one on the first stamped line in
    /// insertion order. Its current definition is re-read so the discount
    /// tracks coupon edits; a stamp referencing a since-deleted coupon
    /// stays visible but contributes no discount.
    pub async fn view_cart(&self, user_id: &str) -> CartResult<CartView> {
        validate_user_id(user_id).map_err(CoreError::from)?;

        let rows = self.db.cart_lines().list_active_with_products(user_id).await?;

        if rows.is_empty() {
            return Ok(CartView::new(Vec::new(), None, &CartTotals::empty()));
        }

        let agg_lines: Vec<_> = rows.iter().map(|r| r.to_aggregate_line()).collect();
        let coupon_code = applied_coupon_code(&agg_lines).map(str::to_string);

        let coupon = match &coupon_code {
            Some(code) => self.db.coupons().find_by_code(code).await?,
            None => None,
        };

        let totals = aggregate(&agg_lines, coupon.as_ref());
        let line_views = rows.iter().map(CartLineView::from_row).collect();

        debug!(
            user_id = %user_id,
            lines = rows.len(),
            grand_total = totals.grand_total.minor(),
            "Cart viewed"
        );

        Ok(CartView::new(line_views, coupon_code, &totals))
    }

    /// Applies a coupon to the user's cart.
    ///
    /// The code must reference a coupon that is active and inside its
    /// validity window right now. On success every active line is stamped;
    /// applying to an empty cart succeeds and stamps nothing.
    ///
    /// ## Returns
    /// The number of lines stamped.
    pub async fn apply_coupon(&self, user_id: &str, code: &str) -> CartResult<u64> {
        validate_user_id(user_id).map_err(CoreError::from)?;
        let code = validate_coupon_code(code).map_err(CoreError::from)?;

        let coupon = self
            .db
            .coupons()
            .find_by_code(&code)
            .await?
            .ok_or_else(|| CartError::invalid_coupon(&code))?;

        if !coupon.is_valid_at(Utc::now()) {
            warn!(code = %code, "Rejected coupon outside validity window");
            return Err(CartError::invalid_coupon(&code));
        }

        let stamped = self.db.cart_lines().set_coupon(user_id, &code).await?;

        info!(user_id = %user_id, code = %code, stamped, "Coupon applied");

        Ok(stamped)
    }

    /// Clears the coupon stamp from every active line. Idempotent.
    ///
    /// ## Returns
    /// The number of lines cleared.
    pub async fn remove_coupon(&self, user_id: &str) -> CartResult<u64> {
        validate_user_id(user_id).map_err(CoreError::from)?;

        let cleared = self.db.cart_lines().clear_coupon(user_id).await?;

        info!(user_id = %user_id, cleared, "Coupon removed");

        Ok(cleared)
    }

    /// Number of active lines in the user's cart (the header badge).
    pub async fn line_count(&self, user_id: &str) -> CartResult<u32> {
        validate_user_id(user_id).map_err(CoreError::from)?;

        let count = self.db.cart_lines().count_active(user_id).await?;
        Ok(count as u32)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartErrorCode;
    use bazaar_core::{AdjustmentKind, Coupon, CouponStatus, Product};
    use bazaar_db::repository::coupon::generate_coupon_id;
    use bazaar_db::repository::product::generate_product_id;
    use bazaar_db::DbConfig;
    use chrono::Duration;

    async fn service() -> CartService {
        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database");
        CartService::new(db)
    }

    fn test_product(price_minor: i64) -> Product {
        let id = generate_product_id();
        let sku = format!("TST-{}", &id[..8]);
        Product {
            id,
            sku,
            name: "Test Product".to_string(),
            unit_price_minor: price_minor,
            discount_value: 0,
            discount_kind: AdjustmentKind::Percent,
            tax_value: 0,
            tax_kind: AdjustmentKind::Percent,
            shipping_cost_minor: 0,
            shipping_quantity_multiplied: false,
            current_stock: 0,
            weight_grams: 250,
            published: true,
            approved: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_coupon(code: &str, value: i64, kind: AdjustmentKind) -> Coupon {
        Coupon {
            id: generate_coupon_id(),
            code: code.to_string(),
            discount_value: value,
            discount_kind: kind,
            status: CouponStatus::Active,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn size(value: &str) -> Variation {
        let mut v = Variation::new();
        v.set("size", value);
        v
    }

    #[tokio::test]
    async fn test_add_creates_line() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(49_900)).await.unwrap();

        let mutation = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), 2)
            .await
            .unwrap();

        assert_eq!(mutation.line.quantity, 2);
        assert_eq!(mutation.line.unit_price_minor, 49_900);
        assert_eq!(mutation.line.line_total_minor, 99_800);
        assert_eq!(mutation.item_count, 1);
    }

    #[tokio::test]
    async fn test_add_same_variation_merges() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(49_900)).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &size("M"), 2)
            .await
            .unwrap();
        let mutation = svc
            .add_to_cart("user-1", &product.id, &size("M"), 3)
            .await
            .unwrap();

        assert_eq!(mutation.line.quantity, 5);
        assert_eq!(mutation.item_count, 1);

        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.totals.total_quantity, 5);
    }

    #[tokio::test]
    async fn test_variation_key_order_is_identity() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        let mut first = Variation::new();
        first.set("size", "M");
        first.set("color", "blue");

        let mut second = Variation::new();
        second.set("color", "blue");
        second.set("size", "M");

        svc.add_to_cart("user-1", &product.id, &first, 1)
            .await
            .unwrap();
        let mutation = svc
            .add_to_cart("user-1", &product.id, &second, 1)
            .await
            .unwrap();

        assert_eq!(mutation.line.quantity, 2);
        assert_eq!(mutation.item_count, 1);
    }

    #[tokio::test]
    async fn test_different_variation_separate_line() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &size("M"), 1)
            .await
            .unwrap();
        let mutation = svc
            .add_to_cart("user-1", &product.id, &size("L"), 1)
            .await
            .unwrap();

        assert_eq!(mutation.item_count, 2);

        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_add_zero_quantity_clamps_to_one() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        let mutation = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), 0)
            .await
            .unwrap();

        assert_eq!(mutation.line.quantity, 1);
    }

    #[tokio::test]
    async fn test_add_negative_quantity_clamps_to_one() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        let mutation = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), -5)
            .await
            .unwrap();

        assert_eq!(mutation.line.quantity, 1);
    }

    #[tokio::test]
    async fn test_merge_with_zero_added_keeps_quantity() {
        let svc = service().await;
        let mut product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 2)
            .await
            .unwrap();

        product.unit_price_minor = 12_000;
        svc.db.products().update(&product).await.unwrap();

        let mutation = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), 0)
            .await
            .unwrap();

        // Nothing was added, but the snapshot still refreshed
        assert_eq!(mutation.line.quantity, 2);
        assert_eq!(mutation.line.unit_price_minor, 12_000);
        assert_eq!(mutation.item_count, 1);
    }

    #[tokio::test]
    async fn test_merge_reprices_at_current_price() {
        let svc = service().await;
        let mut product = svc.db.products().insert(&test_product(100_000)).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap();

        product.unit_price_minor = 120_000;
        svc.db.products().update(&product).await.unwrap();

        let mutation = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap();

        // The whole line is repriced, not just the added units
        assert_eq!(mutation.line.quantity, 2);
        assert_eq!(mutation.line.unit_price_minor, 120_000);
        assert_eq!(mutation.line.line_total_minor, 240_000);
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_product() {
        let svc = service().await;
        let missing_id = generate_product_id();

        let err = svc
            .add_to_cart("user-1", &missing_id, &Variation::new(), 1)
            .await
            .unwrap_err();

        assert_eq!(err.code, CartErrorCode::ProductUnavailable);
    }

    #[tokio::test]
    async fn test_add_rejects_unpublished_product() {
        let svc = service().await;
        let mut product = test_product(10_000);
        product.published = false;
        let product = svc.db.products().insert(&product).await.unwrap();

        let err = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap_err();

        assert_eq!(err.code, CartErrorCode::ProductUnavailable);
    }

    #[tokio::test]
    async fn test_add_rejects_unapproved_product() {
        let svc = service().await;
        let mut product = test_product(10_000);
        product.approved = false;
        let product = svc.db.products().insert(&product).await.unwrap();

        let err = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap_err();

        assert_eq!(err.code, CartErrorCode::ProductUnavailable);
    }

    #[tokio::test]
    async fn test_add_rejects_out_of_stock() {
        let svc = service().await;
        let mut product = test_product(10_000);
        product.current_stock = 3;
        let product = svc.db.products().insert(&product).await.unwrap();

        let err = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), 5)
            .await
            .unwrap_err();

        assert_eq!(err.code, CartErrorCode::OutOfStock);
        assert!(err.message.contains("3 available"));
    }

    #[tokio::test]
    async fn test_merge_checks_combined_stock() {
        let svc = service().await;
        let mut product = test_product(10_000);
        product.current_stock = 5;
        let product = svc.db.products().insert(&product).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 3)
            .await
            .unwrap();

        let err = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), 3)
            .await
            .unwrap_err();
        assert_eq!(err.code, CartErrorCode::OutOfStock);

        // The failed merge must not have touched the stored line
        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.totals.total_quantity, 3);
    }

    #[tokio::test]
    async fn test_zero_stock_means_unlimited() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        let mutation = svc
            .add_to_cart("user-1", &product.id, &Variation::new(), 10_000)
            .await
            .unwrap();

        assert_eq!(mutation.line.quantity, 10_000);
    }

    #[tokio::test]
    async fn test_update_quantity_sets_absolute() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 2)
            .await
            .unwrap();
        let mutation = svc
            .update_quantity("user-1", &product.id, &Variation::new(), 7)
            .await
            .unwrap();

        assert_eq!(mutation.line.quantity, 7);

        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.totals.total_quantity, 7);
    }

    #[tokio::test]
    async fn test_update_quantity_missing_line_is_invalid_input() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        let err = svc
            .update_quantity("user-1", &product.id, &Variation::new(), 3)
            .await
            .unwrap_err();

        assert_eq!(err.code, CartErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_update_quantity_checks_stock() {
        let svc = service().await;
        let mut product = test_product(10_000);
        product.current_stock = 5;
        let product = svc.db.products().insert(&product).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 2)
            .await
            .unwrap();

        let err = svc
            .update_quantity("user-1", &product.id, &Variation::new(), 9)
            .await
            .unwrap_err();
        assert_eq!(err.code, CartErrorCode::OutOfStock);

        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.totals.total_quantity, 2);
    }

    #[tokio::test]
    async fn test_update_preserves_coupon_stamp() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();
        svc.db
            .coupons()
            .insert(&test_coupon("WELCOME10", 1000, AdjustmentKind::Percent))
            .await
            .unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap();
        svc.apply_coupon("user-1", "WELCOME10").await.unwrap();

        let mutation = svc
            .update_quantity("user-1", &product.id, &Variation::new(), 4)
            .await
            .unwrap();

        assert_eq!(mutation.line.coupon_code.as_deref(), Some("WELCOME10"));
    }

    #[tokio::test]
    async fn test_remove_line() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap();
        let remaining = svc
            .remove_line("user-1", &product.id, &Variation::new())
            .await
            .unwrap();

        assert_eq!(remaining, 0);
        assert!(svc.view_cart("user-1").await.unwrap().lines.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_line_is_invalid_input() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        let err = svc
            .remove_line("user-1", &product.id, &Variation::new())
            .await
            .unwrap_err();

        assert_eq!(err.code, CartErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_remove_only_touches_matching_variation() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &size("M"), 1)
            .await
            .unwrap();
        svc.add_to_cart("user-1", &product.id, &size("L"), 1)
            .await
            .unwrap();

        let remaining = svc
            .remove_line("user-1", &product.id, &size("M"))
            .await
            .unwrap();

        assert_eq!(remaining, 1);

        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].variation, size("L"));
    }

    #[tokio::test]
    async fn test_clear_cart_is_idempotent() {
        let svc = service().await;
        let p1 = svc.db.products().insert(&test_product(10_000)).await.unwrap();
        let p2 = svc.db.products().insert(&test_product(20_000)).await.unwrap();

        svc.add_to_cart("user-1", &p1.id, &Variation::new(), 1)
            .await
            .unwrap();
        svc.add_to_cart("user-1", &p2.id, &Variation::new(), 1)
            .await
            .unwrap();

        assert_eq!(svc.clear_cart("user-1").await.unwrap(), 2);
        assert_eq!(svc.clear_cart("user-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_view_empty_cart() {
        let svc = service().await;

        let view = svc.view_cart("user-1").await.unwrap();

        assert!(view.lines.is_empty());
        assert!(view.coupon_code.is_none());
        assert_eq!(view.totals.item_count, 0);
        assert_eq!(view.totals.grand_total_minor, 0);
    }

    #[tokio::test]
    async fn test_view_totals_discount_tax_shipping() {
        let svc = service().await;
        let mut product = test_product(200_000);
        product.discount_value = 1000; // 10%
        product.tax_value = 500; // 5%
        product.shipping_cost_minor = 20_000;
        let product = svc.db.products().insert(&product).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 2)
            .await
            .unwrap();

        let view = svc.view_cart("user-1").await.unwrap();

        // 200000 − 10% = 180000/unit; 5% tax on the discounted price = 9000/unit
        assert_eq!(view.totals.subtotal_minor, 360_000);
        assert_eq!(view.totals.tax_minor, 18_000);
        assert_eq!(view.totals.shipping_minor, 20_000);
        assert_eq!(view.totals.grand_total_minor, 398_000);
        // Reported discount is recomputed against the discounted subtotal
        assert_eq!(view.totals.line_discount_minor, 36_000);
        assert_eq!(view.totals.coupon_discount_minor, 0);
    }

    #[tokio::test]
    async fn test_shipping_multiplied_when_flagged() {
        let svc = service().await;
        let mut product = test_product(10_000);
        product.shipping_cost_minor = 10_000;
        product.shipping_quantity_multiplied = true;
        let product = svc.db.products().insert(&product).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 3)
            .await
            .unwrap();

        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.totals.shipping_minor, 30_000);
    }

    #[tokio::test]
    async fn test_apply_percent_coupon_discounts_grand_total() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(50_000)).await.unwrap();
        svc.db
            .coupons()
            .insert(&test_coupon("WELCOME10", 1000, AdjustmentKind::Percent))
            .await
            .unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 2)
            .await
            .unwrap();
        let stamped = svc.apply_coupon("user-1", "WELCOME10").await.unwrap();
        assert_eq!(stamped, 1);

        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.coupon_code.as_deref(), Some("WELCOME10"));
        assert_eq!(view.totals.coupon_discount_minor, 10_000);
        assert_eq!(view.totals.grand_total_minor, 90_000);
    }

    #[tokio::test]
    async fn test_flat_coupon_capped_at_subtotal() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(50_000)).await.unwrap();
        svc.db
            .coupons()
            .insert(&test_coupon("BIGFLAT", 80_000, AdjustmentKind::Flat))
            .await
            .unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap();
        svc.apply_coupon("user-1", "BIGFLAT").await.unwrap();

        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.totals.coupon_discount_minor, 50_000);
        assert_eq!(view.totals.grand_total_minor, 0);
    }

    #[tokio::test]
    async fn test_apply_unknown_coupon() {
        let svc = service().await;

        let err = svc.apply_coupon("user-1", "NOPE").await.unwrap_err();

        assert_eq!(err.code, CartErrorCode::InvalidOrExpiredCoupon);
    }

    #[tokio::test]
    async fn test_apply_expired_coupon() {
        let svc = service().await;
        let mut coupon = test_coupon("OLD10", 1000, AdjustmentKind::Percent);
        coupon.starts_at = Some(Utc::now() - Duration::days(60));
        coupon.ends_at = Some(Utc::now() - Duration::days(1));
        svc.db.coupons().insert(&coupon).await.unwrap();

        let err = svc.apply_coupon("user-1", "OLD10").await.unwrap_err();

        assert_eq!(err.code, CartErrorCode::InvalidOrExpiredCoupon);
    }

    #[tokio::test]
    async fn test_apply_not_yet_started_coupon() {
        let svc = service().await;
        let mut coupon = test_coupon("SOON25", 2500, AdjustmentKind::Percent);
        coupon.starts_at = Some(Utc::now() + Duration::days(7));
        svc.db.coupons().insert(&coupon).await.unwrap();

        let err = svc.apply_coupon("user-1", "SOON25").await.unwrap_err();

        assert_eq!(err.code, CartErrorCode::InvalidOrExpiredCoupon);
    }

    #[tokio::test]
    async fn test_apply_disabled_coupon() {
        let svc = service().await;
        let mut coupon = test_coupon("PAUSED15", 1500, AdjustmentKind::Percent);
        coupon.status = CouponStatus::Disabled;
        svc.db.coupons().insert(&coupon).await.unwrap();

        let err = svc.apply_coupon("user-1", "PAUSED15").await.unwrap_err();

        assert_eq!(err.code, CartErrorCode::InvalidOrExpiredCoupon);
    }

    #[tokio::test]
    async fn test_apply_coupon_to_empty_cart_succeeds() {
        let svc = service().await;
        svc.db
            .coupons()
            .insert(&test_coupon("WELCOME10", 1000, AdjustmentKind::Percent))
            .await
            .unwrap();

        let stamped = svc.apply_coupon("user-1", "WELCOME10").await.unwrap();

        assert_eq!(stamped, 0);
    }

    #[tokio::test]
    async fn test_coupon_code_is_trimmed() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(50_000)).await.unwrap();
        svc.db
            .coupons()
            .insert(&test_coupon("WELCOME10", 1000, AdjustmentKind::Percent))
            .await
            .unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap();
        svc.apply_coupon("user-1", "  WELCOME10  ").await.unwrap();

        let view = svc.view_cart("user-1").await.unwrap();
        assert_eq!(view.coupon_code.as_deref(), Some("WELCOME10"));
    }

    #[tokio::test]
    async fn test_deleted_coupon_contributes_no_discount() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(50_000)).await.unwrap();
        svc.db
            .coupons()
            .insert(&test_coupon("WELCOME10", 1000, AdjustmentKind::Percent))
            .await
            .unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap();
        svc.apply_coupon("user-1", "WELCOME10").await.unwrap();
        svc.db.coupons().delete_by_code("WELCOME10").await.unwrap();

        let view = svc.view_cart("user-1").await.unwrap();

        // The stamp stays visible but no longer buys anything
        assert_eq!(view.coupon_code.as_deref(), Some("WELCOME10"));
        assert_eq!(view.totals.coupon_discount_minor, 0);
        assert_eq!(view.totals.grand_total_minor, 50_000);
    }

    #[tokio::test]
    async fn test_lines_added_after_coupon_keep_cart_discount() {
        let svc = service().await;
        let p1 = svc.db.products().insert(&test_product(50_000)).await.unwrap();
        let p2 = svc.db.products().insert(&test_product(30_000)).await.unwrap();
        svc.db
            .coupons()
            .insert(&test_coupon("WELCOME10", 1000, AdjustmentKind::Percent))
            .await
            .unwrap();

        svc.add_to_cart("user-1", &p1.id, &Variation::new(), 1)
            .await
            .unwrap();
        svc.apply_coupon("user-1", "WELCOME10").await.unwrap();
        svc.add_to_cart("user-1", &p2.id, &Variation::new(), 1)
            .await
            .unwrap();

        let view = svc.view_cart("user-1").await.unwrap();

        // Only the first line carries the stamp, but the discount applies
        // to the whole subtotal
        assert_eq!(view.coupon_code.as_deref(), Some("WELCOME10"));
        assert_eq!(view.totals.subtotal_minor, 80_000);
        assert_eq!(view.totals.coupon_discount_minor, 8_000);
        assert_eq!(view.totals.grand_total_minor, 72_000);
    }

    #[tokio::test]
    async fn test_remove_coupon_is_idempotent() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(50_000)).await.unwrap();
        svc.db
            .coupons()
            .insert(&test_coupon("WELCOME10", 1000, AdjustmentKind::Percent))
            .await
            .unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 1)
            .await
            .unwrap();
        svc.apply_coupon("user-1", "WELCOME10").await.unwrap();

        assert_eq!(svc.remove_coupon("user-1").await.unwrap(), 1);
        assert_eq!(svc.remove_coupon("user-1").await.unwrap(), 0);

        let view = svc.view_cart("user-1").await.unwrap();
        assert!(view.coupon_code.is_none());
        assert_eq!(view.totals.coupon_discount_minor, 0);
    }

    #[tokio::test]
    async fn test_line_count_tracks_distinct_lines() {
        let svc = service().await;
        let p1 = svc.db.products().insert(&test_product(10_000)).await.unwrap();
        let p2 = svc.db.products().insert(&test_product(20_000)).await.unwrap();

        assert_eq!(svc.line_count("user-1").await.unwrap(), 0);

        svc.add_to_cart("user-1", &p1.id, &Variation::new(), 2)
            .await
            .unwrap();
        svc.add_to_cart("user-1", &p2.id, &Variation::new(), 1)
            .await
            .unwrap();
        svc.add_to_cart("user-1", &p1.id, &Variation::new(), 1)
            .await
            .unwrap();

        assert_eq!(svc.line_count("user-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_carts_are_isolated_per_user() {
        let svc = service().await;
        let product = svc.db.products().insert(&test_product(10_000)).await.unwrap();

        svc.add_to_cart("user-1", &product.id, &Variation::new(), 2)
            .await
            .unwrap();
        svc.add_to_cart("user-2", &product.id, &Variation::new(), 5)
            .await
            .unwrap();

        svc.clear_cart("user-1").await.unwrap();

        assert_eq!(svc.line_count("user-1").await.unwrap(), 0);
        let view = svc.view_cart("user-2").await.unwrap();
        assert_eq!(view.totals.total_quantity, 5);
    }

    #[tokio::test]
    async fn test_rejects_oversized_user_id() {
        let svc = service().await;
        let long_user = "u".repeat(100);

        let err = svc.view_cart(&long_user).await.unwrap_err();

        assert_eq!(err.code, CartErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_rejects_malformed_product_id() {
        let svc = service().await;

        let err = svc
            .add_to_cart("user-1", "not-a-uuid", &Variation::new(), 1)
            .await
            .unwrap_err();

        assert_eq!(err.code, CartErrorCode::InvalidInput);
    }
}
