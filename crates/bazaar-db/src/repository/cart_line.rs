//! # Cart Line Repository
//!
//! Database operations for cart lines.
//!
//! ## Line Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              One Active Line per (user, product, variation)             │
//! │                                                                         │
//! │  add(user-1, tee-uuid, {color: red})                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  find_active(user-1, tee-uuid, '{"color":"red"}')                      │
//! │       │                                                                 │
//! │       ├── Some(line) ──► update_snapshot()   (merge: qty grows)        │
//! │       │                                                                 │
//! │       └── None ────────► insert()            (new line)                │
//! │                                                                         │
//! │  Both run inside one transaction. The partial unique index on          │
//! │  (user_id, product_id, variation_sig) WHERE status = 'active'          │
//! │  backstops the race where two adds both see None.                      │
//! │                                                                         │
//! │  add(user-1, tee-uuid, {color: blue}) ──► different signature,         │
//! │                                           separate line                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read vs Write Split
//! Write steps of the merge take a `Transaction` so the caller controls
//! atomicity (lines re-read then written). Plain reads and single-statement
//! writes go through the pool.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::{Adjustment, AdjustmentKind, AggregateLine, CartLine, Money};

const CART_LINE_COLUMNS: &str = r#"
    id, user_id, product_id, variation_sig,
    quantity,
    price_minor, tax_minor, shipping_minor,
    coupon_code, coupon_applied,
    status,
    created_at, updated_at
"#;

// =============================================================================
// Joined Row
// =============================================================================

/// A cart line joined with the product attributes aggregation needs.
///
/// Views and totals want both the frozen snapshot (on the line) and the
/// live product (name, current price, current discount, weight), so the
/// list query fetches them in one pass.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLineWithProduct {
    #[sqlx(flatten)]
    pub line: CartLine,

    /// Product SKU, for display.
    pub p_sku: String,
    /// Product display name.
    pub p_name: String,
    /// Current base unit price in minor units.
    pub p_unit_price_minor: i64,
    /// Current discount value (raw encoding).
    pub p_discount_value: i64,
    /// Current discount kind.
    pub p_discount_kind: AdjustmentKind,
    /// Current unit weight in grams.
    pub p_weight_grams: i64,
}

impl CartLineWithProduct {
    /// Converts the joined row into the aggregator's input shape.
    pub fn to_aggregate_line(&self) -> AggregateLine {
        AggregateLine {
            quantity: self.line.quantity,
            price: self.line.price(),
            tax: self.line.tax(),
            shipping: self.line.shipping(),
            coupon_code: self.line.coupon_code.clone(),
            coupon_applied: self.line.coupon_applied,
            live_unit_price: Money::from_minor(self.p_unit_price_minor),
            live_discount: Adjustment::from_raw(self.p_discount_value, self.p_discount_kind),
            weight_grams: self.p_weight_grams,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for cart line database operations.
#[derive(Debug, Clone)]
pub struct CartLineRepository {
    pool: SqlitePool,
}

impl CartLineRepository {
    /// Creates a new CartLineRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartLineRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Transaction-scoped (the add/merge write path)
    // -------------------------------------------------------------------------

    /// Finds the active line matching the (user, product, variation) identity.
    ///
    /// ## Arguments
    /// * `tx` - Open transaction the merge runs in
    /// * `user_id` - Cart owner
    /// * `product_id` - Product UUID
    /// * `variation_sig` - Canonical variation signature
    ///
    /// ## Returns
    /// * `Ok(Some(CartLine))` - Line exists, caller should merge into it
    /// * `Ok(None)` - No line yet, caller should insert
    pub async fn find_active(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user_id: &str,
        product_id: &str,
        variation_sig: &str,
    ) -> DbResult<Option<CartLine>> {
        let sql = format!(
            "SELECT {CART_LINE_COLUMNS} FROM cart_lines \
             WHERE user_id = ?1 AND product_id = ?2 AND variation_sig = ?3 \
             AND status = 'active'"
        );

        let line = sqlx::query_as::<_, CartLine>(&sql)
            .bind(user_id)
            .bind(product_id)
            .bind(variation_sig)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(line)
    }

    /// Inserts a new cart line.
    ///
    /// ## Returns
    /// * `Ok(())` - Line inserted
    /// * `Err(DbError::UniqueViolation)` - An active line with the same
    ///   identity already exists (concurrent add)
    pub async fn insert(&self, tx: &mut Transaction<'_, Sqlite>, line: &CartLine) -> DbResult<()> {
        debug!(
            user_id = %line.user_id,
            product_id = %line.product_id,
            quantity = %line.quantity,
            "Inserting cart line"
        );

        sqlx::query(
            r#"
            INSERT INTO cart_lines (
                id, user_id, product_id, variation_sig,
                quantity,
                price_minor, tax_minor, shipping_minor,
                coupon_code, coupon_applied,
                status,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5,
                ?6, ?7, ?8,
                ?9, ?10,
                ?11,
                ?12, ?13
            )
            "#,
        )
        .bind(&line.id)
        .bind(&line.user_id)
        .bind(&line.product_id)
        .bind(&line.variation_sig)
        .bind(line.quantity)
        .bind(line.price_minor)
        .bind(line.tax_minor)
        .bind(line.shipping_minor)
        .bind(&line.coupon_code)
        .bind(line.coupon_applied)
        .bind(line.status)
        .bind(line.created_at)
        .bind(line.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Writes a fresh pricing snapshot onto an existing active line.
    ///
    /// Used by both the merge (quantity grew) and explicit quantity
    /// updates. The whole snapshot is rewritten because pricing always
    /// re-derives from the current product.
    ///
    /// ## Returns
    /// * `Ok(())` - Snapshot written
    /// * `Err(DbError::NotFound)` - No active line with that ID
    pub async fn update_snapshot(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: &str,
        quantity: i64,
        price_minor: i64,
        tax_minor: i64,
        shipping_minor: i64,
    ) -> DbResult<()> {
        debug!(id = %id, quantity = %quantity, "Updating cart line snapshot");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cart_lines SET
                quantity = ?2,
                price_minor = ?3,
                tax_minor = ?4,
                shipping_minor = ?5,
                updated_at = ?6
            WHERE id = ?1 AND status = 'active'
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(price_minor)
        .bind(tax_minor)
        .bind(shipping_minor)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartLine", id));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Pool-scoped reads
    // -------------------------------------------------------------------------

    /// Lists a user's active lines joined with their products.
    ///
    /// Ordered by creation time so views are stable and the first
    /// coupon-bearing line is well-defined.
    pub async fn list_active_with_products(
        &self,
        user_id: &str,
    ) -> DbResult<Vec<CartLineWithProduct>> {
        let rows = sqlx::query_as::<_, CartLineWithProduct>(
            r#"
            SELECT
                l.*,
                p.sku AS p_sku,
                p.name AS p_name,
                p.unit_price_minor AS p_unit_price_minor,
                p.discount_value AS p_discount_value,
                p.discount_kind AS p_discount_kind,
                p.weight_grams AS p_weight_grams
            FROM cart_lines l
            INNER JOIN products p ON p.id = l.product_id
            WHERE l.user_id = ?1 AND l.status = 'active'
            ORDER BY l.created_at, l.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Counts a user's active lines.
    pub async fn count_active(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cart_lines WHERE user_id = ?1 AND status = 'active'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Pool-scoped writes (single statements)
    // -------------------------------------------------------------------------

    /// Deletes one active line, addressed by its identity.
    ///
    /// ## Returns
    /// Rows affected: 1 if deleted, 0 if no active line matched the
    /// (user, product, variation) triple.
    pub async fn delete_active(
        &self,
        user_id: &str,
        product_id: &str,
        variation_sig: &str,
    ) -> DbResult<u64> {
        debug!(user_id = %user_id, product_id = %product_id, "Deleting cart line");

        let result = sqlx::query(
            "DELETE FROM cart_lines \
             WHERE user_id = ?1 AND product_id = ?2 AND variation_sig = ?3 \
               AND status = 'active'",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(variation_sig)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes all of a user's active lines.
    ///
    /// ## Returns
    /// Number of lines removed (0 for an already-empty cart).
    pub async fn clear_for_user(&self, user_id: &str) -> DbResult<u64> {
        debug!(user_id = %user_id, "Clearing cart");

        let result =
            sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1 AND status = 'active'")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Stamps a validated coupon code onto all of a user's active lines.
    ///
    /// ## Returns
    /// Rows affected. Zero is not an error: applying a coupon to an empty
    /// cart simply stamps nothing.
    pub async fn set_coupon(&self, user_id: &str, code: &str) -> DbResult<u64> {
        debug!(user_id = %user_id, code = %code, "Applying coupon to cart lines");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cart_lines SET
                coupon_code = ?2,
                coupon_applied = 1,
                updated_at = ?3
            WHERE user_id = ?1 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Removes any coupon from all of a user's active lines.
    pub async fn clear_coupon(&self, user_id: &str) -> DbResult<u64> {
        debug!(user_id = %user_id, "Removing coupon from cart lines");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cart_lines SET
                coupon_code = NULL,
                coupon_applied = 0,
                updated_at = ?2
            WHERE user_id = ?1 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Helper to generate a new cart line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}
