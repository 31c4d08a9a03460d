//! # Coupon Repository
//!
//! Database operations for coupons.
//!
//! ## Lookup Semantics
//! Codes are matched exactly as stored (after input trimming upstream).
//! Validity (status + date window) is a domain rule, so `find_by_code`
//! returns expired and disabled coupons too; callers decide what a dead
//! coupon means in their context (rejection at apply time, silent zero
//! at aggregation time).

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bazaar_core::Coupon;

const COUPON_COLUMNS: &str = r#"
    id, code,
    discount_value, discount_kind,
    status,
    starts_at, ends_at,
    created_at, updated_at
"#;

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Finds a coupon by its code (exact match).
    ///
    /// ## Returns
    /// * `Ok(Some(Coupon))` - Coupon exists (may still be invalid)
    /// * `Ok(None)` - No coupon with that code
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1");

        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    /// Inserts a new coupon.
    ///
    /// ## Returns
    /// * `Ok(Coupon)` - Inserted coupon
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<Coupon> {
        debug!(code = %coupon.code, "Inserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code,
                discount_value, discount_kind,
                status,
                starts_at, ends_at,
                created_at, updated_at
            ) VALUES (
                ?1, ?2,
                ?3, ?4,
                ?5,
                ?6, ?7,
                ?8, ?9
            )
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.discount_value)
        .bind(coupon.discount_kind)
        .bind(coupon.status)
        .bind(coupon.starts_at)
        .bind(coupon.ends_at)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(coupon.clone())
    }

    /// Deletes a coupon by its code.
    ///
    /// Carts that already applied the code keep their stamp; aggregation
    /// treats the unresolvable code as contributing nothing.
    pub async fn delete_by_code(&self, code: &str) -> DbResult<u64> {
        debug!(code = %code, "Deleting coupon");

        let result = sqlx::query("DELETE FROM coupons WHERE code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts total coupons (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new coupon ID.
pub fn generate_coupon_id() -> String {
    Uuid::new_v4().to_string()
}
