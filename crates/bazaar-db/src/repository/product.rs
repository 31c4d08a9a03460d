//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Lookup by UUID (the cart's add/merge path)
//! - Lookup by SKU (seeding, diagnostics)
//! - CRUD for catalog administration
//!
//! ## Role in Pricing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Products Are the Pricing Source                         │
//! │                                                                         │
//! │  add_to_cart(user, product_id, ...)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get_by_id(product_id) ──► Product row                                 │
//! │       │                      (price, discount, tax, shipping, stock)   │
//! │       ▼                                                                 │
//! │  compute_line_snapshot(&product, qty) ──► frozen line pricing          │
//! │                                                                         │
//! │  Every add and merge re-reads this table, so snapshots always          │
//! │  reflect the catalog as of the latest cart mutation.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::Product;

const PRODUCT_COLUMNS: &str = r#"
    id, sku, name,
    unit_price_minor,
    discount_value, discount_kind,
    tax_value, tax_kind,
    shipping_cost_minor, shipping_quantity_multiplied,
    current_stock, weight_grams,
    published, approved,
    created_at, updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Get by ID (the hot path during cart mutations)
/// let product = repo.get_by_id("uuid-here").await?;
///
/// // Get by SKU
/// let product = repo.get_by_sku("TEE-CLASSIC").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Arguments
    /// * `id` - Product UUID
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    ///
    /// ## Arguments
    /// * `sku` - Product SKU (e.g., "TEE-CLASSIC")
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists orderable products sorted by name.
    ///
    /// ## Usage
    /// Catalog browsing and diagnostics. Unpublished and unapproved
    /// products are excluded, same as the add-to-cart gate.
    pub async fn list_orderable(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE published = 1 AND approved = 1 \
             ORDER BY name LIMIT ?1"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Arguments
    /// * `product` - Product to insert (id should be generated beforehand)
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name,
                unit_price_minor,
                discount_value, discount_kind,
                tax_value, tax_kind,
                shipping_cost_minor, shipping_quantity_multiplied,
                current_stock, weight_grams,
                published, approved,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4,
                ?5, ?6,
                ?7, ?8,
                ?9, ?10,
                ?11, ?12,
                ?13, ?14,
                ?15, ?16
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.unit_price_minor)
        .bind(product.discount_value)
        .bind(product.discount_kind)
        .bind(product.tax_value)
        .bind(product.tax_kind)
        .bind(product.shipping_cost_minor)
        .bind(product.shipping_quantity_multiplied)
        .bind(product.current_stock)
        .bind(product.weight_grams)
        .bind(product.published)
        .bind(product.approved)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        // Return the product as-is (it already has all fields)
        Ok(product.clone())
    }

    /// Updates an existing product.
    ///
    /// ## Arguments
    /// * `product` - Product with updated fields
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                name = ?3,
                unit_price_minor = ?4,
                discount_value = ?5,
                discount_kind = ?6,
                tax_value = ?7,
                tax_kind = ?8,
                shipping_cost_minor = ?9,
                shipping_quantity_multiplied = ?10,
                current_stock = ?11,
                weight_grams = ?12,
                published = ?13,
                approved = ?14,
                updated_at = ?15
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.unit_price_minor)
        .bind(product.discount_value)
        .bind(product.discount_kind)
        .bind(product.tax_value)
        .bind(product.tax_kind)
        .bind(product.shipping_cost_minor)
        .bind(product.shipping_quantity_multiplied)
        .bind(product.current_stock)
        .bind(product.weight_grams)
        .bind(product.published)
        .bind(product.approved)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
///
/// ## Usage
/// ```rust,ignore
/// let id = generate_product_id();
/// let product = Product { id, ... };
/// ```
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
