//! # Cart Error Type
//!
//! Unified error type for cart operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bazaar Cart                            │
//! │                                                                         │
//! │  Storefront                  Rust Backend                               │
//! │  ──────────                  ────────────                               │
//! │                                                                         │
//! │  addToCart(productId, qty)                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  CartService Method                                              │  │
//! │  │  CartResult<T>                                                   │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Domain Error? ─── CoreError::OutOfStock ──────── CartError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await addToCart(productId, qty)                                      │
//! │  } catch (e) {                                                          │
//! │    // e.message = "Out of stock for TEE-RED-001: 3 available, ..."      │
//! │    // e.code = "OUT_OF_STOCK"                                           │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Serialization
//! Callers receive a serializable error with both a machine-readable `code`
//! and a human-readable `message`. Storage internals never leak: the raw
//! database error is logged here and a generic message goes out.

use serde::Serialize;
use tracing::{error, warn};

use bazaar_core::CoreError;
use bazaar_db::DbError;

/// Error returned from cart operations.
///
/// ## Serialization
/// This is what the storefront receives when an operation fails:
/// ```json
/// {
///   "code": "INVALID_OR_EXPIRED_COUPON",
///   "message": "Coupon is not valid: LAUNCH20"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartError {
    /// Machine-readable error code for programmatic handling
    pub code: CartErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for cart responses.
///
/// ## Usage in Frontend
/// ```typescript
/// try {
///   await addToCart({ productId, quantity });
/// } catch (e) {
///   switch (e.code) {
///     case 'OUT_OF_STOCK':
///       showNotification('Not enough stock');
///       break;
///     case 'INVALID_OR_EXPIRED_COUPON':
///       clearCouponField(e.message);
///       break;
///     default:
///       showError('An error occurred');
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartErrorCode {
    /// Malformed or unusable input (bad IDs, oversized fields, missing line)
    InvalidInput,

    /// Product exists but cannot be ordered right now
    ProductUnavailable,

    /// Requested quantity exceeds remaining stock
    OutOfStock,

    /// Coupon code unknown, outside its window, or disabled
    InvalidOrExpiredCoupon,

    /// Persistence layer failed; safe to retry
    StorageFailure,
}

impl CartError {
    /// Creates a new cart error.
    pub fn new(code: CartErrorCode, message: impl Into<String>) -> Self {
        CartError {
            code,
            message: message.into(),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CartError::new(CartErrorCode::InvalidInput, message)
    }

    /// Creates a product unavailable error.
    pub fn product_unavailable(id: &str) -> Self {
        CartError::new(
            CartErrorCode::ProductUnavailable,
            format!("Product is not available: {}", id),
        )
    }

    /// Creates an invalid coupon error.
    pub fn invalid_coupon(code: &str) -> Self {
        CartError::new(
            CartErrorCode::InvalidOrExpiredCoupon,
            format!("Coupon is not valid: {}", code),
        )
    }

    /// Creates a storage failure error.
    pub fn storage(message: impl Into<String>) -> Self {
        CartError::new(CartErrorCode::StorageFailure, message)
    }
}

/// Converts domain errors to cart errors.
impl From<CoreError> for CartError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductUnavailable(id) => CartError::product_unavailable(&id),
            CoreError::OutOfStock {
                sku,
                available,
                requested,
            } => CartError::new(
                CartErrorCode::OutOfStock,
                format!(
                    "Out of stock for {}: {} available, {} requested",
                    sku, available, requested
                ),
            ),
            CoreError::InvalidOrExpiredCoupon(code) => CartError::invalid_coupon(&code),
            CoreError::Validation(e) => CartError::invalid_input(e.to_string()),
        }
    }
}

/// Converts database errors to cart errors.
impl From<DbError> for CartError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                CartError::invalid_input(format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => {
                // Two concurrent adds raced past the merge lookup; the
                // partial unique index caught the second insert.
                warn!("Unique violation on {}: {}", field, value);
                CartError::storage("Cart was modified concurrently, please retry")
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                CartError::invalid_input("Invalid reference")
            }
            DbError::ConnectionFailed(_) => CartError::storage("Database connection failed"),
            DbError::MigrationFailed(_) => CartError::storage("Database migration failed"),
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                CartError::storage("Storage operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                CartError::storage("Storage transaction failed")
            }
            DbError::PoolExhausted => CartError::storage("Database pool exhausted"),
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                CartError::storage("Storage operation failed")
            }
        }
    }
}

impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CartError {}

/// Result alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;
