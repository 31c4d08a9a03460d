//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Pricing and cart rule violations               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  bazaar-cart errors (service crate)                                    │
//! │  └── CartError        - What callers see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CartError → Caller      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, code, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations and pricing failures.
///
/// These errors represent business rule violations in the pure layer.
/// They should be caught and translated to caller-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be added to a cart.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist
    /// - Product is unpublished by the merchant
    /// - Product has not passed moderation
    #[error("Product unavailable: {0}")]
    ProductUnavailable(String),

    /// Requested quantity exceeds tracked stock.
    ///
    /// ## When This Occurs
    /// - Product is stock-tracked and the requested total (including units
    ///   already in the cart when merging) exceeds what is available
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// OutOfStock { sku: "TEE-BLK", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 TEE-BLK in stock"
    /// ```
    #[error("Out of stock for {sku}: available {available}, requested {requested}")]
    OutOfStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Coupon code does not resolve to a redeemable coupon.
    ///
    /// ## When This Occurs
    /// - Code doesn't exist
    /// - Coupon is disabled
    /// - Current time is outside the validity window
    #[error("Invalid or expired coupon: {0}")]
    InvalidOrExpiredCoupon(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before pricing logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., invalid UUID, invalid attribute name).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Collection has more entries than allowed.
    #[error("{field} must have at most {max} entries")]
    TooMany { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
