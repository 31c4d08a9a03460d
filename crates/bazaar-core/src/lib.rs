//! # bazaar-core: Pure Pricing Logic for Bazaar Carts
//!
//! This crate is the **heart** of the Bazaar cart engine. It contains all
//! pricing logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bazaar Cart Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Storefront Callers                         │   │
//! │  │    Product page ──► Cart page ──► Checkout                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazaar-cart (Service)                        │   │
//! │  │    add_to_cart, view_cart, apply_coupon, etc.                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │  totals   │  │   │
//! │  │   │  Product  │  │   Money   │  │ Snapshot  │  │ CartTotals│  │   │
//! │  │   │ CartLine  │  │   Rate    │  │  merge    │  │  coupons  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazaar-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartLine, Adjustment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`variation`] - Canonical variation signatures for line identity
//! - [`coupon`] - Coupon type and validity windows
//! - [`pricing`] - Per-line snapshot computation and quantity merging
//! - [`totals`] - Cart-wide aggregation and coupon math
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in minor units (i64), no float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::{Money, Rate};
//!
//! // Create money from minor units (never from floats!)
//! let price = Money::from_minor(200_000); // 2000.00 in a 2-decimal currency
//!
//! // Percentages are basis points for exact integer math
//! let discount = Rate::from_bps(1000); // 10%
//!
//! assert_eq!(price.percent_of(discount).minor(), 20_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coupon;
pub mod error;
pub mod money;
pub mod pricing;
pub mod totals;
pub mod types;
pub mod validation;
pub mod variation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bazaar_core::Money` instead of
// `use bazaar_core::money::Money`

pub use coupon::{Coupon, CouponStatus};
pub use error::{CoreError, ValidationError};
pub use money::{Money, Rate};
pub use pricing::{compute_line_snapshot, merge_quantity, LineSnapshot};
pub use totals::{aggregate, applied_coupon_code, AggregateLine, CartTotals};
pub use types::*;
pub use variation::Variation;
