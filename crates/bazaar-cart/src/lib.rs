//! # bazaar-cart: The Cart Engine
//!
//! Ties pure pricing logic to storage and exposes the operations a
//! storefront backend embeds: add, merge, edit, remove, coupon flows and
//! the aggregated cart view.
//!
//! ## Module Organization
//! ```text
//! bazaar_cart/
//! ├── lib.rs          ◄─── You are here (exports & tracing setup)
//! ├── service.rs      ◄─── CartService: transactional cart operations
//! ├── view.rs         ◄─── Serializable response shapes (camelCase)
//! └── error.rs        ◄─── Caller-facing error type with stable codes
//! ```
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Does What                                        │
//! │                                                                         │
//! │  bazaar-cart (THIS CRATE)                                               │
//! │  • Orchestrates: validate → load → transact → respond                   │
//! │  • Owns the error contract (INVALID_INPUT, OUT_OF_STOCK, ...)           │
//! │  • Never does money math, never writes SQL                              │
//! │                                                                         │
//! │  bazaar-core                                                            │
//! │  • Pure pricing: snapshots, merges, totals, coupon windows              │
//! │                                                                         │
//! │  bazaar-db                                                              │
//! │  • SQLite pool, migrations, repositories, transactions                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use bazaar_cart::CartService;
//! use bazaar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./bazaar.db")).await?;
//! let cart = CartService::new(db);
//!
//! let mutation = cart.add_to_cart(&user_id, &product_id, &variation, 2).await?;
//! println!("{} lines in cart", mutation.item_count);
//! ```

pub mod error;
pub mod service;
pub mod view;

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub use error::{CartError, CartErrorCode, CartResult};
pub use service::CartService;
pub use view::{CartLineView, CartMutation, CartView, TotalsView};

/// Initializes tracing for a process embedding the cart engine.
///
/// Default filter: INFO globally, DEBUG for bazaar crates, WARN for sqlx.
/// Override with `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bazaar=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
