//! # bazaar-db: Database Layer for the Bazaar Cart Engine
//!
//! This crate provides database access for the cart engine.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bazaar Cart Data Flow                             │
//! │                                                                         │
//! │  Cart service call (add_to_cart)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (cart_line.rs)│    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Transactions  │◄───│ CartLineRepo  │    │ ...          │  │   │
//! │  │   │ Management    │    │ CouponRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                  ./data/bazaar.db (WAL mode)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, cart line, coupon)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/db.sqlite");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let product = db.products().get_by_id("uuid-here").await?;
//!
//! // Merge-or-insert runs inside a transaction
//! let mut tx = db.begin().await?;
//! let existing = db.cart_lines().find_active(&mut tx, "user", "product", "{}").await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart_line::{CartLineRepository, CartLineWithProduct};
pub use repository::coupon::CouponRepository;
pub use repository::product::ProductRepository;
