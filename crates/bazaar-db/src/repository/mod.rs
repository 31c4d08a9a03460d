//! # Repository Layer
//!
//! Data access operations for cart domain entities.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Repository Pattern                                │
//! │                                                                         │
//! │  Cart Service                                                          │
//! │       │                                                                 │
//! │       │ db.cart_lines().list_active_with_products(user)                │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │           Repository                     │                           │
//! │  │  - Owns SQL queries                      │                           │
//! │  │  - Maps rows ↔ domain types              │                           │
//! │  │  - Translates sqlx errors to DbError     │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePool ──► SQLite file                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. **Repositories own all SQL** - No query strings outside this module
//! 2. **Domain types in, domain types out** - Callers never see rows
//! 3. **Write paths are explicit** - Merge steps take a transaction handle
//!    so the caller controls atomicity

pub mod cart_line;
pub mod coupon;
pub mod product;
