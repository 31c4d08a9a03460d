//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartError (in bazaar-cart) ← Serialized for callers                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Storefront displays user-friendly message                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    /// - Line was already removed from the cart
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two concurrent adds race to create the same active line
    ///   (the `idx_cart_lines_identity` index rejects the second)
    /// - Inserting a duplicate SKU or coupon code
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Cart line references a product_id that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    ///
    /// ## When This Occurs
    /// - Invalid SQL in migration
    /// - Migration version conflict
    /// - Schema incompatibility
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Repositories read through fetch_optional and attach real
            // entity context themselves; this arm only catches a stray
            // fetch_one.
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error codes for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>[, ...]"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    unique_violation_from(msg)
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Builds the [`DbError::UniqueViolation`] for a SQLite unique-constraint
/// message. SQLite names the offending columns, never the values.
///
/// The active-line identity index trips when two adds race for the same
/// (user, product, variation); that case is reported as one logical
/// "active cart line" duplicate, with the column list kept as the value,
/// instead of echoing three raw column names as the field.
fn unique_violation_from(msg: &str) -> DbError {
    let columns = msg
        .split("UNIQUE constraint failed: ")
        .nth(1)
        .unwrap_or("")
        .trim();

    if columns.starts_with("cart_lines.") && columns.contains("variation_sig") {
        return DbError::duplicate("active cart line", columns);
    }

    match columns.rsplit_once('.') {
        // Single-column uniques read as the bare column: "sku", "code"
        Some((_, column)) if !columns.contains(',') => DbError::duplicate(column, "unknown"),
        _ if columns.is_empty() => DbError::duplicate("unknown", "unknown"),
        _ => DbError::duplicate(columns, "unknown"),
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_parse_identity_index() {
        // Verbatim SQLite message for the active-line identity index
        let err = unique_violation_from(
            "UNIQUE constraint failed: cart_lines.user_id, cart_lines.product_id, cart_lines.variation_sig",
        );
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "active cart line");
                assert!(value.contains("cart_lines.variation_sig"));
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_unique_parse_single_column() {
        let err = unique_violation_from("UNIQUE constraint failed: products.sku");
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "sku");
                assert_eq!(value, "unknown");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_unique_parse_unrecognized_message() {
        let err = unique_violation_from("UNIQUE constraint failed");
        match err {
            DbError::UniqueViolation { field, .. } => assert_eq!(field, "unknown"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_identity_duplicate_display() {
        let err = DbError::duplicate("active cart line", "cart_lines.user_id");
        assert_eq!(
            err.to_string(),
            "Duplicate active cart line: 'cart_lines.user_id' already exists"
        );
    }
}
