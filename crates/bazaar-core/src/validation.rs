//! # Validation Module
//!
//! Input validation utilities for the cart engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (storefront)                                          │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart service (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: identifier and variation validation                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that quantity is NOT validated here. Quantities below one are
//! clamped to one by the pricing layer, never rejected.
//!
//! ## Usage
//! ```rust,no_run
//! use bazaar_core::validation::{validate_product_id, validate_coupon_code};
//!
//! validate_product_id("550e8400-e29b-41d4-a716-446655440000").unwrap();
//! let code = validate_coupon_code("  SAVE10 ").unwrap();
//! assert_eq!(code, "SAVE10");
//! ```

use crate::error::ValidationError;
use crate::variation::Variation;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a user identifier.
pub const MAX_USER_ID_LENGTH: usize = 64;

/// Maximum length of a coupon code.
pub const MAX_COUPON_CODE_LENGTH: usize = 64;

/// Maximum number of attributes in one variation pick.
pub const MAX_VARIATION_ATTRIBUTES: usize = 20;

/// Maximum length of a variation attribute name or value.
pub const MAX_ATTRIBUTE_LENGTH: usize = 100;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a user identifier.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
///
/// User IDs are opaque here: account IDs and guest session tokens both
/// pass through, so no format beyond length is enforced.
pub fn validate_user_id(user_id: &str) -> ValidationResult<()> {
    let user_id = user_id.trim();

    if user_id.is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }

    if user_id.len() > MAX_USER_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: "user_id".to_string(),
            max: MAX_USER_ID_LENGTH,
        });
    }

    Ok(())
}

/// Validates a product identifier.
///
/// ## Rules
/// - Must be a valid UUID format
/// - 36 characters with hyphens: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_product_id;
///
/// assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_product_id("not-a-uuid").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    // Try to parse as UUID
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "product_id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates a coupon code.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
/// - Must contain only alphanumeric characters, hyphens, underscores
///
/// ## Returns
/// The trimmed code. Matching against stored coupons is exact after
/// trimming; no case folding happens here.
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon_code".to_string(),
        });
    }

    if code.len() > MAX_COUPON_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "coupon_code".to_string(),
            max: MAX_COUPON_CODE_LENGTH,
        });
    }

    // Check for valid characters (alphanumeric, hyphen, underscore)
    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon_code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_string())
}

// =============================================================================
// Variation Validators
// =============================================================================

/// Validates a variation pick before it becomes part of line identity.
///
/// ## Rules
/// - At most 20 attributes
/// - Attribute names must not be empty
/// - Names and values at most 100 characters
pub fn validate_variation(variation: &Variation) -> ValidationResult<()> {
    if variation.len() > MAX_VARIATION_ATTRIBUTES {
        return Err(ValidationError::TooMany {
            field: "variation".to_string(),
            max: MAX_VARIATION_ATTRIBUTES,
        });
    }

    for (attribute, value) in variation.iter() {
        if attribute.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "variation attribute".to_string(),
            });
        }

        if attribute.len() > MAX_ATTRIBUTE_LENGTH {
            return Err(ValidationError::TooLong {
                field: "variation attribute".to_string(),
                max: MAX_ATTRIBUTE_LENGTH,
            });
        }

        if value.len() > MAX_ATTRIBUTE_LENGTH {
            return Err(ValidationError::TooLong {
                field: "variation value".to_string(),
                max: MAX_ATTRIBUTE_LENGTH,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("user-42").is_ok());
        assert!(validate_user_id("sess_9f8e7d6c").is_ok());

        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("   ").is_err());
        assert!(validate_user_id(&"u".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("not-a-uuid").is_err());
        assert!(validate_product_id("123").is_err());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert_eq!(validate_coupon_code("SAVE10").unwrap(), "SAVE10");
        assert_eq!(validate_coupon_code("  SAVE10 ").unwrap(), "SAVE10");
        assert!(validate_coupon_code("spring_sale-2").is_ok());

        assert!(validate_coupon_code("").is_err());
        assert!(validate_coupon_code("has space").is_err());
        assert!(validate_coupon_code(&"C".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_variation() {
        let mut pick = Variation::new();
        pick.set("size", "M");
        assert!(validate_variation(&pick).is_ok());

        // Empty pick is fine (product without options)
        assert!(validate_variation(&Variation::new()).is_ok());

        let mut empty_name = Variation::new();
        empty_name.set("  ", "M");
        assert!(validate_variation(&empty_name).is_err());

        let mut long_value = Variation::new();
        long_value.set("size", "M".repeat(200));
        assert!(validate_variation(&long_value).is_err());

        let mut too_many = Variation::new();
        for i in 0..30 {
            too_many.set(format!("attr{i}"), "v");
        }
        assert!(validate_variation(&too_many).is_err());
    }
}
