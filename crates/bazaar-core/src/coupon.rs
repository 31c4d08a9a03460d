//! # Coupons
//!
//! A coupon is a code-addressed discount with an optional validity window.
//! Validity is checked against an instant the caller supplies, so the rule
//! itself stays pure and testable with fixed timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Adjustment, AdjustmentKind};

// =============================================================================
// Coupon Status
// =============================================================================

/// Whether a coupon is administratively enabled.
///
/// Status and validity window are independent checks: a disabled coupon is
/// invalid even inside its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    Active,
    Disabled,
}

// =============================================================================
// Coupon
// =============================================================================

/// A discount code redeemable against the whole cart.
///
/// The discount encoding mirrors products: a raw integer plus a kind tag,
/// decoded through [`Adjustment::from_raw`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Coupon {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The code shoppers type. Business identifier, unique per shop.
    pub code: String,

    /// Discount value: bps when percent, minor units when flat.
    pub discount_value: i64,

    /// How to interpret `discount_value`.
    pub discount_kind: AdjustmentKind,

    pub status: CouponStatus,

    /// Start of the validity window. `None` means valid from creation.
    pub starts_at: Option<DateTime<Utc>>,

    /// End of the validity window. `None` means never expires.
    pub ends_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Checks whether the coupon can be redeemed at `instant`.
    ///
    /// Window boundaries are inclusive on both ends.
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        if self.status != CouponStatus::Active {
            return false;
        }
        if let Some(starts_at) = self.starts_at {
            if instant < starts_at {
                return false;
            }
        }
        if let Some(ends_at) = self.ends_at {
            if instant > ends_at {
                return false;
            }
        }
        true
    }

    /// Returns the configured discount, if any.
    #[inline]
    pub fn discount(&self) -> Option<Adjustment> {
        Adjustment::from_raw(self.discount_value, self.discount_kind)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
