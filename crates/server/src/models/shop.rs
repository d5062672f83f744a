//! Shop (tenant) domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brewpoints_core::{Email, ShopId};

/// A coffee shop running its own loyalty program.
///
/// The admin password hash is never loaded into this type; see
/// [`crate::db::shops::find_credentials`].
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Shop {
    /// Unique shop ID.
    pub id: ShopId,
    /// Display name.
    pub name: String,
    /// Email the shop administrator signs in with.
    pub admin_email: Email,
    /// Points granted per full 100 currency units spent.
    pub points_per_100_units: i32,
    /// Balance required to redeem a free item.
    pub free_item_threshold: i64,
    /// Brand color used by guest-facing clients.
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    /// Reward rules currently in force.
    #[must_use]
    pub fn settings(&self) -> ShopSettings {
        ShopSettings {
            points_per_100_units: self.points_per_100_units,
            free_item_threshold: self.free_item_threshold,
            color: self.color.clone(),
        }
    }
}

/// Fields required to create a shop.
#[derive(Debug, Clone)]
pub struct NewShop {
    pub name: String,
    pub admin_email: Email,
    pub admin_password_hash: String,
}

/// Reward rules and branding as exposed to shop admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSettings {
    pub points_per_100_units: i32,
    pub free_item_threshold: i64,
    pub color: String,
}

/// Partial settings update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShopSettingsUpdate {
    #[serde(default, alias = "points_per_100_rub")]
    pub points_per_100_units: Option<i32>,
    #[serde(default, alias = "free_coffee_at_points")]
    pub free_item_threshold: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ShopSettingsUpdate {
    /// Returns `true` when no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points_per_100_units.is_none()
            && self.free_item_threshold.is_none()
            && self.color.is_none()
    }
}
