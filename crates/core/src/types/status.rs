//! Status and role enums shared between the server and the CLI.

use serde::{Deserialize, Serialize};

/// Role carried in a bearer token.
///
/// Shop admins manage one shop's dashboard and settings; guests accrue and
/// redeem points at the shop they registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrator of a single shop.
    Admin,
    /// Loyalty program member.
    Guest,
}

impl Role {
    /// Wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Guest => "guest",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "guest" => Ok(Self::Guest),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Lifecycle status of a recorded purchase.
///
/// Every purchase accepted through the API is confirmed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "loyalty.purchase_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    #[default]
    Confirmed,
}

/// Kind of reward a guest can redeem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "loyalty.reward_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// One free item once the shop's threshold is reached.
    #[serde(alias = "free_coffee")]
    FreeItem,
}

impl RewardKind {
    /// Human readable title stored alongside a redemption.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::FreeItem => "Free item",
        }
    }
}
