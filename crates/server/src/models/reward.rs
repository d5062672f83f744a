//! Redeemed rewards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use brewpoints_core::{GuestId, RewardId, RewardKind, ShopId};

/// A reward granted to a guest in exchange for points.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reward {
    pub id: RewardId,
    pub guest_id: GuestId,
    pub shop_id: ShopId,
    pub kind: RewardKind,
    pub title: String,
    pub description: Option<String>,
    /// Points spent on this reward.
    pub points_reward: i64,
    pub unlocked_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReward {
    pub guest_id: GuestId,
    pub shop_id: ShopId,
    pub kind: RewardKind,
    pub points_reward: i64,
}
