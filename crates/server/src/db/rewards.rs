//! Reward queries.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use brewpoints_core::{GuestId, RewardId};

use super::RepositoryError;
use crate::models::{NewReward, Reward};

const REWARD_COLUMNS: &str =
    "id, guest_id, shop_id, kind, title, description, points_reward, unlocked_at, created_at";

/// Record a redeemed reward.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create<'e, E>(
    executor: E,
    reward: &NewReward,
    unlocked_at: DateTime<Utc>,
) -> Result<Reward, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let reward = sqlx::query_as::<_, Reward>(&format!(
        "INSERT INTO loyalty.reward (id, guest_id, shop_id, kind, title, points_reward, unlocked_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {REWARD_COLUMNS}"
    ))
    .bind(RewardId::generate())
    .bind(reward.guest_id)
    .bind(reward.shop_id)
    .bind(reward.kind)
    .bind(reward.kind.title())
    .bind(reward.points_reward)
    .bind(unlocked_at)
    .fetch_one(executor)
    .await?;

    Ok(reward)
}

/// A guest's most recent rewards, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_by_guest<'e, E>(
    executor: E,
    guest_id: GuestId,
    limit: i64,
) -> Result<Vec<Reward>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let rewards = sqlx::query_as::<_, Reward>(&format!(
        "SELECT {REWARD_COLUMNS} FROM loyalty.reward
         WHERE guest_id = $1
         ORDER BY unlocked_at DESC, id DESC
         LIMIT $2"
    ))
    .bind(guest_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rewards)
}
