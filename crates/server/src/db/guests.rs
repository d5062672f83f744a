//! Guest queries, including the balance mutations used by the points engine.
//!
//! Balance changes are single `UPDATE ... RETURNING` statements and are meant
//! to run inside the caller's transaction.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use brewpoints_core::{GuestId, ShopId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Guest, GuestIdentity, NewGuest};

const GUEST_COLUMNS: &str =
    "id, shop_id, phone, email, balance, last_visit, created_at, updated_at";

/// Unique index on guest phone numbers.
pub const PHONE_CONSTRAINT: &str = "guest_phone_key";
/// Unique index on guest emails.
pub const EMAIL_CONSTRAINT: &str = "guest_email_key";

/// Enroll a guest with a zero balance.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the phone or email is already registered.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn create<'e, E>(executor: E, guest: &NewGuest) -> Result<Guest, RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Guest>(&format!(
        "INSERT INTO loyalty.guest (id, shop_id, phone, email)
         VALUES ($1, $2, $3, $4)
         RETURNING {GUEST_COLUMNS}"
    ))
    .bind(GuestId::generate())
    .bind(guest.shop_id)
    .bind(guest.phone.as_ref().map(brewpoints_core::Phone::as_str))
    .bind(guest.email.as_ref().map(brewpoints_core::Email::as_str))
    .fetch_one(executor)
    .await
    .map_err(map_unique_violation)
}

/// Get a guest of `shop_id` by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_in_shop<'e, E>(
    executor: E,
    shop_id: ShopId,
    id: GuestId,
) -> Result<Option<Guest>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let guest = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM loyalty.guest WHERE id = $1 AND shop_id = $2"
    ))
    .bind(id)
    .bind(shop_id)
    .fetch_optional(executor)
    .await?;

    Ok(guest)
}

/// Find a guest of `shop_id` by phone or email.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_by_identity<'e, E>(
    executor: E,
    shop_id: ShopId,
    identity: &GuestIdentity,
) -> Result<Option<Guest>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let (column, value) = match identity {
        GuestIdentity::Phone(phone) => ("phone", phone.as_str()),
        GuestIdentity::Email(email) => ("email", email.as_str()),
    };

    let guest = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM loyalty.guest WHERE shop_id = $1 AND {column} = $2"
    ))
    .bind(shop_id)
    .bind(value)
    .fetch_optional(executor)
    .await?;

    Ok(guest)
}

/// Add `points` to a balance and return the new balance.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the guest does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn add_points<'e, E>(
    executor: E,
    id: GuestId,
    points: i64,
) -> Result<i64, RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        "UPDATE loyalty.guest
         SET balance = balance + $2, updated_at = NOW()
         WHERE id = $1
         RETURNING balance",
    )
    .bind(id)
    .bind(points)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// Subtract `points` from a balance and return the new balance.
///
/// The `balance >= 0` check constraint rejects overdrafts; callers lock the
/// row with [`lock_balance`] and compare first.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the guest does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn deduct_points<'e, E>(
    executor: E,
    id: GuestId,
    points: i64,
) -> Result<i64, RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        "UPDATE loyalty.guest
         SET balance = balance - $2, updated_at = NOW()
         WHERE id = $1
         RETURNING balance",
    )
    .bind(id)
    .bind(points)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// Read a balance with `FOR UPDATE`, blocking concurrent redemptions of the
/// same guest until the surrounding transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_balance<'e, E>(
    executor: E,
    shop_id: ShopId,
    id: GuestId,
) -> Result<Option<i64>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let balance = sqlx::query_scalar::<_, i64>(
        "SELECT balance FROM loyalty.guest WHERE id = $1 AND shop_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(shop_id)
    .fetch_optional(executor)
    .await?;

    Ok(balance)
}

/// Record a visit at `at`.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the guest does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn touch_last_visit<'e, E>(
    executor: E,
    id: GuestId,
    at: DateTime<Utc>,
) -> Result<(), RepositoryError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE loyalty.guest SET last_visit = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(at)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Number of guests enrolled at a shop.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn count_by_shop<'e, E>(executor: E, shop_id: ShopId) -> Result<i64, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM loyalty.guest WHERE shop_id = $1")
            .bind(shop_id)
            .fetch_one(executor)
            .await?;

    Ok(count)
}

/// Number of guests who never visited or last visited before `cutoff`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn count_churn_risk<'e, E>(
    executor: E,
    shop_id: ShopId,
    cutoff: DateTime<Utc>,
) -> Result<i64, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM loyalty.guest
         WHERE shop_id = $1 AND (last_visit IS NULL OR last_visit < $2)",
    )
    .bind(shop_id)
    .bind(cutoff)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

/// Guests who never visited or last visited before `cutoff`.
///
/// Never-visited guests come first, then the longest absent.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_churn_risk<'e, E>(
    executor: E,
    shop_id: ShopId,
    cutoff: DateTime<Utc>,
) -> Result<Vec<Guest>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let guests = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM loyalty.guest
         WHERE shop_id = $1 AND (last_visit IS NULL OR last_visit < $2)
         ORDER BY last_visit ASC NULLS FIRST, id ASC"
    ))
    .bind(shop_id)
    .bind(cutoff)
    .fetch_all(executor)
    .await?;

    Ok(guests)
}
