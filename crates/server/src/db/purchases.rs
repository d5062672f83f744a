//! Purchase ledger queries.

use rust_decimal::Decimal;
use sqlx::PgExecutor;

use brewpoints_core::{GuestId, PurchaseId, ShopId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{NewPurchase, Purchase, TopGuest};

const PURCHASE_COLUMNS: &str =
    "id, guest_id, shop_id, check_id, amount, points, items, status, created_at";

/// Unique constraint making a check count once per guest.
pub const CHECK_CONSTRAINT: &str = "purchase_guest_check_key";

/// Whether a purchase with this check already exists for the guest.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn check_exists<'e, E>(
    executor: E,
    guest_id: GuestId,
    check_id: &str,
) -> Result<bool, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM loyalty.purchase WHERE guest_id = $1 AND check_id = $2)",
    )
    .bind(guest_id)
    .bind(check_id)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// Append a confirmed purchase.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` with [`CHECK_CONSTRAINT`] if the check
/// was already recorded for this guest.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn create<'e, E>(executor: E, purchase: &NewPurchase) -> Result<Purchase, RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Purchase>(&format!(
        "INSERT INTO loyalty.purchase (id, guest_id, shop_id, check_id, amount, points, items)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {PURCHASE_COLUMNS}"
    ))
    .bind(PurchaseId::generate())
    .bind(purchase.guest_id)
    .bind(purchase.shop_id)
    .bind(&purchase.check_id)
    .bind(purchase.amount)
    .bind(purchase.points)
    .bind(&purchase.items)
    .fetch_one(executor)
    .await
    .map_err(map_unique_violation)
}

/// A guest's most recent purchases, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_by_guest<'e, E>(
    executor: E,
    guest_id: GuestId,
    limit: i64,
) -> Result<Vec<Purchase>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let purchases = sqlx::query_as::<_, Purchase>(&format!(
        "SELECT {PURCHASE_COLUMNS} FROM loyalty.purchase
         WHERE guest_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT $2"
    ))
    .bind(guest_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(purchases)
}

/// Sum of all purchase amounts at a shop. Zero when there are none.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn total_revenue<'e, E>(executor: E, shop_id: ShopId) -> Result<Decimal, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let total = sqlx::query_scalar::<_, Decimal>(
        "SELECT COALESCE(SUM(amount), 0) FROM loyalty.purchase WHERE shop_id = $1",
    )
    .bind(shop_id)
    .fetch_one(executor)
    .await?;

    Ok(total)
}

/// Guests ranked by lifetime spend at a shop.
///
/// Ties are broken by guest ID so the ranking is stable.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn top_spenders<'e, E>(
    executor: E,
    shop_id: ShopId,
    limit: i64,
) -> Result<Vec<TopGuest>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let guests = sqlx::query_as::<_, TopGuest>(
        "SELECT g.id AS guest_id, g.phone, g.email,
                SUM(p.amount) AS total_spent,
                COUNT(*) AS visits
         FROM loyalty.purchase p
         JOIN loyalty.guest g ON g.id = p.guest_id
         WHERE p.shop_id = $1
         GROUP BY g.id, g.phone, g.email
         ORDER BY total_spent DESC, g.id ASC
         LIMIT $2",
    )
    .bind(shop_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(guests)
}
