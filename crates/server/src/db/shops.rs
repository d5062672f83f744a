//! Shop queries.

use sqlx::PgExecutor;

use brewpoints_core::rules::{DEFAULT_FREE_ITEM_THRESHOLD, DEFAULT_POINTS_PER_100_UNITS};
use brewpoints_core::{Email, ShopId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{NewShop, Shop, ShopSettingsUpdate};

const SHOP_COLUMNS: &str = "id, name, admin_email, points_per_100_units, free_item_threshold, \
                            color, created_at, updated_at";

/// Unique constraint on the admin email.
pub const ADMIN_EMAIL_CONSTRAINT: &str = "shop_admin_email_key";

/// Create a shop with the default reward rules.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the admin email is already taken.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn create<'e, E>(executor: E, shop: &NewShop) -> Result<Shop, RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Shop>(&format!(
        "INSERT INTO loyalty.shop
             (id, name, admin_email, admin_password_hash, points_per_100_units, free_item_threshold)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {SHOP_COLUMNS}"
    ))
    .bind(ShopId::generate())
    .bind(&shop.name)
    .bind(shop.admin_email.as_str())
    .bind(&shop.admin_password_hash)
    .bind(DEFAULT_POINTS_PER_100_UNITS)
    .bind(DEFAULT_FREE_ITEM_THRESHOLD)
    .fetch_one(executor)
    .await
    .map_err(map_unique_violation)
}

/// Get a shop by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_by_id<'e, E>(executor: E, id: ShopId) -> Result<Option<Shop>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let shop = sqlx::query_as::<_, Shop>(&format!(
        "SELECT {SHOP_COLUMNS} FROM loyalty.shop WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(shop)
}

/// Get a shop together with its admin password hash, for sign-in.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_credentials<'e, E>(
    executor: E,
    admin_email: &Email,
) -> Result<Option<(Shop, String)>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    #[derive(sqlx::FromRow)]
    struct Row {
        #[sqlx(flatten)]
        shop: Shop,
        admin_password_hash: String,
    }

    let row = sqlx::query_as::<_, Row>(&format!(
        "SELECT {SHOP_COLUMNS}, admin_password_hash FROM loyalty.shop WHERE admin_email = $1"
    ))
    .bind(admin_email.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|r| (r.shop, r.admin_password_hash)))
}

/// List all shops, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list<'e, E>(executor: E) -> Result<Vec<Shop>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let shops = sqlx::query_as::<_, Shop>(&format!(
        "SELECT {SHOP_COLUMNS} FROM loyalty.shop ORDER BY created_at, id"
    ))
    .fetch_all(executor)
    .await?;

    Ok(shops)
}

/// Apply a partial settings update and return the updated shop.
///
/// Fields left as `None` keep their stored value.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the shop does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn update_settings<'e, E>(
    executor: E,
    id: ShopId,
    update: &ShopSettingsUpdate,
) -> Result<Shop, RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Shop>(&format!(
        "UPDATE loyalty.shop
         SET points_per_100_units = COALESCE($2, points_per_100_units),
             free_item_threshold = COALESCE($3, free_item_threshold),
             color = COALESCE($4, color),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {SHOP_COLUMNS}"
    ))
    .bind(id)
    .bind(update.points_per_100_units)
    .bind(update.free_item_threshold)
    .bind(update.color.as_deref())
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)
}
