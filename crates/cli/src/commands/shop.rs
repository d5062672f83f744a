//! Shop management commands.
//!
//! # Usage
//!
//! ```bash
//! bp-cli shop create -n "Bean There" -e owner@beanthere.example -p s3cret!
//! bp-cli shop list
//! ```

use brewpoints_server::db;
use brewpoints_server::services::auth::create_shop;

/// Create a shop with its admin credentials.
///
/// Applies the same validation and hashing as `POST /api/auth/register-shop`.
///
/// # Errors
///
/// Returns an error for invalid input, a taken admin email, or a database failure.
pub async fn create(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), super::CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Creating shop: {}", name);
    let shop = create_shop(&pool, name, email, password).await?;

    tracing::info!("Shop created successfully!");
    tracing::info!("  ID: {}", shop.id);
    tracing::info!("  Name: {}", shop.name);
    tracing::info!("  Admin: {}", shop.admin_email);
    tracing::info!(
        "  Rules: {} point(s) per 100, free item at {}",
        shop.points_per_100_units,
        shop.free_item_threshold
    );
    Ok(())
}

/// List all shops, oldest first.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub async fn list() -> Result<(), super::CommandError> {
    let pool = super::connect().await?;

    let shops = db::shops::list(&pool).await?;
    if shops.is_empty() {
        tracing::info!("No shops yet. Create one with `bp-cli shop create`.");
        return Ok(());
    }

    for shop in shops {
        tracing::info!(
            "{}  {}  <{}>  {}/100, free at {}",
            shop.id,
            shop.name,
            shop.admin_email,
            shop.points_per_100_units,
            shop.free_item_threshold
        );
    }
    Ok(())
}
