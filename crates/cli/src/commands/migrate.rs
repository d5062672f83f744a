//! Database migration command.
//!
//! Applies the migrations in `crates/server/migrations/`, which are embedded
//! into the binary at build time.
//!
//! ```text
//! migrations/
//! ├── 20260301000001_create_shop.sql
//! ├── 20260301000002_create_guest.sql
//! ├── 20260301000003_create_purchase.sql
//! └── 20260301000004_create_reward.sql
//! ```

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails to apply.
pub async fn run() -> Result<(), super::CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
