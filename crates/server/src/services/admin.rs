//! Shop admin dashboard and settings.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use brewpoints_core::ShopId;
use brewpoints_core::rules::churn_cutoff;

use crate::db::{self, RepositoryError};
use crate::models::{DashboardSummary, Guest, ShopSettings, ShopSettingsUpdate};

/// Number of guests listed in the dashboard ranking.
pub const TOP_GUESTS_LIMIT: i64 = 10;

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The update carried no fields.
    #[error("no fields to update")]
    NoFieldsProvided,

    /// A supplied field is out of range.
    #[error("{0}")]
    InvalidSetting(String),

    #[error("shop not found")]
    ShopNotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Admin operations scoped to one shop.
pub struct AdminService<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Guest count, revenue, churn count, and the top spenders of a shop.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if a query fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, shop_id: ShopId) -> Result<DashboardSummary, AdminError> {
        self.dashboard_at(shop_id, Utc::now()).await
    }

    async fn dashboard_at(
        &self,
        shop_id: ShopId,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, AdminError> {
        let cutoff = churn_cutoff(now);

        let (total_guests, total_revenue, churn_risk_count, top_guests) = tokio::try_join!(
            db::guests::count_by_shop(self.pool, shop_id),
            db::purchases::total_revenue(self.pool, shop_id),
            db::guests::count_churn_risk(self.pool, shop_id, cutoff),
            db::purchases::top_spenders(self.pool, shop_id, TOP_GUESTS_LIMIT),
        )?;

        Ok(DashboardSummary {
            total_guests,
            total_revenue,
            churn_risk_count,
            top_guests,
        })
    }

    /// Guests who never visited or have been away longer than the churn window.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn churn_risk(&self, shop_id: ShopId) -> Result<Vec<Guest>, AdminError> {
        let guests =
            db::guests::list_churn_risk(self.pool, shop_id, churn_cutoff(Utc::now())).await?;
        Ok(guests)
    }

    /// Current reward rules and branding.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::ShopNotFound` if the shop no longer exists.
    pub async fn settings(&self, shop_id: ShopId) -> Result<ShopSettings, AdminError> {
        let shop = db::shops::find_by_id(self.pool, shop_id)
            .await?
            .ok_or(AdminError::ShopNotFound)?;
        Ok(shop.settings())
    }

    /// Apply a partial settings update and return the resulting settings.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NoFieldsProvided` for an empty update and
    /// `AdminError::InvalidSetting` for out-of-range values.
    #[instrument(skip(self))]
    pub async fn update_settings(
        &self,
        shop_id: ShopId,
        update: ShopSettingsUpdate,
    ) -> Result<ShopSettings, AdminError> {
        let update = validate_update(update)?;

        let shop = db::shops::update_settings(self.pool, shop_id, &update)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AdminError::ShopNotFound,
                other => AdminError::Repository(other),
            })?;

        tracing::info!("Shop settings updated");
        Ok(shop.settings())
    }
}

/// Check ranges and normalize the color to lowercase.
fn validate_update(mut update: ShopSettingsUpdate) -> Result<ShopSettingsUpdate, AdminError> {
    if update.is_empty() {
        return Err(AdminError::NoFieldsProvided);
    }

    if let Some(rate) = update.points_per_100_units
        && rate < 0
    {
        return Err(AdminError::InvalidSetting(
            "points_per_100_units must not be negative".to_owned(),
        ));
    }

    if let Some(threshold) = update.free_item_threshold
        && threshold < 1
    {
        return Err(AdminError::InvalidSetting(
            "free_item_threshold must be at least 1".to_owned(),
        ));
    }

    if let Some(color) = update.color.take() {
        let color = color.trim().to_ascii_lowercase();
        if !is_hex_color(&color) {
            return Err(AdminError::InvalidSetting(
                "color must be a hex color like #6f4e37".to_owned(),
            ));
        }
        update.color = Some(color);
    }

    Ok(update)
}

/// `#rgb` or `#rrggbb`.
fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_rejected() {
        assert!(matches!(
            validate_update(ShopSettingsUpdate::default()),
            Err(AdminError::NoFieldsProvided)
        ));
    }

    #[test]
    fn test_ranges() {
        let negative_rate = ShopSettingsUpdate {
            points_per_100_units: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            validate_update(negative_rate),
            Err(AdminError::InvalidSetting(_))
        ));

        let zero_threshold = ShopSettingsUpdate {
            free_item_threshold: Some(0),
            ..Default::default()
        };
        assert!(validate_update(zero_threshold).is_err());

        let zero_rate = ShopSettingsUpdate {
            points_per_100_units: Some(0),
            ..Default::default()
        };
        assert!(validate_update(zero_rate).is_ok());
    }

    #[test]
    fn test_color_normalized() {
        let update = ShopSettingsUpdate {
            color: Some(" #A0B1C2 ".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            validate_update(update).unwrap().color.as_deref(),
            Some("#a0b1c2")
        );
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#6f4e37"));
        assert!(!is_hex_color("6f4e37"));
        assert!(!is_hex_color("#6f4e3"));
        assert!(!is_hex_color("#ggg"));
        assert!(!is_hex_color("#"));
    }
}
