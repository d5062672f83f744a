//! Shop admin handlers.
//!
//! The shop is always the one named by the admin's bearer token.

use axum::{Json, extract::State};
use serde::Serialize;

use super::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{DashboardSummary, Guest, ShopSettings, ShopSettingsUpdate};
use crate::services::admin::AdminService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChurnRiskResponse {
    pub count: usize,
    pub guests: Vec<Guest>,
}

/// Headline numbers and top spenders.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<DashboardSummary>> {
    let summary = AdminService::new(state.pool()).dashboard(admin.shop_id).await?;
    Ok(Json(summary))
}

/// Guests at risk of churning.
pub async fn churn_risk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<ChurnRiskResponse>> {
    let guests = AdminService::new(state.pool())
        .churn_risk(admin.shop_id)
        .await?;
    Ok(Json(ChurnRiskResponse {
        count: guests.len(),
        guests,
    }))
}

/// Current reward rules.
pub async fn settings(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<ShopSettings>> {
    let settings = AdminService::new(state.pool()).settings(admin.shop_id).await?;
    Ok(Json(settings))
}

/// Partially update reward rules; returns the settings now in force.
pub async fn update_settings(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(update): ApiJson<ShopSettingsUpdate>,
) -> Result<Json<ShopSettings>> {
    let settings = AdminService::new(state.pool())
        .update_settings(admin.shop_id, update)
        .await?;
    Ok(Json(settings))
}
