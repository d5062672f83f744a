//! Guest-facing loyalty handlers.
//!
//! All handlers act on the guest and shop named by the bearer token.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use brewpoints_core::{RewardKind, ShopId, rules::points_to_free_item};

use super::ApiJson;
use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::RequireGuest;
use crate::models::{Guest, Purchase, Reward};
use crate::services::points::{PointsService, PurchaseInput};
use crate::state::AppState;

/// Most purchases or rewards returned by the list endpoints.
pub const LIST_LIMIT: i64 = 100;

// =============================================================================
// Request Types
// =============================================================================

/// A purchase reported by the point of sale.
#[derive(Debug, Deserialize)]
pub struct AddPointsRequest {
    pub check_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    #[serde(rename = "type")]
    pub kind: RewardKind,
}

// =============================================================================
// Response Types
// =============================================================================

/// Shop details a guest client needs for display.
#[derive(Debug, Serialize)]
pub struct ShopSummary {
    pub id: ShopId,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: Guest,
    pub free_item_threshold: i64,
    pub progress_to_free: i64,
    pub shop: ShopSummary,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub purchases: Vec<Purchase>,
}

#[derive(Debug, Serialize)]
pub struct RewardsResponse {
    pub rewards: Vec<Reward>,
}

#[derive(Debug, Serialize)]
pub struct AddPointsResponse {
    pub purchase: Purchase,
    pub new_balance: i64,
    pub to_free_item: i64,
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub message: &'static str,
    pub reward: Reward,
    pub new_balance: i64,
}

// =============================================================================
// Handlers
// =============================================================================

/// The signed-in guest with their progress toward a free item.
pub async fn profile(
    State(state): State<AppState>,
    RequireGuest(current): RequireGuest,
) -> Result<Json<ProfileResponse>> {
    let guest = db::guests::find_in_shop(state.pool(), current.shop_id, current.guest_id)
        .await?
        .ok_or_else(|| AppError::NotFound("guest not found".to_owned()))?;

    let shop = db::shops::find_by_id(state.pool(), current.shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("shop not found".to_owned()))?;

    Ok(Json(ProfileResponse {
        progress_to_free: points_to_free_item(shop.free_item_threshold, guest.balance),
        free_item_threshold: shop.free_item_threshold,
        user: guest,
        shop: ShopSummary {
            id: shop.id,
            name: shop.name,
            color: shop.color,
        },
    }))
}

/// The guest's most recent purchases, newest first.
pub async fn history(
    State(state): State<AppState>,
    RequireGuest(current): RequireGuest,
) -> Result<Json<HistoryResponse>> {
    let purchases =
        db::purchases::list_by_guest(state.pool(), current.guest_id, LIST_LIMIT).await?;
    Ok(Json(HistoryResponse { purchases }))
}

/// The guest's most recent redemptions, newest first.
pub async fn rewards(
    State(state): State<AppState>,
    RequireGuest(current): RequireGuest,
) -> Result<Json<RewardsResponse>> {
    let rewards = db::rewards::list_by_guest(state.pool(), current.guest_id, LIST_LIMIT).await?;
    Ok(Json(RewardsResponse { rewards }))
}

/// Record a purchase and credit its points.
pub async fn add_points(
    State(state): State<AppState>,
    RequireGuest(current): RequireGuest,
    ApiJson(req): ApiJson<AddPointsRequest>,
) -> Result<Json<AddPointsResponse>> {
    let input = PurchaseInput::new(&req.check_id, req.amount, req.items)?;

    let receipt = PointsService::new(state.pool())
        .record_purchase(current.shop_id, current.guest_id, input)
        .await?;

    Ok(Json(AddPointsResponse {
        purchase: receipt.purchase,
        new_balance: receipt.new_balance,
        to_free_item: receipt.to_free_item,
    }))
}

/// Spend the shop's threshold on a free item.
pub async fn redeem(
    State(state): State<AppState>,
    RequireGuest(current): RequireGuest,
    ApiJson(req): ApiJson<RedeemRequest>,
) -> Result<Json<RedeemResponse>> {
    let redemption = PointsService::new(state.pool())
        .redeem(current.shop_id, current.guest_id, req.kind)
        .await?;

    Ok(Json(RedeemResponse {
        message: "free item redeemed",
        reward: redemption.reward,
        new_balance: redemption.new_balance,
    }))
}
