//! Registration and sign-in handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brewpoints_core::{GuestId, Role, ShopId};

use super::ApiJson;
use crate::error::Result;
use crate::models::Guest;
use crate::services::auth::{AuthService, IssuedToken};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Shop registration body.
#[derive(Debug, Deserialize)]
pub struct RegisterShopRequest {
    pub name: String,
    pub admin_email: String,
    #[serde(alias = "password")]
    pub admin_password: String,
}

/// Admin sign-in body.
#[derive(Debug, Deserialize)]
pub struct LoginShopRequest {
    pub admin_email: String,
    #[serde(alias = "password")]
    pub admin_password: String,
}

/// Guest registration and sign-in body. At least one of phone and email is required.
#[derive(Debug, Deserialize)]
pub struct GuestAuthRequest {
    pub shop_id: ShopId,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ShopTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub shop_id: ShopId,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct GuestTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: GuestId,
    pub role: Role,
    pub user: Guest,
}

impl ShopTokenResponse {
    fn new(shop_id: ShopId, token: IssuedToken) -> Self {
        Self {
            token: token.token,
            expires_at: token.expires_at,
            shop_id,
            role: Role::Admin,
        }
    }
}

impl GuestTokenResponse {
    fn new(guest: Guest, token: IssuedToken) -> Self {
        Self {
            token: token.token,
            expires_at: token.expires_at,
            user_id: guest.id,
            role: Role::Guest,
            user: guest,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a shop and return an admin token.
pub async fn register_shop(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterShopRequest>,
) -> Result<(StatusCode, Json<ShopTokenResponse>)> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (shop, token) = auth
        .register_shop(&req.name, &req.admin_email, &req.admin_password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ShopTokenResponse::new(shop.id, token)),
    ))
}

/// Sign a shop admin in.
pub async fn login_shop(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginShopRequest>,
) -> Result<Json<ShopTokenResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (shop, token) = auth
        .login_shop(&req.admin_email, &req.admin_password)
        .await?;

    Ok(Json(ShopTokenResponse::new(shop.id, token)))
}

/// Enroll a guest at a shop and return a guest token.
pub async fn register_guest(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GuestAuthRequest>,
) -> Result<(StatusCode, Json<GuestTokenResponse>)> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (guest, token) = auth
        .register_guest(req.shop_id, req.phone.as_deref(), req.email.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GuestTokenResponse::new(guest, token)),
    ))
}

/// Sign a guest in by phone or email.
pub async fn login_guest(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GuestAuthRequest>,
) -> Result<Json<GuestTokenResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (guest, token) = auth
        .login_guest(req.shop_id, req.phone.as_deref(), req.email.as_deref())
        .await?;

    Ok(Json(GuestTokenResponse::new(guest, token)))
}
