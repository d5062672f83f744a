//! HTTP route handlers for the loyalty API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (database)
//!
//! # Auth (rate limited)
//! POST /api/auth/register-shop     - Create a shop, returns an admin token
//! POST /api/auth/login-shop        - Admin sign-in
//! POST /api/auth/register-guest    - Enroll a guest, returns a guest token
//! POST /api/auth/login-guest       - Guest sign-in by phone or email
//!
//! # Loyalty (guest token)
//! GET  /api/loyalty/profile        - Guest, balance, progress to a free item
//! GET  /api/loyalty/history        - Last 100 purchases
//! GET  /api/loyalty/rewards        - Last 100 redemptions
//! POST /api/loyalty/add-points     - Record a purchase
//! POST /api/loyalty/redeem         - Spend points on a free item
//!
//! # Admin (admin token)
//! GET  /api/admin/dashboard        - Guests, revenue, churn, top spenders
//! GET  /api/admin/churn-risk       - Guests away for more than 14 days
//! GET  /api/admin/settings         - Current reward rules
//! PUT  /api/admin/settings         - Partial update of reward rules
//! ```

pub mod admin;
pub mod auth;
pub mod health;
pub mod loyalty;

use axum::{
    Router,
    extract::FromRequest,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// JSON body extractor whose rejections render as `{"error": ...}` with 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Create the auth routes router.
///
/// `trust_proxy` decides whether the rate limiter keys on forwarding headers.
pub fn auth_routes(trust_proxy: bool) -> Router<AppState> {
    Router::new()
        .route("/register-shop", post(auth::register_shop))
        .route("/login-shop", post(auth::login_shop))
        .route("/register-guest", post(auth::register_guest))
        .route("/login-guest", post(auth::login_guest))
        .layer(auth_rate_limiter(trust_proxy))
}

/// Create the guest loyalty routes router.
pub fn loyalty_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(loyalty::profile))
        .route("/history", get(loyalty::history))
        .route("/rewards", get(loyalty::rewards))
        .route("/add-points", post(loyalty::add_points))
        .route("/redeem", post(loyalty::redeem))
}

/// Create the shop admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/churn-risk", get(admin::churn_risk))
        .route(
            "/settings",
            get(admin::settings).put(admin::update_settings),
        )
}

/// Create all routes for the loyalty API.
pub fn routes(trust_proxy: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes(trust_proxy))
        .nest("/api/loyalty", loyalty_routes())
        .nest("/api/admin", admin_routes())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("route not found".to_owned())
}
