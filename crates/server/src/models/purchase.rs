//! Purchase ledger types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use brewpoints_core::{GuestId, PurchaseId, PurchaseStatus, ShopId};

/// A confirmed purchase and the points it earned.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Purchase {
    pub id: PurchaseId,
    pub guest_id: GuestId,
    pub shop_id: ShopId,
    /// Point-of-sale check identifier, unique per guest.
    pub check_id: String,
    pub amount: Decimal,
    pub points: i64,
    pub items: Vec<String>,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the purchase ledger.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub guest_id: GuestId,
    pub shop_id: ShopId,
    pub check_id: String,
    pub amount: Decimal,
    pub points: i64,
    pub items: Vec<String>,
}
