//! Admin dashboard aggregates.

use rust_decimal::Decimal;
use serde::Serialize;

use brewpoints_core::{Email, GuestId, Phone};

/// Headline numbers for one shop.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_guests: i64,
    pub total_revenue: Decimal,
    /// Guests with no visit in the last 14 days, including those who never visited.
    pub churn_risk_count: i64,
    pub top_guests: Vec<TopGuest>,
}

/// A guest ranked by lifetime spend.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopGuest {
    pub guest_id: GuestId,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub total_spent: Decimal,
    pub visits: i64,
}
