//! Guest (loyalty member) domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use brewpoints_core::{Email, GuestId, Phone, ShopId};

/// A loyalty member of a single shop.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Guest {
    pub id: GuestId,
    pub shop_id: ShopId,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    /// Current point balance. Never negative.
    pub balance: i64,
    /// Last purchase or redemption, `None` if the guest never came back.
    pub last_visit: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to enroll a guest.
#[derive(Debug, Clone)]
pub struct NewGuest {
    pub shop_id: ShopId,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
}

/// How a guest identifies themselves at sign-in.
///
/// Phone takes precedence when a client sends both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestIdentity {
    Phone(Phone),
    Email(Email),
}

impl GuestIdentity {
    /// Pick the lookup key from optional phone and email.
    #[must_use]
    pub fn from_parts(phone: Option<Phone>, email: Option<Email>) -> Option<Self> {
        phone.map(Self::Phone).or_else(|| email.map(Self::Email))
    }
}
