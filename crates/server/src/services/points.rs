//! Points engine.
//!
//! Accrual and redemption each run in a single transaction. Accrual relies on
//! the `(guest_id, check_id)` unique constraint to count a check once; redemption
//! locks the guest row so concurrent redemptions cannot overdraw a balance.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::instrument;

use brewpoints_core::rules::{calculate_points, can_redeem, points_to_free_item};
use brewpoints_core::{GuestId, RewardKind, ShopId};

use crate::db::{self, RepositoryError};
use crate::models::{NewPurchase, NewReward, Purchase, Reward};

/// Longest accepted check identifier.
pub const MAX_CHECK_ID_LENGTH: usize = 128;
/// Most line items accepted on one purchase.
pub const MAX_ITEMS: usize = 100;
/// Longest accepted line item label.
pub const MAX_ITEM_LENGTH: usize = 200;

/// Errors from the points engine.
#[derive(Debug, Error)]
pub enum PointsError {
    /// Malformed purchase input.
    #[error("{0}")]
    InvalidInput(String),

    /// The check was already recorded for this guest.
    #[error("check already processed")]
    DuplicateCheck,

    #[error("shop not found")]
    ShopNotFound,

    #[error("guest not found")]
    GuestNotFound,

    /// Balance below the redemption cost.
    #[error("insufficient points: balance {balance}, required {required}")]
    InsufficientBalance { balance: i64, required: i64 },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PointsError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// A purchase as reported by the point of sale, already validated.
#[derive(Debug, Clone)]
pub struct PurchaseInput {
    check_id: String,
    amount: Decimal,
    items: Vec<String>,
}

impl PurchaseInput {
    /// Validate a purchase.
    ///
    /// The check ID is trimmed and must be non-empty. The amount must be
    /// positive with at most two decimal places. Blank items are dropped.
    ///
    /// # Errors
    ///
    /// Returns `PointsError::InvalidInput` describing the first problem found.
    pub fn new(check_id: &str, amount: Decimal, items: Vec<String>) -> Result<Self, PointsError> {
        let check_id = check_id.trim();
        if check_id.is_empty() {
            return Err(PointsError::InvalidInput("check_id is required".to_owned()));
        }
        if check_id.chars().count() > MAX_CHECK_ID_LENGTH {
            return Err(PointsError::InvalidInput(format!(
                "check_id must be at most {MAX_CHECK_ID_LENGTH} characters"
            )));
        }

        if amount <= Decimal::ZERO {
            return Err(PointsError::InvalidInput(
                "amount must be greater than zero".to_owned(),
            ));
        }
        if amount.normalize().scale() > 2 {
            return Err(PointsError::InvalidInput(
                "amount must have at most two decimal places".to_owned(),
            ));
        }
        // NUMERIC(12, 2)
        if amount >= Decimal::from(10_000_000_000_i64) {
            return Err(PointsError::InvalidInput("amount is too large".to_owned()));
        }

        let items: Vec<String> = items
            .into_iter()
            .map(|item| item.trim().to_owned())
            .filter(|item| !item.is_empty())
            .collect();
        if items.len() > MAX_ITEMS {
            return Err(PointsError::InvalidInput(format!(
                "at most {MAX_ITEMS} items per purchase"
            )));
        }
        if items.iter().any(|item| item.chars().count() > MAX_ITEM_LENGTH) {
            return Err(PointsError::InvalidInput(format!(
                "items must be at most {MAX_ITEM_LENGTH} characters"
            )));
        }

        Ok(Self {
            check_id: check_id.to_owned(),
            amount,
            items,
        })
    }

    #[must_use]
    pub fn check_id(&self) -> &str {
        &self.check_id
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Outcome of a recorded purchase.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub purchase: Purchase,
    pub new_balance: i64,
    /// Points still missing for a free item. Negative once past the threshold.
    pub to_free_item: i64,
}

/// Outcome of a redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub reward: Reward,
    pub new_balance: i64,
}

/// Points engine bound to a connection pool.
pub struct PointsService<'a> {
    pool: &'a PgPool,
}

impl<'a> PointsService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a purchase and credit its points.
    ///
    /// The duplicate check, ledger insert, balance credit, and visit stamp
    /// commit together or not at all.
    ///
    /// # Errors
    ///
    /// Returns `PointsError::DuplicateCheck` if the check was already recorded.
    /// Returns `PointsError::ShopNotFound` or `PointsError::GuestNotFound` if
    /// either party is gone.
    #[instrument(skip(self, input), fields(check_id = %input.check_id()))]
    pub async fn record_purchase(
        &self,
        shop_id: ShopId,
        guest_id: GuestId,
        input: PurchaseInput,
    ) -> Result<PurchaseReceipt, PointsError> {
        let mut tx = self.pool.begin().await?;

        if db::purchases::check_exists(&mut *tx, guest_id, &input.check_id).await? {
            return Err(PointsError::DuplicateCheck);
        }

        let shop = db::shops::find_by_id(&mut *tx, shop_id)
            .await?
            .ok_or(PointsError::ShopNotFound)?;

        if db::guests::find_in_shop(&mut *tx, shop_id, guest_id)
            .await?
            .is_none()
        {
            return Err(PointsError::GuestNotFound);
        }

        let points = calculate_points(input.amount, shop.points_per_100_units);

        // A concurrent insert of the same check loses on the unique constraint
        let purchase = db::purchases::create(
            &mut *tx,
            &NewPurchase {
                guest_id,
                shop_id,
                check_id: input.check_id,
                amount: input.amount,
                points,
                items: input.items,
            },
        )
        .await
        .map_err(|e| {
            if e.is_conflict_on(db::purchases::CHECK_CONSTRAINT) {
                PointsError::DuplicateCheck
            } else {
                PointsError::Repository(e)
            }
        })?;

        let new_balance = accrue_points(&mut tx, guest_id, points).await?;
        touch_last_visit(&mut tx, guest_id).await?;

        tx.commit().await?;

        tracing::info!(
            purchase_id = %purchase.id,
            points,
            new_balance,
            "Purchase recorded"
        );

        Ok(PurchaseReceipt {
            purchase,
            new_balance,
            to_free_item: points_to_free_item(shop.free_item_threshold, new_balance),
        })
    }

    /// Spend the shop's free-item threshold from the guest's balance.
    ///
    /// The guest row stays locked from the balance check until commit, so two
    /// concurrent redemptions of a balance that covers one succeed at most once.
    ///
    /// # Errors
    ///
    /// Returns `PointsError::InsufficientBalance` if the balance is below the
    /// threshold; nothing is changed in that case.
    #[instrument(skip(self))]
    pub async fn redeem(
        &self,
        shop_id: ShopId,
        guest_id: GuestId,
        kind: RewardKind,
    ) -> Result<Redemption, PointsError> {
        let mut tx = self.pool.begin().await?;

        let shop = db::shops::find_by_id(&mut *tx, shop_id)
            .await?
            .ok_or(PointsError::ShopNotFound)?;
        let required = shop.free_item_threshold;

        let balance = db::guests::lock_balance(&mut *tx, shop_id, guest_id)
            .await?
            .ok_or(PointsError::GuestNotFound)?;

        if !can_redeem(balance, required) {
            return Err(PointsError::InsufficientBalance { balance, required });
        }

        let new_balance = db::guests::deduct_points(&mut *tx, guest_id, required).await?;
        touch_last_visit(&mut tx, guest_id).await?;

        let reward = db::rewards::create(
            &mut *tx,
            &NewReward {
                guest_id,
                shop_id,
                kind,
                points_reward: required,
            },
            Utc::now(),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(reward_id = %reward.id, new_balance, "Reward redeemed");
        Ok(Redemption {
            reward,
            new_balance,
        })
    }
}

/// Credit `points` to a guest inside the caller's transaction.
///
/// # Errors
///
/// Returns `PointsError::GuestNotFound` if the guest does not exist.
pub async fn accrue_points(
    conn: &mut PgConnection,
    guest_id: GuestId,
    points: i64,
) -> Result<i64, PointsError> {
    db::guests::add_points(conn, guest_id, points)
        .await
        .map_err(not_found_as_guest)
}

/// Stamp the guest's last visit with the current time inside the caller's transaction.
///
/// # Errors
///
/// Returns `PointsError::GuestNotFound` if the guest does not exist.
pub async fn touch_last_visit(conn: &mut PgConnection, guest_id: GuestId) -> Result<(), PointsError> {
    db::guests::touch_last_visit(conn, guest_id, Utc::now())
        .await
        .map_err(not_found_as_guest)
}

fn not_found_as_guest(e: RepositoryError) -> PointsError {
    match e {
        RepositoryError::NotFound => PointsError::GuestNotFound,
        other => PointsError::Repository(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_purchase_input_accepts_valid() {
        let input = PurchaseInput::new(
            "  CHK-1 ",
            dec("250.50"),
            vec!["latte".to_owned(), " ".to_owned(), " croissant ".to_owned()],
        )
        .unwrap();

        assert_eq!(input.check_id(), "CHK-1");
        assert_eq!(input.amount(), dec("250.50"));
        assert_eq!(input.items, vec!["latte", "croissant"]);
    }

    #[test]
    fn test_purchase_input_trailing_zeros_allowed() {
        assert!(PurchaseInput::new("c", dec("12.5000"), vec![]).is_ok());
    }

    #[test]
    fn test_purchase_input_rejects_bad_amounts() {
        for amount in ["0", "-1", "0.001", "10000000000"] {
            assert!(
                matches!(
                    PurchaseInput::new("c", dec(amount), vec![]),
                    Err(PointsError::InvalidInput(_))
                ),
                "{amount}"
            );
        }
    }

    #[test]
    fn test_purchase_input_rejects_bad_check_id() {
        assert!(PurchaseInput::new("   ", dec("1"), vec![]).is_err());
        let long = "x".repeat(MAX_CHECK_ID_LENGTH + 1);
        assert!(PurchaseInput::new(&long, dec("1"), vec![]).is_err());
    }

    #[test]
    fn test_purchase_input_rejects_too_many_items() {
        let items = vec!["espresso".to_owned(); MAX_ITEMS + 1];
        assert!(PurchaseInput::new("c", dec("1"), items).is_err());
    }
}
