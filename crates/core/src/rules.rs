//! Points rules.
//!
//! Pure functions deciding how many points a purchase earns, whether a guest
//! can redeem, and whether a guest is drifting away. Everything that touches
//! the database lives in the server crate and defers to these functions.
//!
//! ```
//! use brewpoints_core::rules::calculate_points;
//! use rust_decimal::Decimal;
//!
//! // 1 point per full 100 units spent
//! assert_eq!(calculate_points(Decimal::from(250), 1), 2);
//! // ...but never less than one point per purchase
//! assert_eq!(calculate_points(Decimal::from(50), 5), 1);
//! ```

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Default points granted per full 100 currency units.
pub const DEFAULT_POINTS_PER_100_UNITS: i32 = 1;

/// Default balance required to redeem a free item.
pub const DEFAULT_FREE_ITEM_THRESHOLD: i64 = 600;

/// A guest is at risk of churning after this many days without a visit.
pub const CHURN_AFTER_DAYS: i64 = 14;

/// Every recorded purchase earns at least this many points.
pub const MIN_POINTS_PER_PURCHASE: i64 = 1;

/// Convert a purchase amount into points.
///
/// `floor(amount / 100) * points_per_100_units`, clamped to at least
/// [`MIN_POINTS_PER_PURCHASE`]. The clamp applies even when the shop rate is
/// zero. Amounts too large for `i64` saturate instead of wrapping.
#[must_use]
pub fn calculate_points(amount: Decimal, points_per_100_units: i32) -> i64 {
    let hundreds = (amount / Decimal::ONE_HUNDRED)
        .floor()
        .to_i64()
        .unwrap_or(i64::MAX);

    hundreds
        .saturating_mul(i64::from(points_per_100_units))
        .max(MIN_POINTS_PER_PURCHASE)
}

/// Points still missing before the guest can redeem.
///
/// Negative when the guest already holds more than the threshold.
#[must_use]
pub const fn points_to_free_item(free_item_threshold: i64, balance: i64) -> i64 {
    free_item_threshold.saturating_sub(balance)
}

/// Whether `balance` covers a redemption costing `required` points.
#[must_use]
pub const fn can_redeem(balance: i64, required: i64) -> bool {
    balance >= required
}

/// Oldest last-visit timestamp that still counts as active at `now`.
#[must_use]
pub fn churn_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(CHURN_AFTER_DAYS)
}

/// A guest is at risk when they never visited, or last visited more than
/// [`CHURN_AFTER_DAYS`] days before `now`.
#[must_use]
pub fn is_churn_risk(last_visit: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    last_visit.is_none_or(|visited| visited < churn_cutoff(now))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_points_examples() {
        assert_eq!(calculate_points(Decimal::from(250), 1), 2);
        assert_eq!(calculate_points(Decimal::from(50), 5), 1);
        assert_eq!(calculate_points(Decimal::from(1000), 0), 1);
        assert_eq!(calculate_points(Decimal::from(1000), 3), 30);
    }

    #[test]
    fn test_calculate_points_floors_fractional_hundreds() {
        assert_eq!(calculate_points(Decimal::new(19_999, 2), 10), 10);
        assert_eq!(calculate_points(Decimal::new(20_000, 2), 10), 20);
    }

    #[test]
    fn test_calculate_points_never_below_one() {
        let amounts = [
            Decimal::ZERO,
            Decimal::new(1, 2),
            Decimal::from(99),
            Decimal::from(100),
            Decimal::from(12_345),
            Decimal::MAX,
        ];
        for amount in amounts {
            for rate in [0, 1, 2, 7, 100, i32::MAX] {
                assert!(
                    calculate_points(amount, rate) >= 1,
                    "amount {amount} rate {rate}"
                );
            }
        }
    }

    #[test]
    fn test_calculate_points_saturates() {
        assert_eq!(calculate_points(Decimal::MAX, i32::MAX), i64::MAX);
    }

    #[test]
    fn test_points_to_free_item() {
        assert_eq!(points_to_free_item(600, 150), 450);
        assert_eq!(points_to_free_item(600, 600), 0);
        assert_eq!(points_to_free_item(600, 700), -100);
    }

    #[test]
    fn test_can_redeem() {
        assert!(can_redeem(600, 600));
        assert!(can_redeem(601, 600));
        assert!(!can_redeem(599, 600));
    }

    #[test]
    fn test_churn_never_visited() {
        assert!(is_churn_risk(None, Utc::now()));
    }

    #[test]
    fn test_churn_boundaries() {
        let now = Utc::now();
        assert!(!is_churn_risk(Some(now - Duration::days(13)), now));
        assert!(is_churn_risk(Some(now - Duration::days(15)), now));
        assert!(!is_churn_risk(Some(now), now));
        // Exactly at the cutoff is not "more than" 14 days
        assert!(!is_churn_risk(Some(churn_cutoff(now)), now));
    }
}
