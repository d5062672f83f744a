//! Integration tests for the admin dashboard and churn list.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use brewpoints_core::rules::is_churn_risk;
use brewpoints_core::{GuestId, ShopId};
use brewpoints_integration_tests::{dec, reload_guest, seed_guest, seed_shop, set_last_visit};
use brewpoints_server::services::admin::AdminService;
use brewpoints_server::services::points::{PointsService, PurchaseInput};
use chrono::{Duration, Utc};
use sqlx::PgPool;

async fn buy(pool: &PgPool, shop_id: ShopId, guest_id: GuestId, check_id: &str, amount: &str) {
    let input = PurchaseInput::new(check_id, dec(amount), Vec::new()).unwrap();
    PointsService::new(pool)
        .record_purchase(shop_id, guest_id, input)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_empty_shop_dashboard(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;

    let summary = AdminService::new(&pool).dashboard(shop.id).await.unwrap();

    assert_eq!(summary.total_guests, 0);
    assert_eq!(summary.total_revenue, dec("0"));
    assert_eq!(summary.churn_risk_count, 0);
    assert!(summary.top_guests.is_empty());
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_churn_counts_absent_and_never_visited(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;
    let never = seed_guest(&pool, shop.id, "+15550000001").await;
    let away = seed_guest(&pool, shop.id, "+15550000002").await;
    let recent = seed_guest(&pool, shop.id, "+15550000003").await;

    set_last_visit(&pool, away.id, Utc::now() - Duration::days(15)).await;
    set_last_visit(&pool, recent.id, Utc::now() - Duration::days(13)).await;

    let admin = AdminService::new(&pool);
    let summary = admin.dashboard(shop.id).await.unwrap();
    assert_eq!(summary.total_guests, 3);
    assert_eq!(summary.churn_risk_count, 2);

    let at_risk = admin.churn_risk(shop.id).await.unwrap();
    let ids: Vec<_> = at_risk.iter().map(|g| g.id).collect();
    // Never-visited guests come first
    assert_eq!(ids, vec![never.id, away.id]);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_churn_list_agrees_with_rule(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;
    let now = Utc::now();
    let last_visits = [
        None,
        Some(now),
        Some(now - Duration::days(1)),
        Some(now - Duration::days(13)),
        Some(now - Duration::days(14) + Duration::minutes(5)),
        Some(now - Duration::days(15)),
        Some(now - Duration::days(400)),
    ];

    let mut guests = Vec::new();
    for (i, last_visit) in last_visits.into_iter().enumerate() {
        let guest = seed_guest(&pool, shop.id, &format!("+1555000{:04}", i + 1)).await;
        if let Some(at) = last_visit {
            set_last_visit(&pool, guest.id, at).await;
        }
        guests.push(guest.id);
    }

    let admin = AdminService::new(&pool);
    let listed: Vec<GuestId> = admin
        .churn_risk(shop.id)
        .await
        .unwrap()
        .iter()
        .map(|g| g.id)
        .collect();

    let check_time = Utc::now();
    for id in guests {
        let guest = reload_guest(&pool, shop.id, id).await;
        assert_eq!(
            listed.contains(&id),
            is_churn_risk(guest.last_visit, check_time),
            "last visit {:?}",
            guest.last_visit
        );
    }
    assert_eq!(listed.len(), 3);
    assert_eq!(
        admin.dashboard(shop.id).await.unwrap().churn_risk_count,
        3
    );
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_purchase_takes_guest_off_churn_list(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;
    let guest = seed_guest(&pool, shop.id, "+15550000001").await;
    set_last_visit(&pool, guest.id, Utc::now() - Duration::days(30)).await;

    let admin = AdminService::new(&pool);
    assert_eq!(admin.churn_risk(shop.id).await.unwrap().len(), 1);

    buy(&pool, shop.id, guest.id, "CHK-1", "150").await;
    assert!(admin.churn_risk(shop.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_revenue_and_top_spenders(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;
    let alice = seed_guest(&pool, shop.id, "+15550000001").await;
    let bob = seed_guest(&pool, shop.id, "+15550000002").await;
    let carol = seed_guest(&pool, shop.id, "+15550000003").await;

    buy(&pool, shop.id, alice.id, "A-1", "120.50").await;
    buy(&pool, shop.id, alice.id, "A-2", "80.00").await;
    buy(&pool, shop.id, bob.id, "B-1", "450.00").await;

    let summary = AdminService::new(&pool).dashboard(shop.id).await.unwrap();

    assert_eq!(summary.total_guests, 3);
    assert_eq!(summary.total_revenue, dec("650.50"));

    // Guests without purchases are not ranked
    assert_eq!(summary.top_guests.len(), 2);
    let first = &summary.top_guests[0];
    assert_eq!(first.guest_id, bob.id);
    assert_eq!(first.total_spent, dec("450.00"));
    assert_eq!(first.visits, 1);
    let second = &summary.top_guests[1];
    assert_eq!(second.guest_id, alice.id);
    assert_eq!(second.total_spent, dec("200.50"));
    assert_eq!(second.visits, 2);
    assert_eq!(second.phone.as_ref().unwrap().as_str(), "+15550000001");
    assert!(summary.top_guests.iter().all(|g| g.guest_id != carol.id));
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_top_spender_ties_are_stable(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;
    let a = seed_guest(&pool, shop.id, "+15550000001").await;
    let b = seed_guest(&pool, shop.id, "+15550000002").await;

    buy(&pool, shop.id, a.id, "CHK-1", "300").await;
    buy(&pool, shop.id, b.id, "CHK-1", "300").await;

    let summary = AdminService::new(&pool).dashboard(shop.id).await.unwrap();
    let ids: Vec<_> = summary.top_guests.iter().map(|g| g.guest_id).collect();

    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(ids, expected);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_top_spenders_capped_at_ten(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;

    // Twelve guests spending 100, 110, ..., 210
    let mut guests = Vec::new();
    for i in 0..12_u32 {
        let guest = seed_guest(&pool, shop.id, &format!("+1555000{:04}", i + 1)).await;
        let amount = (100 + 10 * i).to_string();
        buy(&pool, shop.id, guest.id, "CHK-1", &amount).await;
        guests.push(guest);
    }

    let summary = AdminService::new(&pool).dashboard(shop.id).await.unwrap();

    assert_eq!(summary.total_guests, 12);
    assert_eq!(summary.top_guests.len(), 10);
    assert!(
        summary
            .top_guests
            .windows(2)
            .all(|pair| pair[0].total_spent >= pair[1].total_spent)
    );
    assert_eq!(summary.top_guests[0].guest_id, guests[11].id);
    assert_eq!(summary.top_guests[0].total_spent, dec("210"));
    assert_eq!(summary.top_guests[9].total_spent, dec("120"));

    // The two smallest spenders fall off the list
    for dropped in &guests[..2] {
        assert!(summary.top_guests.iter().all(|g| g.guest_id != dropped.id));
    }
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_dashboard_is_scoped_to_shop(pool: PgPool) {
    let mine = seed_shop(&pool, "Bean There", 1, 600).await;
    let theirs = seed_shop(&pool, "Daily Grind", 1, 600).await;
    let guest = seed_guest(&pool, mine.id, "+15550000001").await;
    let stranger = seed_guest(&pool, theirs.id, "+15550000002").await;

    buy(&pool, mine.id, guest.id, "CHK-1", "100").await;
    buy(&pool, theirs.id, stranger.id, "CHK-1", "9000").await;

    let admin = AdminService::new(&pool);
    let summary = admin.dashboard(mine.id).await.unwrap();

    assert_eq!(summary.total_guests, 1);
    assert_eq!(summary.total_revenue, dec("100"));
    assert_eq!(summary.top_guests.len(), 1);
    assert_eq!(summary.top_guests[0].guest_id, guest.id);

    set_last_visit(&pool, stranger.id, Utc::now() - Duration::days(60)).await;
    assert!(admin.churn_risk(mine.id).await.unwrap().is_empty());
    assert_eq!(admin.dashboard(mine.id).await.unwrap().churn_risk_count, 0);
}
