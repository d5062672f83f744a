//! Integration tests for shop settings updates.

#![allow(clippy::unwrap_used)]

use brewpoints_core::ShopId;
use brewpoints_integration_tests::{dec, seed_guest, seed_shop};
use brewpoints_server::models::ShopSettingsUpdate;
use brewpoints_server::services::admin::{AdminError, AdminService};
use brewpoints_server::services::points::{PointsService, PurchaseInput};
use sqlx::PgPool;

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_partial_update_keeps_other_fields(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;
    let admin = AdminService::new(&pool);
    let before = admin.settings(shop.id).await.unwrap();

    let after = admin
        .update_settings(
            shop.id,
            ShopSettingsUpdate {
                free_item_threshold: Some(300),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(after.free_item_threshold, 300);
    assert_eq!(after.points_per_100_units, before.points_per_100_units);
    assert_eq!(after.color, before.color);
    assert_eq!(admin.settings(shop.id).await.unwrap(), after);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_color_is_normalized(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;

    let after = AdminService::new(&pool)
        .update_settings(
            shop.id,
            ShopSettingsUpdate {
                color: Some(" #A1B2C3 ".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(after.color, "#a1b2c3");
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_invalid_updates_are_rejected(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;
    let admin = AdminService::new(&pool);

    let empty = admin
        .update_settings(shop.id, ShopSettingsUpdate::default())
        .await;
    assert!(matches!(empty, Err(AdminError::NoFieldsProvided)));

    let zero_threshold = admin
        .update_settings(
            shop.id,
            ShopSettingsUpdate {
                free_item_threshold: Some(0),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(zero_threshold, Err(AdminError::InvalidSetting(_))));

    assert_eq!(admin.settings(shop.id).await.unwrap().free_item_threshold, 600);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_update_unknown_shop(pool: PgPool) {
    let result = AdminService::new(&pool)
        .update_settings(
            ShopId::generate(),
            ShopSettingsUpdate {
                points_per_100_units: Some(2),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AdminError::ShopNotFound)));
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_new_rate_applies_to_later_purchases_only(pool: PgPool) {
    let shop = seed_shop(&pool, "Bean There", 1, 600).await;
    let guest = seed_guest(&pool, shop.id, "+15550000001").await;
    let points = PointsService::new(&pool);

    let first = points
        .record_purchase(
            shop.id,
            guest.id,
            PurchaseInput::new("CHK-1", dec("500"), Vec::new()).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.purchase.points, 5);

    AdminService::new(&pool)
        .update_settings(
            shop.id,
            ShopSettingsUpdate {
                points_per_100_units: Some(3),
                free_item_threshold: Some(20),
                color: None,
            },
        )
        .await
        .unwrap();

    let second = points
        .record_purchase(
            shop.id,
            guest.id,
            PurchaseInput::new("CHK-2", dec("500"), Vec::new()).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.purchase.points, 15);
    assert_eq!(second.new_balance, 20);
    assert_eq!(second.to_free_item, 0);
}
