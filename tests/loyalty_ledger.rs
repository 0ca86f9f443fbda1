mod common;

use laundry_pos::{
    dto::{loyalty::RedeemPointsRequest, stores::UpdateStoreSettingsRequest},
    entity::point_transactions::PointKind,
    error::AppError,
    routes::params::Pagination,
    services::{ledger, ledger::CreditOutcome, store_service},
    state::AppState,
};

use common::{PHONE, order_request, owned_store, place_order, unit_line, unit_service};

/// The in-memory database has a single connection, so the two settlements
/// queue behind each other here. `settlements_race_on_a_shared_database`
/// runs the same flow against a pooled server database.
#[tokio::test]
async fn concurrent_settlements_both_land() -> anyhow::Result<()> {
    let state = common::setup().await?;
    settle_two_orders_at_once(&state).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn settlements_race_on_a_shared_database() -> anyhow::Result<()> {
    let Some(state) = common::setup_external().await? else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run it on a pool.");
        return Ok(());
    };
    for _ in 0..5 {
        settle_two_orders_at_once(&state).await?;
    }
    Ok(())
}

async fn settle_two_orders_at_once(state: &AppState) -> anyhow::Result<()> {
    let tenant = owned_store(state, "Fresh Laundry", true).await?;
    let service = unit_service(state, &tenant).await?;

    let (first, second) = tokio::join!(
        place_order(state, &tenant, order_request(vec![unit_line(service, 3.0)], Some(15_000))),
        place_order(state, &tenant, order_request(vec![unit_line(service, 5.0)], Some(25_000))),
    );
    assert_eq!(first?.points, Some(CreditOutcome::Credited { points: 3 }));
    assert_eq!(second?.points, Some(CreditOutcome::Credited { points: 5 }));

    let balance = ledger::get_points_balance(state, &tenant, PHONE)
        .await?
        .data
        .expect("balance");
    assert_eq!(balance.current_points, 8);
    assert_eq!(balance.accumulated_points, 8);

    let report = ledger::reconcile_customer(state, &tenant, PHONE)
        .await?
        .data
        .expect("reconciliation");
    assert!(report.balanced);
    assert_eq!(report.ledger_sum, 8);
    Ok(())
}

#[tokio::test]
async fn redemption_never_overdraws() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let tenant = owned_store(&state, "Fresh Laundry", true).await?;
    let service = unit_service(&state, &tenant).await?;
    place_order(&state, &tenant, order_request(vec![unit_line(service, 5.0)], Some(25_000))).await?;

    let err = ledger::redeem_points(
        &state,
        &tenant,
        PHONE,
        RedeemPointsRequest {
            points: 6,
            note: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientPoints {
            requested: 6,
            available: 5
        }
    ));

    let redeemed = ledger::redeem_points(
        &state,
        &tenant,
        PHONE,
        RedeemPointsRequest {
            points: 4,
            note: Some("Free ironing".into()),
        },
    )
    .await?
    .data
    .expect("redemption");
    assert_eq!(redeemed.account.current_points, 1);
    assert_eq!(redeemed.account.accumulated_points, 5);
    assert_eq!(redeemed.transaction.delta, -4);
    assert_eq!(redeemed.transaction.kind, PointKind::Redemption);

    let balance = ledger::get_points_balance(&state, &tenant, PHONE)
        .await?
        .data
        .expect("balance");
    assert_eq!(balance.redeemed_points, 4);

    let history = ledger::list_point_transactions(&state, &tenant, PHONE, Pagination::default())
        .await?
        .data
        .expect("transactions");
    assert_eq!(history.items.len(), 2);

    let report = ledger::reconcile_customer(&state, &tenant, PHONE)
        .await?
        .data
        .expect("reconciliation");
    assert!(report.balanced);
    assert_eq!(report.current_points, 1);
    Ok(())
}

#[tokio::test]
async fn redeeming_without_account_or_amount_fails() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let tenant = owned_store(&state, "Fresh Laundry", true).await?;

    let err = ledger::redeem_points(
        &state,
        &tenant,
        PHONE,
        RedeemPointsRequest {
            points: 1,
            note: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientPoints {
            requested: 1,
            available: 0
        }
    ));

    let err = ledger::redeem_points(
        &state,
        &tenant,
        PHONE,
        RedeemPointsRequest {
            points: 0,
            note: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let balance = ledger::get_points_balance(&state, &tenant, PHONE)
        .await?
        .data
        .expect("balance");
    assert_eq!(balance.account_id, None);
    assert_eq!(balance.current_points, 0);

    let err = ledger::reconcile_customer(&state, &tenant, PHONE).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn disabling_points_keeps_history() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let tenant = owned_store(&state, "Fresh Laundry", true).await?;
    let service = unit_service(&state, &tenant).await?;
    place_order(&state, &tenant, order_request(vec![unit_line(service, 2.0)], Some(10_000))).await?;

    store_service::update_store_settings(
        &state,
        &tenant,
        UpdateStoreSettingsRequest {
            points_enabled: Some(false),
            ..Default::default()
        },
    )
    .await?;

    let request = order_request(vec![unit_line(service, 4.0)], Some(20_000));
    let later = place_order(&state, &tenant, request).await?;
    assert_eq!(later.points, Some(CreditOutcome::PointsDisabled));

    let balance = ledger::get_points_balance(&state, &tenant, PHONE)
        .await?
        .data
        .expect("balance");
    assert_eq!(balance.current_points, 2);

    let history = ledger::list_point_transactions(&state, &tenant, PHONE, Pagination::default())
        .await?
        .data
        .expect("transactions");
    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].delta, 2);
    Ok(())
}

#[tokio::test]
async fn accounts_are_per_store() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let north = owned_store(&state, "North Laundry", true).await?;
    let south = owned_store(&state, "South Laundry", true).await?;
    let north_service = unit_service(&state, &north).await?;
    let request = order_request(vec![unit_line(north_service, 3.0)], Some(15_000));
    place_order(&state, &north, request).await?;

    let south_balance = ledger::get_points_balance(&state, &south, PHONE)
        .await?
        .data
        .expect("balance");
    assert_eq!(south_balance.account_id, None);
    assert_eq!(south_balance.current_points, 0);
    Ok(())
}
