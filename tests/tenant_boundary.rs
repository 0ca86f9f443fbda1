mod common;

use laundry_pos::{
    domain::{pricing::PricingMode, status::FulfillmentStatus},
    dto::{orders::UpdateFulfillmentRequest, stores::UpdateStoreSettingsRequest},
    entity::store_members::MemberRole,
    error::AppError,
    routes::params::OrderListQuery,
    services::{order_service, store_service},
};
use uuid::Uuid;

use common::{
    add_member, context_for, create_store, order_request, owned_store, place_order, weight_line,
    weight_service,
};

#[tokio::test]
async fn other_store_orders_are_forbidden() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let north = owned_store(&state, "North Laundry", true).await?;
    let south = owned_store(&state, "South Laundry", true).await?;
    let service = weight_service(&state, &north).await?;
    let order =
        place_order(&state, &north, order_request(vec![weight_line(service, 1.5)], None)).await?;

    let err = order_service::get_order(&state, &south, order.order.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = order_service::update_fulfillment(
        &state,
        &south,
        order.order.id,
        UpdateFulfillmentRequest {
            status: FulfillmentStatus::InProgress,
            staff_override: false,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let still = order_service::get_order(&state, &north, order.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(still.order.fulfillment_status, FulfillmentStatus::InQueue);

    let listed = order_service::list_orders(&state, &south, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert!(listed.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn other_store_services_cannot_be_ordered() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let north = owned_store(&state, "North Laundry", true).await?;
    let south = owned_store(&state, "South Laundry", true).await?;
    let north_service = weight_service(&state, &north).await?;

    let err = order_service::create_order(
        &state,
        &south,
        order_request(vec![weight_line(north_service, 2.0)], None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn staff_cannot_manage_catalog_or_settings() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let store_id = create_store(&state, "Fresh Laundry", true).await?;
    let staff_id = Uuid::new_v4();
    add_member(&state, store_id, staff_id, MemberRole::Staff).await?;
    let staff = context_for(&state, staff_id, None).await?;
    assert_eq!(staff.role, MemberRole::Staff);
    assert_eq!(staff.store_id, store_id);

    let err = common::create_service(&state, &staff, PricingMode::Unit, Some(5_000), None, Some(1))
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Forbidden)));

    let err = store_service::update_store_settings(
        &state,
        &staff,
        UpdateStoreSettingsRequest {
            points_enabled: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}

#[tokio::test]
async fn store_selection_is_checked() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let first = create_store(&state, "North Laundry", true).await?;
    let second = create_store(&state, "South Laundry", true).await?;
    let stranger_store = create_store(&state, "Elsewhere", true).await?;
    let owner = Uuid::new_v4();
    add_member(&state, first, owner, MemberRole::Owner).await?;
    add_member(&state, second, owner, MemberRole::Owner).await?;

    let ctx = context_for(&state, owner, Some(second)).await?;
    assert_eq!(ctx.store_id, second);
    assert_eq!(ctx.store_ids_accessible.len(), 2);
    assert!(ctx.is_owner_of(first));

    let err = context_for(&state, owner, Some(stranger_store)).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Forbidden)));

    let err = context_for(&state, Uuid::new_v4(), None).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Forbidden)));
    Ok(())
}
