use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CreateOrderRequest, NotificationResult, OrderList, OrderOutcome, OrderWithItems,
        PickupEstimate, Receipt, RecordPaymentRequest, ReminderSummary, ResendNotificationRequest,
        UpdateFulfillmentRequest, UpdatePaymentRequest,
    },
    error::AppResult,
    response::ApiResponse,
    routes::params::{OrderListQuery, Pagination, PendingPaymentsQuery, TodaysOrdersQuery},
    services::order_service,
    state::AppState,
    tenant::TenantContext,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/today", get(list_todays_orders))
        .route("/ready", get(list_ready_for_pickup))
        .route("/pending-payments", get(list_pending_payments))
        .route("/pending-payments/reminders", post(send_payment_reminders))
        .route("/{id}", get(get_order))
        .route("/{id}/receipt", get(get_receipt))
        .route("/{id}/pickup-estimate", get(estimate_pickup))
        .route("/{id}/fulfillment", patch(update_fulfillment))
        .route("/{id}/payment", patch(update_payment_status))
        .route("/{id}/payments", post(record_payment))
        .route("/{id}/notifications", post(resend_notification))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("fulfillment_status" = Option<String>, Query, description = "Filter by fulfillment status"),
        ("payment_status" = Option<String>, Query, description = "Filter by payment status"),
        ("customer_phone" = Option<String>, Query, description = "Filter by customer phone"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Orders of the current store", body = ApiResponse<OrderList>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &tenant, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created, points credited when paid", body = ApiResponse<OrderOutcome>),
        (status = 400, description = "Invalid order"),
        (status = 404, description = "Service not found"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderOutcome>>> {
    let resp = order_service::create_order(&state, &tenant, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/today",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("fulfillment_status" = Option<String>, Query, description = "Filter by fulfillment status")
    ),
    responses(
        (status = 200, description = "Orders taken since midnight UTC", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_todays_orders(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<TodaysOrdersQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_todays_orders(&state, &tenant, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/ready",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Orders waiting for pickup", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_ready_for_pickup(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_ready_for_pickup(&state, &tenant, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/pending-payments",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("hours_old" = Option<i64>, Query, description = "Minimum order age in hours, default 24")
    ),
    responses(
        (status = 200, description = "Unpaid orders older than the cutoff", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_pending_payments(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<PendingPaymentsQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_pending_payments(&state, &tenant, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/pending-payments/reminders",
    params(
        ("hours_old" = Option<i64>, Query, description = "Minimum order age in hours, default 24")
    ),
    responses(
        (status = 200, description = "Reminders handed to the dispatcher", body = ApiResponse<ReminderSummary>),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn send_payment_reminders(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<PendingPaymentsQuery>,
) -> AppResult<Json<ApiResponse<ReminderSummary>>> {
    let resp = order_service::send_payment_reminders(&state, &tenant, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Order belongs to another store"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &tenant, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/receipt",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Printable receipt", body = ApiResponse<Receipt>),
        (status = 403, description = "Order belongs to another store"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_receipt(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Receipt>>> {
    let resp = order_service::get_receipt(&state, &tenant, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/pickup-estimate",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Expected ready time and status", body = ApiResponse<PickupEstimate>),
        (status = 403, description = "Order belongs to another store"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn estimate_pickup(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PickupEstimate>>> {
    let resp = order_service::estimate_pickup(&state, &tenant, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/fulfillment",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateFulfillmentRequest,
    responses(
        (status = 200, description = "Fulfillment status updated", body = ApiResponse<OrderOutcome>),
        (status = 409, description = "Transition not allowed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_fulfillment(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFulfillmentRequest>,
) -> AppResult<Json<ApiResponse<OrderOutcome>>> {
    let resp = order_service::update_fulfillment(&state, &tenant, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/payment",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment status updated", body = ApiResponse<OrderOutcome>),
        (status = 409, description = "Transition not allowed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_payment_status(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> AppResult<Json<ApiResponse<OrderOutcome>>> {
    let resp = order_service::update_payment_status(&state, &tenant, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/payments",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<OrderOutcome>),
        (status = 400, description = "Invalid amount"),
        (status = 409, description = "Order is already settled"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> AppResult<Json<ApiResponse<OrderOutcome>>> {
    let resp = order_service::record_payment(&state, &tenant, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/notifications",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ResendNotificationRequest,
    responses(
        (status = 200, description = "Dispatch outcome", body = ApiResponse<NotificationResult>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn resend_notification(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResendNotificationRequest>,
) -> AppResult<Json<ApiResponse<NotificationResult>>> {
    let resp = order_service::resend_notification(&state, &tenant, id, payload).await?;
    Ok(Json(resp))
}
