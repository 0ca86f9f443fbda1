use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use crate::{
    dto::{
        customers::{CustomerList, LapsedCustomerList},
        loyalty::{
            PointTransactionList, PointsBalance, Reconciliation, RedeemPointsRequest,
            RedemptionResult,
        },
        orders::{CustomerInput, OrderList},
    },
    error::AppResult,
    models::Customer,
    response::ApiResponse,
    routes::params::{CustomerQuery, InactivityQuery, Pagination},
    services::{customer_service, ledger},
    state::AppState,
    tenant::TenantContext,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_customers).put(upsert_customer))
        .route("/inactive", get(inactive_customers))
        .route("/churned", get(churned_customers))
        .route("/{phone}", get(get_customer))
        .route("/{phone}/orders", get(order_history))
        .route("/{phone}/points", get(points_balance))
        .route("/{phone}/points/transactions", get(point_transactions))
        .route("/{phone}/points/redeem", post(redeem_points))
        .route("/{phone}/points/reconcile", get(reconcile_points))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Name or phone fragment")
    ),
    responses(
        (status = 200, description = "Customers of the current store", body = ApiResponse<CustomerList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn search_customers(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<CustomerQuery>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = customer_service::search_customers(&state, &tenant, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/inactive",
    params(
        ("days" = Option<i64>, Query, description = "Days since the last order, default 14"),
        ("limit" = Option<i64>, Query, description = "Maximum customers returned, default 100")
    ),
    responses(
        (status = 200, description = "Longest inactive first", body = ApiResponse<LapsedCustomerList>),
        (status = 400, description = "Days out of range"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn inactive_customers(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<InactivityQuery>,
) -> AppResult<Json<ApiResponse<LapsedCustomerList>>> {
    let resp = customer_service::list_inactive_customers(&state, &tenant, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/churned",
    params(
        ("days" = Option<i64>, Query, description = "Days since the only order, default 30"),
        ("limit" = Option<i64>, Query, description = "Maximum customers returned, default 100")
    ),
    responses(
        (status = 200, description = "One-time customers who never returned", body = ApiResponse<LapsedCustomerList>),
        (status = 400, description = "Days out of range"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn churned_customers(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<InactivityQuery>,
) -> AppResult<Json<ApiResponse<LapsedCustomerList>>> {
    let resp = customer_service::list_churned_customers(&state, &tenant, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/customers",
    request_body = CustomerInput,
    responses(
        (status = 200, description = "Customer created or updated", body = ApiResponse<Customer>),
        (status = 400, description = "Invalid customer"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn upsert_customer(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CustomerInput>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::upsert_customer(&state, &tenant, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{phone}",
    params(("phone" = String, Path, description = "Customer phone")),
    responses(
        (status = 200, description = "Customer", body = ApiResponse<Customer>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(phone): Path<String>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_customer_by_phone(&state, &tenant, &phone).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{phone}/orders",
    params(
        ("phone" = String, Path, description = "Customer phone"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Order history", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn order_history(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(phone): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = customer_service::customer_order_history(&state, &tenant, &phone, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{phone}/points",
    params(("phone" = String, Path, description = "Customer phone")),
    responses(
        (status = 200, description = "Points balance", body = ApiResponse<PointsBalance>),
    ),
    security(("bearer_auth" = [])),
    tag = "Loyalty"
)]
pub async fn points_balance(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(phone): Path<String>,
) -> AppResult<Json<ApiResponse<PointsBalance>>> {
    let resp = ledger::get_points_balance(&state, &tenant, &phone).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{phone}/points/transactions",
    params(
        ("phone" = String, Path, description = "Customer phone"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Point transactions, newest first", body = ApiResponse<PointTransactionList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Loyalty"
)]
pub async fn point_transactions(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(phone): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PointTransactionList>>> {
    let resp = ledger::list_point_transactions(&state, &tenant, &phone, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/customers/{phone}/points/redeem",
    params(("phone" = String, Path, description = "Customer phone")),
    request_body = RedeemPointsRequest,
    responses(
        (status = 200, description = "Points redeemed", body = ApiResponse<RedemptionResult>),
        (status = 400, description = "Invalid amount"),
        (status = 409, description = "Insufficient points"),
    ),
    security(("bearer_auth" = [])),
    tag = "Loyalty"
)]
pub async fn redeem_points(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(phone): Path<String>,
    Json(payload): Json<RedeemPointsRequest>,
) -> AppResult<Json<ApiResponse<RedemptionResult>>> {
    let resp = ledger::redeem_points(&state, &tenant, &phone, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{phone}/points/reconcile",
    params(("phone" = String, Path, description = "Customer phone")),
    responses(
        (status = 200, description = "Balance checked against the ledger", body = ApiResponse<Reconciliation>),
        (status = 404, description = "No points account"),
    ),
    security(("bearer_auth" = [])),
    tag = "Loyalty"
)]
pub async fn reconcile_points(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(phone): Path<String>,
) -> AppResult<Json<ApiResponse<Reconciliation>>> {
    let resp = ledger::reconcile_customer(&state, &tenant, &phone).await?;
    Ok(Json(resp))
}
