use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};

use crate::{
    dto::stores::{CurrentStore, UpdateStoreSettingsRequest},
    error::AppResult,
    models::Store,
    response::ApiResponse,
    services::store_service,
    state::AppState,
    tenant::TenantContext,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/current", get(current_store))
        .route("/current/settings", patch(update_settings))
}

#[utoipa::path(
    get,
    path = "/api/stores/current",
    params(
        ("x-store-id" = Option<String>, Header, description = "Store to act on, defaults to the first accessible one")
    ),
    responses(
        (status = 200, description = "Resolved store context", body = ApiResponse<CurrentStore>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No access to the store"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn current_store(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> AppResult<Json<ApiResponse<CurrentStore>>> {
    let resp = store_service::get_current_store(&state, &tenant).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/stores/current/settings",
    request_body = UpdateStoreSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<Store>),
        (status = 400, description = "Invalid phone"),
        (status = 403, description = "Owner only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<UpdateStoreSettingsRequest>,
) -> AppResult<Json<ApiResponse<Store>>> {
    let resp = store_service::update_store_settings(&state, &tenant, payload).await?;
    Ok(Json(resp))
}
