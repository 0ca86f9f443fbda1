use axum::{extract::FromRequestParts, http::HeaderName};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    state::AppState,
    tenant::{self, TenantContext},
};

pub const STORE_HEADER: HeaderName = HeaderName::from_static("x-store-id");

/// Store explicitly picked by the client, if any.
fn selected_store(parts: &axum::http::request::Parts) -> Result<Option<Uuid>, AppError> {
    let Some(value) = parts.headers.get(&STORE_HEADER) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::BadRequest("Invalid x-store-id header".into()))?;
    Uuid::parse_str(raw.trim())
        .map(Some)
        .map_err(|_| AppError::BadRequest("Invalid x-store-id header".into()))
}

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let selected = selected_store(parts)?;
        tenant::resolve(&state.orm, &user, selected).await
    }
}
