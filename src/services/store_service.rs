use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};

use crate::{
    audit,
    domain::phone,
    dto::stores::{CurrentStore, UpdateStoreSettingsRequest},
    entity::stores::{ActiveModel as StoreActive, Entity as Stores, Model as StoreModel},
    error::{AppError, AppResult},
    models::Store,
    response::{ApiResponse, Meta},
    state::AppState,
    tenant::TenantContext,
};

pub(crate) async fn load_current<C>(conn: &C, tenant: &TenantContext) -> AppResult<StoreModel>
where
    C: ConnectionTrait,
{
    Stores::find_by_id(tenant.store_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_current_store(
    state: &AppState,
    tenant: &TenantContext,
) -> AppResult<ApiResponse<CurrentStore>> {
    let store = load_current(&state.orm, tenant).await?;
    Ok(ApiResponse::success(
        "Current store",
        CurrentStore {
            store: Store::from(store),
            current_store_id: tenant.store_id,
            store_ids_accessible: tenant.store_ids_accessible.clone(),
            is_owner: tenant.is_owner_of(tenant.store_id),
        },
        None,
    ))
}

/// Toggling `points_enabled` only affects orders settled afterwards.
pub async fn update_store_settings(
    state: &AppState,
    tenant: &TenantContext,
    payload: UpdateStoreSettingsRequest,
) -> AppResult<ApiResponse<Store>> {
    tenant.ensure_owner()?;
    let store = load_current(&state.orm, tenant).await?;

    let mut active: StoreActive = store.into();
    if let Some(enabled) = payload.points_enabled {
        active.points_enabled = Set(enabled);
    }
    if let Some(own_number) = payload.use_own_number_for_messages {
        active.use_own_number_for_messages = Set(own_number);
    }
    if let Some(number) = payload.phone {
        let number = number.trim();
        if number.is_empty() {
            active.phone = Set(None);
        } else if phone::is_valid(number) {
            active.phone = Set(Some(phone::clean(number)));
        } else {
            return Err(AppError::BadRequest("Store phone is invalid".into()));
        }
    }
    active.updated_at = Set(Utc::now().into());
    let store = active.update(&state.orm).await?;

    tracing::info!(
        store_id = %store.id,
        points_enabled = store.points_enabled,
        own_number = store.use_own_number_for_messages,
        "store settings updated"
    );
    audit::record(
        state,
        tenant,
        "store_settings_update",
        "stores",
        serde_json::json!({
            "points_enabled": store.points_enabled,
            "use_own_number_for_messages": store.use_own_number_for_messages,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Store settings updated",
        Store::from(store),
        Some(Meta::empty()),
    ))
}
