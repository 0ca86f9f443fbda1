use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Store;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStoreSettingsRequest {
    pub points_enabled: Option<bool>,
    pub use_own_number_for_messages: Option<bool>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentStore {
    pub store: Store,
    pub current_store_id: Uuid,
    pub store_ids_accessible: Vec<Uuid>,
    pub is_owner: bool,
}
