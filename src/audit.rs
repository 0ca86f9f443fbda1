use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    entity::audit_logs::ActiveModel as AuditActive, error::AppResult, state::AppState,
    tenant::TenantContext,
};

pub async fn log_audit(
    state: &AppState,
    tenant: &TenantContext,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    AuditActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(Some(tenant.store_id)),
        user_id: Set(Some(tenant.user_id)),
        action: Set(action.to_string()),
        resource: Set(resource.map(str::to_string)),
        metadata: Set(metadata),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(())
}

/// Records an audit row after a committed write. Failures are only logged.
pub async fn record(
    state: &AppState,
    tenant: &TenantContext,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    if let Err(err) = log_audit(state, tenant, action, Some(resource), Some(metadata)).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
