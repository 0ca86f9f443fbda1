use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::pricing::{MAX_DURATION_HOURS, PricingMode, ServiceDefinition, ServiceDuration},
    dto::catalog::{CreateServiceRequest, ServiceList},
    entity::services::{ActiveModel, Column, Entity as Services, Model as ServiceModel},
    error::{AppError, AppResult},
    models::Service,
    response::{ApiResponse, Meta},
    routes::params::ServiceQuery,
    state::AppState,
    tenant::TenantContext,
};

/// Resolves a service reference for pricing. Inactive services and services
/// of other stores are both reported as not found.
pub async fn lookup_service<C>(
    conn: &C,
    tenant: &TenantContext,
    service_id: Uuid,
) -> AppResult<ServiceDefinition>
where
    C: ConnectionTrait,
{
    let model = Services::find_by_id(service_id)
        .filter(Column::StoreId.eq(tenant.store_id))
        .filter(Column::IsActive.eq(true))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(definition_from_entity(model))
}

pub async fn list_services(
    state: &AppState,
    tenant: &TenantContext,
    query: ServiceQuery,
) -> AppResult<ApiResponse<ServiceList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all()
        .add(Column::StoreId.eq(tenant.store_id))
        .add(Column::IsActive.eq(true));
    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    let finder = Services::find()
        .filter(condition)
        .order_by_asc(Column::Category)
        .order_by_asc(Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Service::from)
        .collect();

    Ok(ApiResponse::success(
        "Services",
        ServiceList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_service(
    state: &AppState,
    tenant: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<Service>> {
    let service = Services::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    tenant.ensure_store(service.store_id)?;
    Ok(ApiResponse::success("Service", Service::from(service), None))
}

pub async fn create_service(
    state: &AppState,
    tenant: &TenantContext,
    payload: CreateServiceRequest,
) -> AppResult<ApiResponse<Service>> {
    tenant.ensure_owner()?;
    validate_service(&payload)?;

    let service = ActiveModel {
        id: Set(Uuid::new_v4()),
        store_id: Set(tenant.store_id),
        name: Set(payload.name.trim().to_string()),
        category: Set(payload.category.trim().to_string()),
        pricing_mode: Set(payload.pricing_mode),
        unit_price: Set(payload.unit_price),
        weight_price: Set(payload.weight_price),
        duration_value: Set(payload.duration.map(|d| d.value)),
        duration_unit: Set(payload.duration.map(|d| d.unit)),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        tenant,
        "service_create",
        "services",
        serde_json::json!({ "service_id": service.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Service created",
        Service::from(service),
        Some(Meta::empty()),
    ))
}

/// Services referenced by past orders stay in place; they are only hidden
/// from new orders.
pub async fn deactivate_service(
    state: &AppState,
    tenant: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<Service>> {
    tenant.ensure_owner()?;
    let existing = Services::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    tenant.ensure_store(existing.store_id)?;

    let mut active: ActiveModel = existing.into();
    active.is_active = Set(false);
    let service = active.update(&state.orm).await?;

    audit::record(
        state,
        tenant,
        "service_deactivate",
        "services",
        serde_json::json!({ "service_id": service.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Service deactivated",
        Service::from(service),
        Some(Meta::empty()),
    ))
}

fn validate_service(payload: &CreateServiceRequest) -> AppResult<()> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Service name is required".into()));
    }
    if payload.category.trim().is_empty() {
        return Err(AppError::BadRequest("Service category is required".into()));
    }
    let needs_unit = payload.pricing_mode.uses_quantity();
    let needs_weight = payload.pricing_mode.uses_weight();
    match (needs_unit, payload.unit_price) {
        (true, None) => {
            return Err(AppError::BadRequest(
                "unit_price is required for this pricing mode".into(),
            ));
        }
        (_, Some(price)) if price < 0 => {
            return Err(AppError::BadRequest("unit_price must not be negative".into()));
        }
        _ => {}
    }
    match (needs_weight, payload.weight_price) {
        (true, None) => {
            return Err(AppError::BadRequest(
                "weight_price is required for this pricing mode".into(),
            ));
        }
        (_, Some(price)) if price < 0 => {
            return Err(AppError::BadRequest("weight_price must not be negative".into()));
        }
        _ => {}
    }
    if let Some(duration) = payload.duration {
        if !duration.is_within_limit() {
            return Err(AppError::BadRequest(format!(
                "duration must be positive and at most {MAX_DURATION_HOURS} hours"
            )));
        }
    }
    Ok(())
}

pub(crate) fn definition_from_entity(model: ServiceModel) -> ServiceDefinition {
    let duration = match (model.duration_value, model.duration_unit) {
        (Some(value), Some(unit)) if value > 0 => Some(ServiceDuration { value, unit }),
        _ => None,
    };
    ServiceDefinition {
        id: model.id,
        name: model.name,
        category: model.category,
        pricing_mode: model.pricing_mode,
        unit_price: model.unit_price,
        weight_price: model.weight_price,
        duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::DurationUnit;

    fn request(mode: PricingMode, unit: Option<i64>, weight: Option<i64>) -> CreateServiceRequest {
        CreateServiceRequest {
            name: "Wash & Fold".into(),
            category: "laundry".into(),
            pricing_mode: mode,
            unit_price: unit,
            weight_price: weight,
            duration: Some(ServiceDuration {
                value: 2,
                unit: DurationUnit::Days,
            }),
        }
    }

    #[test]
    fn prices_must_match_pricing_mode() {
        assert!(validate_service(&request(PricingMode::Unit, Some(5_000), None)).is_ok());
        assert!(validate_service(&request(PricingMode::Weight, None, Some(7_000))).is_ok());
        assert!(validate_service(&request(PricingMode::Unit, None, Some(7_000))).is_err());
        assert!(validate_service(&request(PricingMode::Weight, Some(5_000), None)).is_err());
        assert!(validate_service(&request(PricingMode::Combined, Some(5_000), None)).is_err());
        assert!(validate_service(&request(PricingMode::Combined, Some(1), Some(1))).is_ok());
    }

    #[test]
    fn rejects_negative_prices_and_durations() {
        assert!(validate_service(&request(PricingMode::Unit, Some(-1), None)).is_err());
        let mut req = request(PricingMode::Unit, Some(1), None);
        req.duration = Some(ServiceDuration {
            value: 0,
            unit: DurationUnit::Hours,
        });
        assert!(validate_service(&req).is_err());
    }

    #[test]
    fn durations_longer_than_a_year_are_rejected() {
        let mut req = request(PricingMode::Unit, Some(1), None);
        req.duration = Some(ServiceDuration {
            value: 365,
            unit: DurationUnit::Days,
        });
        assert!(validate_service(&req).is_ok());
        req.duration = Some(ServiceDuration {
            value: i32::MAX,
            unit: DurationUnit::Days,
        });
        assert!(matches!(validate_service(&req), Err(AppError::BadRequest(_))));
        req.duration = Some(ServiceDuration {
            value: 366 * 24,
            unit: DurationUnit::Hours,
        });
        assert!(validate_service(&req).is_err());
    }
}
