use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::pricing::{PricingMode, ServiceDuration},
    models::Service,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub name: String,
    pub category: String,
    pub pricing_mode: PricingMode,
    pub unit_price: Option<i64>,
    pub weight_price: Option<i64>,
    pub duration: Option<ServiceDuration>,
}

#[derive(Serialize, ToSchema)]
pub struct ServiceList {
    pub items: Vec<Service>,
}
