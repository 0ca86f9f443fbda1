use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Customer;

#[derive(Serialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
}

/// A customer who has stopped ordering, cancelled orders not counted.
#[derive(Debug, Serialize, ToSchema)]
pub struct LapsedCustomer {
    pub customer_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub order_count: i64,
    pub first_order_at: DateTime<Utc>,
    pub last_order_at: DateTime<Utc>,
    pub last_order_total: i64,
    /// Whole days since the last order.
    pub days_inactive: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LapsedCustomerList {
    pub items: Vec<LapsedCustomer>,
}
