use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{
        pricing::{PricingMode, ServiceDuration},
        status::{FulfillmentStatus, PaymentStatus},
    },
    entity::{
        customers::Model as CustomerModel,
        order_items::Model as OrderItemModel,
        orders::Model as OrderModel,
        point_transactions::{Model as PointTransactionModel, PointKind},
        points_accounts::Model as PointsAccountModel,
        services::Model as ServiceModel,
        stores::Model as StoreModel,
    },
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub points_enabled: bool,
    pub use_own_number_for_messages: bool,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Service {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub category: String,
    pub pricing_mode: PricingMode,
    pub unit_price: Option<i64>,
    pub weight_price: Option<i64>,
    pub duration: Option<ServiceDuration>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub store_id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_phone: String,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub fulfillment_status: FulfillmentStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub amount_tendered: i64,
    pub remaining_balance: i64,
    pub points_earned: i64,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub service_id: Option<Uuid>,
    pub name: String,
    pub pricing_mode: PricingMode,
    pub quantity: Option<f64>,
    pub weight_kg: Option<f64>,
    pub unit_price: Option<i64>,
    pub weight_price: Option<i64>,
    pub line_total: i64,
    pub estimated_completion: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointsAccount {
    pub id: Uuid,
    pub store_id: Uuid,
    pub customer_phone: String,
    pub accumulated_points: i64,
    pub current_points: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub order_id: Option<Uuid>,
    pub delta: i64,
    pub kind: PointKind,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StoreModel> for Store {
    fn from(model: StoreModel) -> Self {
        Store {
            id: model.id,
            name: model.name,
            phone: model.phone,
            address: model.address,
            points_enabled: model.points_enabled,
            use_own_number_for_messages: model.use_own_number_for_messages,
            is_active: model.is_active,
        }
    }
}

impl From<CustomerModel> for Customer {
    fn from(model: CustomerModel) -> Self {
        Customer {
            id: model.id,
            store_id: model.store_id,
            name: model.name,
            phone: model.phone,
            email: model.email,
            address: model.address,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<ServiceModel> for Service {
    fn from(model: ServiceModel) -> Self {
        let duration = match (model.duration_value, model.duration_unit) {
            (Some(value), Some(unit)) => Some(ServiceDuration { value, unit }),
            _ => None,
        };
        Service {
            id: model.id,
            store_id: model.store_id,
            name: model.name,
            category: model.category,
            pricing_mode: model.pricing_mode,
            unit_price: model.unit_price,
            weight_price: model.weight_price,
            duration,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<OrderModel> for Order {
    fn from(model: OrderModel) -> Self {
        Order {
            id: model.id,
            store_id: model.store_id,
            order_number: model.order_number,
            customer_id: model.customer_id,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            subtotal: model.subtotal,
            discount: model.discount,
            total: model.total,
            fulfillment_status: model.fulfillment_status,
            payment_status: model.payment_status,
            payment_method: model.payment_method,
            amount_tendered: model.amount_tendered,
            remaining_balance: (model.total - model.amount_tendered).max(0),
            points_earned: model.points_earned,
            estimated_completion: model.estimated_completion.map(|dt| dt.with_timezone(&Utc)),
            paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            service_id: model.service_id,
            name: model.name,
            pricing_mode: model.pricing_mode,
            quantity: model.quantity,
            weight_kg: model.weight_kg,
            unit_price: model.unit_price,
            weight_price: model.weight_price,
            line_total: model.line_total,
            estimated_completion: model.estimated_completion.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<PointsAccountModel> for PointsAccount {
    fn from(model: PointsAccountModel) -> Self {
        PointsAccount {
            id: model.id,
            store_id: model.store_id,
            customer_phone: model.customer_phone,
            accumulated_points: model.accumulated_points,
            current_points: model.current_points,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<PointTransactionModel> for PointTransaction {
    fn from(model: PointTransactionModel) -> Self {
        PointTransaction {
            id: model.id,
            account_id: model.account_id,
            order_id: model.order_id,
            delta: model.delta,
            kind: model.kind,
            note: model.note,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
