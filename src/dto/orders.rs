use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::status::{FulfillmentStatus, PaymentStatus},
    models::{Order, OrderItem},
    notify::{DispatchStatus, NotificationKind},
    services::ledger::CreditOutcome,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderLineRequest {
    /// A catalog service. Quantity and weight are read according to the
    /// service's pricing mode.
    Service {
        service_id: Uuid,
        quantity: Option<f64>,
        weight_kg: Option<f64>,
    },
    /// A free-text product priced per unit, with no turnaround.
    AdHoc {
        name: String,
        unit_price: i64,
        quantity: f64,
    },
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer: CustomerInput,
    pub items: Vec<OrderLineRequest>,
    pub discount: Option<i64>,
    pub payment_method: Option<String>,
    pub amount_tendered: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFulfillmentRequest {
    pub status: FulfillmentStatus,
    #[serde(default)]
    pub staff_override: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResendNotificationRequest {
    pub kind: NotificationKind,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// Result of creating an order or moving it along either status axis.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderOutcome {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub change_due: i64,
    /// Absent for fulfillment moves, which never touch the ledger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<CreditOutcome>,
    pub notification: DispatchStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResult {
    pub order_id: Uuid,
    pub kind: NotificationKind,
    pub status: DispatchStatus,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ReminderSummary {
    pub queued: u32,
    pub skipped: u32,
    pub dropped: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreContact {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: Option<f64>,
    pub weight_kg: Option<f64>,
    pub line_total: i64,
}

/// Read-only projection handed to receipt printers, taken after commit.
#[derive(Debug, Serialize, ToSchema)]
pub struct Receipt {
    pub order_id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub formatted_total: String,
    pub amount_tendered: i64,
    pub change_due: i64,
    pub remaining_balance: i64,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub payment_label: String,
    pub fulfillment_status: FulfillmentStatus,
    pub points_earned: i64,
    pub store: StoreContact,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// When an order is expected to be ready, from the stored completion
/// estimate or a status-based fallback.
#[derive(Debug, Serialize, ToSchema)]
pub struct PickupEstimate {
    pub order_id: Uuid,
    pub order_number: String,
    pub fulfillment_status: FulfillmentStatus,
    pub status_label: String,
    pub estimated_ready_at: Option<chrono::DateTime<chrono::Utc>>,
    pub ready: bool,
    /// Still being worked on after the estimate passed.
    pub overdue: bool,
    pub message: String,
}
