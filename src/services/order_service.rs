use std::collections::HashMap;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        money::format_rupiah,
        phone,
        status::{FulfillmentStatus, PaymentStatus},
    },
    dto::orders::{
        CreateOrderRequest, NotificationResult, OrderLineRequest, OrderList, OrderOutcome,
        OrderWithItems, PickupEstimate, Receipt, ReceiptLine, RecordPaymentRequest,
        ReminderSummary, ResendNotificationRequest, StoreContact, UpdateFulfillmentRequest,
        UpdatePaymentRequest,
    },
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem},
    notify::{DispatchStatus, NotificationKind},
    response::{ApiResponse, Meta},
    routes::params::{
        OrderListQuery, Pagination, PendingPaymentsQuery, SortOrder, TodaysOrdersQuery,
    },
    services::{
        catalog_service, customer_service,
        ledger,
        order_assembler::{self, OrderDraft},
        store_service,
    },
    state::AppState,
    tenant::TenantContext,
};

/// Upper bound on reminders queued by one call.
const REMINDER_BATCH: u64 = 500;

pub async fn create_order(
    state: &AppState,
    tenant: &TenantContext,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderOutcome>> {
    let mut catalog = HashMap::new();
    for line in &payload.items {
        if let OrderLineRequest::Service { service_id, .. } = line {
            if !catalog.contains_key(service_id) {
                let service =
                    catalog_service::lookup_service(&state.orm, tenant, *service_id).await?;
                catalog.insert(*service_id, service);
            }
        }
    }

    let now = Utc::now();
    let draft = order_assembler::assemble(tenant.store_id, &payload, &catalog, now)?;

    let txn = state.orm.begin().await?;

    let customer = customer_service::find_or_create(&txn, tenant.store_id, &draft.customer).await?;
    let order = insert_order(&txn, &draft, Some(customer.id), now).await?;
    let items = insert_items(&txn, order.id, &draft, now).await?;

    let points = ledger::credit_order(&txn, &order, &items).await?;
    let order = reload(&txn, order.id).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        store_id = %order.store_id,
        order_number = %order.order_number,
        total = order.total,
        payment_status = %order.payment_status,
        fulfillment_status = %order.fulfillment_status,
        "order created"
    );

    let notification = notify(state, tenant, NotificationKind::OrderCreated, &order).await;

    audit::record(
        state,
        tenant,
        "order_create",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "total": order.total,
            "points": points.points(),
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderOutcome {
            change_due: draft.change_due(),
            order: Order::from(order),
            items: items.into_iter().map(OrderItem::from).collect(),
            points: Some(points),
            notification,
        },
        Some(Meta::empty()),
    ))
}

async fn insert_order(
    txn: &DatabaseTransaction,
    draft: &OrderDraft,
    customer_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<OrderModel> {
    let order_id = Uuid::new_v4();
    let paid_at = draft.payment_status.is_settled().then(|| now.into());
    let order = OrderActive {
        id: Set(order_id),
        store_id: Set(draft.store_id),
        order_number: Set(build_order_number(now, order_id)),
        customer_id: Set(customer_id),
        customer_name: Set(draft.customer.name.clone()),
        customer_phone: Set(draft.customer.phone.clone()),
        subtotal: Set(draft.subtotal),
        discount: Set(draft.discount),
        total: Set(draft.total),
        fulfillment_status: Set(draft.fulfillment_status),
        payment_status: Set(draft.payment_status),
        payment_method: Set(draft.payment_method.clone()),
        amount_tendered: Set(draft.amount_tendered),
        points_earned: Set(0),
        estimated_completion: Set(draft.estimated_completion.map(Into::into)),
        paid_at: Set(paid_at),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await?;
    Ok(order)
}

async fn insert_items(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    draft: &OrderDraft,
    now: DateTime<Utc>,
) -> AppResult<Vec<OrderItemModel>> {
    let mut items = Vec::with_capacity(draft.lines.len());
    for line in &draft.lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            service_id: Set(line.service_id),
            name: Set(line.name.clone()),
            pricing_mode: Set(line.pricing_mode),
            quantity: Set(line.quantity),
            weight_kg: Set(line.weight_kg),
            unit_price: Set(line.unit_price),
            weight_price: Set(line.weight_price),
            line_total: Set(line.line_total),
            estimated_completion: Set(line.estimated_completion.map(Into::into)),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await?;
        items.push(item);
    }
    Ok(items)
}

/// `ORD-YYYYMMDD-xxxxxxxx`, the suffix taken from the order id.
pub fn build_order_number(now: DateTime<Utc>, order_id: Uuid) -> String {
    let suffix: String = order_id.simple().to_string().chars().take(8).collect();
    format!("ORD-{}-{}", now.format("%Y%m%d"), suffix)
}

async fn reload<C>(conn: &C, id: Uuid) -> AppResult<OrderModel>
where
    C: ConnectionTrait,
{
    Orders::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Locks the order row for the rest of the transaction.
async fn lock_order(
    txn: &DatabaseTransaction,
    tenant: &TenantContext,
    id: Uuid,
) -> AppResult<OrderModel> {
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)?;
    tenant.ensure_store(order.store_id)?;
    Ok(order)
}

async fn load_order<C>(conn: &C, tenant: &TenantContext, id: Uuid) -> AppResult<OrderModel>
where
    C: ConnectionTrait,
{
    let order = reload(conn, id).await?;
    tenant.ensure_store(order.store_id)?;
    Ok(order)
}

async fn fetch_items<C>(conn: &C, order_id: Uuid) -> AppResult<Vec<OrderItemModel>>
where
    C: ConnectionTrait,
{
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?;
    Ok(items)
}

/// Composes and queues a message. Runs after commit; the outcome is only
/// reported, never propagated.
async fn notify(
    state: &AppState,
    tenant: &TenantContext,
    kind: NotificationKind,
    order: &OrderModel,
) -> DispatchStatus {
    match store_service::load_current(&state.orm, tenant).await {
        Ok(store) => state.notifier.notify_order(kind, order, &store),
        Err(err) => {
            tracing::warn!(
                order_id = %order.id,
                ?kind,
                error = %err,
                "notification skipped, store not loaded"
            );
            DispatchStatus::Skipped
        }
    }
}

fn change_due(order: &OrderModel) -> i64 {
    (order.amount_tendered - order.total).max(0)
}

pub async fn get_order(
    state: &AppState,
    tenant: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = load_order(&state.orm, tenant, id).await?;
    let items = fetch_items(&state.orm, order.id).await?;
    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: Order::from(order),
            items: items.into_iter().map(OrderItem::from).collect(),
        },
        None,
    ))
}

/// Moves the order along the fulfillment axis. Payment fields are not
/// written.
pub async fn update_fulfillment(
    state: &AppState,
    tenant: &TenantContext,
    id: Uuid,
    payload: UpdateFulfillmentRequest,
) -> AppResult<ApiResponse<OrderOutcome>> {
    let txn = state.orm.begin().await?;
    let order = lock_order(&txn, tenant, id).await?;

    let from = order.fulfillment_status;
    let to = payload.status;
    if !from.can_transition_to(to, payload.staff_override) {
        return Err(AppError::InvalidTransition {
            axis: "fulfillment",
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let mut active: OrderActive = order.into();
    active.fulfillment_status = Set(to);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    let items = fetch_items(&txn, order.id).await?;

    txn.commit().await?;

    if payload.staff_override {
        tracing::warn!(
            order_id = %order.id,
            %from,
            %to,
            user_id = %tenant.user_id,
            "fulfillment moved with staff override"
        );
    } else {
        tracing::info!(order_id = %order.id, %from, %to, "fulfillment status updated");
    }

    let notification = match NotificationKind::for_fulfillment(to) {
        Some(kind) => notify(state, tenant, kind, &order).await,
        None => DispatchStatus::Skipped,
    };

    audit::record(
        state,
        tenant,
        "order_fulfillment_update",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "from": from,
            "to": to,
            "staff_override": payload.staff_override,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Fulfillment status updated",
        OrderOutcome {
            change_due: change_due(&order),
            order: Order::from(order),
            items: items.into_iter().map(OrderItem::from).collect(),
            points: None,
            notification,
        },
        Some(Meta::empty()),
    ))
}

/// Moves the order along the payment axis and credits points when the order
/// becomes settled. Repeating "mark as paid" on a paid order is answered
/// with the points already credited instead of an error.
pub async fn update_payment_status(
    state: &AppState,
    tenant: &TenantContext,
    id: Uuid,
    payload: UpdatePaymentRequest,
) -> AppResult<ApiResponse<OrderOutcome>> {
    let txn = state.orm.begin().await?;
    let order = lock_order(&txn, tenant, id).await?;

    let from = order.payment_status;
    let to = payload.status;
    let retried = from == to && to.is_settled();
    if !retried && !from.can_transition_to(to) {
        return Err(AppError::InvalidTransition {
            axis: "payment",
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let order = if retried {
        order
    } else {
        let now = Utc::now();
        let mut active: OrderActive = order.clone().into();
        active.payment_status = Set(to);
        if to == PaymentStatus::Completed {
            active.amount_tendered = Set(order.amount_tendered.max(order.total));
            active.paid_at = Set(Some(now.into()));
        }
        active.updated_at = Set(now.into());
        active.update(&txn).await?
    };

    let items = fetch_items(&txn, order.id).await?;
    let points = ledger::credit_order(&txn, &order, &items).await?;
    let order = reload(&txn, order.id).await?;

    txn.commit().await?;

    if retried {
        tracing::debug!(order_id = %order.id, ?points, "payment update repeated");
    } else {
        tracing::info!(order_id = %order.id, %from, %to, ?points, "payment status updated");
        audit::record(
            state,
            tenant,
            "order_payment_update",
            "orders",
            serde_json::json!({
                "order_id": order.id,
                "from": from,
                "to": to,
                "points": points.points(),
            }),
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Payment status updated",
        OrderOutcome {
            change_due: change_due(&order),
            order: Order::from(order),
            items: items.into_iter().map(OrderItem::from).collect(),
            points: Some(points),
            notification: DispatchStatus::Skipped,
        },
        Some(Meta::empty()),
    ))
}

/// Adds money to an unpaid or partially paid order.
pub async fn record_payment(
    state: &AppState,
    tenant: &TenantContext,
    id: Uuid,
    payload: RecordPaymentRequest,
) -> AppResult<ApiResponse<OrderOutcome>> {
    if payload.amount <= 0 {
        return Err(AppError::BadRequest("Payment amount must be positive".into()));
    }

    let txn = state.orm.begin().await?;
    let order = lock_order(&txn, tenant, id).await?;

    if !order.payment_status.accepts_payment() {
        return Err(AppError::Conflict(format!(
            "Order payment is already {}",
            order.payment_status
        )));
    }

    let from = order.payment_status;
    let tendered = order
        .amount_tendered
        .checked_add(payload.amount)
        .ok_or_else(|| AppError::BadRequest("Payment amount is too large".into()))?;
    let to = PaymentStatus::from_tendered(order.total, tendered);

    let now = Utc::now();
    let mut active: OrderActive = order.into();
    active.amount_tendered = Set(tendered);
    active.payment_status = Set(to);
    if to.is_settled() {
        active.paid_at = Set(Some(now.into()));
    }
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    let items = fetch_items(&txn, order.id).await?;
    let points = ledger::credit_order(&txn, &order, &items).await?;
    let order = reload(&txn, order.id).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, amount = payload.amount, %from, %to, "payment recorded");
    audit::record(
        state,
        tenant,
        "order_payment_record",
        "orders",
        serde_json::json!({ "order_id": order.id, "amount": payload.amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment recorded",
        OrderOutcome {
            change_due: change_due(&order),
            order: Order::from(order),
            items: items.into_iter().map(OrderItem::from).collect(),
            points: Some(points),
            notification: DispatchStatus::Skipped,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    tenant: &TenantContext,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::StoreId.eq(tenant.store_id));
    if let Some(status) = query.fulfillment_status {
        condition = condition.add(OrderCol::FulfillmentStatus.eq(status));
    }
    if let Some(status) = query.payment_status {
        condition = condition.add(OrderCol::PaymentStatus.eq(status));
    }
    if let Some(customer_phone) = query.customer_phone.as_deref().filter(|p| !p.trim().is_empty()) {
        condition = condition.add(OrderCol::CustomerPhone.eq(phone::clean(customer_phone)));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_ready_for_pickup(
    state: &AppState,
    tenant: &TenantContext,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(OrderCol::StoreId.eq(tenant.store_id))
        .filter(OrderCol::FulfillmentStatus.eq(FulfillmentStatus::ReadyForPickup))
        .order_by_asc(OrderCol::UpdatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Orders ready for pickup",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Orders taken since midnight UTC, newest first.
pub async fn list_todays_orders(
    state: &AppState,
    tenant: &TenantContext,
    query: TodaysOrdersQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let midnight: DateTimeWithTimeZone =
        Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc().into();
    let mut condition = Condition::all()
        .add(OrderCol::StoreId.eq(tenant.store_id))
        .add(OrderCol::CreatedAt.gte(midnight));
    if let Some(status) = query.fulfillment_status {
        condition = condition.add(OrderCol::FulfillmentStatus.eq(status));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Today's orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn estimate_pickup(
    state: &AppState,
    tenant: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<PickupEstimate>> {
    let order = load_order(&state.orm, tenant, id).await?;
    Ok(ApiResponse::success(
        "Pickup estimate",
        pickup_estimate(&order, Utc::now()),
        None,
    ))
}

/// Hours of work assumed for orders that carry no completion estimate.
fn fallback_hours(status: FulfillmentStatus) -> Option<i64> {
    match status {
        FulfillmentStatus::InQueue => Some(3),
        FulfillmentStatus::InProgress => Some(2),
        _ => None,
    }
}

fn pickup_estimate(order: &OrderModel, now: DateTime<Utc>) -> PickupEstimate {
    let status = order.fulfillment_status;
    let waiting = matches!(
        status,
        FulfillmentStatus::InQueue | FulfillmentStatus::InProgress
    );
    let estimated_ready_at = if waiting {
        order
            .estimated_completion
            .map(|at| at.with_timezone(&Utc))
            .or_else(|| {
                fallback_hours(status)
                    .and_then(TimeDelta::try_hours)
                    .and_then(|hours| now.checked_add_signed(hours))
            })
    } else {
        None
    };
    let overdue = estimated_ready_at.is_some_and(|at| at < now);
    let message = match (status, estimated_ready_at) {
        (FulfillmentStatus::ReadyForPickup, _) => "Ready for pickup".to_string(),
        (FulfillmentStatus::Completed, _) => "Already picked up".to_string(),
        (FulfillmentStatus::Cancelled, _) => "Order was cancelled".to_string(),
        (_, Some(at)) if overdue => {
            format!("Running late, was due {}", at.format("%d %b %Y %H:%M UTC"))
        }
        (_, Some(at)) => format!("Expected ready by {}", at.format("%d %b %Y %H:%M UTC")),
        (_, None) => status.label().to_string(),
    };

    PickupEstimate {
        order_id: order.id,
        order_number: order.order_number.clone(),
        fulfillment_status: status,
        status_label: status.label().to_string(),
        estimated_ready_at,
        ready: status == FulfillmentStatus::ReadyForPickup,
        overdue,
        message,
    }
}

/// Unpaid or partially paid orders created before `cutoff`, cancelled ones
/// excluded.
fn pending_payments_condition(tenant: &TenantContext, cutoff: DateTime<Utc>) -> Condition {
    let cutoff: DateTimeWithTimeZone = cutoff.into();
    Condition::all()
        .add(OrderCol::StoreId.eq(tenant.store_id))
        .add(OrderCol::PaymentStatus.is_in([PaymentStatus::Pending, PaymentStatus::DownPayment]))
        .add(OrderCol::FulfillmentStatus.ne(FulfillmentStatus::Cancelled))
        .add(OrderCol::CreatedAt.lte(cutoff))
}

pub async fn list_pending_payments(
    state: &AppState,
    tenant: &TenantContext,
    query: PendingPaymentsQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let finder = Orders::find()
        .filter(pending_payments_condition(tenant, query.cutoff(Utc::now())?))
        .order_by_asc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Pending payments",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn send_payment_reminders(
    state: &AppState,
    tenant: &TenantContext,
    query: PendingPaymentsQuery,
) -> AppResult<ApiResponse<ReminderSummary>> {
    let orders = Orders::find()
        .filter(pending_payments_condition(tenant, query.cutoff(Utc::now())?))
        .order_by_asc(OrderCol::CreatedAt)
        .limit(REMINDER_BATCH)
        .all(&state.orm)
        .await?;
    let store = store_service::load_current(&state.orm, tenant).await?;

    let mut summary = ReminderSummary::default();
    for order in &orders {
        match state
            .notifier
            .notify_order(NotificationKind::PaymentReminder, order, &store)
        {
            DispatchStatus::Queued => summary.queued += 1,
            DispatchStatus::Skipped => summary.skipped += 1,
            DispatchStatus::Dropped => summary.dropped += 1,
        }
    }

    tracing::info!(
        store_id = %tenant.store_id,
        queued = summary.queued,
        skipped = summary.skipped,
        dropped = summary.dropped,
        "payment reminders dispatched"
    );
    audit::record(
        state,
        tenant,
        "payment_reminders_send",
        "orders",
        serde_json::json!({ "queued": summary.queued, "hours_old": query.hours() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment reminders queued",
        summary,
        Some(Meta::empty()),
    ))
}

/// Dispatches a template for an order independently of any write.
pub async fn resend_notification(
    state: &AppState,
    tenant: &TenantContext,
    id: Uuid,
    payload: ResendNotificationRequest,
) -> AppResult<ApiResponse<NotificationResult>> {
    let order = load_order(&state.orm, tenant, id).await?;
    let status = notify(state, tenant, payload.kind, &order).await;

    audit::record(
        state,
        tenant,
        "notification_resend",
        "orders",
        serde_json::json!({ "order_id": order.id, "kind": payload.kind, "status": status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Notification processed",
        NotificationResult {
            order_id: order.id,
            kind: payload.kind,
            status,
        },
        None,
    ))
}

/// Receipt projection, always read from committed rows.
pub async fn get_receipt(
    state: &AppState,
    tenant: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<Receipt>> {
    let order = load_order(&state.orm, tenant, id).await?;
    let items = fetch_items(&state.orm, order.id).await?;
    let store = store_service::load_current(&state.orm, tenant).await?;

    let receipt = Receipt {
        order_id: order.id,
        order_number: order.order_number.clone(),
        customer_name: order.customer_name.clone(),
        customer_phone: order.customer_phone.clone(),
        lines: items
            .into_iter()
            .map(|item| ReceiptLine {
                name: item.name,
                quantity: item.quantity,
                weight_kg: item.weight_kg,
                line_total: item.line_total,
            })
            .collect(),
        subtotal: order.subtotal,
        discount: order.discount,
        total: order.total,
        formatted_total: format_rupiah(order.total),
        amount_tendered: order.amount_tendered,
        change_due: change_due(&order),
        remaining_balance: (order.total - order.amount_tendered).max(0),
        payment_method: order.payment_method.clone(),
        payment_status: order.payment_status,
        payment_label: order.payment_status.label().to_string(),
        fulfillment_status: order.fulfillment_status,
        points_earned: order.points_earned,
        store: StoreContact {
            name: store.name,
            phone: store.phone,
            address: store.address,
        },
        created_at: order.created_at.with_timezone(&Utc),
    };

    Ok(ApiResponse::success("Receipt", receipt, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_uses_date_and_id_prefix() {
        let now = DateTime::parse_from_rfc3339("2026-05-17T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        assert_eq!(build_order_number(now, id), "ORD-20260517-a1b2c3d4");
    }

    fn order_at(status: FulfillmentStatus, due: Option<DateTime<Utc>>) -> OrderModel {
        let created = DateTime::parse_from_rfc3339("2026-05-17T08:00:00Z").unwrap();
        OrderModel {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            order_number: "ORD-20260517-a1b2c3d4".into(),
            customer_id: None,
            customer_name: "Budi".into(),
            customer_phone: "081234567890".into(),
            subtotal: 14_000,
            discount: 0,
            total: 14_000,
            fulfillment_status: status,
            payment_status: PaymentStatus::Pending,
            payment_method: "cash".into(),
            amount_tendered: 0,
            points_earned: 0,
            estimated_completion: due.map(Into::into),
            paid_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn pickup_estimate_follows_status_and_due_date() {
        let now = DateTime::parse_from_rfc3339("2026-05-17T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let due = now + TimeDelta::hours(20);

        let queued = pickup_estimate(&order_at(FulfillmentStatus::InQueue, Some(due)), now);
        assert_eq!(queued.estimated_ready_at, Some(due));
        assert!(!queued.overdue && !queued.ready);
        assert_eq!(queued.message, "Expected ready by 18 May 2026 06:00 UTC");

        let late = pickup_estimate(
            &order_at(FulfillmentStatus::InProgress, Some(now - TimeDelta::hours(1))),
            now,
        );
        assert!(late.overdue);
        assert!(late.message.starts_with("Running late"));

        let undated = pickup_estimate(&order_at(FulfillmentStatus::InProgress, None), now);
        assert_eq!(undated.estimated_ready_at, Some(now + TimeDelta::hours(2)));

        let ready = pickup_estimate(&order_at(FulfillmentStatus::ReadyForPickup, Some(due)), now);
        assert!(ready.ready);
        assert_eq!(ready.estimated_ready_at, None);
        assert_eq!(ready.status_label, "Ready for pickup");

        let cancelled = pickup_estimate(&order_at(FulfillmentStatus::Cancelled, Some(due)), now);
        assert!(!cancelled.overdue);
        assert_eq!(cancelled.message, "Order was cancelled");
    }
}
