#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use laundry_pos::{
    db::{create_orm_conn, run_migrations},
    domain::pricing::{DurationUnit, PricingMode, ServiceDuration},
    dto::{
        catalog::CreateServiceRequest,
        orders::{CreateOrderRequest, CustomerInput, OrderLineRequest, OrderOutcome},
    },
    entity::{
        orders::{ActiveModel as OrderActive, Entity as Orders},
        store_members::{ActiveModel as MemberActive, MemberRole},
        stores::ActiveModel as StoreActive,
    },
    middleware::auth::AuthUser,
    notify::{
        NotificationDispatcher,
        transport::{DeliveryReceipt, LogTransport, MessageTransport, TransportError},
    },
    services::{catalog_service, order_service},
    state::AppState,
    tenant::{self, TenantContext},
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

pub const PHONE: &str = "0812-3456-7890";

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub destination: String,
    pub body: String,
    pub sender: Option<String>,
}

/// Keeps every message it is handed.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<SentMessage>>,
}

impl RecordingTransport {
    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send(
        &self,
        destination: &str,
        body: &str,
        sender: Option<&str>,
    ) -> Result<DeliveryReceipt, TransportError> {
        self.sent.lock().unwrap().push(SentMessage {
            destination: destination.to_string(),
            body: body.to_string(),
            sender: sender.map(str::to_string),
        });
        Ok(DeliveryReceipt {
            destination: destination.to_string(),
            simulated: false,
        })
    }
}

/// Rejects everything, counting attempts.
#[derive(Default)]
pub struct FailingTransport {
    pub attempts: Mutex<u32>,
}

#[async_trait]
impl MessageTransport for FailingTransport {
    async fn send(
        &self,
        _destination: &str,
        _body: &str,
        _sender: Option<&str>,
    ) -> Result<DeliveryReceipt, TransportError> {
        *self.attempts.lock().unwrap() += 1;
        Err(TransportError::Rejected("gateway unavailable".into()))
    }
}

pub async fn setup() -> anyhow::Result<AppState> {
    setup_with(Arc::new(LogTransport)).await
}

pub async fn setup_with(transport: Arc<dyn MessageTransport>) -> anyhow::Result<AppState> {
    setup_on("sqlite::memory:", transport).await
}

/// State backed by `TEST_DATABASE_URL` or `DATABASE_URL`, `None` when neither is set.
pub async fn setup_external() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => return Ok(None),
    };
    Ok(Some(setup_on(&database_url, Arc::new(LogTransport)).await?))
}

async fn setup_on(
    database_url: &str,
    transport: Arc<dyn MessageTransport>,
) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    let (notifier, _worker) = NotificationDispatcher::spawn(transport, 64);
    Ok(AppState { orm, notifier })
}

pub async fn create_store(
    state: &AppState,
    name: &str,
    points_enabled: bool,
) -> anyhow::Result<Uuid> {
    let now = Utc::now();
    let store = StoreActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        phone: Set(Some("081122223333".into())),
        address: Set(None),
        points_enabled: Set(points_enabled),
        use_own_number_for_messages: Set(false),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(store.id)
}

pub async fn add_member(
    state: &AppState,
    store_id: Uuid,
    user_id: Uuid,
    role: MemberRole,
) -> anyhow::Result<()> {
    MemberActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        user_id: Set(user_id),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

pub async fn context_for(
    state: &AppState,
    user_id: Uuid,
    store_id: Option<Uuid>,
) -> anyhow::Result<TenantContext> {
    Ok(tenant::resolve(&state.orm, &AuthUser { user_id }, store_id).await?)
}

/// A store with one owner, returned as the owner's context.
pub async fn owned_store(
    state: &AppState,
    name: &str,
    points_enabled: bool,
) -> anyhow::Result<TenantContext> {
    let store_id = create_store(state, name, points_enabled).await?;
    let owner = Uuid::new_v4();
    add_member(state, store_id, owner, MemberRole::Owner).await?;
    context_for(state, owner, Some(store_id)).await
}

pub async fn weight_service(state: &AppState, tenant: &TenantContext) -> anyhow::Result<Uuid> {
    create_service(state, tenant, PricingMode::Weight, None, Some(7_000), Some(2)).await
}

pub async fn unit_service(state: &AppState, tenant: &TenantContext) -> anyhow::Result<Uuid> {
    create_service(state, tenant, PricingMode::Unit, Some(5_000), None, Some(1)).await
}

pub async fn create_service(
    state: &AppState,
    tenant: &TenantContext,
    pricing_mode: PricingMode,
    unit_price: Option<i64>,
    weight_price: Option<i64>,
    days: Option<i32>,
) -> anyhow::Result<Uuid> {
    let resp = catalog_service::create_service(
        state,
        tenant,
        CreateServiceRequest {
            name: format!("{pricing_mode:?} service"),
            category: "laundry".into(),
            pricing_mode,
            unit_price,
            weight_price,
            duration: days.map(|value| ServiceDuration {
                value,
                unit: DurationUnit::Days,
            }),
        },
    )
    .await?;
    Ok(resp.data.expect("service").id)
}

pub fn order_request(
    items: Vec<OrderLineRequest>,
    amount_tendered: Option<i64>,
) -> CreateOrderRequest {
    CreateOrderRequest {
        customer: CustomerInput {
            name: "Budi".into(),
            phone: PHONE.into(),
            email: None,
            address: None,
        },
        items,
        discount: None,
        payment_method: Some("cash".into()),
        amount_tendered,
    }
}

pub fn weight_line(service_id: Uuid, weight_kg: f64) -> OrderLineRequest {
    OrderLineRequest::Service {
        service_id,
        quantity: None,
        weight_kg: Some(weight_kg),
    }
}

pub fn unit_line(service_id: Uuid, quantity: f64) -> OrderLineRequest {
    OrderLineRequest::Service {
        service_id,
        quantity: Some(quantity),
        weight_kg: None,
    }
}

pub async fn place_order(
    state: &AppState,
    tenant: &TenantContext,
    request: CreateOrderRequest,
) -> anyhow::Result<OrderOutcome> {
    let resp = order_service::create_order(state, tenant, request).await?;
    Ok(resp.data.expect("order outcome"))
}

/// Polls until `done` holds or a second has passed.
pub async fn eventually<F>(mut done: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    done()
}

/// Moves an order's creation time `days` into the past.
pub async fn backdate_order(state: &AppState, order_id: Uuid, days: i64) -> anyhow::Result<()> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .expect("order");
    let mut active: OrderActive = order.into();
    active.created_at = Set((Utc::now() - TimeDelta::days(days)).into());
    active.update(&state.orm).await?;
    Ok(())
}
