use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::phone,
    domain::status::FulfillmentStatus,
    dto::{
        customers::{CustomerList, LapsedCustomer, LapsedCustomerList},
        orders::{CustomerInput, OrderList},
    },
    entity::{
        customers::{
            ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers,
            Model as CustomerModel,
        },
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    models::{Customer, Order},
    response::{ApiResponse, Meta},
    routes::params::{CustomerQuery, InactivityQuery, Pagination},
    state::AppState,
    tenant::TenantContext,
};

/// Customer details after trimming, with the phone already cleaned.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl CustomerDetails {
    pub fn from_input(input: &CustomerInput) -> AppResult<Self> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Customer name is required".into()));
        }
        if !phone::is_valid(&input.phone) {
            return Err(AppError::BadRequest("Customer phone is invalid".into()));
        }
        let trimmed = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Ok(Self {
            name,
            phone: phone::clean(&input.phone),
            email: trimmed(&input.email),
            address: trimmed(&input.address),
        })
    }
}

/// Returns the store's customer with this phone, creating it when missing.
/// A newer name, email or address replaces the stored one.
pub async fn find_or_create<C>(
    conn: &C,
    store_id: Uuid,
    details: &CustomerDetails,
) -> AppResult<CustomerModel>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let candidate = CustomerActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        name: Set(details.name.clone()),
        phone: Set(details.phone.clone()),
        email: Set(details.email.clone()),
        address: Set(details.address.clone()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    Customers::insert(candidate)
        .on_conflict(
            OnConflict::columns([CustomerCol::StoreId, CustomerCol::Phone])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let existing = Customers::find()
        .filter(CustomerCol::StoreId.eq(store_id))
        .filter(CustomerCol::Phone.eq(details.phone.as_str()))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("customer missing after insert")))?;

    let changed = existing.name != details.name
        || (details.email.is_some() && existing.email != details.email)
        || (details.address.is_some() && existing.address != details.address);
    if !changed {
        return Ok(existing);
    }

    let mut active: CustomerActive = existing.into();
    active.name = Set(details.name.clone());
    if details.email.is_some() {
        active.email = Set(details.email.clone());
    }
    if details.address.is_some() {
        active.address = Set(details.address.clone());
    }
    active.updated_at = Set(now.into());
    Ok(active.update(conn).await?)
}

pub async fn upsert_customer(
    state: &AppState,
    tenant: &TenantContext,
    payload: CustomerInput,
) -> AppResult<ApiResponse<Customer>> {
    let details = CustomerDetails::from_input(&payload)?;

    let txn = state.orm.begin().await?;
    let customer = find_or_create(&txn, tenant.store_id, &details).await?;
    txn.commit().await?;

    audit::record(
        state,
        tenant,
        "customer_upsert",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customer saved",
        Customer::from(customer),
        Some(Meta::empty()),
    ))
}

pub async fn search_customers(
    state: &AppState,
    tenant: &TenantContext,
    query: CustomerQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(CustomerCol::StoreId.eq(tenant.store_id));
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let cleaned = phone::clean(q);
        condition = condition.add(
            Condition::any()
                .add(CustomerCol::Name.contains(q))
                .add(CustomerCol::Phone.contains(cleaned.as_str())),
        );
    }

    let finder = Customers::find()
        .filter(condition)
        .order_by_asc(CustomerCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Customer::from)
        .collect();

    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_customer_by_phone(
    state: &AppState,
    tenant: &TenantContext,
    customer_phone: &str,
) -> AppResult<ApiResponse<Customer>> {
    let customer = Customers::find()
        .filter(CustomerCol::StoreId.eq(tenant.store_id))
        .filter(CustomerCol::Phone.eq(phone::clean(customer_phone)))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Customer", Customer::from(customer), None))
}

/// Orders placed under this phone, newest first. Matches the phone snapshot
/// on the order, so history survives customer edits.
pub async fn customer_order_history(
    state: &AppState,
    tenant: &TenantContext,
    customer_phone: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(OrderCol::StoreId.eq(tenant.store_id))
        .filter(OrderCol::CustomerPhone.eq(phone::clean(customer_phone)))
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
        "Order history",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Per-customer order counts and dates, cancelled orders left out.
#[derive(Debug, FromQueryResult)]
struct OrderActivity {
    customer_id: Uuid,
    order_count: i64,
    first_order_at: DateTimeWithTimeZone,
    last_order_at: DateTimeWithTimeZone,
}

/// Which lapsed customers a report asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Lapse {
    /// Last order placed before the cutoff.
    Inactive,
    /// Exactly one order, placed before the cutoff.
    Churned,
}

impl Lapse {
    fn matches(&self, activity: &OrderActivity, cutoff: DateTime<Utc>) -> bool {
        match self {
            Lapse::Inactive => activity.last_order_at < cutoff,
            Lapse::Churned => activity.order_count == 1 && activity.first_order_at < cutoff,
        }
    }
}

/// Customers whose latest order is at least `days` old, default 14. Longest
/// inactive first.
pub async fn list_inactive_customers(
    state: &AppState,
    tenant: &TenantContext,
    query: InactivityQuery,
) -> AppResult<ApiResponse<LapsedCustomerList>> {
    let cutoff = query.cutoff(Utc::now(), 14)?;
    let items = lapsed_customers(state, tenant, Lapse::Inactive, cutoff, query.limit()).await?;
    Ok(ApiResponse::success(
        "Inactive customers",
        LapsedCustomerList { items },
        None,
    ))
}

/// Customers who ordered once and never came back within `days`, default 30.
pub async fn list_churned_customers(
    state: &AppState,
    tenant: &TenantContext,
    query: InactivityQuery,
) -> AppResult<ApiResponse<LapsedCustomerList>> {
    let cutoff = query.cutoff(Utc::now(), 30)?;
    let items = lapsed_customers(state, tenant, Lapse::Churned, cutoff, query.limit()).await?;
    Ok(ApiResponse::success(
        "Churned customers",
        LapsedCustomerList { items },
        None,
    ))
}

async fn lapsed_customers(
    state: &AppState,
    tenant: &TenantContext,
    lapse: Lapse,
    cutoff: DateTime<Utc>,
    limit: usize,
) -> AppResult<Vec<LapsedCustomer>> {
    let settled = Condition::all()
        .add(OrderCol::StoreId.eq(tenant.store_id))
        .add(OrderCol::FulfillmentStatus.ne(FulfillmentStatus::Cancelled))
        .add(OrderCol::CustomerId.is_not_null());

    let mut activity: Vec<OrderActivity> = Orders::find()
        .select_only()
        .column(OrderCol::CustomerId)
        .column_as(OrderCol::Id.count(), "order_count")
        .column_as(OrderCol::CreatedAt.min(), "first_order_at")
        .column_as(OrderCol::CreatedAt.max(), "last_order_at")
        .filter(settled.clone())
        .group_by(OrderCol::CustomerId)
        .into_model::<OrderActivity>()
        .all(&state.orm)
        .await?
        .into_iter()
        .filter(|row| lapse.matches(row, cutoff))
        .collect();
    activity.sort_by_key(|row| row.last_order_at);
    activity.truncate(limit);
    if activity.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = activity.iter().map(|row| row.customer_id).collect();
    let customers: HashMap<Uuid, CustomerModel> = Customers::find()
        .filter(CustomerCol::StoreId.eq(tenant.store_id))
        .filter(CustomerCol::Id.is_in(ids.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|customer| (customer.id, customer))
        .collect();

    let earliest_last = activity[0].last_order_at;
    let mut last_totals: HashMap<Uuid, i64> = HashMap::new();
    for order in Orders::find()
        .filter(settled)
        .filter(OrderCol::CustomerId.is_in(ids))
        .filter(OrderCol::CreatedAt.gte(earliest_last))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
    {
        if let Some(customer_id) = order.customer_id {
            last_totals.entry(customer_id).or_insert(order.total);
        }
    }

    let now = Utc::now();
    let items = activity
        .into_iter()
        .filter_map(|row| {
            let customer = customers.get(&row.customer_id)?;
            let last_order_at = row.last_order_at.with_timezone(&Utc);
            Some(LapsedCustomer {
                customer_id: row.customer_id,
                name: customer.name.clone(),
                phone: customer.phone.clone(),
                email: customer.email.clone(),
                order_count: row.order_count,
                first_order_at: row.first_order_at.with_timezone(&Utc),
                last_order_at,
                last_order_total: last_totals.get(&row.customer_id).copied().unwrap_or(0),
                days_inactive: (now - last_order_at).num_days(),
            })
        })
        .collect();
    Ok(items)
}
