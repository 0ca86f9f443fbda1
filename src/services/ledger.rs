//! Loyalty ledger.
//!
//! Balances live in `points_accounts`, one row per `(store_id, customer_phone)`.
//! Every change to a balance is paired with an append-only
//! `point_transactions` row inside the same database transaction, so the sum
//! of an account's deltas always equals its current balance.
//!
//! Balance changes are single SQL expressions (`col = col + n`,
//! `col = col - n WHERE col >= n`), never read-modify-write in memory.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
    entity::prelude::DateTimeWithTimeZone,
    sea_query::{Expr, OnConflict},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    audit,
    domain::{phone, points},
    dto::loyalty::{
        PointTransactionList, PointsBalance, Reconciliation, RedeemPointsRequest, RedemptionResult,
    },
    entity::{
        order_items::Model as OrderItemModel,
        orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
        point_transactions::{
            ActiveModel as TxnActive, Column as TxnCol, Entity as PointTransactions, PointKind,
        },
        points_accounts::{
            ActiveModel as AccountActive, Column as AccountCol, Entity as PointsAccounts,
            Model as AccountModel,
        },
        stores::Entity as Stores,
    },
    error::{AppError, AppResult},
    models::{PointTransaction, PointsAccount},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    tenant::TenantContext,
};

/// What happened to an order's points when its payment was processed.
///
/// `AlreadyCredited` is the idempotent "already done" answer to a retried
/// request, distinct from every "nothing to do" case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreditOutcome {
    Credited { points: i64 },
    AlreadyCredited { points: i64 },
    PointsDisabled,
    NotSettled,
    NothingToEarn,
}

impl CreditOutcome {
    pub fn points(&self) -> i64 {
        match self {
            CreditOutcome::Credited { points } | CreditOutcome::AlreadyCredited { points } => {
                *points
            }
            _ => 0,
        }
    }
}

/// Credits the points of a settled order, at most once per order.
///
/// Must run inside the transaction that holds the order row lock. The
/// duplicate check and the increment then share one atomic unit; the partial
/// unique index on earning rows backs the check up when the backend cannot
/// lock rows.
pub async fn credit_order(
    txn: &DatabaseTransaction,
    order: &OrderModel,
    items: &[OrderItemModel],
) -> AppResult<CreditOutcome> {
    if !order.payment_status.is_settled() {
        return Ok(CreditOutcome::NotSettled);
    }

    if let Some(existing) = PointTransactions::find()
        .filter(TxnCol::OrderId.eq(order.id))
        .filter(TxnCol::Kind.eq(PointKind::Earning))
        .one(txn)
        .await?
    {
        tracing::debug!(order_id = %order.id, points = existing.delta, "order already credited");
        return Ok(CreditOutcome::AlreadyCredited {
            points: existing.delta,
        });
    }

    let store = Stores::find_by_id(order.store_id)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !store.points_enabled {
        return Ok(CreditOutcome::PointsDisabled);
    }

    let earned = points::order_points(
        items
            .iter()
            .map(|item| (item.pricing_mode, item.quantity, item.weight_kg)),
    );
    if earned == 0 {
        return Ok(CreditOutcome::NothingToEarn);
    }

    let account = add_to_account(txn, order.store_id, &order.customer_phone, earned).await?;

    let inserted = TxnActive {
        id: Set(Uuid::new_v4()),
        account_id: Set(account.id),
        store_id: Set(order.store_id),
        order_id: Set(Some(order.id)),
        delta: Set(earned),
        kind: Set(PointKind::Earning),
        note: Set(Some(format!("Order {}", order.order_number))),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await;
    if let Err(err) = inserted {
        return Err(duplicate_credit(err));
    }

    Orders::update_many()
        .col_expr(OrderCol::PointsEarned, Expr::value(earned))
        .filter(OrderCol::Id.eq(order.id))
        .exec(txn)
        .await?;

    tracing::info!(
        order_id = %order.id,
        store_id = %order.store_id,
        account_id = %account.id,
        points = earned,
        "points credited"
    );
    Ok(CreditOutcome::Credited { points: earned })
}

fn duplicate_credit(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("order points were credited concurrently".into())
        }
        _ => AppError::OrmError(err),
    }
}

/// Creates the account on first earning, otherwise increments both balances
/// in one statement.
async fn add_to_account(
    txn: &DatabaseTransaction,
    store_id: Uuid,
    customer_phone: &str,
    delta: i64,
) -> AppResult<AccountModel> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let account = AccountActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        customer_phone: Set(customer_phone.to_string()),
        accumulated_points: Set(delta),
        current_points: Set(delta),
        created_at: Set(now),
        updated_at: Set(now),
    };

    PointsAccounts::insert(account)
        .on_conflict(
            OnConflict::columns([AccountCol::StoreId, AccountCol::CustomerPhone])
                .value(
                    AccountCol::AccumulatedPoints,
                    Expr::col((PointsAccounts, AccountCol::AccumulatedPoints)).add(delta),
                )
                .value(
                    AccountCol::CurrentPoints,
                    Expr::col((PointsAccounts, AccountCol::CurrentPoints)).add(delta),
                )
                .value(AccountCol::UpdatedAt, Expr::value(now))
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;

    find_account(txn, store_id, customer_phone)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("points account missing after upsert")))
}

async fn find_account<C>(
    conn: &C,
    store_id: Uuid,
    customer_phone: &str,
) -> AppResult<Option<AccountModel>>
where
    C: ConnectionTrait,
{
    let account = PointsAccounts::find()
        .filter(AccountCol::StoreId.eq(store_id))
        .filter(AccountCol::CustomerPhone.eq(customer_phone))
        .one(conn)
        .await?;
    Ok(account)
}

/// Spends points. Leaves `accumulated_points` untouched and never lets the
/// current balance go below zero.
pub async fn redeem_points(
    state: &AppState,
    tenant: &TenantContext,
    customer_phone: &str,
    payload: RedeemPointsRequest,
) -> AppResult<ApiResponse<RedemptionResult>> {
    if payload.points <= 0 {
        return Err(AppError::BadRequest("points must be positive".into()));
    }
    let customer_phone = phone::clean(customer_phone);
    let requested = payload.points;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let txn = state.orm.begin().await?;

    let account = find_account(&txn, tenant.store_id, &customer_phone)
        .await?
        .ok_or(AppError::InsufficientPoints {
            requested,
            available: 0,
        })?;

    let result = PointsAccounts::update_many()
        .col_expr(
            AccountCol::CurrentPoints,
            Expr::col(AccountCol::CurrentPoints).sub(requested),
        )
        .col_expr(AccountCol::UpdatedAt, Expr::value(now))
        .filter(AccountCol::Id.eq(account.id))
        .filter(AccountCol::CurrentPoints.gte(requested))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        let available = PointsAccounts::find_by_id(account.id)
            .one(&txn)
            .await?
            .map(|a| a.current_points)
            .unwrap_or(0);
        txn.rollback().await?;
        return Err(AppError::InsufficientPoints {
            requested,
            available,
        });
    }

    let transaction = TxnActive {
        id: Set(Uuid::new_v4()),
        account_id: Set(account.id),
        store_id: Set(tenant.store_id),
        order_id: Set(None),
        delta: Set(-requested),
        kind: Set(PointKind::Redemption),
        note: Set(payload.note.filter(|n| !n.trim().is_empty())),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let account = PointsAccounts::find_by_id(account.id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    txn.commit().await?;

    audit::record(
        state,
        tenant,
        "points_redeem",
        "points_accounts",
        serde_json::json!({ "account_id": account.id, "points": requested }),
    )
    .await;

    Ok(ApiResponse::success(
        "Points redeemed",
        RedemptionResult {
            account: PointsAccount::from(account),
            transaction: PointTransaction::from(transaction),
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_points_balance(
    state: &AppState,
    tenant: &TenantContext,
    customer_phone: &str,
) -> AppResult<ApiResponse<PointsBalance>> {
    let customer_phone = phone::clean(customer_phone);
    let balance = match find_account(&state.orm, tenant.store_id, &customer_phone).await? {
        Some(account) => PointsBalance {
            account_id: Some(account.id),
            redeemed_points: account.accumulated_points - account.current_points,
            accumulated_points: account.accumulated_points,
            current_points: account.current_points,
            customer_phone,
        },
        None => PointsBalance {
            account_id: None,
            customer_phone,
            accumulated_points: 0,
            current_points: 0,
            redeemed_points: 0,
        },
    };
    Ok(ApiResponse::success("Points balance", balance, None))
}

pub async fn list_point_transactions(
    state: &AppState,
    tenant: &TenantContext,
    customer_phone: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<PointTransactionList>> {
    let customer_phone = phone::clean(customer_phone);
    let (page, limit, offset) = pagination.normalize();

    let Some(account) = find_account(&state.orm, tenant.store_id, &customer_phone).await? else {
        return Ok(ApiResponse::success(
            "Point transactions",
            PointTransactionList { items: Vec::new() },
            Some(Meta::new(page, limit, 0)),
        ));
    };

    let finder = PointTransactions::find()
        .filter(TxnCol::AccountId.eq(account.id))
        .filter(TxnCol::StoreId.eq(tenant.store_id))
        .order_by_desc(TxnCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(PointTransaction::from)
        .collect();

    Ok(ApiResponse::success(
        "Point transactions",
        PointTransactionList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Compares an account's balance with the sum of its transaction deltas.
pub async fn reconcile_account<C>(
    conn: &C,
    tenant: &TenantContext,
    account_id: Uuid,
) -> AppResult<Reconciliation>
where
    C: ConnectionTrait,
{
    let account = PointsAccounts::find_by_id(account_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    tenant.ensure_store(account.store_id)?;

    let deltas: Vec<i64> = PointTransactions::find()
        .select_only()
        .column(TxnCol::Delta)
        .filter(TxnCol::AccountId.eq(account.id))
        .into_tuple::<i64>()
        .all(conn)
        .await?;
    let ledger_sum: i64 = deltas.iter().sum();

    if ledger_sum != account.current_points {
        tracing::warn!(
            account_id = %account.id,
            current = account.current_points,
            ledger_sum,
            "points account out of balance"
        );
    }

    Ok(Reconciliation {
        account_id: account.id,
        current_points: account.current_points,
        ledger_sum,
        balanced: ledger_sum == account.current_points,
    })
}

pub async fn reconcile_customer(
    state: &AppState,
    tenant: &TenantContext,
    customer_phone: &str,
) -> AppResult<ApiResponse<Reconciliation>> {
    let customer_phone = phone::clean(customer_phone);
    let account = find_account(&state.orm, tenant.store_id, &customer_phone)
        .await?
        .ok_or(AppError::NotFound)?;
    let report = reconcile_account(&state.orm, tenant, account.id).await?;
    Ok(ApiResponse::success("Reconciliation", report, None))
}
