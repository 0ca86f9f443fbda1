use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{PointTransaction, PointsAccount};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemPointsRequest {
    pub points: i64,
    pub note: Option<String>,
}

/// Balance view of a customer. Zeroes when no account exists yet.
#[derive(Debug, Serialize, ToSchema)]
pub struct PointsBalance {
    pub account_id: Option<Uuid>,
    pub customer_phone: String,
    pub accumulated_points: i64,
    pub current_points: i64,
    pub redeemed_points: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PointTransactionList {
    pub items: Vec<PointTransaction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionResult {
    pub account: PointsAccount,
    pub transaction: PointTransaction,
}

/// Whether an account's balance agrees with its transaction history.
#[derive(Debug, Serialize, ToSchema)]
pub struct Reconciliation {
    pub account_id: Uuid,
    pub current_points: i64,
    pub ledger_sum: i64,
    pub balanced: bool,
}
