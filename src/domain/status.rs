//! The two orthogonal status axes of an order.
//!
//! Fulfillment:
//! ```text
//! InQueue ──► InProgress ──► ReadyForPickup ──► Completed
//!    │            │                │
//!    └────────────┴────────────────┴──► Cancelled
//! ```
//!
//! Payment:
//! ```text
//! Pending ──┬──► DownPayment ──┬──► Refunded
//!           │        │         │
//!           │        ▼         │
//!           └──► Completed ────┘
//! ```
//!
//! Each axis has its own transition table. Neither table knows about the
//! other, so a move on one axis can never touch the other.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    #[sea_orm(string_value = "in_queue")]
    InQueue,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "ready_for_pickup")]
    ReadyForPickup,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl FulfillmentStatus {
    /// Position along the forward path. `Cancelled` sits outside it.
    fn rank(&self) -> Option<u8> {
        match self {
            FulfillmentStatus::InQueue => Some(0),
            FulfillmentStatus::InProgress => Some(1),
            FulfillmentStatus::ReadyForPickup => Some(2),
            FulfillmentStatus::Completed => Some(3),
            FulfillmentStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FulfillmentStatus::Completed | FulfillmentStatus::Cancelled
        )
    }

    /// Forward moves may skip intermediate steps. Backward moves need a
    /// staff override, and nothing ever leaves `Cancelled`.
    pub fn can_transition_to(&self, next: FulfillmentStatus, staff_override: bool) -> bool {
        if *self == next {
            return false;
        }
        if *self == FulfillmentStatus::Cancelled {
            return false;
        }
        if next == FulfillmentStatus::Cancelled {
            return !self.is_terminal();
        }
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) if to > from => !self.is_terminal(),
            (Some(from), Some(to)) if to < from => staff_override,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::InQueue => "in_queue",
            FulfillmentStatus::InProgress => "in_progress",
            FulfillmentStatus::ReadyForPickup => "ready_for_pickup",
            FulfillmentStatus::Completed => "completed",
            FulfillmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FulfillmentStatus::InQueue => "Waiting to be processed",
            FulfillmentStatus::InProgress => "In progress",
            FulfillmentStatus::ReadyForPickup => "Ready for pickup",
            FulfillmentStatus::Completed => "Completed",
            FulfillmentStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "down_payment")]
    DownPayment,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl PaymentStatus {
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, DownPayment)
                | (Pending, Completed)
                | (DownPayment, Completed)
                | (DownPayment, Refunded)
                | (Completed, Refunded)
        )
    }

    /// Whether this status makes the order eligible for point crediting.
    /// Only full settlement counts; a down payment does not.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Completed)
    }

    /// Whether more money can still be recorded against the order.
    pub fn accepts_payment(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::DownPayment)
    }

    /// Status implied by how much of `total` has been tendered.
    pub fn from_tendered(total: i64, tendered: i64) -> PaymentStatus {
        if tendered >= total {
            PaymentStatus::Completed
        } else if tendered > 0 {
            PaymentStatus::DownPayment
        } else {
            PaymentStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::DownPayment => "down_payment",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Unpaid",
            PaymentStatus::DownPayment => "Partially paid",
            PaymentStatus::Completed => "Paid",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn forward_fulfillment_moves_are_allowed() {
        use FulfillmentStatus::*;
        assert!(InQueue.can_transition_to(InProgress, false));
        assert!(InProgress.can_transition_to(ReadyForPickup, false));
        assert!(ReadyForPickup.can_transition_to(Completed, false));
        assert!(InQueue.can_transition_to(ReadyForPickup, false));
    }

    #[test]
    fn backward_fulfillment_moves_need_override() {
        use FulfillmentStatus::*;
        assert!(!ReadyForPickup.can_transition_to(InProgress, false));
        assert!(ReadyForPickup.can_transition_to(InProgress, true));
        assert!(!Completed.can_transition_to(ReadyForPickup, false));
        assert!(Completed.can_transition_to(ReadyForPickup, true));
    }

    #[test]
    fn cancellation_only_from_non_terminal_states() {
        use FulfillmentStatus::*;
        assert!(InQueue.can_transition_to(Cancelled, false));
        assert!(InProgress.can_transition_to(Cancelled, false));
        assert!(ReadyForPickup.can_transition_to(Cancelled, false));
        assert!(!Completed.can_transition_to(Cancelled, false));
        for next in FulfillmentStatus::iter() {
            assert!(!Cancelled.can_transition_to(next, true));
        }
    }

    #[test]
    fn self_transitions_are_rejected() {
        for status in FulfillmentStatus::iter() {
            assert!(!status.can_transition_to(status, true));
        }
        for status in PaymentStatus::iter() {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn payment_transition_table() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(DownPayment));
        assert!(Pending.can_transition_to(Completed));
        assert!(DownPayment.can_transition_to(Completed));
        assert!(DownPayment.can_transition_to(Refunded));
        assert!(Completed.can_transition_to(Refunded));
        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Refunded.can_transition_to(Completed));
    }

    #[test]
    fn payment_status_from_tendered_amount() {
        assert_eq!(PaymentStatus::from_tendered(10_000, 0), PaymentStatus::Pending);
        assert_eq!(
            PaymentStatus::from_tendered(10_000, 2_500),
            PaymentStatus::DownPayment
        );
        assert_eq!(
            PaymentStatus::from_tendered(10_000, 10_000),
            PaymentStatus::Completed
        );
        assert_eq!(
            PaymentStatus::from_tendered(10_000, 20_000),
            PaymentStatus::Completed
        );
        assert_eq!(PaymentStatus::from_tendered(0, 0), PaymentStatus::Completed);
    }

    #[test]
    fn only_full_payment_is_settled() {
        assert!(PaymentStatus::Completed.is_settled());
        assert!(!PaymentStatus::DownPayment.is_settled());
        assert!(!PaymentStatus::Pending.is_settled());
        assert!(!PaymentStatus::Refunded.is_settled());
    }
}
