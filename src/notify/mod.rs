//! Notification dispatcher.
//!
//! Composition happens on the request path after the order transaction has
//! committed; delivery happens on a background worker fed through a bounded
//! channel. Nothing on the delivery side can reach back into committed state.

pub mod templates;
pub mod transport;
pub mod worker;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, task::JoinHandle};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::status::FulfillmentStatus,
    entity::{orders::Model as OrderModel, stores::Model as StoreModel},
};
use transport::MessageTransport;
use worker::NotificationWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderCreated,
    OrderReady,
    OrderCompleted,
    PaymentReminder,
}

impl NotificationKind {
    /// Template fired by a fulfillment transition into `status`, if any.
    pub fn for_fulfillment(status: FulfillmentStatus) -> Option<Self> {
        match status {
            FulfillmentStatus::ReadyForPickup => Some(NotificationKind::OrderReady),
            FulfillmentStatus::Completed => Some(NotificationKind::OrderCompleted),
            _ => None,
        }
    }
}

/// A fully composed message waiting for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub order_id: Uuid,
    pub kind: NotificationKind,
    pub destination: String,
    pub body: String,
    /// `None` means the platform default sender.
    pub sender: Option<String>,
}

/// Best-effort delivery status reported next to, never instead of, the
/// primary result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Queued,
    /// No template for the transition or no usable destination.
    Skipped,
    /// Queue full or worker gone.
    Dropped,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Notification>,
}

impl NotificationDispatcher {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    /// Starts a worker draining the queue into `transport`.
    pub fn spawn(transport: Arc<dyn MessageTransport>, buffer: usize) -> (Self, JoinHandle<()>) {
        let (dispatcher, rx) = Self::new(buffer);
        let handle = tokio::spawn(NotificationWorker::new(transport).run(rx));
        (dispatcher, handle)
    }

    /// Never blocks and never fails the caller.
    pub fn dispatch(&self, notification: Notification) -> DispatchStatus {
        let order_id = notification.order_id;
        let kind = notification.kind;
        match self.tx.try_send(notification) {
            Ok(()) => {
                tracing::debug!(order_id = %order_id, ?kind, "notification queued");
                DispatchStatus::Queued
            }
            Err(err) => {
                tracing::warn!(order_id = %order_id, ?kind, error = %err, "notification dropped");
                DispatchStatus::Dropped
            }
        }
    }

    /// Composes and queues `kind` for `order`.
    pub fn notify_order(
        &self,
        kind: NotificationKind,
        order: &OrderModel,
        store: &StoreModel,
    ) -> DispatchStatus {
        match templates::compose(kind, order, store) {
            Some(notification) => self.dispatch(notification),
            None => {
                tracing::debug!(
                    order_id = %order.id,
                    ?kind,
                    "no usable destination, notification skipped"
                );
                DispatchStatus::Skipped
            }
        }
    }
}
