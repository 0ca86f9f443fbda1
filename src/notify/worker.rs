use std::sync::Arc;

use tokio::sync::mpsc;

use super::{Notification, transport::MessageTransport};

/// Background worker draining the notification queue.
pub struct NotificationWorker {
    transport: Arc<dyn MessageTransport>,
}

impl NotificationWorker {
    pub fn new(transport: Arc<dyn MessageTransport>) -> Self {
        Self { transport }
    }

    /// Runs until every dispatcher handle is dropped. A failed send is logged
    /// and the worker moves on.
    pub async fn run(self, mut rx: mpsc::Receiver<Notification>) {
        tracing::info!("notification worker started");

        while let Some(notification) = rx.recv().await {
            match self
                .transport
                .send(
                    &notification.destination,
                    &notification.body,
                    notification.sender.as_deref(),
                )
                .await
            {
                Ok(receipt) => {
                    tracing::debug!(
                        order_id = %notification.order_id,
                        kind = ?notification.kind,
                        simulated = receipt.simulated,
                        "notification delivered"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        order_id = %notification.order_id,
                        kind = ?notification.kind,
                        error = %err,
                        "notification dispatch failed"
                    );
                }
            }
        }

        tracing::info!("notification channel closed, worker stopping");
    }
}
