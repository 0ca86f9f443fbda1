use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::MessagingConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub destination: String,
    /// True when nothing actually left the process.
    pub simulated: bool,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("messaging transport is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("transport returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Rejected(String),
}

/// Delivers one message. Retrying is the transport's business, not the
/// caller's.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(
        &self,
        destination: &str,
        body: &str,
        sender: Option<&str>,
    ) -> Result<DeliveryReceipt, TransportError>;
}

/// Used when messaging is disabled: logs the message and reports a simulated
/// delivery.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl MessageTransport for LogTransport {
    async fn send(
        &self,
        destination: &str,
        body: &str,
        sender: Option<&str>,
    ) -> Result<DeliveryReceipt, TransportError> {
        tracing::info!(
            destination,
            sender = sender.unwrap_or("platform-default"),
            length = body.len(),
            "messaging disabled, message not sent"
        );
        Ok(DeliveryReceipt {
            destination: destination.to_string(),
            simulated: true,
        })
    }
}

#[derive(Debug, Clone)]
enum TransportAuth {
    Basic { username: String, password: String },
    Bearer(String),
}

impl TransportAuth {
    fn parse(key: &str) -> Self {
        match key.split_once(':') {
            Some((username, password)) => TransportAuth::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
            None => TransportAuth::Bearer(key.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    to: String,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
}

/// Posts messages as JSON to an HTTP messaging gateway.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    auth: Option<TransportAuth>,
    default_sender: Option<String>,
}

impl HttpTransport {
    pub fn from_config(config: &MessagingConfig) -> Result<Self, TransportError> {
        let url = config
            .api_url
            .clone()
            .ok_or(TransportError::NotConfigured("MESSAGING_API_URL is not set"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            url,
            auth: config.api_key.as_deref().map(TransportAuth::parse),
            default_sender: config.default_sender.clone(),
        })
    }
}

fn with_plus(number: &str) -> String {
    if number.starts_with('+') {
        number.to_string()
    } else {
        format!("+{number}")
    }
}

#[async_trait]
impl MessageTransport for HttpTransport {
    async fn send(
        &self,
        destination: &str,
        body: &str,
        sender: Option<&str>,
    ) -> Result<DeliveryReceipt, TransportError> {
        let from = sender
            .map(str::to_string)
            .or_else(|| self.default_sender.clone())
            .map(|n| with_plus(&n));
        let payload = OutgoingMessage {
            to: with_plus(destination),
            message: body,
            from,
        };

        let mut request = self.client.post(&self.url).json(&payload);
        request = match &self.auth {
            Some(TransportAuth::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            Some(TransportAuth::Bearer(token)) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(DeliveryReceipt {
            destination: destination.to_string(),
            simulated: false,
        })
    }
}

/// Picks the transport for the current configuration.
pub fn build_transport(
    config: &MessagingConfig,
) -> Result<Arc<dyn MessageTransport>, TransportError> {
    if !config.enabled {
        tracing::info!("messaging disabled, using log transport");
        return Ok(Arc::new(LogTransport));
    }
    Ok(Arc::new(HttpTransport::from_config(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_and_bearer_keys() {
        let TransportAuth::Basic { username, password } = TransportAuth::parse("user:secret") else {
            panic!("expected basic auth");
        };
        assert_eq!((username.as_str(), password.as_str()), ("user", "secret"));
        assert!(matches!(
            TransportAuth::parse("token123"),
            TransportAuth::Bearer(ref t) if t == "token123"
        ));
    }

    #[test]
    fn enabled_transport_requires_url() {
        let config = MessagingConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(matches!(
            build_transport(&config),
            Err(TransportError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn log_transport_simulates_delivery() {
        let receipt = LogTransport
            .send("6281234567890", "hello", None)
            .await
            .unwrap();
        assert!(receipt.simulated);
    }
}
