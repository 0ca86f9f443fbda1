use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub messaging: MessagingConfig,
    pub notification_queue_size: usize,
}

/// Outbound message transport settings.
#[derive(Debug, Clone, Default)]
pub struct MessagingConfig {
    pub enabled: bool,
    pub api_url: Option<String>,
    /// Either `user:password` (basic auth) or a bearer token.
    pub api_key: Option<String>,
    pub default_sender: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let notification_queue_size = env::var("NOTIFICATION_QUEUE_SIZE")
            .ok()
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(256);
        Ok(Self {
            port,
            database_url,
            host,
            messaging: MessagingConfig::from_env(),
            notification_queue_size,
        })
    }
}

impl MessagingConfig {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            enabled: env::var("MESSAGING_ENABLED")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            api_url: non_empty("MESSAGING_API_URL"),
            api_key: non_empty("MESSAGING_API_KEY"),
            default_sender: non_empty("MESSAGING_DEFAULT_SENDER"),
        }
    }
}
