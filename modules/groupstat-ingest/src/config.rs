use std::time::Duration;

use graph_client::{app_token, RetryPolicy, DEFAULT_BASE_URL};

/// Posts requested per feed page unless overridden.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Importer configuration. Only `from_env` touches the process environment;
/// everything downstream receives this struct.
#[derive(Debug, Clone)]
pub struct Config {
    // Facebook
    pub group_id: String,
    pub app_id: String,
    pub app_secret: String,
    pub graph_api_base: String,

    // Database
    pub database_url: String,

    // Crawl
    pub page_size: u32,
    pub max_attempts: Option<u32>,
    pub retry_delay: Duration,
}

impl Config {
    /// Load from `.env` (if present) and the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from any key -> value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Self {
            group_id: required("FACEBOOK_GROUP_ID")?,
            app_id: required("FACEBOOK_APP_ID")?,
            app_secret: required("FACEBOOK_APP_SECRET")?,
            graph_api_base: lookup("GRAPH_API_BASE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            database_url: required("DATABASE_URL")?,
            page_size: parse_opt(&lookup, "FEED_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE),
            max_attempts: check_max_attempts(parse_opt(&lookup, "FETCH_MAX_ATTEMPTS")?)?,
            retry_delay: Duration::from_millis(
                parse_opt(&lookup, "FETCH_RETRY_DELAY_MS")?.unwrap_or(0),
            ),
        })
    }

    /// `app_id|app_secret`.
    pub fn access_token(&self) -> String {
        app_token(&self.app_id, &self.app_secret)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = match self.max_attempts {
            Some(max) => RetryPolicy::bounded(max),
            None => RetryPolicy::forever(),
        };
        policy.with_delay(self.retry_delay)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(3).collect();
            format!("{head}...({} chars)", val.chars().count())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  FACEBOOK_GROUP_ID: {}", self.group_id);
        tracing::info!("  FACEBOOK_APP_ID: {}", preview(&self.app_id));
        tracing::info!("  FACEBOOK_APP_SECRET: {}", preview(&self.app_secret));
        tracing::info!("  GRAPH_API_BASE: {}", self.graph_api_base);
        tracing::info!("  FEED_PAGE_SIZE: {}", self.page_size);
        match self.max_attempts {
            Some(max) => tracing::info!("  FETCH_MAX_ATTEMPTS: {max}"),
            None => tracing::info!("  FETCH_MAX_ATTEMPTS: <unbounded>"),
        }
    }
}

/// A retry cap of zero would never issue the request. Unset means unbounded.
pub fn check_max_attempts(max: Option<u32>) -> Result<Option<u32>, ConfigError> {
    match max {
        Some(0) => Err(ConfigError::Invalid {
            key: "FETCH_MAX_ATTEMPTS",
            value: "0".to_string(),
        }),
        other => Ok(other),
    }
}

fn parse_opt<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
