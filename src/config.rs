//! Runtime configuration.
//!
//! Loaded from a TOML file. Every field has a default, so an empty file (or no
//! file at all) yields a working setup against the public endpoints, minus
//! credentials.
//!
//! ```toml
//! [tracking]
//! poll_interval_secs = 60
//! cooldown_secs = 8
//!
//! [order_source]
//! username = "..."
//! password = "..."
//!
//! [whatsapp]
//! access_token = "..."
//! phone_number_id = "..."
//! ```

use crate::model::{ReadySet, DEFAULT_READY_STATUSES, DELIVERED_STATUS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub order_source: OrderSourceConfig,
    /// Outbound messaging. Without it notifications only go to the log.
    pub whatsapp: Option<WhatsAppConfig>,
}

#[derive(Debug, Clone)]
pub struct TrackingConfig {
    pub poll_interval: Duration,
    pub cooldown: Duration,
    pub ready_statuses: Vec<String>,
    pub delivered_status: String,
    pub registry_buffer: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingToml::default().into()
    }
}

impl TrackingConfig {
    pub fn ready_set(&self) -> ReadySet {
        ReadySet::new(&self.ready_statuses, self.delivered_status.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct OrderSourceConfig {
    pub base_url: String,
    pub origin: String,
    pub user_agent: String,
    pub username: String,
    pub password: String,
    pub request_timeout: Duration,
}

impl Default for OrderSourceConfig {
    fn default() -> Self {
        OrderSourceToml::default().into()
    }
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub base_url: String,
    pub api_version: String,
    pub access_token: String,
    pub phone_number_id: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TomlConfig = toml::from_str(content)?;
        if Duration::try_from_secs_f64(file.tracking.cooldown_secs).is_err() {
            return Err(ConfigError::Invalid(format!(
                "tracking.cooldown_secs must be a non-negative number, got {}",
                file.tracking.cooldown_secs
            )));
        }
        let config = Self {
            tracking: file.tracking.into(),
            order_source: file.order_source.into(),
            whatsapp: file.whatsapp.map(Into::into),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tracking.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("tracking.poll_interval_secs must be > 0".into()));
        }
        if self.tracking.registry_buffer == 0 {
            return Err(ConfigError::Invalid("tracking.registry_buffer must be > 0".into()));
        }
        if self.tracking.delivered_status.trim().is_empty() {
            return Err(ConfigError::Invalid("tracking.delivered_status must not be empty".into()));
        }
        if let Some(whatsapp) = &self.whatsapp {
            if whatsapp.access_token.is_empty() || whatsapp.phone_number_id.is_empty() {
                return Err(ConfigError::Invalid(
                    "whatsapp.access_token and whatsapp.phone_number_id are required".into(),
                ));
            }
        }
        Ok(())
    }
}

/// TOML file structure for deserialization.
#[derive(Debug, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    tracking: TrackingToml,
    #[serde(default)]
    order_source: OrderSourceToml,
    whatsapp: Option<WhatsAppToml>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TrackingToml {
    poll_interval_secs: u64,
    cooldown_secs: f64,
    ready_statuses: Vec<String>,
    delivered_status: String,
    registry_buffer: usize,
}

impl Default for TrackingToml {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            cooldown_secs: 8.0,
            ready_statuses: DEFAULT_READY_STATUSES.iter().map(|s| s.to_string()).collect(),
            delivered_status: DELIVERED_STATUS.to_string(),
            registry_buffer: 32,
        }
    }
}

impl From<TrackingToml> for TrackingConfig {
    fn from(t: TrackingToml) -> Self {
        Self {
            poll_interval: Duration::from_secs(t.poll_interval_secs),
            cooldown: Duration::try_from_secs_f64(t.cooldown_secs).unwrap_or_default(),
            ready_statuses: t.ready_statuses,
            delivered_status: t.delivered_status,
            registry_buffer: t.registry_buffer,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct OrderSourceToml {
    base_url: String,
    origin: String,
    user_agent: String,
    username: String,
    password: String,
    request_timeout_secs: u64,
}

impl Default for OrderSourceToml {
    fn default() -> Self {
        Self {
            base_url: "https://api.esbas.com.tr".to_string(),
            origin: "https://mip.esbas.com.tr".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36"
                .to_string(),
            username: String::new(),
            password: String::new(),
            request_timeout_secs: 15,
        }
    }
}

impl From<OrderSourceToml> for OrderSourceConfig {
    fn from(t: OrderSourceToml) -> Self {
        Self {
            base_url: t.base_url.trim_end_matches('/').to_string(),
            origin: t.origin,
            user_agent: t.user_agent,
            username: t.username,
            password: t.password,
            request_timeout: Duration::from_secs(t.request_timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct WhatsAppToml {
    base_url: String,
    api_version: String,
    access_token: String,
    phone_number_id: String,
    request_timeout_secs: u64,
}

impl Default for WhatsAppToml {
    fn default() -> Self {
        Self {
            base_url: "https://graph.facebook.com".to_string(),
            api_version: "v19.0".to_string(),
            access_token: String::new(),
            phone_number_id: String::new(),
            request_timeout_secs: 15,
        }
    }
}

impl From<WhatsAppToml> for WhatsAppConfig {
    fn from(t: WhatsAppToml) -> Self {
        Self {
            base_url: t.base_url.trim_end_matches('/').to_string(),
            api_version: t.api_version,
            access_token: t.access_token,
            phone_number_id: t.phone_number_id,
            request_timeout: Duration::from_secs(t.request_timeout_secs),
        }
    }
}
