// Application configuration read from the environment.
//
// Responsibilities
// - Parse and validate every setting once, at startup.
// - Select the metric source: stub data or a Home Assistant instance.

use crate::shared::core::interval::Lookback;
use chrono::TimeDelta;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENTITY_ID: &str = "sensor.calorie_tracker";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Home Assistant credentials not configured: {0} is required")]
    MissingCredential(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Stub,
    HomeAssistant { base_url: String, token: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub entity_id: String,
    pub lookback: Lookback,
    pub sync_interval: Duration,
    pub attempt_timeout: Duration,
    pub retry_initial: Duration,
    pub retry_max: Duration,
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = match get("HEALTH_BRIDGE_SOURCE").as_deref().unwrap_or("stub") {
            "stub" => SourceConfig::Stub,
            "home_assistant" => SourceConfig::HomeAssistant {
                base_url: get("HOME_ASSISTANT_URL")
                    .ok_or(ConfigError::MissingCredential("HOME_ASSISTANT_URL"))?,
                token: get("HOME_ASSISTANT_TOKEN")
                    .ok_or(ConfigError::MissingCredential("HOME_ASSISTANT_TOKEN"))?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "HEALTH_BRIDGE_SOURCE",
                    value: other.to_string(),
                    reason: "expected `stub` or `home_assistant`".into(),
                });
            }
        };

        let lookback_secs = seconds(&get, "HEALTH_BRIDGE_LOOKBACK_SECS", 60)?;
        let lookback = i64::try_from(lookback_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| Lookback::new(delta).ok())
            .ok_or_else(|| ConfigError::Invalid {
                key: "HEALTH_BRIDGE_LOOKBACK_SECS",
                value: lookback_secs.to_string(),
                reason: "must be a positive number of seconds".into(),
            })?;

        let sync_interval = positive(&get, "HEALTH_BRIDGE_INTERVAL_SECS", 900)?;
        if sync_interval < lookback.as_delta().to_std().unwrap_or_default() {
            tracing::warn!(
                interval_secs = sync_interval.as_secs(),
                lookback_secs,
                "sync interval is shorter than the lookback; consecutive attempts will overlap and rely on the duplicate guard"
            );
        }

        let retry_initial = positive(&get, "HEALTH_BRIDGE_RETRY_INITIAL_SECS", 30)?;
        let retry_max = positive(&get, "HEALTH_BRIDGE_RETRY_MAX_SECS", 600)?;
        if retry_max < retry_initial {
            return Err(ConfigError::Invalid {
                key: "HEALTH_BRIDGE_RETRY_MAX_SECS",
                value: retry_max.as_secs().to_string(),
                reason: "must not be lower than HEALTH_BRIDGE_RETRY_INITIAL_SECS".into(),
            });
        }

        let bind_raw = get("HEALTH_BRIDGE_BIND").unwrap_or_else(|| "0.0.0.0:8080".into());
        let bind = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key: "HEALTH_BRIDGE_BIND",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source,
            entity_id: get("HEALTH_BRIDGE_ENTITY_ID").unwrap_or_else(|| DEFAULT_ENTITY_ID.into()),
            lookback,
            sync_interval,
            attempt_timeout: positive(&get, "HEALTH_BRIDGE_ATTEMPT_TIMEOUT_SECS", 60)?,
            retry_initial,
            retry_max,
            data_dir: get("HEALTH_BRIDGE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            bind,
        })
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join("records.jsonl")
    }

    pub fn watermark_path(&self) -> PathBuf {
        self.data_dir.join("watermark.json")
    }
}

fn seconds(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected a whole number of seconds".into(),
        }),
    }
}

fn positive(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs = seconds(get, key, default)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: secs.to_string(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}
