// Home Assistant REST adapter for the MetricSource port.
//
// Purpose
// - Read the state of one sensor entity via `GET api/states/{entity_id}`.
//
// Responsibilities
// - Normalize the configured base URL and attach the bearer token.
// - Map transport failures and non-success statuses to SourceError.

use crate::shared::infrastructure::metric_source::{MetricReading, MetricSource, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
    pub last_changed: Option<String>,
    pub last_updated: Option<String>,
}

impl EntityState {
    pub fn into_reading(self, now: DateTime<Utc>) -> MetricReading {
        let state = Some(self.state).filter(|s| !s.trim().is_empty());
        MetricReading {
            state,
            observed_at: now,
        }
    }
}

pub struct HomeAssistantMetricSource {
    client: reqwest::Client,
    base_url: String,
    token: String,
    entity_id: String,
}

impl HomeAssistantMetricSource {
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let token = token.into();
        if base_url.trim().is_empty() || token.trim().is_empty() {
            return Err(SourceError::NotConfigured(
                "Home Assistant credentials not configured".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            token,
            entity_id: entity_id.into(),
        })
    }

    fn state_url(&self) -> String {
        format!("{}api/states/{}", self.base_url, self.entity_id)
    }
}

pub fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

#[async_trait]
impl MetricSource for HomeAssistantMetricSource {
    async fn fetch(&self, now: DateTime<Utc>) -> Result<MetricReading, SourceError> {
        tracing::debug!(entity_id = %self.entity_id, "fetching entity state from Home Assistant");
        let response = self
            .client
            .get(self.state_url())
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let entity = response
            .json::<EntityState>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        Ok(entity.into_reading(now))
    }

    fn name(&self) -> &str {
        "home_assistant"
    }
}
