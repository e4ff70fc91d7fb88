use crate::shared::infrastructure::metric_source::{MetricReading, MetricSource, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Scripted = Result<Option<String>, String>;

/// Replays queued readings in order, then repeats the fallback state.
#[derive(Default)]
pub struct ScriptedMetricSource {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
}

impl ScriptedMetricSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_state(&self, state: &str) {
        self.push_reading(Some(state));
    }

    pub fn push_reading(&self, state: Option<&str>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(state.map(str::to_string)));
    }

    pub fn push_error(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn set_fallback(&self, state: &str) {
        *self.fallback.lock().unwrap() = Some(state.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricSource for ScriptedMetricSource {
    async fn fetch(&self, now: DateTime<Utc>) -> Result<MetricReading, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        let state = match next {
            Some(Ok(state)) => state,
            Some(Err(message)) => return Err(SourceError::Transport(message)),
            None => self.fallback.lock().unwrap().clone(),
        };
        Ok(MetricReading {
            state,
            observed_at: now,
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
