//! Reading extraction from the plant API

use async_trait::async_trait;
use eyre::{Context, Result};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ApiConfig;

/// Source of raw plant payloads, one per plant id
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch the current payload for a plant; `None` when the plant has no usable reading
    async fn fetch(&self, plant_id: u32) -> Option<Value>;
}

/// Reads payloads from `GET {base_url}{plant_id}`
pub struct HttpReadingSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReadingSource {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        debug!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "HttpReadingSource::new: called");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ReadingSource for HttpReadingSource {
    async fn fetch(&self, plant_id: u32) -> Option<Value> {
        let url = format!("{}{}", self.base_url, plant_id);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(plant_id, error = %e, "fetch: request failed");
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            debug!(plant_id, status = %response.status(), "fetch: non-200 response");
            return None;
        }

        match response.json::<Value>().await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!(plant_id, error = %e, "fetch: body is not JSON");
                None
            }
        }
    }
}

/// Fetch every plant id in `ids` with at most `workers` requests in flight.
///
/// Result order is unspecified; ids without a payload are dropped.
pub async fn extract_readings(source: &dyn ReadingSource, ids: RangeInclusive<u32>, workers: usize) -> Vec<Value> {
    debug!(?ids, workers, "extract_readings: called");
    let requested = ids.clone().count();

    let payloads: Vec<Value> = stream::iter(ids)
        .map(|id| source.fetch(id))
        .buffer_unordered(workers.max(1))
        .filter_map(|payload| async move { payload })
        .collect()
        .await;

    info!(requested, received = payloads.len(), "Extracted readings");
    payloads
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned payloads keyed by plant id
    pub struct MockReadingSource {
        payloads: HashMap<u32, Value>,
        call_count: AtomicUsize,
    }

    impl MockReadingSource {
        pub fn new(payloads: HashMap<u32, Value>) -> Self {
            Self {
                payloads,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadingSource for MockReadingSource {
        async fn fetch(&self, plant_id: u32) -> Option<Value> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.payloads.get(&plant_id).cloned()
        }
    }
}
