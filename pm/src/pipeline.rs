//! Extract, transform and load one batch of readings

use chrono::NaiveDateTime;
use eyre::{Context, Result};
use plantstore::{BatchStats, PlantBatch, Store};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::extract::{ReadingSource, extract_readings};
use crate::transform::{PlantFactory, to_batch};

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Payloads returned by the API
    pub fetched: usize,
    /// Payloads that validated into plants
    pub accepted: usize,
    /// Rows written per table; `None` when there was nothing to load
    pub stats: Option<BatchStats>,
}

/// Run extract, transform and load against the configured store
pub async fn run_pipeline(config: &Config, source: &dyn ReadingSource, now: NaiveDateTime) -> Result<PipelineReport> {
    debug!(%now, "run_pipeline: called");
    let api = &config.api;
    let payloads = extract_readings(source, api.min_plant_id..=api.max_plant_id, api.worker_count()).await;

    let plants = PlantFactory::new(now).create_plants(&payloads);
    let mut report = PipelineReport {
        fetched: payloads.len(),
        accepted: plants.len(),
        stats: None,
    };

    if plants.is_empty() {
        info!("No valid plants, skipping load");
        return Ok(report);
    }

    report.stats = Some(load_batch(&config.storage.db_path, to_batch(&plants)).await?);
    info!(fetched = report.fetched, accepted = report.accepted, "Pipeline finished");
    Ok(report)
}

/// Upsert a batch on a blocking thread; a failed batch is logged and abandoned
pub async fn load_batch(db_path: &Path, batch: PlantBatch) -> Result<BatchStats> {
    let db_path: PathBuf = db_path.to_path_buf();
    debug!(?db_path, plants = batch.plants.len(), "load_batch: called");

    let result = tokio::task::spawn_blocking(move || {
        let mut store = Store::open(&db_path)?;
        store.upsert_batch(&batch)
    })
    .await
    .context("Load task panicked")?;

    result.map_err(|e| {
        error!(error = %e, "Load failed, batch abandoned");
        eyre::Report::new(e).wrap_err("Failed to load batch")
    })
}
