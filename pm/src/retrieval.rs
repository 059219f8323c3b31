//! Fetching archived readings back out of cold storage

use chrono::NaiveDateTime;
use coldstore::{ColdStore, QueryService, QueryState, TimeRangeQuery};
use eyre::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::RetrievalConfig;

/// Format of `--start` and `--end`
pub const RANGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Archive column the time range applies to
const TIMESTAMP_COLUMN: &str = "record_timestamp";

/// Outcome of one retrieval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalReport {
    pub query_id: String,
    pub rows: usize,
    pub output: PathBuf,
}

/// Parse both bounds and require `end` to be after `start`
pub fn parse_range(start: &str, end: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let parse = |raw: &str, name: &str| {
        NaiveDateTime::parse_from_str(raw.trim(), RANGE_FORMAT)
            .context(format!("Invalid {} {:?}, expected YYYY-MM-DD HH:MM:SS", name, raw))
    };
    let start = parse(start, "start")?;
    let end = parse(end, "end")?;
    if end <= start {
        return Err(eyre::eyre!("End {} must be after start {}", end, start));
    }
    Ok((start, end))
}

/// Query the archive for `start < record_timestamp < end` and download the result
pub async fn retrieve_archive(
    service: &dyn QueryService,
    cold: &ColdStore,
    archive_bucket: &str,
    config: &RetrievalConfig,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<RetrievalReport> {
    debug!(%start, %end, archive_bucket, "retrieve_archive: called");
    let id = service
        .start_query(TimeRangeQuery {
            source_bucket: archive_bucket.to_string(),
            column: TIMESTAMP_COLUMN.to_string(),
            start,
            end,
        })
        .await
        .context("Failed to start archive query")?;

    let interval = Duration::from_millis(config.poll_interval_ms);
    let mut rows = None;
    for attempt in 0..config.max_polls {
        match service.query_state(&id).await? {
            QueryState::Succeeded { rows: count } => {
                rows = Some(count);
                break;
            }
            QueryState::Failed { reason } => {
                return Err(eyre::eyre!("Query {} failed: {}", id, reason));
            }
            state => {
                debug!(%id, %state, attempt, "retrieve_archive: waiting");
                tokio::time::sleep(interval).await;
            }
        }
    }
    let rows = rows.ok_or_else(|| eyre::eyre!("Query {} still running after {} polls", id, config.max_polls))?;

    let (bucket, key) = service.result_location(&id);
    cold.download_file(&bucket, &key, &config.output_path)
        .context("Failed to download query result")?;
    info!(%id, rows, output = %config.output_path.display(), "Retrieved archived data");

    Ok(RetrievalReport {
        query_id: id.to_string(),
        rows,
        output: config.output_path.clone(),
    })
}
