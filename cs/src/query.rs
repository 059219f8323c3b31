//! Time-range queries over archived CSV objects
//!
//! A query is started asynchronously and identified by a [`QueryId`].
//! Callers poll [`QueryService::query_state`] until the query reaches a
//! terminal state, then fetch `{query_id}.csv` from the results bucket.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use eyre::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::TIMESTAMP_FORMAT;
use crate::store::ColdStore;

/// Opaque identifier of a started query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryId(String);

impl QueryId {
    fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle of a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueryState {
    Queued,
    Running,
    Succeeded { rows: usize },
    Failed { reason: String },
}

impl QueryState {
    /// True once the query will no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "QUEUED"),
            Self::Running => write!(f, "RUNNING"),
            Self::Succeeded { rows } => write!(f, "SUCCEEDED ({} rows)", rows),
            Self::Failed { reason } => write!(f, "FAILED: {}", reason),
        }
    }
}

/// Select rows whose `column` timestamp lies strictly between `start` and `end`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRangeQuery {
    pub source_bucket: String,
    pub column: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Asynchronous query engine over cold storage
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Start a query; the result lands in the results bucket when it succeeds
    async fn start_query(&self, query: TimeRangeQuery) -> Result<QueryId>;

    /// Current state of a started query
    async fn query_state(&self, id: &QueryId) -> Result<QueryState>;

    /// Bucket and key of the result object for a query
    fn result_location(&self, id: &QueryId) -> (String, String);
}

/// Query service that scans the store's CSV objects on a blocking thread
#[derive(Clone)]
pub struct LocalQueryService {
    store: ColdStore,
    output_bucket: String,
    states: Arc<RwLock<HashMap<QueryId, QueryState>>>,
}

impl LocalQueryService {
    pub fn new(store: ColdStore, output_bucket: impl Into<String>) -> Self {
        Self {
            store,
            output_bucket: output_bucket.into(),
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn set_state(states: &RwLock<HashMap<QueryId, QueryState>>, id: &QueryId, state: QueryState) {
        debug!(%id, %state, "set_state: called");
        states.write().await.insert(id.clone(), state);
    }
}

#[async_trait]
impl QueryService for LocalQueryService {
    async fn start_query(&self, query: TimeRangeQuery) -> Result<QueryId> {
        if query.end <= query.start {
            return Err(eyre::eyre!(
                "Query end {} must be after start {}",
                query.end.format(TIMESTAMP_FORMAT),
                query.start.format(TIMESTAMP_FORMAT)
            ));
        }

        let id = QueryId::generate();
        Self::set_state(&self.states, &id, QueryState::Queued).await;
        info!(%id, bucket = %query.source_bucket, "Started query");

        let store = self.store.clone();
        let output_bucket = self.output_bucket.clone();
        let states = self.states.clone();
        let task_id = id.clone();
        tokio::spawn(async move {
            Self::set_state(&states, &task_id, QueryState::Running).await;
            let key = result_key(&task_id);
            let outcome =
                tokio::task::spawn_blocking(move || run_time_range(&store, &query, &output_bucket, &key)).await;
            let state = match outcome {
                Ok(Ok(rows)) => QueryState::Succeeded { rows },
                Ok(Err(e)) => QueryState::Failed { reason: format!("{:#}", e) },
                Err(e) => QueryState::Failed { reason: e.to_string() },
            };
            if let QueryState::Failed { reason } = &state {
                warn!(id = %task_id, %reason, "Query failed");
            }
            Self::set_state(&states, &task_id, state).await;
        });

        Ok(id)
    }

    async fn query_state(&self, id: &QueryId) -> Result<QueryState> {
        self.states
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| eyre::eyre!("Unknown query: {}", id))
    }

    fn result_location(&self, id: &QueryId) -> (String, String) {
        (self.output_bucket.clone(), result_key(id))
    }
}

fn result_key(id: &QueryId) -> String {
    format!("{}.csv", id)
}

/// Scan every CSV object in the source bucket and write matching rows to `output_bucket/key`.
///
/// The header of the first non-empty object is used for the result; objects whose header differs are skipped.
fn run_time_range(store: &ColdStore, query: &TimeRangeQuery, output_bucket: &str, key: &str) -> Result<usize> {
    let objects = store.list(&query.source_bucket, None)?;
    debug!(count = objects.len(), "run_time_range: scanning objects");

    let mut header: Option<csv::StringRecord> = None;
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut rows = 0;

    for object in objects.iter().filter(|o| o.key.ends_with(".csv")) {
        let body = store.get_object(&query.source_bucket, &object.key)?;
        let mut reader = csv::Reader::from_reader(body.as_slice());
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            debug!(key = %object.key, "run_time_range: skipping empty object");
            continue;
        }

        match &header {
            None => {
                writer.write_record(&headers)?;
                header = Some(headers.clone());
            }
            Some(expected) if *expected != headers => {
                warn!(key = %object.key, "Skipping object with a different header");
                continue;
            }
            Some(_) => {}
        }

        let column = headers
            .iter()
            .position(|h| h == query.column)
            .ok_or_else(|| eyre::eyre!("Column {} not found in {}", query.column, object.key))?;

        for record in reader.records() {
            let record = record.context(format!("Malformed row in {}", object.key))?;
            let Some(raw) = record.get(column) else {
                continue;
            };
            let taken = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
                .context(format!("Bad timestamp {:?} in {}", raw, object.key))?;
            if query.start < taken && taken < query.end {
                writer.write_record(&record)?;
                rows += 1;
            }
        }
    }

    let body = writer.into_inner().map_err(|e| eyre::eyre!("Failed to flush CSV: {}", e))?;
    store.put_object(output_bucket, key, &body)?;
    info!(rows, key, "Query finished");
    Ok(rows)
}
