//! ColdStore - cold object storage for archived plant readings
//!
//! Objects live in named buckets and are addressed by slash-separated keys,
//! the way the archive pipeline lays them out by date:
//!
//! ```text
//! .coldstore/
//! ├── archive/
//! │   └── 2025/
//! │       └── 04/
//! │           └── 01/
//! │               └── 09.csv
//! └── query-results/
//!     └── {query_id}.csv
//! ```
//!
//! A [`QueryService`] runs time-range queries over the CSV objects of a
//! bucket and writes each result as `{query_id}.csv` in an output bucket.
//!
//! # Example
//!
//! ```ignore
//! use coldstore::ColdStore;
//!
//! let store = ColdStore::open(".coldstore")?;
//! store.upload_file("archived_data.csv", "archive", "2025/04/01/09.csv")?;
//! let keys = store.list("archive", Some("2025/04"))?;
//! ```

pub mod cli;
pub mod config;
mod query;
mod store;

pub use query::{LocalQueryService, QueryId, QueryService, QueryState, TimeRangeQuery};
pub use store::{ColdStore, ObjectMeta};

/// Default bucket for archived readings
pub const DEFAULT_ARCHIVE_BUCKET: &str = "archive";

/// Default bucket for query results
pub const DEFAULT_RESULTS_BUCKET: &str = "query-results";

/// Timestamp format of the time columns in archived CSV objects
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default on-disk location of the cold store
pub fn default_store_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("plantmonitor")
        .join("coldstore")
}
