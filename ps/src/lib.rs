//! PlantStore - short-term relational storage for plant sensor readings
//!
//! Holds the most recent readings in SQLite, normalized into reference tables
//! (continent, country, city, botanist, plant type, plant) plus the `record`
//! fact table. Rows older than the archival window are extracted, shipped to
//! cold storage by the caller, then deleted here by id.
//!
//! # Schema
//!
//! ```text
//! continent <- country <- city <-+
//!                   botanist <---+- plant <- record
//!                 plant_type <---+
//! ```
//!
//! # Example
//!
//! ```ignore
//! use plantstore::{PlantBatch, Store};
//!
//! let mut store = Store::open("plants.sqlite")?;
//! let stats = store.upsert_batch(&batch)?;
//! let expired = store.find_expired(cutoff)?;
//! ```

mod error;
mod queries;
mod rows;
mod store;

pub use error::StoreError;
pub use queries::delete_query;
pub use rows::{
    ArchivedRow, BatchStats, BotanistRow, ExpiredRecord, LocationRow, PlantBatch, PlantRow, PlantTypeRow, ReadingRow,
    RecordingRow,
};
pub use store::{Store, Table};

/// Timestamp format used for every stored and exported timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
