//! PlantMonitor - plant sensor ETL
//!
//! Pulls readings for each plant from the reading API, validates them into
//! entities, loads them into the short-term store, archives aged rows to cold
//! storage, and serves dashboard views over what remains.
//!
//! # Modules
//!
//! - [`domain`] - validated entities built from raw payloads
//! - [`extract`] - reading source trait and concurrent extraction
//! - [`transform`] - entity factory and row flattening
//! - [`pipeline`] - extract, transform, load
//! - [`archive`] - expired rows to cold storage
//! - [`retrieval`] - archived rows back from cold storage
//! - [`dashboard`] - anomaly flags and views
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod archive;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod extract;
pub mod pipeline;
pub mod retrieval;
pub mod transform;

pub use archive::{ArchiveReport, archive_cutoff, archive_key, read_archive_csv, run_archive};
pub use config::Config;
pub use domain::{Botanist, Location, Plant, PlantType, Recording, ValidationError};
pub use extract::{HttpReadingSource, ReadingSource, extract_readings};
pub use pipeline::{PipelineReport, run_pipeline};
pub use retrieval::{RetrievalReport, parse_range, retrieve_archive};
pub use transform::{PlantFactory, to_batch};
