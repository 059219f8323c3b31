//! PlantMonitor configuration types and loading

use chrono_tz::Tz;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main PlantMonitor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reading API configuration
    pub api: ApiConfig,

    /// Short-term store configuration
    pub storage: StorageConfig,

    /// Archive pipeline configuration
    pub archive: ArchiveConfig,

    /// Archive retrieval configuration
    pub retrieval: RetrievalConfig,

    /// Dashboard heuristics
    pub dashboard: DashboardConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .plantmonitor.yml
        let local_config = PathBuf::from(".plantmonitor.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/plantmonitor/plantmonitor.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("plantmonitor").join("plantmonitor.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plantmonitor")
}

/// Reading API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Endpoint prefix; the plant id is appended
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// First plant id to request
    #[serde(rename = "min-plant-id")]
    pub min_plant_id: u32,

    /// Last plant id to request (inclusive)
    #[serde(rename = "max-plant-id")]
    pub max_plant_id: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Concurrent requests; defaults to the number of CPU cores
    pub workers: Option<usize>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/plants/".to_string(),
            min_plant_id: 1,
            max_plant_id: 55,
            timeout_secs: 4,
            workers: None,
        }
    }
}

impl ApiConfig {
    /// Worker count, falling back to available parallelism
    pub fn worker_count(&self) -> usize {
        self.workers
            .filter(|w| *w > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    }
}

/// Short-term store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(rename = "db-path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: data_dir().join("plants.sqlite"),
        }
    }
}

/// Archive pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Records older than this many hours are archived
    #[serde(rename = "window-hours")]
    pub window_hours: i64,

    /// Cold store root directory
    #[serde(rename = "cold-store-path")]
    pub cold_store_path: PathBuf,

    /// Bucket archived CSV files are uploaded to
    pub bucket: String,

    /// Local CSV file written before upload
    #[serde(rename = "staging-csv")]
    pub staging_csv: PathBuf,

    /// Zone the cutoff and bucket keys are computed in
    pub timezone: Tz,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            cold_store_path: coldstore::default_store_path(),
            bucket: coldstore::DEFAULT_ARCHIVE_BUCKET.to_string(),
            staging_csv: data_dir().join("archived_data.csv"),
            timezone: chrono_tz::Europe::London,
        }
    }
}

/// Archive retrieval configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Bucket query results are written to
    #[serde(rename = "results-bucket")]
    pub results_bucket: String,

    /// Delay between status polls in milliseconds
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Polls before giving up
    #[serde(rename = "max-polls")]
    pub max_polls: u32,

    /// Where the result CSV is downloaded to
    #[serde(rename = "output-path")]
    pub output_path: PathBuf,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            results_bucket: coldstore::DEFAULT_RESULTS_BUCKET.to_string(),
            poll_interval_ms: 500,
            max_polls: 120,
            output_path: PathBuf::from("requested_data.csv"),
        }
    }
}

/// Dashboard heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Soil moisture below this needs watering
    #[serde(rename = "watering-threshold")]
    pub watering_threshold: f64,

    /// Modified z-score above which a reading is an outlier
    #[serde(rename = "mad-threshold")]
    pub mad_threshold: f64,

    /// Lower percentile for extreme values; the upper one is 100 minus this
    #[serde(rename = "extreme-percentile")]
    pub extreme_percentile: f64,

    /// Default time frame for recording views, in hours
    #[serde(rename = "default-hours")]
    pub default_hours: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            watering_threshold: 30.0,
            mad_threshold: 3.5,
            extreme_percentile: 5.0,
            default_hours: 12,
        }
    }
}
