//! Configuration for coldstore

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding one subdirectory per bucket
    pub store_path: PathBuf,

    /// Bucket the archive pipeline writes to
    pub archive_bucket: String,

    /// Bucket query results are written to
    pub results_bucket: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: crate::default_store_path(),
            archive_bucket: crate::DEFAULT_ARCHIVE_BUCKET.to_string(),
            results_bucket: crate::DEFAULT_RESULTS_BUCKET.to_string(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        let default_paths = [
            Some(PathBuf::from("coldstore.yml")),
            dirs::config_dir().map(|p| p.join("coldstore").join("config.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
