//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::dashboard::{MAX_HOURS, Metric};

/// PlantMonitor - plant sensor ETL and dashboard
#[derive(Parser)]
#[command(
    name = "pm",
    about = "Extract plant readings, archive them and inspect the results",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the short-term store schema
    InitDb,

    /// Fetch readings from the API, validate them and load the store
    Pipeline {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Move readings older than the archive window to cold storage
    Archive {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Download archived readings taken between two times
    Retrieve {
        /// Start of the range, exclusive (YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        start: String,

        /// End of the range, exclusive (YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        end: String,

        /// Where to write the CSV (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect recent readings
    Dashboard {
        #[command(subcommand)]
        view: DashboardView,

        /// Output format
        #[arg(short, long, default_value = "text", global = true)]
        format: OutputFormat,
    },
}

/// Dashboard views
#[derive(Debug, Subcommand)]
pub enum DashboardView {
    /// List plants as "number - type"
    Plants,

    /// List botanists
    Botanists,

    /// Recent readings of one plant
    Recordings {
        /// Plant number, or a "number - type" option
        #[arg(short, long)]
        plant: String,

        /// temperature or soil-moisture
        #[arg(short, long, default_value = "temperature")]
        metric: Metric,

        /// Time frame in hours (default: from config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_HOURS as i64))]
        hours: Option<u32>,
    },

    /// When each plant of a botanist was last watered
    LastWatered {
        /// Botanist name
        #[arg(short, long)]
        botanist: String,
    },

    /// Latest reading per plant with watering and temperature alerts
    Alerts,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" | "table" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

/// Path of the log file written by `pm`
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plantmonitor")
        .join("logs")
        .join("plantmonitor.log")
}
