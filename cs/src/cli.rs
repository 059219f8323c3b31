//! CLI argument parsing for coldstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cs")]
#[command(author, version, about = "Cold object storage for archived plant readings", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the store directory
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List objects in a bucket
    List {
        /// Bucket name (default: archive bucket)
        #[arg(short, long)]
        bucket: Option<String>,

        /// Only keys starting with this prefix, e.g. 2025/04
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Upload a local file as an object
    Put {
        /// Local file to upload
        #[arg(required = true)]
        file: PathBuf,

        /// Object key
        #[arg(required = true)]
        key: String,

        /// Bucket name (default: archive bucket)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Download an object to a local file
    Get {
        /// Object key
        #[arg(required = true)]
        key: String,

        /// Destination file
        #[arg(required = true)]
        dest: PathBuf,

        /// Bucket name (default: archive bucket)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Delete an object
    Delete {
        /// Object key
        #[arg(required = true)]
        key: String,

        /// Bucket name (default: archive bucket)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Run a time-range query over archived CSV objects and wait for the result
    Query {
        /// Start of the range, exclusive (YYYY-MM-DD HH:MM:SS)
        #[arg(required = true)]
        start: String,

        /// End of the range, exclusive (YYYY-MM-DD HH:MM:SS)
        #[arg(required = true)]
        end: String,

        /// Timestamp column to filter on
        #[arg(long, default_value = "record_timestamp")]
        column: String,
    },
}
