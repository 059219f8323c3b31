//! PlantMonitor CLI entry point

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use coldstore::{ColdStore, LocalQueryService};
use plantmonitor::cli::{Cli, Command, DashboardView, OutputFormat};
use plantmonitor::config::Config;
use plantmonitor::dashboard::{DataManager, view};
use plantmonitor::{HttpReadingSource, parse_range, retrieve_archive, run_archive, run_pipeline};
use plantstore::Store;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = plantmonitor::cli::get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn print_report<T: Serialize>(report: &T, format: OutputFormat, text: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => println!("{}", text(report)),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::InitDb => cmd_init_db(&config),
        Command::Pipeline { format } => cmd_pipeline(&config, format).await,
        Command::Archive { format } => cmd_archive(&config, format),
        Command::Retrieve { start, end, output } => cmd_retrieve(&config, &start, &end, output).await,
        Command::Dashboard { view: selected, format } => cmd_dashboard(&config, selected, format),
    }
}

fn cmd_init_db(config: &Config) -> Result<()> {
    debug!(db_path = %config.storage.db_path.display(), "cmd_init_db: called");
    Store::open(&config.storage.db_path).context("Failed to open store")?;
    println!("{} Store ready at {}", "✓".green(), config.storage.db_path.display());
    Ok(())
}

async fn cmd_pipeline(config: &Config, format: OutputFormat) -> Result<()> {
    let source = HttpReadingSource::new(&config.api)?;
    let now = Utc::now().naive_utc();
    let report = run_pipeline(config, &source, now).await?;

    print_report(&report, format, |r| match &r.stats {
        Some(stats) => format!(
            "{} Loaded {} of {} plants ({} new recordings)",
            "✓".green(),
            r.accepted,
            r.fetched,
            stats.recordings
        ),
        None => format!("{} No valid plants in {} payloads", "!".yellow(), r.fetched),
    })
}

fn cmd_archive(config: &Config, format: OutputFormat) -> Result<()> {
    let mut store = Store::open(&config.storage.db_path).context("Failed to open store")?;
    let cold = ColdStore::open(&config.archive.cold_store_path)?;
    let report = run_archive(&mut store, &cold, &config.archive, Utc::now())?;

    print_report(&report, format, |r| match &r.key {
        Some(key) => format!(
            "{} Archived {} rows to {}/{} ({} deleted)",
            "✓".green(),
            r.archived,
            config.archive.bucket,
            key.cyan(),
            r.deleted
        ),
        None => format!("No {} hour old data", config.archive.window_hours),
    })
}

async fn cmd_retrieve(config: &Config, start: &str, end: &str, output: Option<PathBuf>) -> Result<()> {
    let (start, end) = parse_range(start, end)?;

    let mut retrieval = config.retrieval.clone();
    if let Some(output) = output {
        retrieval.output_path = output;
    }

    let cold = ColdStore::open(&config.archive.cold_store_path)?;
    let service = LocalQueryService::new(cold.clone(), retrieval.results_bucket.clone());
    let report = retrieve_archive(&service, &cold, &config.archive.bucket, &retrieval, start, end).await?;

    println!(
        "{} Retrieved {} rows into {}",
        "✓".green(),
        report.rows,
        report.output.display().to_string().cyan()
    );
    Ok(())
}

fn cmd_dashboard(config: &Config, selected: DashboardView, format: OutputFormat) -> Result<()> {
    let store = Store::open(&config.storage.db_path).context("Failed to open store")?;
    let dm = DataManager::new(store.readings()?, &config.dashboard);
    let now = Utc::now().naive_utc();

    let rendered = match selected {
        DashboardView::Plants => view::render_list("Plants", &dm.plant_options(), format)?,
        DashboardView::Botanists => view::render_list("Botanists", &dm.botanists(), format)?,
        DashboardView::Recordings { plant, metric, hours } => {
            let plant_number = DataManager::parse_plant_option(&plant)
                .ok_or_else(|| eyre::eyre!("Invalid plant {:?}, expected a number or \"number - type\"", plant))?;
            let hours = hours.unwrap_or(config.dashboard.default_hours);
            let points = dm.recordings(plant_number, metric, hours, now);
            view::render_recordings(&plant, metric, hours, &points, format)?
        }
        DashboardView::LastWatered { botanist } => {
            let rows = dm.last_watered(&botanist, now);
            view::render_last_watered(&botanist, &rows, format)?
        }
        DashboardView::Alerts => view::render_alerts(&dm.alerts(), format)?,
    };

    print!("{}", rendered);
    Ok(())
}
