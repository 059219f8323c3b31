use std::time::Duration;

use chrono::NaiveDateTime;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use coldstore::cli::{Cli, Command};
use coldstore::config::Config;
use coldstore::{ColdStore, LocalQueryService, QueryService, QueryState, TIMESTAMP_FORMAT, TimeRangeQuery};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .context(format!("Invalid timestamp {:?}, expected YYYY-MM-DD HH:MM:SS", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(store_path) = cli.store {
        config.store_path = store_path;
    }

    info!("coldstore starting");
    let store = ColdStore::open(&config.store_path)?;

    match cli.command {
        Command::List { bucket, prefix } => {
            let bucket = bucket.unwrap_or(config.archive_bucket);
            let objects = store.list(&bucket, prefix.as_deref())?;
            if objects.is_empty() {
                println!("No objects found");
            } else {
                for object in objects {
                    println!("{:<40} {:>10}", object.key, object.size.to_string().dimmed());
                }
            }
        }
        Command::Put { file, key, bucket } => {
            let bucket = bucket.unwrap_or(config.archive_bucket);
            store.upload_file(&file, &bucket, &key)?;
            println!("{} Uploaded {}/{}", "✓".green(), bucket, key.cyan());
        }
        Command::Get { key, dest, bucket } => {
            let bucket = bucket.unwrap_or(config.archive_bucket);
            store.download_file(&bucket, &key, &dest)?;
            println!("{} Downloaded {}/{} to {}", "✓".green(), bucket, key, dest.display());
        }
        Command::Delete { key, bucket } => {
            let bucket = bucket.unwrap_or(config.archive_bucket);
            store.delete(&bucket, &key)?;
            println!("{} Deleted {}/{}", "✓".green(), bucket, key);
        }
        Command::Query { start, end, column } => {
            let service = LocalQueryService::new(store, config.results_bucket);
            let id = service
                .start_query(TimeRangeQuery {
                    source_bucket: config.archive_bucket,
                    column,
                    start: parse_timestamp(&start)?,
                    end: parse_timestamp(&end)?,
                })
                .await?;

            let state = loop {
                let state = service.query_state(&id).await?;
                if state.is_terminal() {
                    break state;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            };

            match state {
                QueryState::Succeeded { rows } => {
                    let (bucket, key) = service.result_location(&id);
                    println!(
                        "{} Query {} matched {} rows: {}/{}",
                        "✓".green(),
                        id.to_string().cyan(),
                        rows,
                        bucket,
                        key
                    );
                }
                other => {
                    println!("{} Query {} {}", "✗".red(), id, other);
                    return Err(eyre::eyre!("Query did not succeed"));
                }
            }
        }
    }

    Ok(())
}
