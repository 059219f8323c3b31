//! Moving expired readings from the short-term store to cold storage

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use coldstore::ColdStore;
use eyre::{Context, Result};
use plantstore::{ArchivedRow, Store};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::ArchiveConfig;

/// Outcome of one archive run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveReport {
    /// Rows written to the archive file
    pub archived: usize,
    /// Object key the file was uploaded under
    pub key: Option<String>,
    /// Rows removed from the short-term store
    pub deleted: usize,
}

/// `YYYY/MM/DD/HH.csv` for the day before `now`, on the wall clock of `tz`
pub fn archive_key(now: DateTime<Utc>, tz: Tz) -> String {
    (now.with_timezone(&tz).naive_local() - Duration::days(1))
        .format("%Y/%m/%d/%H.csv")
        .to_string()
}

/// Local time in `tz` before which a reading counts as expired
pub fn archive_cutoff(now: DateTime<Utc>, tz: Tz, window_hours: i64) -> NaiveDateTime {
    now.with_timezone(&tz).naive_local() - Duration::hours(window_hours)
}

/// Archive every record older than the window, then delete it from the store.
///
/// Rows already archived under the same hour key are kept: the existing
/// object is read back and rewritten with the new rows appended.
pub fn run_archive(
    store: &mut Store,
    cold: &ColdStore,
    config: &ArchiveConfig,
    now: DateTime<Utc>,
) -> Result<ArchiveReport> {
    let cutoff = archive_cutoff(now, config.timezone, config.window_hours);
    debug!(%cutoff, tz = %config.timezone, "run_archive: called");

    let expired = store.find_expired(cutoff).context("Failed to read expired records")?;
    if expired.is_empty() {
        info!("No {} hour old data", config.window_hours);
        return Ok(ArchiveReport {
            archived: 0,
            key: None,
            deleted: 0,
        });
    }

    let (ids, rows): (Vec<i64>, Vec<ArchivedRow>) = expired.into_iter().map(|r| (r.record_id, r.row)).unzip();
    let archived = rows.len();

    let key = archive_key(now, config.timezone);
    let mut contents = Vec::new();
    if cold.exists(&config.bucket, &key)? {
        let body = cold.get_object(&config.bucket, &key)?;
        contents = read_archive_csv(&body).context(format!("Failed to read existing archive {}", key))?;
        info!(%key, existing = contents.len(), "Appending to existing archive object");
    }
    contents.extend(rows);

    write_archive_csv(&config.staging_csv, &contents)?;
    cold.upload_file(&config.staging_csv, &config.bucket, &key)
        .context("Failed to upload archive")?;

    let deleted = store.delete_records(&ids).context("Failed to delete archived records")?;
    info!(archived, deleted, %key, "Archived expired records");

    Ok(ArchiveReport {
        archived,
        key: Some(key),
        deleted,
    })
}

/// Write rows with a header line to `path`
pub fn write_archive_csv(path: &Path, rows: &[ArchivedRow]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path).context(format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    debug!(rows = rows.len(), path = %path.display(), "write_archive_csv: written");
    Ok(())
}

/// Parse an archive object back into rows
pub fn read_archive_csv(body: &[u8]) -> Result<Vec<ArchivedRow>> {
    let mut reader = csv::Reader::from_reader(body);
    let rows = reader.deserialize().collect::<std::result::Result<Vec<ArchivedRow>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::London;
    use plantstore::{BotanistRow, LocationRow, PlantBatch, PlantRow, PlantTypeRow, RecordingRow};
    use tempfile::TempDir;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn batch(readings: &[&str]) -> PlantBatch {
        let botanist = BotanistRow {
            name: "Gertrude Jekyll".to_string(),
            email: "gertrude.jekyll@lnhm.co.uk".to_string(),
            phone: "001-481-273-3691x127".to_string(),
        };
        PlantBatch {
            botanists: vec![botanist.clone()],
            locations: vec![LocationRow {
                continent: "Europe".to_string(),
                country: "United Kingdom of Great Britain and Northern Ireland".to_string(),
                capital: "London".to_string(),
                city: "Bromley".to_string(),
                latitude: 51.40,
                longitude: 0.01,
            }],
            plant_types: vec![PlantTypeRow {
                name: "Venus flytrap".to_string(),
                scientific_name: None,
                image_url: None,
            }],
            plants: vec![PlantRow {
                plant_number: 7,
                plant_type_name: "Venus flytrap".to_string(),
                botanist,
                city_name: "Bromley".to_string(),
                last_watered: ts("2024-12-31 13:54:32"),
            }],
            recordings: readings
                .iter()
                .map(|taken| RecordingRow {
                    plant_number: 7,
                    soil_moisture: 31.5,
                    temperature: 12.03,
                    taken: ts(taken),
                })
                .collect(),
        }
    }

    fn archive_config(temp: &TempDir) -> ArchiveConfig {
        ArchiveConfig {
            window_hours: 24,
            cold_store_path: temp.path().join("cold"),
            bucket: "archive".to_string(),
            staging_csv: temp.path().join("archived_data.csv"),
            timezone: London,
        }
    }

    #[test]
    fn test_archive_key_is_previous_day() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 9, 15, 0).unwrap();
        assert_eq!(archive_key(now, London), "2025/01/01/09.csv");

        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 5, 0).unwrap();
        assert_eq!(archive_key(now, London), "2025/02/28/00.csv");
    }

    #[test]
    fn test_archive_key_and_cutoff_follow_summer_time() {
        // 08:30 UTC is 09:30 in London during BST
        let now = Utc.with_ymd_and_hms(2025, 7, 2, 8, 30, 0).unwrap();
        assert_eq!(archive_key(now, London), "2025/07/01/09.csv");
        assert_eq!(archive_cutoff(now, London, 24), ts("2025-07-01 09:30:00"));

        assert_eq!(archive_key(now, chrono_tz::UTC), "2025/07/01/08.csv");
        assert_eq!(archive_cutoff(now, chrono_tz::UTC, 24), ts("2025-07-01 08:30:00"));
    }

    #[test]
    fn test_second_run_in_same_hour_keeps_earlier_rows() {
        let temp = TempDir::new().unwrap();
        let config = archive_config(&temp);
        let cold = ColdStore::open(&config.cold_store_path).unwrap();
        let mut store = Store::open_in_memory().unwrap();
        store
            .upsert_batch(&batch(&["2025-01-01 09:00:00", "2025-01-01 09:30:00"]))
            .unwrap();

        let first_now = Utc.with_ymd_and_hms(2025, 1, 2, 9, 10, 0).unwrap();
        let first = run_archive(&mut store, &cold, &config, first_now).unwrap();
        assert_eq!(first.archived, 1);
        assert_eq!(first.key.as_deref(), Some("2025/01/01/09.csv"));

        let second_now = Utc.with_ymd_and_hms(2025, 1, 2, 9, 40, 0).unwrap();
        let second = run_archive(&mut store, &cold, &config, second_now).unwrap();
        assert_eq!(second.archived, 1);
        assert_eq!(second.deleted, 1);
        assert_eq!(second.key, first.key);
        assert_eq!(store.record_count().unwrap(), 0);

        let rows = read_archive_csv(&cold.get_object("archive", "2025/01/01/09.csv").unwrap()).unwrap();
        let taken: Vec<_> = rows.iter().map(|r| r.record_timestamp).collect();
        assert_eq!(taken, vec![ts("2025-01-01 09:00:00"), ts("2025-01-01 09:30:00")]);
    }

    #[test]
    fn test_csv_has_header_and_no_record_id() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("staging").join("archived_data.csv");
        let ts = ts("2025-04-01 09:00:00");
        let row = ArchivedRow {
            plant_number: 7,
            plant_last_watered: ts,
            record_soil_moisture: 31.5,
            record_temperature: 12.03,
            record_timestamp: ts,
            plant_type_name: "Venus flytrap".to_string(),
            plant_type_scientific_name: None,
            plant_type_image_url: None,
            botanist_name: "Gertrude Jekyll".to_string(),
            botanist_email: "gertrude.jekyll@lnhm.co.uk".to_string(),
            botanist_phone: "001-481-273-3691x127".to_string(),
            city_name: "South Whittier".to_string(),
            city_latitude: 33.95015,
            city_longitude: -118.03917,
            country_name: "United States of America".to_string(),
            country_capital: "Los_Angeles".to_string(),
            continent_name: "America".to_string(),
        };

        write_archive_csv(&path, &[row]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("plant_number,plant_last_watered,record_soil_moisture"));
        assert!(!header.contains("record_id"));
        assert_eq!(
            lines.next().unwrap(),
            "7,2025-04-01 09:00:00,31.5,12.03,2025-04-01 09:00:00,Venus flytrap,,,Gertrude Jekyll,\
             gertrude.jekyll@lnhm.co.uk,001-481-273-3691x127,South Whittier,33.95015,-118.03917,\
             United States of America,Los_Angeles,America"
        );
    }
}
