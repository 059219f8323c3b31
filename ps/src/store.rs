//! Core Store implementation

use chrono::NaiveDateTime;
use rusqlite::{Connection, Row, Statement, Transaction, params, params_from_iter};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::queries::{
    BOTANIST_UPSERT, CITY_UPSERT, CONTINENT_UPSERT, COUNTRY_UPSERT, EXPIRED_QUERY, PLANT_TYPE_UPSERT, PLANT_UPSERT,
    READINGS_QUERY, RECORDING_INSERT, SCHEMA, delete_query,
};
use crate::{ArchivedRow, BatchStats, ExpiredRecord, PlantBatch, ReadingRow, StoreError};

/// The short-term relational store.
///
/// Owns a single SQLite connection; it is not shared across threads.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(?path, "Opened plant store");
        Self::init(conn)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Upsert a whole batch in one transaction.
    ///
    /// Tables are written in foreign-key order: continent, country, city,
    /// botanist, plant type, plant, recording. Nothing is committed unless
    /// every statement succeeds; on error the transaction is dropped and
    /// rolled back.
    pub fn upsert_batch(&mut self, batch: &PlantBatch) -> Result<BatchStats, StoreError> {
        debug!(
            plants = batch.plants.len(),
            recordings = batch.recordings.len(),
            "upsert_batch: called"
        );
        let tx = self.conn.transaction()?;
        let stats = BatchStats {
            continents: execute_many(&tx, CONTINENT_UPSERT, &batch.locations, |stmt, loc| {
                stmt.execute(params![loc.continent])
            })?,
            countries: execute_many(&tx, COUNTRY_UPSERT, &batch.locations, |stmt, loc| {
                stmt.execute(params![loc.country, loc.capital, loc.continent])
            })?,
            cities: execute_many(&tx, CITY_UPSERT, &batch.locations, |stmt, loc| {
                stmt.execute(params![loc.city, loc.latitude, loc.longitude, loc.country])
            })?,
            botanists: execute_many(&tx, BOTANIST_UPSERT, &batch.botanists, |stmt, b| {
                stmt.execute(params![b.name, b.email, b.phone])
            })?,
            plant_types: execute_many(&tx, PLANT_TYPE_UPSERT, &batch.plant_types, |stmt, pt| {
                stmt.execute(params![pt.name, pt.scientific_name, pt.image_url])
            })?,
            plants: execute_many(&tx, PLANT_UPSERT, &batch.plants, |stmt, p| {
                stmt.execute(params![
                    p.plant_number,
                    p.plant_type_name,
                    p.botanist.name,
                    p.botanist.email,
                    p.botanist.phone,
                    p.city_name,
                    p.last_watered,
                ])
            })?,
            recordings: execute_many(&tx, RECORDING_INSERT, &batch.recordings, |stmt, r| {
                stmt.execute(params![r.soil_moisture, r.temperature, r.taken, r.plant_number])
            })?,
        };
        tx.commit()?;
        info!(?stats, "Batch committed");
        Ok(stats)
    }

    /// Find every record taken before `cutoff`, joined with its reference data
    pub fn find_expired(&self, cutoff: NaiveDateTime) -> Result<Vec<ExpiredRecord>, StoreError> {
        debug!(%cutoff, "find_expired: called");
        let mut stmt = self.conn.prepare(EXPIRED_QUERY)?;
        let rows = stmt
            .query_map(params![cutoff], expired_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = rows.len(), %cutoff, "Found expired records");
        Ok(rows)
    }

    /// Delete records by id, returning the number of rows removed
    pub fn delete_records(&mut self, record_ids: &[i64]) -> Result<usize, StoreError> {
        debug!(count = record_ids.len(), "delete_records: called");
        let query = delete_query(record_ids.len())?;
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(&query, params_from_iter(record_ids.iter()))?;
        tx.commit()?;
        info!(deleted, "Deleted archived records");
        Ok(deleted)
    }

    /// All readings joined with plant, botanist and continent, ordered by plant then time
    pub fn readings(&self) -> Result<Vec<ReadingRow>, StoreError> {
        debug!("readings: called");
        let mut stmt = self.conn.prepare(READINGS_QUERY)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ReadingRow {
                    plant_number: row.get(0)?,
                    plant_type: row.get(1)?,
                    soil_moisture: row.get(2)?,
                    temperature: row.get(3)?,
                    timestamp: row.get(4)?,
                    last_watered: row.get(5)?,
                    botanist: row.get(6)?,
                    continent: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of rows in `record`
    pub fn record_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM record", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of rows in a reference table
    pub fn table_count(&self, table: Table) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Last watered time stored for a plant, if the plant exists
    pub fn plant_last_watered(&self, plant_number: u32) -> Result<Option<NaiveDateTime>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT plant_last_watered FROM plant WHERE plant_number = ?1")?;
        let mut rows = stmt.query(params![plant_number])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }
}

/// Store tables, for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Continent,
    Country,
    City,
    Botanist,
    PlantType,
    Plant,
    Record,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Self::Continent => "continent",
            Self::Country => "country",
            Self::City => "city",
            Self::Botanist => "botanist",
            Self::PlantType => "plant_type",
            Self::Plant => "plant",
            Self::Record => "record",
        }
    }
}

fn execute_many<T>(
    tx: &Transaction<'_>,
    sql: &str,
    rows: &[T],
    mut run: impl FnMut(&mut Statement<'_>, &T) -> rusqlite::Result<usize>,
) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(sql)?;
    let mut changed = 0;
    for row in rows {
        changed += run(&mut stmt, row)?;
    }
    Ok(changed)
}

fn expired_from_row(row: &Row<'_>) -> rusqlite::Result<ExpiredRecord> {
    Ok(ExpiredRecord {
        record_id: row.get(0)?,
        row: ArchivedRow {
            plant_number: row.get(1)?,
            plant_last_watered: row.get(2)?,
            record_soil_moisture: row.get(3)?,
            record_temperature: row.get(4)?,
            record_timestamp: row.get(5)?,
            plant_type_name: row.get(6)?,
            plant_type_scientific_name: row.get(7)?,
            plant_type_image_url: row.get(8)?,
            botanist_name: row.get(9)?,
            botanist_email: row.get(10)?,
            botanist_phone: row.get(11)?,
            city_name: row.get(12)?,
            city_latitude: row.get(13)?,
            city_longitude: row.get(14)?,
            country_name: row.get(15)?,
            country_capital: row.get(16)?,
            continent_name: row.get(17)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BotanistRow, LocationRow, PlantRow, PlantTypeRow, RecordingRow};
    use chrono::Duration;
    use tempfile::TempDir;

    fn ts(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, crate::TIMESTAMP_FORMAT).unwrap()
    }

    fn gertrude() -> BotanistRow {
        BotanistRow {
            name: "Gertrude Jekyll".to_string(),
            email: "gertrude.jekyll@lnhm.co.uk".to_string(),
            phone: "001-481-273-3691x127".to_string(),
        }
    }

    fn batch_for(plant_number: u32, taken: &str, last_watered: &str) -> PlantBatch {
        PlantBatch {
            botanists: vec![gertrude()],
            locations: vec![LocationRow {
                continent: "America".to_string(),
                country: "United States of America".to_string(),
                capital: "Los_Angeles".to_string(),
                city: "South Whittier".to_string(),
                latitude: 33.95015,
                longitude: -118.03917,
            }],
            plant_types: vec![PlantTypeRow {
                name: "Venus flytrap".to_string(),
                scientific_name: None,
                image_url: None,
            }],
            plants: vec![PlantRow {
                plant_number,
                plant_type_name: "Venus flytrap".to_string(),
                botanist: gertrude(),
                city_name: "South Whittier".to_string(),
                last_watered: ts(last_watered),
            }],
            recordings: vec![RecordingRow {
                plant_number,
                soil_moisture: 30.52,
                temperature: 12.03,
                taken: ts(taken),
            }],
        }
    }

    #[test]
    fn test_upsert_batch_writes_every_table() {
        let mut store = Store::open_in_memory().unwrap();
        let stats = store
            .upsert_batch(&batch_for(1, "2025-04-02 09:31:07", "2025-04-01 13:54:32"))
            .unwrap();

        assert_eq!(
            stats,
            BatchStats {
                continents: 1,
                countries: 1,
                cities: 1,
                botanists: 1,
                plant_types: 1,
                plants: 1,
                recordings: 1,
            }
        );
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_batch_is_idempotent() {
        let mut store = Store::open_in_memory().unwrap();
        let batch = batch_for(1, "2025-04-02 09:31:07", "2025-04-01 13:54:32");
        store.upsert_batch(&batch).unwrap();
        let stats = store.upsert_batch(&batch).unwrap();

        assert_eq!(stats.continents, 0);
        assert_eq!(stats.botanists, 0);
        assert_eq!(stats.recordings, 0);
        assert_eq!(store.table_count(Table::Botanist).unwrap(), 1);
        assert_eq!(store.table_count(Table::City).unwrap(), 1);
        assert_eq!(store.table_count(Table::Plant).unwrap(), 1);
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn test_plant_upsert_updates_last_watered() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .upsert_batch(&batch_for(1, "2025-04-02 09:31:07", "2025-04-01 13:54:32"))
            .unwrap();
        store
            .upsert_batch(&batch_for(1, "2025-04-02 10:31:07", "2025-04-02 08:00:00"))
            .unwrap();

        assert_eq!(
            store.plant_last_watered(1).unwrap(),
            Some(ts("2025-04-02 08:00:00"))
        );
        assert_eq!(store.table_count(Table::Plant).unwrap(), 1);
        assert_eq!(store.record_count().unwrap(), 2);
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        let mut batch = batch_for(1, "2025-04-02 09:31:07", "2025-04-01 13:54:32");
        // Plant type that was never inserted: plant_type_id resolves to NULL
        batch.plants[0].plant_type_name = "Unknown".to_string();

        assert!(store.upsert_batch(&batch).is_err());
        assert_eq!(store.table_count(Table::Continent).unwrap(), 0);
        assert_eq!(store.table_count(Table::Botanist).unwrap(), 0);
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn test_find_expired_respects_cutoff() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .upsert_batch(&batch_for(1, "2025-04-01 09:00:00", "2025-04-01 08:00:00"))
            .unwrap();
        store
            .upsert_batch(&batch_for(1, "2025-04-02 09:00:00", "2025-04-01 08:00:00"))
            .unwrap();

        let cutoff = ts("2025-04-02 09:00:00") - Duration::hours(24) + Duration::minutes(1);
        let expired = store.find_expired(cutoff).unwrap();

        assert_eq!(expired.len(), 1);
        let row = &expired[0].row;
        assert_eq!(row.record_timestamp, ts("2025-04-01 09:00:00"));
        assert_eq!(row.botanist_name, "Gertrude Jekyll");
        assert_eq!(row.country_name, "United States of America");
        assert_eq!(row.continent_name, "America");
    }

    #[test]
    fn test_delete_records() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .upsert_batch(&batch_for(1, "2025-04-01 09:00:00", "2025-04-01 08:00:00"))
            .unwrap();
        store
            .upsert_batch(&batch_for(1, "2025-04-01 10:00:00", "2025-04-01 08:00:00"))
            .unwrap();
        store
            .upsert_batch(&batch_for(1, "2025-04-02 10:00:00", "2025-04-01 08:00:00"))
            .unwrap();

        let expired = store.find_expired(ts("2025-04-02 00:00:00")).unwrap();
        let ids: Vec<i64> = expired.iter().map(|e| e.record_id).collect();
        assert_eq!(ids.len(), 2);

        assert_eq!(store.delete_records(&ids).unwrap(), 2);
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn test_delete_records_rejects_empty() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(matches!(store.delete_records(&[]), Err(StoreError::NoIds)));
    }

    #[test]
    fn test_readings_join() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .upsert_batch(&batch_for(3, "2025-04-02 09:31:07", "2025-04-01 13:54:32"))
            .unwrap();

        let readings = store.readings().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].plant_number, 3);
        assert_eq!(readings[0].plant_type, "Venus flytrap");
        assert_eq!(readings[0].botanist, "Gertrude Jekyll");
        assert_eq!(readings[0].continent, "America");
        assert_eq!(readings[0].timestamp, ts("2025-04-02 09:31:07"));
    }

    #[test]
    fn test_open_on_disk_creates_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("plants.sqlite");
        let mut store = Store::open(&path).unwrap();
        store
            .upsert_batch(&batch_for(1, "2025-04-02 09:31:07", "2025-04-01 13:54:32"))
            .unwrap();
        drop(store);

        let store = Store::open(&path).unwrap();
        assert_eq!(store.record_count().unwrap(), 1);
    }
}
