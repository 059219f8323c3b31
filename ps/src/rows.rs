//! Row types exchanged with the store

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Botanist reference row, keyed by (name, email, phone)
#[derive(Debug, Clone, PartialEq)]
pub struct BotanistRow {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Location reference rows: one continent, country and city per entry
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub continent: String,
    pub country: String,
    pub capital: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Plant type reference row, keyed by name
#[derive(Debug, Clone, PartialEq)]
pub struct PlantTypeRow {
    pub name: String,
    pub scientific_name: Option<String>,
    pub image_url: Option<String>,
}

/// Plant row; foreign keys are resolved through the referenced natural keys
#[derive(Debug, Clone, PartialEq)]
pub struct PlantRow {
    pub plant_number: u32,
    pub plant_type_name: String,
    pub botanist: BotanistRow,
    pub city_name: String,
    pub last_watered: NaiveDateTime,
}

/// A single sensor reading for a plant
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingRow {
    pub plant_number: u32,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub taken: NaiveDateTime,
}

/// Everything one pipeline run writes, grouped per table
#[derive(Debug, Clone, Default)]
pub struct PlantBatch {
    pub botanists: Vec<BotanistRow>,
    pub locations: Vec<LocationRow>,
    pub plant_types: Vec<PlantTypeRow>,
    pub plants: Vec<PlantRow>,
    pub recordings: Vec<RecordingRow>,
}

impl PlantBatch {
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty() && self.recordings.is_empty()
    }
}

/// Rows changed per table by one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub continents: usize,
    pub countries: usize,
    pub cities: usize,
    pub botanists: usize,
    pub plant_types: usize,
    pub plants: usize,
    pub recordings: usize,
}

/// One denormalized `record` row as written to cold storage.
///
/// Field order is the CSV column order of the archive files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedRow {
    pub plant_number: u32,
    #[serde(with = "timestamp")]
    pub plant_last_watered: NaiveDateTime,
    pub record_soil_moisture: f64,
    pub record_temperature: f64,
    #[serde(with = "timestamp")]
    pub record_timestamp: NaiveDateTime,
    pub plant_type_name: String,
    pub plant_type_scientific_name: Option<String>,
    pub plant_type_image_url: Option<String>,
    pub botanist_name: String,
    pub botanist_email: String,
    pub botanist_phone: String,
    pub city_name: String,
    pub city_latitude: f64,
    pub city_longitude: f64,
    pub country_name: String,
    pub country_capital: String,
    pub continent_name: String,
}

/// A record older than the archival window, with its primary key
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiredRecord {
    pub record_id: i64,
    pub row: ArchivedRow,
}

/// Joined reading used by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRow {
    pub plant_number: u32,
    pub plant_type: String,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub timestamp: NaiveDateTime,
    pub last_watered: NaiveDateTime,
    pub botanist: String,
    pub continent: String,
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch() {
        assert!(PlantBatch::default().is_empty());
    }
}
