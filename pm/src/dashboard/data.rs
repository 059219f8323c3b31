//! Dashboard data manager over joined readings

use chrono::{Duration, NaiveDateTime};
use plantstore::ReadingRow;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::stats::{extremes, mad_outliers};
use crate::config::DashboardConfig;

/// Longest time frame a recording view covers, in hours
pub const MAX_HOURS: u32 = 24;

/// Which measurement a recording view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Temperature,
    SoilMoisture,
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "temperature" | "temp" => Ok(Self::Temperature),
            "soil_moisture" | "moisture" => Ok(Self::SoilMoisture),
            _ => Err(format!("Unknown metric: {}. Use: temperature or soil-moisture", s)),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "Temperature"),
            Self::SoilMoisture => write!(f, "Soil Moisture"),
        }
    }
}

/// A reading with its temperature flags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedReading {
    #[serde(flatten)]
    pub reading: ReadingRow,
    pub anomalous_temperature: bool,
    pub extreme_temperature: bool,
}

/// One point of a recording series; flags are only set for temperature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalous: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extreme: Option<bool>,
}

/// When a plant was last watered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WateringRow {
    pub plant_number: u32,
    pub last_watered: NaiveDateTime,
    pub hours_since: f64,
}

/// Latest state of a plant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRow {
    pub plant_number: u32,
    pub plant_type: String,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub needs_watering: bool,
    pub extreme_temperature: bool,
}

/// Holds every reading with temperature flags computed per plant
pub struct DataManager {
    readings: Vec<FlaggedReading>,
    watering_threshold: f64,
}

impl DataManager {
    pub fn new(readings: Vec<ReadingRow>, config: &DashboardConfig) -> Self {
        debug!(count = readings.len(), "DataManager::new: called");
        let mut by_plant: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (idx, reading) in readings.iter().enumerate() {
            by_plant.entry(reading.plant_number).or_default().push(idx);
        }

        let mut anomalous = vec![false; readings.len()];
        let mut extreme = vec![false; readings.len()];
        for indices in by_plant.values() {
            let temperatures: Vec<f64> = indices.iter().map(|i| readings[*i].temperature).collect();
            let outliers = mad_outliers(&temperatures, config.mad_threshold);
            let extremes = extremes(&temperatures, &outliers, config.extreme_percentile);
            for (pos, idx) in indices.iter().enumerate() {
                anomalous[*idx] = outliers[pos];
                extreme[*idx] = extremes[pos];
            }
        }

        let readings = readings
            .into_iter()
            .enumerate()
            .map(|(idx, reading)| FlaggedReading {
                reading,
                anomalous_temperature: anomalous[idx],
                extreme_temperature: extreme[idx],
            })
            .collect();

        Self {
            readings,
            watering_threshold: config.watering_threshold,
        }
    }

    pub fn readings(&self) -> &[FlaggedReading] {
        &self.readings
    }

    /// `"{plant_number} - {plant_type}"` for each distinct plant, in first-seen order
    pub fn plant_options(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.readings
            .iter()
            .map(|r| &r.reading)
            .filter(|r| seen.insert((r.plant_number, r.plant_type.clone())))
            .map(|r| format!("{} - {}", r.plant_number, r.plant_type))
            .collect()
    }

    /// Plant number from an option produced by [`plant_options`](Self::plant_options)
    pub fn parse_plant_option(option: &str) -> Option<u32> {
        option.split(" - ").next()?.trim().parse().ok()
    }

    /// Distinct botanist names, in first-seen order
    pub fn botanists(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.readings
            .iter()
            .filter(|r| seen.insert(r.reading.botanist.clone()))
            .map(|r| r.reading.botanist.clone())
            .collect()
    }

    /// Readings of one plant taken within the last `hours` (1 to 24), oldest first
    pub fn recordings(&self, plant_number: u32, metric: Metric, hours: u32, now: NaiveDateTime) -> Vec<SeriesPoint> {
        let since = now - Duration::hours(i64::from(hours.clamp(1, MAX_HOURS)));
        let mut points: Vec<SeriesPoint> = self
            .readings
            .iter()
            .filter(|r| r.reading.plant_number == plant_number && r.reading.timestamp > since)
            .map(|r| match metric {
                Metric::Temperature => SeriesPoint {
                    timestamp: r.reading.timestamp,
                    value: r.reading.temperature,
                    anomalous: Some(r.anomalous_temperature),
                    extreme: Some(r.extreme_temperature),
                },
                Metric::SoilMoisture => SeriesPoint {
                    timestamp: r.reading.timestamp,
                    value: r.reading.soil_moisture,
                    anomalous: None,
                    extreme: None,
                },
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);
        points
    }

    /// Last watering of each plant a botanist looks after
    pub fn last_watered(&self, botanist: &str, now: NaiveDateTime) -> Vec<WateringRow> {
        let mut seen = HashSet::new();
        let mut rows: Vec<WateringRow> = self
            .readings
            .iter()
            .map(|r| &r.reading)
            .filter(|r| r.botanist == botanist && seen.insert((r.plant_number, r.last_watered)))
            .map(|r| WateringRow {
                plant_number: r.plant_number,
                last_watered: r.last_watered,
                hours_since: hours_between(r.last_watered, now),
            })
            .collect();
        rows.sort_by_key(|r| (r.plant_number, r.last_watered));
        rows
    }

    /// Latest reading per plant with watering and temperature alerts
    pub fn alerts(&self) -> Vec<AlertRow> {
        let mut latest: BTreeMap<u32, &FlaggedReading> = BTreeMap::new();
        for flagged in &self.readings {
            let entry = latest.entry(flagged.reading.plant_number).or_insert(flagged);
            if flagged.reading.timestamp > entry.reading.timestamp {
                *entry = flagged;
            }
        }

        latest
            .into_values()
            .map(|f| AlertRow {
                plant_number: f.reading.plant_number,
                plant_type: f.reading.plant_type.clone(),
                soil_moisture: f.reading.soil_moisture,
                temperature: f.reading.temperature,
                needs_watering: f.reading.soil_moisture < self.watering_threshold,
                extreme_temperature: f.extreme_temperature,
            })
            .collect()
    }
}

/// Hours from `from` to `to`, rounded to two decimals
fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let hours = (to - from).num_seconds() as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}
