//! Recording entity

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use super::ValidationError;
use super::fields::{past_timestamp, require, round2};

pub const MIN_SOIL_MOISTURE: f64 = 0.0;
pub const MAX_SOIL_MOISTURE: f64 = 100.0;

/// Format of `recording_taken`, e.g. `2025-04-01 14:12:18`
pub const RECORDING_TAKEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One sensor reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    soil_moisture: f64,
    temperature: f64,
    taken: NaiveDateTime,
}

impl Recording {
    /// Build from the top-level reading fields of a payload
    pub fn from_payload(payload: &Value, now: NaiveDateTime) -> Result<Self, ValidationError> {
        Ok(Self {
            soil_moisture: clean_soil_moisture(require(payload, "soil_moisture")?)?,
            temperature: round2(measurement(require(payload, "temperature")?, "temperature")?),
            taken: past_timestamp(
                require(payload, "recording_taken")?,
                "recording_taken",
                RECORDING_TAKEN_FORMAT,
                now,
            )?,
        })
    }

    pub fn soil_moisture(&self) -> f64 {
        self.soil_moisture
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn taken(&self) -> NaiveDateTime {
        self.taken
    }
}

fn measurement(value: &Value, field: &'static str) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or(ValidationError::WrongType {
            field,
            expected: "a number",
        })
}

fn clean_soil_moisture(value: &Value) -> Result<f64, ValidationError> {
    let moisture = measurement(value, "soil_moisture")?;
    if !(MIN_SOIL_MOISTURE..=MAX_SOIL_MOISTURE).contains(&moisture) {
        return Err(ValidationError::invalid(
            "soil_moisture",
            format!("{} is outside [{}, {}]", moisture, MIN_SOIL_MOISTURE, MAX_SOIL_MOISTURE),
        ));
    }
    Ok(round2(moisture))
}
