//! Plant entity, composed from one API payload

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use super::fields::{past_timestamp, require};
use super::{Botanist, Location, PlantType, Recording, ValidationError};

/// Format of `last_watered`, e.g. `Tue, 01 Apr 2025 13:54:32 GMT`
pub const LAST_WATERED_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %Z";

/// A monitored plant with its botanist, origin, species and latest reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plant {
    plant_number: u32,
    last_watered: NaiveDateTime,
    botanist: Botanist,
    location: Location,
    recording: Recording,
    plant_type: PlantType,
}

impl Plant {
    /// Validate a whole payload; any invalid field rejects the plant
    pub fn from_payload(payload: &Value, now: NaiveDateTime) -> Result<Self, ValidationError> {
        if !payload.is_object() {
            return Err(ValidationError::WrongType {
                field: "payload",
                expected: "an object",
            });
        }

        Ok(Self {
            last_watered: past_timestamp(require(payload, "last_watered")?, "last_watered", LAST_WATERED_FORMAT, now)?,
            plant_number: clean_plant_number(require(payload, "plant_id")?)?,
            botanist: Botanist::from_value(require(payload, "botanist")?)?,
            location: Location::from_value(require(payload, "origin_location")?)?,
            recording: Recording::from_payload(payload, now)?,
            plant_type: PlantType::from_payload(payload)?,
        })
    }

    pub fn plant_number(&self) -> u32 {
        self.plant_number
    }

    pub fn last_watered(&self) -> NaiveDateTime {
        self.last_watered
    }

    pub fn botanist(&self) -> &Botanist {
        &self.botanist
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn plant_type(&self) -> &PlantType {
        &self.plant_type
    }
}

fn clean_plant_number(value: &Value) -> Result<u32, ValidationError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(ValidationError::WrongType {
            field: "plant_id",
            expected: "a non-negative integer",
        })
}
