//! Turning raw payloads into validated plants and store rows

use chrono::NaiveDateTime;
use plantstore::{BotanistRow, LocationRow, PlantBatch, PlantRow, PlantTypeRow, RecordingRow};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::domain::Plant;

/// Builds plants from payloads, keeping the ones that validate
pub struct PlantFactory {
    now: NaiveDateTime,
}

impl PlantFactory {
    /// `now` bounds every timestamp in the payloads
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// One plant per valid payload; invalid payloads are logged and dropped
    pub fn create_plants(&self, payloads: &[Value]) -> Vec<Plant> {
        debug!(count = payloads.len(), "create_plants: called");
        let mut plants = Vec::with_capacity(payloads.len());

        for payload in payloads {
            match Plant::from_payload(payload, self.now) {
                Ok(plant) => plants.push(plant),
                Err(e) => {
                    let plant_id = payload.get("plant_id").and_then(Value::as_u64);
                    warn!(?plant_id, error = %e, "Rejected plant payload");
                }
            }
        }

        info!(
            accepted = plants.len(),
            rejected = payloads.len() - plants.len(),
            "Transformed payloads"
        );
        plants
    }
}

/// Flatten plants into per-table rows, dropping duplicate reference rows
pub fn to_batch(plants: &[Plant]) -> PlantBatch {
    let mut batch = PlantBatch::default();
    let mut botanists = HashSet::new();
    let mut cities = HashSet::new();
    let mut plant_types = HashSet::new();

    for plant in plants {
        let botanist = BotanistRow {
            name: plant.botanist().name().to_string(),
            email: plant.botanist().email().to_string(),
            phone: plant.botanist().phone().to_string(),
        };
        if botanists.insert((botanist.name.clone(), botanist.email.clone(), botanist.phone.clone())) {
            batch.botanists.push(botanist.clone());
        }

        let location = plant.location();
        if cities.insert(location.city().to_string()) {
            batch.locations.push(LocationRow {
                continent: location.continent().to_string(),
                country: location.country().to_string(),
                capital: location.capital().to_string(),
                city: location.city().to_string(),
                latitude: location.latitude(),
                longitude: location.longitude(),
            });
        }

        let plant_type = plant.plant_type();
        if plant_types.insert(plant_type.name().to_string()) {
            batch.plant_types.push(PlantTypeRow {
                name: plant_type.name().to_string(),
                scientific_name: plant_type.scientific_name().map(str::to_string),
                image_url: plant_type.image_url().map(str::to_string),
            });
        }

        batch.plants.push(PlantRow {
            plant_number: plant.plant_number(),
            plant_type_name: plant_type.name().to_string(),
            botanist,
            city_name: location.city().to_string(),
            last_watered: plant.last_watered(),
        });

        let recording = plant.recording();
        batch.recordings.push(RecordingRow {
            plant_number: plant.plant_number(),
            soil_moisture: recording.soil_moisture(),
            temperature: recording.temperature(),
            taken: recording.taken(),
        });
    }

    batch
}
