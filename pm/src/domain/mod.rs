//! Validated plant entities built from raw API payloads
//!
//! Every entity is constructed through a fallible constructor over
//! `serde_json::Value`. Construction either yields a fully valid entity or a
//! [`ValidationError`] naming the first offending field.

mod botanist;
mod countries;
mod error;
mod fields;
mod location;
mod plant;
mod plant_type;
mod recording;

pub use botanist::Botanist;
pub use countries::country_name;
pub use error::ValidationError;
pub use location::Location;
pub use plant::{LAST_WATERED_FORMAT, Plant};
pub use plant_type::PlantType;
pub use recording::{MAX_SOIL_MOISTURE, MIN_SOIL_MOISTURE, RECORDING_TAKEN_FORMAT, Recording};
