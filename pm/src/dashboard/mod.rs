//! Dashboard views over recent readings
//!
//! [`DataManager`] flags unusual temperatures per plant and shapes the
//! readings for each view; [`view`] renders them as tables or JSON.

mod data;
mod stats;
pub mod view;

pub use data::{AlertRow, DataManager, FlaggedReading, MAX_HOURS, Metric, SeriesPoint, WateringRow};
pub use stats::{extremes, mad_outliers, median, percentile};
