//! Text and JSON rendering of dashboard views

use colored::*;
use eyre::Result;
use serde::Serialize;
use std::fmt::Write;

use super::data::{AlertRow, Metric, SeriesPoint, WateringRow};
use crate::cli::OutputFormat;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_list(title: &str, items: &[String], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(items);
    }
    let mut out = String::new();
    writeln!(out, "{}", title.bold())?;
    if items.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for item in items {
        writeln!(out, "  {}", item)?;
    }
    Ok(out)
}

pub fn render_recordings(
    plant_option: &str,
    metric: Metric,
    hours: u32,
    points: &[SeriesPoint],
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return json(points);
    }
    let mut out = String::new();
    writeln!(out, "{} for {} (last {}h)", metric.to_string().bold(), plant_option.cyan(), hours)?;
    if points.is_empty() {
        writeln!(out, "  No readings in this time frame")?;
        return Ok(out);
    }

    writeln!(out, "{:<22} {:>10}  {}", "Time", metric.to_string(), "Flags")?;
    for point in points {
        let mut flags = Vec::new();
        if point.anomalous == Some(true) {
            flags.push("anomalous".red().to_string());
        }
        if point.extreme == Some(true) {
            flags.push("extreme".yellow().to_string());
        }
        writeln!(
            out,
            "{:<22} {:>10.2}  {}",
            point.timestamp.format(TIME_FORMAT),
            point.value,
            flags.join(" ")
        )?;
    }

    if metric == Metric::Temperature {
        writeln!(out)?;
        writeln!(out, "{} anomalous: modified z-score above the MAD threshold", "●".red())?;
        writeln!(out, "{} extreme: in the top or bottom tail of normal readings", "●".yellow())?;
    }
    Ok(out)
}

pub fn render_last_watered(botanist: &str, rows: &[WateringRow], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(rows);
    }
    let mut out = String::new();
    writeln!(out, "Plants looked after by {}", botanist.cyan())?;
    if rows.is_empty() {
        writeln!(out, "  No plants found")?;
        return Ok(out);
    }
    writeln!(out, "{:<10} {:<22} {:>12}", "Plant No.", "Last watered", "Hours since")?;
    for row in rows {
        writeln!(
            out,
            "{:<10} {:<22} {:>12.2}",
            row.plant_number,
            row.last_watered.format(TIME_FORMAT),
            row.hours_since
        )?;
    }
    Ok(out)
}

pub fn render_alerts(rows: &[AlertRow], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(rows);
    }
    let mut out = String::new();
    writeln!(
        out,
        "{:<10} {:<40} {:<15} {}",
        "Plant No.", "Name", "Needs Watering", "Extreme Temp."
    )?;
    for row in rows {
        let watering = if row.needs_watering {
            "yes".blue().to_string()
        } else {
            String::new()
        };
        let extreme = if row.extreme_temperature {
            "yes".red().to_string()
        } else {
            String::new()
        };
        writeln!(out, "{:<10} {:<40} {:<15} {}", row.plant_number, row.plant_type, watering, extreme)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, TIME_FORMAT).unwrap()
    }

    #[test]
    fn test_list_json() {
        let out = render_list("Plants", &["1 - Rose".to_string()], OutputFormat::Json).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec!["1 - Rose"]);
    }

    #[test]
    fn test_list_text() {
        colored::control::set_override(false);
        let out = render_list("Botanists", &["Carl Linnaeus".to_string()], OutputFormat::Text).unwrap();
        assert_eq!(out, "Botanists\n  Carl Linnaeus\n");
    }

    #[test]
    fn test_soil_moisture_json_omits_flags() {
        let points = vec![SeriesPoint {
            timestamp: ts("2025-04-02 06:00:00"),
            value: 28.5,
            anomalous: None,
            extreme: None,
        }];
        let out = render_recordings("2 - Rose", Metric::SoilMoisture, 12, &points, OutputFormat::Json).unwrap();
        assert!(!out.contains("anomalous"));
        assert!(out.contains("28.5"));
    }

    #[test]
    fn test_alerts_text() {
        colored::control::set_override(false);
        let rows = vec![AlertRow {
            plant_number: 3,
            plant_type: "Venus flytrap".to_string(),
            soil_moisture: 12.0,
            temperature: 11.0,
            needs_watering: true,
            extreme_temperature: false,
        }];
        let out = render_alerts(&rows, OutputFormat::Text).unwrap();
        let line = out.lines().nth(1).unwrap();
        assert!(line.starts_with("3 "));
        assert!(line.contains("Venus flytrap"));
        assert!(line.contains("yes"));
    }

    #[test]
    fn test_last_watered_empty() {
        colored::control::set_override(false);
        let out = render_last_watered("Nobody", &[], OutputFormat::Text).unwrap();
        assert!(out.contains("No plants found"));
    }
}
