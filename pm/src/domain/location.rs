//! Location entity

use serde::Serialize;
use serde_json::Value;

use super::ValidationError;
use super::countries::country_name;
use super::fields::{non_empty, number, string};

const LOCATION_FIELDS: usize = 5;

/// Where a plant originates from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
    city: String,
    country: String,
    continent: String,
    capital: String,
}

impl Location {
    /// Build from `[latitude, longitude, city, country_code, "Continent/Capital"]`
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let Some(parts) = value.as_array() else {
            return Err(ValidationError::WrongType {
                field: "origin_location",
                expected: "an array",
            });
        };
        if parts.len() != LOCATION_FIELDS {
            return Err(ValidationError::invalid(
                "origin_location",
                format!("expected {} values, got {}", LOCATION_FIELDS, parts.len()),
            ));
        }

        let latitude = coordinate(&parts[0], "latitude", 90.0)?;
        let longitude = coordinate(&parts[1], "longitude", 180.0)?;
        let city = non_empty(&parts[2], "city")?;

        let code = string(&parts[3], "country_code")?;
        let country = country_name(code)
            .ok_or_else(|| ValidationError::invalid("country_code", format!("unknown code {:?}", code)))?
            .to_string();

        let (continent, capital) = split_continent_capital(string(&parts[4], "continent_capital")?)?;

        Ok(Self {
            latitude,
            longitude,
            city,
            country,
            continent,
            capital,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn continent(&self) -> &str {
        &self.continent
    }

    pub fn capital(&self) -> &str {
        &self.capital
    }
}

fn coordinate(value: &Value, field: &'static str, limit: f64) -> Result<f64, ValidationError> {
    let n = number(value, field)?;
    if n.abs() > limit {
        return Err(ValidationError::invalid(field, format!("{} is outside ±{}", n, limit)));
    }
    Ok(n)
}

/// `America/Argentina/Buenos_Aires` yields (`America`, `Buenos_Aires`)
fn split_continent_capital(raw: &str) -> Result<(String, String), ValidationError> {
    let segments: Vec<&str> = raw.split('/').collect();
    match (segments.first(), segments.last()) {
        (Some(continent), Some(capital)) if segments.len() > 1 && !continent.is_empty() && !capital.is_empty() => {
            Ok((continent.to_string(), capital.to_string()))
        }
        _ => Err(ValidationError::invalid(
            "continent_capital",
            format!("{:?} is not Continent/Capital", raw),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_location() {
        let location =
            Location::from_value(&json!(["29.65163", "-82.32483", "Gainesville", "US", "America/New_York"])).unwrap();

        assert_eq!(location.latitude(), 29.65163);
        assert_eq!(location.longitude(), -82.32483);
        assert_eq!(location.city(), "Gainesville");
        assert_eq!(location.country(), "United States of America");
        assert_eq!(location.continent(), "America");
        assert_eq!(location.capital(), "New_York");
    }

    #[test]
    fn test_numeric_coordinates() {
        let location = Location::from_value(&json!([51.30001, 13.10984, "Oschatz", "DE", "Europe/Berlin"])).unwrap();
        assert_eq!(location.country(), "Germany");
        assert_eq!(location.capital(), "Berlin");
    }

    #[test]
    fn test_three_segment_zone() {
        let location = Location::from_value(&json!([
            "-34.6",
            "-58.4",
            "Buenos Aires",
            "AR",
            "America/Argentina/Buenos_Aires"
        ]))
        .unwrap();
        assert_eq!(location.continent(), "America");
        assert_eq!(location.capital(), "Buenos_Aires");
    }

    #[test]
    fn test_wrong_length() {
        let err = Location::from_value(&json!(["1", "2", "City", "US"])).unwrap_err();
        assert_eq!(err.field(), "origin_location");
    }

    #[test]
    fn test_not_a_list() {
        assert!(matches!(
            Location::from_value(&json!({"city": "Gainesville"})),
            Err(ValidationError::WrongType { .. })
        ));
    }

    #[test]
    fn test_bad_coordinates() {
        let err = Location::from_value(&json!(["north", "2", "City", "US", "America/New_York"])).unwrap_err();
        assert_eq!(err.field(), "latitude");

        let err = Location::from_value(&json!(["10", "200", "City", "US", "America/New_York"])).unwrap_err();
        assert_eq!(err.field(), "longitude");
    }

    #[test]
    fn test_unknown_country() {
        let err = Location::from_value(&json!(["1", "2", "City", "ZZ", "America/New_York"])).unwrap_err();
        assert_eq!(err.field(), "country_code");
    }

    #[test]
    fn test_continent_without_capital() {
        let err = Location::from_value(&json!(["1", "2", "City", "US", "America"])).unwrap_err();
        assert_eq!(err.field(), "continent_capital");

        let err = Location::from_value(&json!(["1", "2", "City", "US", "America/"])).unwrap_err();
        assert_eq!(err.field(), "continent_capital");
    }
}
