//! Plant type entity

use serde::Serialize;
use serde_json::Value;

use super::ValidationError;
use super::fields::{non_empty, require};

/// A species of plant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantType {
    name: String,
    scientific_name: Option<String>,
    image_url: Option<String>,
}

impl PlantType {
    /// Build from the `name`, `scientific_name` and `images` fields of a payload
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        Ok(Self {
            name: non_empty(require(payload, "name")?, "name")?,
            scientific_name: clean_scientific_name(payload.get("scientific_name"))?,
            image_url: clean_image_url(payload.get("images")),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scientific_name(&self) -> Option<&str> {
        self.scientific_name.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

/// First entry of the `scientific_name` list; absent or empty means none
fn clean_scientific_name(value: Option<&Value>) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::Array(names)) => match names.first() {
            None => Ok(None),
            Some(Value::String(name)) if name.trim().is_empty() => Ok(None),
            Some(Value::String(name)) => Ok(Some(name.clone())),
            Some(_) => Err(ValidationError::WrongType {
                field: "scientific_name",
                expected: "a list of strings",
            }),
        },
        Some(_) => Err(ValidationError::WrongType {
            field: "scientific_name",
            expected: "a list",
        }),
    }
}

/// `images.original_url` when it is an https jpg link, otherwise none
fn clean_image_url(images: Option<&Value>) -> Option<String> {
    let url = images?.get("original_url")?.as_str()?;
    (url.starts_with("https://") && url.ends_with("jpg")).then(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_plant_type() {
        let plant_type = PlantType::from_payload(&json!({
            "name": "Colocasia Esculenta",
            "scientific_name": ["Colocasia esculenta"],
            "images": {
                "original_url": "https://perenual.com/storage/species_image/2015_colocasia_esculenta/og/24325097844_14719030a3_b.jpg"
            }
        }))
        .unwrap();

        assert_eq!(plant_type.name(), "Colocasia Esculenta");
        assert_eq!(plant_type.scientific_name(), Some("Colocasia esculenta"));
        assert!(plant_type.image_url().unwrap().ends_with("_b.jpg"));
    }

    #[test]
    fn test_optional_fields_absent() {
        let plant_type = PlantType::from_payload(&json!({"name": "Brugmansia X Candida"})).unwrap();
        assert_eq!(plant_type.scientific_name(), None);
        assert_eq!(plant_type.image_url(), None);

        let plant_type = PlantType::from_payload(&json!({"name": "Venus flytrap", "scientific_name": []})).unwrap();
        assert_eq!(plant_type.scientific_name(), None);
    }

    #[test]
    fn test_image_url_shape() {
        for url in [
            "http://test.com/storage/image/orig_image.jpg",
            "https://test.com/storage/image/orig_image.png",
            "ftp://test.com/x.jpg",
        ] {
            let plant_type = PlantType::from_payload(&json!({
                "name": "Rose",
                "images": {"original_url": url}
            }))
            .unwrap();
            assert_eq!(plant_type.image_url(), None, "kept {}", url);
        }

        let plant_type = PlantType::from_payload(&json!({"name": "Rose", "images": null})).unwrap();
        assert_eq!(plant_type.image_url(), None);
    }

    #[test]
    fn test_scientific_name_must_be_list() {
        let err = PlantType::from_payload(&json!({"name": "Rose", "scientific_name": "Rosa"})).unwrap_err();
        assert_eq!(err.field(), "scientific_name");
    }

    #[test]
    fn test_name_required() {
        assert_eq!(
            PlantType::from_payload(&json!({"scientific_name": ["Rosa"]})).unwrap_err(),
            ValidationError::Missing { field: "name" }
        );
        assert!(PlantType::from_payload(&json!({"name": ""})).is_err());
    }
}
