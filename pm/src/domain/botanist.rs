//! Botanist entity

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

use super::ValidationError;
use super::fields::{non_empty, require, string};

/// `001-481-273-3691x127` and `(146)994-1635x35992`
static PHONE_FORMATS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^\d{3}-\d{3}-\d{3}-\d{4}x\d{3}$").expect("valid phone regex"),
        Regex::new(r"^\(\d{3}\)\d{3}-\d{4}x\d{5}$").expect("valid phone regex"),
    ]
});

/// The botanist responsible for a plant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Botanist {
    name: String,
    email: String,
    phone: String,
}

impl Botanist {
    /// Build from the `botanist` object of a payload
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::WrongType {
                field: "botanist",
                expected: "an object",
            });
        }

        Ok(Self {
            email: clean_email(require(value, "email")?)?,
            name: non_empty(require(value, "name")?, "name")?,
            phone: clean_phone(require(value, "phone")?)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

fn clean_email(value: &Value) -> Result<String, ValidationError> {
    let email = string(value, "email")?;
    if !email.contains('@') {
        return Err(ValidationError::invalid("email", format!("{:?} has no '@'", email)));
    }
    Ok(email.to_string())
}

fn clean_phone(value: &Value) -> Result<String, ValidationError> {
    let phone = string(value, "phone")?;
    if !PHONE_FORMATS.iter().any(|re| re.is_match(phone)) {
        return Err(ValidationError::invalid("phone", format!("{:?} is not a known format", phone)));
    }
    Ok(phone.to_string())
}
