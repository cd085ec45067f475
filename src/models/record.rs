//! Conversion between `properties` rows and the in-memory model.

use super::{field, Listing, ListingDraft, ListingStatus};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Failure to read a storage record as a listing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("malformed field `{field}`: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("unknown listing status `{0}`")]
    InvalidStatus(String),
}

fn malformed(field: &'static str, reason: impl Into<String>) -> DecodeError {
    DecodeError::MalformedField {
        field,
        reason: reason.into(),
    }
}

impl ListingDraft {
    /// Plain field map with exactly the draft's columns. No validation.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert(field::TITLE.into(), json!(self.title));
        record.insert(field::PROPERTY_TYPE.into(), json!(self.property_type));
        record.insert(field::LOCATION.into(), json!(self.location));
        record.insert(field::CITY.into(), json!(self.city));
        record.insert(field::STATE.into(), json!(self.state));
        record.insert(field::PRICE.into(), json!(self.price));
        record.insert(field::DESCRIPTION.into(), json!(self.description));
        record.insert(field::IMAGES.into(), json!(self.images));
        record.insert(field::SQUARE_METERS.into(), json!(self.square_meters));
        record.insert(field::BEDROOMS.into(), json!(self.bedrooms));
        record.insert(field::BATHROOMS.into(), json!(self.bathrooms));
        record.insert(field::AMENITIES.into(), json!(self.amenities));
        record.insert(field::STATUS.into(), json!(self.status.as_str()));
        record
    }
}

impl Listing {
    /// Decode a row returned by the store.
    pub fn from_record(raw: &Value) -> Result<Self, DecodeError> {
        let row = raw.as_object().ok_or(DecodeError::NotAnObject)?;

        let id = match required(row, field::ID)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Err(malformed(field::ID, "expected a string or number")),
        };

        let status = text(row, field::STATUS)?.parse::<ListingStatus>()?;

        let fields = ListingDraft {
            title: text(row, field::TITLE)?,
            property_type: text(row, field::PROPERTY_TYPE)?,
            location: text(row, field::LOCATION)?,
            city: optional_text(row, field::CITY)?,
            state: optional_text(row, field::STATE)?,
            price: amount(row, field::PRICE)?,
            description: text(row, field::DESCRIPTION)?,
            images: text_list(row, field::IMAGES)?,
            square_meters: amount(row, field::SQUARE_METERS)?,
            bedrooms: count(row, field::BEDROOMS)?,
            bathrooms: count(row, field::BATHROOMS)?,
            amenities: dedup(text_list(row, field::AMENITIES)?),
            status,
        };

        Ok(Listing::new(id, fields).with_timestamps(
            timestamp(row, field::CREATED_AT)?,
            timestamp(row, field::UPDATED_AT)?,
        ))
    }
}

fn required<'a>(row: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, DecodeError> {
    match row.get(name) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(name)),
        Some(value) => Ok(value),
    }
}

fn text(row: &Map<String, Value>, name: &'static str) -> Result<String, DecodeError> {
    required(row, name)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| malformed(name, "expected a string"))
}

fn optional_text(row: &Map<String, Value>, name: &'static str) -> Result<Option<String>, DecodeError> {
    match row.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(malformed(name, "expected a string")),
    }
}

fn amount(row: &Map<String, Value>, name: &'static str) -> Result<f64, DecodeError> {
    let value = required(row, name)?
        .as_f64()
        .ok_or_else(|| malformed(name, "expected a number"))?;
    if value < 0.0 {
        return Err(malformed(name, format!("negative value {}", value)));
    }
    Ok(value)
}

fn count(row: &Map<String, Value>, name: &'static str) -> Result<i32, DecodeError> {
    let value = required(row, name)?
        .as_i64()
        .ok_or_else(|| malformed(name, "expected an integer"))?;
    if value < 0 {
        return Err(malformed(name, format!("negative value {}", value)));
    }
    i32::try_from(value).map_err(|_| malformed(name, format!("{} is out of range", value)))
}

// Postgres arrays come back as null when never set.
fn text_list(row: &Map<String, Value>, name: &'static str) -> Result<Vec<String>, DecodeError> {
    match row.get(name) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| malformed(name, "expected an array of strings"))
            })
            .collect(),
        Some(_) => Err(malformed(name, "expected an array of strings")),
    }
}

fn timestamp(row: &Map<String, Value>, name: &'static str) -> Result<Option<DateTime<Utc>>, DecodeError> {
    match row.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| malformed(name, e.to_string())),
        Some(_) => Err(malformed(name, "expected an RFC 3339 timestamp")),
    }
}

fn dedup(labels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .filter(|label| seen.insert(label.clone()))
        .collect()
}
