//! # Cinema Data Models
//!
//! Typed records for the three entities a cinema chain's API exposes, and the
//! extraction of those records from loosely typed JSON.
//!
//! The API is not schema-stable, so records are pulled out of a
//! `serde_json::Value` field by field. Every structural problem maps to one
//! `TrackerError`, whose `Display` text is also the line that gets logged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Structural failure while reading a cinema API payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// An expected key is absent from a record.
    #[error("Unexpected key '{0}' found in response, not proceeding.")]
    MissingKey(String),

    /// The payload (or one of its records) has the wrong overall shape, e.g. a
    /// mapping where a sequence of records was expected.
    #[error("Recieved malformed JSON, not proceeding.")]
    Malformed,

    /// A key is present but holds a value of the wrong type.
    #[error("Unexpected value for key '{key}' ({found}) found in response, not proceeding.")]
    InvalidField { key: String, found: String },
}

/// A cinema location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub cinema_id: String,
    pub title: String,
    pub locality: String,
    pub city: String,
}

/// A movie currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub movie_id: String,
    pub title: String,
}

/// All showings of one movie for one session query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGroup {
    pub movie_id: String,
    pub title: String,
    /// Showing date-times exactly as the API reports them, in response order.
    pub sessions: Vec<String>,
}

impl SessionGroup {
    /// Showings whose date-time string contains `date` (e.g. `2024-12-22`).
    pub fn showings_on<'a>(&'a self, date: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.sessions
            .iter()
            .map(String::as_str)
            .filter(move |timeslot| timeslot.contains(date))
    }
}

/// A record that can be read out of one element of an API response.
pub trait ApiRecord: Sized {
    /// Builds the record, failing on the first missing or mistyped key.
    fn from_record(record: &Value) -> Result<Self, TrackerError>;

    /// The stable identifier the record is keyed by.
    fn id(&self) -> &str;
}

impl ApiRecord for Movie {
    fn from_record(record: &Value) -> Result<Self, TrackerError> {
        Ok(Self {
            movie_id: text_field(record, "movieId")?,
            title: text_field(record, "title")?,
        })
    }

    fn id(&self) -> &str {
        &self.movie_id
    }
}

impl ApiRecord for Location {
    fn from_record(record: &Value) -> Result<Self, TrackerError> {
        Ok(Self {
            cinema_id: text_field(record, "cinemaId")?,
            title: text_field(record, "title")?,
            locality: text_field(record, "locality")?,
            city: text_field(record, "city")?,
        })
    }

    fn id(&self) -> &str {
        &self.cinema_id
    }
}

impl ApiRecord for SessionGroup {
    fn from_record(record: &Value) -> Result<Self, TrackerError> {
        let movie_id = text_field(record, "movieId")?;
        let title = text_field(record, "title")?;
        let sessions = list_field(record, "sessions")?
            .iter()
            .map(|showing| text_field(showing, "date"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            movie_id,
            title,
            sessions,
        })
    }

    fn id(&self) -> &str {
        &self.movie_id
    }
}

/// Inserts each record of `items` into `into`, keyed by its id.
///
/// Stops at the first record that fails to parse. Records before it stay in
/// `into`. A record whose id is already present replaces the earlier one.
pub fn collect_records<T: ApiRecord>(
    items: &[Value],
    into: &mut BTreeMap<String, T>,
) -> Result<(), TrackerError> {
    for item in items {
        let record = T::from_record(item)?;
        into.insert(record.id().to_string(), record);
    }
    Ok(())
}

/// The response as a sequence of records.
pub fn as_records(response: &Value) -> Result<&[Value], TrackerError> {
    response
        .as_array()
        .map(Vec::as_slice)
        .ok_or(TrackerError::Malformed)
}

/// `true` for `{}`, the stand-in for "no usable response".
pub fn is_empty_mapping(response: &Value) -> bool {
    response.as_object().map_or(false, |m| m.is_empty())
}

/// Looks up `key` on a record that must be a JSON object.
pub fn field<'a>(record: &'a Value, key: &str) -> Result<&'a Value, TrackerError> {
    record
        .as_object()
        .ok_or(TrackerError::Malformed)?
        .get(key)
        .ok_or_else(|| TrackerError::MissingKey(key.to_string()))
}

/// A string field. Numbers are accepted and rendered as their JSON text.
pub fn text_field(record: &Value, key: &str) -> Result<String, TrackerError> {
    match field(record, key)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(invalid(key, other)),
    }
}

/// An array field.
pub fn list_field<'a>(record: &'a Value, key: &str) -> Result<&'a [Value], TrackerError> {
    let value = field(record, key)?;
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid(key, value))
}

/// A non-negative integer field.
pub fn count_field(record: &Value, key: &str) -> Result<u64, TrackerError> {
    let value = field(record, key)?;
    value.as_u64().ok_or_else(|| invalid(key, value))
}

fn invalid(key: &str, found: &Value) -> TrackerError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    TrackerError::InvalidField {
        key: key.to_string(),
        found: found.to_string(),
    }
}
