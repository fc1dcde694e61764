//! Decoding of protected-area feature attributes.
//!
//! Tiles carry `name` and `country` as plain attributes. Everything else the
//! source data had about a park is packed into a single JSON-encoded string
//! under `properties`, which has to be decoded before it can be shown.

use serde_json::{Map, Value};

pub const NAME_KEY: &str = "name";
pub const COUNTRY_KEY: &str = "country";
pub const EXTRA_KEY: &str = "properties";

pub const DEFAULT_NAME: &str = "Unnamed Park";
pub const DEFAULT_COUNTRY: &str = "Unknown Country";

pub type PropertyMap = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("feature has no `{}` attribute", EXTRA_KEY)]
    Missing,

    #[error("malformed attribute JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Parses the packed attribute string. Keys keep their order from the
/// document; a repeated key keeps its first position and its last value.
pub fn decode_extra(json_text: &str) -> Result<PropertyMap, DecodeError> {
    match serde_json::from_str(json_text)? {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::NotAnObject(value_kind(&other))),
    }
}

fn decode_value(value: Option<&Value>) -> Result<PropertyMap, DecodeError> {
    match value {
        None | Some(Value::Null) => Err(DecodeError::Missing),
        Some(Value::String(text)) => decode_extra(text),
        // already decoded by the host
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(DecodeError::NotAnObject(value_kind(other))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// JavaScript truthiness; null, false, 0, NaN and "" are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text shown for an attribute value: strings as they are, everything else
/// as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    value
        .filter(|value| is_truthy(value))
        .map(display_value)
        .unwrap_or_else(|| default.to_owned())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParkAttributes {
    pub name: String,
    pub country: String,
    pub extra: PropertyMap,
}

impl ParkAttributes {
    /// Never fails: a bad `properties` payload is logged and replaced by an
    /// empty mapping.
    pub fn from_properties(properties: &PropertyMap) -> Self {
        let extra = decode_value(properties.get(EXTRA_KEY)).unwrap_or_else(|err| {
            tracing::warn!(%err, "could not decode park attributes, showing none");
            PropertyMap::new()
        });

        Self::with_extra(properties, extra)
    }

    /// Like [`ParkAttributes::from_properties`] but surfaces the decode error
    /// alongside the attributes that could still be read.
    pub fn try_from_properties(properties: &PropertyMap) -> (Self, Option<DecodeError>) {
        match decode_value(properties.get(EXTRA_KEY)) {
            Ok(extra) => (Self::with_extra(properties, extra), None),
            Err(err) => (Self::with_extra(properties, PropertyMap::new()), Some(err)),
        }
    }

    fn with_extra(properties: &PropertyMap, extra: PropertyMap) -> Self {
        Self {
            name: text_or(properties.get(NAME_KEY), DEFAULT_NAME),
            country: text_or(properties.get(COUNTRY_KEY), DEFAULT_COUNTRY),
            extra,
        }
    }
}
