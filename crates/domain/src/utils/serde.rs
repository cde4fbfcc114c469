//! Lenient serde helpers for loosely-typed API payloads
//!
//! The tracker API is not strict about number encoding: hours arrive as
//! numbers, numeric strings or null, and ids may be integers or strings.

use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Interpret a JSON value as hours.
///
/// Numbers pass through, strings are trimmed and parsed, anything else
/// (null, booleans, garbage strings) yields `None`.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// `Option<f64>` that accepts numbers, numeric strings and null.
///
/// # Usage
/// ```rust
/// use dailytrack_domain::utils::serde::lenient_f64;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(default, with = "lenient_f64")]
///     hours: Option<f64>,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"hours":"7.5"}"#).unwrap();
/// assert_eq!(row.hours, Some(7.5));
/// ```
pub mod lenient_f64 {
    use super::*;

    /// Serde serialization result type
    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(number_from_value(&raw))
    }
}

/// `String` that accepts either a JSON string or a JSON number.
pub mod string_or_number {
    use super::*;

    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    pub fn serialize<S>(value: &str, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Null => Ok(String::new()),
            other => Err(serde::de::Error::custom(format!("expected string or number, got {other}"))),
        }
    }
}
