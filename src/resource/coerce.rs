//! Value coercions applied while translating wire fields
//!
//! The service is not consistent about scalar types: flags such as
//! `bootable` and `encrypted` arrive as `"true"`/`"false"` strings, and some
//! gateways quote integers. These modules are used with
//! `#[serde(default, with = "...")]` on `Option` fields.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, Deserializer, Unexpected};
use serde::Deserialize;
use serde_json::Value;

/// `Option<bool>` accepting JSON booleans or case-insensitive `"true"`/`"false"`
pub mod bool_str {
    use super::*;
    use serde::Serializer;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(de::Error::invalid_value(
                    Unexpected::Str(&s),
                    &"\"true\" or \"false\"",
                )),
            },
            Some(other) => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a boolean or boolean string",
            )),
        }
    }

    pub fn serialize<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(b) => serializer.serialize_bool(*b),
            None => serializer.serialize_none(),
        }
    }
}

/// `Option<u64>` accepting JSON numbers or numeric strings
pub mod int_str {
    use super::*;
    use serde::Serializer;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("expected a non-negative integer, got {}", n))),
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| de::Error::invalid_value(Unexpected::Str(&s), &"an integer string")),
            Some(other) => Err(de::Error::invalid_type(unexpected(&other), &"an integer")),
        }
    }

    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(n) => serializer.serialize_u64(*n),
            None => serializer.serialize_none(),
        }
    }
}

/// Parse a service timestamp
///
/// Cinder reports naive UTC times (`2016-02-03T02:19:29.895237`); version
/// documents use RFC 3339 (`2014-06-28T12:20:21Z`). Both are accepted.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}
