//! Tolerant field decoders for backend JSON.
//!
//! Every payload the backend sends is AI-assembled, so any field may be
//! missing, `null`, or of the wrong JSON type. These helpers are used through
//! `#[serde(deserialize_with = "...")]` and never fail on a type mismatch:
//! they fall back to the field's empty value instead.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Strings as-is; numbers and booleans rendered as text; anything else `None`.
pub(crate) fn string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Like [`string`], with `""` in place of `None`.
pub(crate) fn string_or_empty<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string(de)?.unwrap_or_default())
}

/// JSON numbers or numeric strings.
pub(crate) fn number<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Non-negative whole count: fractions truncate, negatives and junk become 0.
pub(crate) fn to_count(n: f64) -> u32 {
    if n.is_finite() && n > 0.0 {
        n as u32
    } else {
        0
    }
}

pub(crate) fn count<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(de)?.map(to_count).unwrap_or(0))
}

/// Booleans, `"true"`/`"false"` strings, or non-zero numbers.
pub(crate) fn flag<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

/// Array of strings; non-string elements are dropped, non-arrays are empty.
pub(crate) fn string_list<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// A nested object, or its default when absent, `null`, or malformed.
pub(crate) fn object<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(de)? {
        v @ Value::Object(_) => serde_json::from_value(v).unwrap_or_default(),
        _ => T::default(),
    })
}

/// A nested object when it decodes, else `None`.
pub(crate) fn maybe_object<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(de)? {
        v @ Value::Object(_) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

/// A nested array, keeping only the elements that decode.
pub(crate) fn list<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(de)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Decode a top-level response array element by element.
///
/// A non-array body yields nothing; elements that fail to decode are skipped
/// with a warning naming `what`.
pub(crate) fn elements<T: DeserializeOwned>(body: Value, what: &'static str) -> Vec<T> {
    let Value::Array(items) = body else {
        tracing::warn!(what, "response was not an array; treating as empty");
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<T>(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(what, index = i, error = %e, "skipping malformed element");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "string_or_empty")]
        name: String,
        #[serde(deserialize_with = "count")]
        hits: u32,
        #[serde(deserialize_with = "flag")]
        done: bool,
        #[serde(deserialize_with = "string_list")]
        tags: Vec<String>,
    }

    fn sample(v: Value) -> Sample {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn nulls_fall_back_to_empty() {
        let s = sample(json!({ "name": null, "hits": null, "done": null, "tags": null }));
        assert_eq!(s, Sample::default());
    }

    #[test]
    fn missing_fields_use_defaults() {
        assert_eq!(sample(json!({})), Sample::default());
    }

    #[test]
    fn counts_accept_floats_and_strings() {
        assert_eq!(sample(json!({ "hits": 2.0 })).hits, 2);
        assert_eq!(sample(json!({ "hits": 2.7 })).hits, 2);
        assert_eq!(sample(json!({ "hits": " 4 " })).hits, 4);
        assert_eq!(sample(json!({ "hits": -3 })).hits, 0);
        assert_eq!(sample(json!({ "hits": "many" })).hits, 0);
    }

    #[test]
    fn strings_accept_scalars() {
        assert_eq!(sample(json!({ "name": 42 })).name, "42");
        assert_eq!(sample(json!({ "name": ["x"] })).name, "");
    }

    #[test]
    fn flags_and_lists() {
        assert!(sample(json!({ "done": "TRUE" })).done);
        assert!(sample(json!({ "done": 1 })).done);
        assert_eq!(
            sample(json!({ "tags": ["a", null, 3, {"x": 1}] })).tags,
            vec!["a", "3"]
        );
        assert!(sample(json!({ "tags": "a" })).tags.is_empty());
    }

    #[test]
    fn elements_skip_bad_items() {
        let out: Vec<Sample> =
            elements(json!([{ "name": "ok" }, null, 7, { "hits": 1 }]), "samples");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "ok");
        assert_eq!(out[1].hits, 1);

        let none: Vec<Sample> = elements(json!({ "error": "boom" }), "samples");
        assert!(none.is_empty());
    }
}
