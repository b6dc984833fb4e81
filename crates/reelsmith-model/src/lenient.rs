//! Forgiving field decoders for generator output.
//!
//! Generated records drift from their schema in predictable ways: numbers arrive
//! as strings, lists arrive as single values, nulls stand in for empty fields.
//! These decoders absorb that drift so one odd field does not sink a record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number, numeric string, or nothing.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_of))
}

/// Unsigned integer, numeric string, or nothing.
pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_of)
        .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32))
}

/// String, or any scalar rendered as a string. Null becomes empty.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// A list, a single value promoted to a one-element list, or nothing.
pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(single) => vec![single],
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
        .collect()
}

/// List of text items; non-string items are rendered as compact JSON.
pub fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<Value> = seq(deserializer)?;
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .collect())
}

pub(crate) fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('s').trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "opt_f64")]
        duration: Option<f64>,
        #[serde(default, deserialize_with = "seq")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "string")]
        name: String,
    }

    #[test]
    fn test_numbers_accept_strings_with_unit_suffix() {
        let probe: Probe = serde_json::from_value(json!({"duration": "45s"})).unwrap();
        assert_eq!(probe.duration, Some(45.0));
    }

    #[test]
    fn test_single_value_becomes_list() {
        let probe: Probe = serde_json::from_value(json!({"tags": "one"})).unwrap();
        assert_eq!(probe.tags, vec!["one".to_string()]);
    }

    #[test]
    fn test_nulls_default_quietly() {
        let probe: Probe =
            serde_json::from_value(json!({"duration": null, "tags": null, "name": null}))
                .unwrap();
        assert_eq!(probe.duration, None);
        assert!(probe.tags.is_empty());
        assert!(probe.name.is_empty());
    }

    #[test]
    fn test_scalar_name_is_stringified() {
        let probe: Probe = serde_json::from_value(json!({"name": 7})).unwrap();
        assert_eq!(probe.name, "7");
    }
}
