//! Lenient deserializers for fields whose wire type drifted across remote
//! schema versions.
//!
//! Node and choice ids arrive as either strings or integers, flags as
//! booleans, numbers or strings, and roll parameters as numbers or numeric
//! strings. Everything is normalized here so the rest of the system only
//! ever sees `String`, `bool` and `Option<i64>`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Identifier that must be present; `null` and missing become an empty string.
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_id(deserializer)?.unwrap_or_default())
}

/// Value whose `null` means the same as a missing field.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional identifier; empty strings are treated as absent.
pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| value_to_id(&v)))
}

/// Flag accepting `true`, non-zero numbers and `"true"`/`"1"`/`"yes"`/`"on"`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        _ => false,
    })
}

/// Integer that silently becomes `None` when it cannot be interpreted.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "super::opt_id")]
        id: Option<String>,
        #[serde(default, deserialize_with = "super::flag")]
        on: bool,
        #[serde(default, deserialize_with = "super::lenient_int")]
        n: Option<i64>,
        #[serde(default, deserialize_with = "super::null_default")]
        title: String,
        #[serde(default, deserialize_with = "super::null_default")]
        items: Vec<u32>,
    }

    fn fields(json: &str) -> Fields {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn numeric_ids_become_strings() {
        assert_eq!(fields(r#"{"id": 12}"#).id.as_deref(), Some("12"));
        assert_eq!(fields(r#"{"id": " node_01 "}"#).id.as_deref(), Some("node_01"));
        assert_eq!(fields(r#"{"id": ""}"#).id, None);
        assert_eq!(fields(r#"{"id": null}"#).id, None);
        assert_eq!(fields("{}").id, None);
    }

    #[test]
    fn flags_accept_loose_truthiness() {
        assert!(fields(r#"{"on": true}"#).on);
        assert!(fields(r#"{"on": 1}"#).on);
        assert!(fields(r#"{"on": "Yes"}"#).on);
        assert!(!fields(r#"{"on": "no"}"#).on);
        assert!(!fields(r#"{"on": null}"#).on);
        assert!(!fields("{}").on);
    }

    #[test]
    fn ints_tolerate_strings_and_garbage() {
        assert_eq!(fields(r#"{"n": 6}"#).n, Some(6));
        assert_eq!(fields(r#"{"n": "20"}"#).n, Some(20));
        assert_eq!(fields(r#"{"n": 4.9}"#).n, Some(4));
        assert_eq!(fields(r#"{"n": "d20"}"#).n, None);
        assert_eq!(fields(r#"{"n": [1]}"#).n, None);
    }

    #[test]
    fn null_collections_and_text_fall_back_to_empty() {
        let nulls = fields(r#"{"title": null, "items": null}"#);
        assert_eq!(nulls.title, "");
        assert!(nulls.items.is_empty());

        let missing = fields("{}");
        assert_eq!(missing.title, "");
        assert!(missing.items.is_empty());

        let present = fields(r#"{"title": "Cave", "items": [1, 2]}"#);
        assert_eq!(present.title, "Cave");
        assert_eq!(present.items, vec![1, 2]);
    }
}
