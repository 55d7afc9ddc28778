pub mod dress;
pub mod product;
pub mod user;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::table::{parse_float, parse_int};

/// Client input that cannot be turned into a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("No valid fields to update")]
    EmptyUpdate,
}

/// Forms post numbers as strings and text fields sometimes as numbers, so
/// payload fields accept either. `null` counts as absent.
pub(crate) fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Integer from a number or string; unparsable text becomes 0.
pub(crate) fn loose_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(
            n.as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .unwrap_or(0),
        ),
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(parse_int(&s).unwrap_or(0)),
        Some(_) => Some(0),
    })
}

/// Decimal from a number or string; unparsable text becomes 0.
pub(crate) fn loose_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(n.as_f64().unwrap_or(0.0)),
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(parse_float(&s).unwrap_or(0.0)),
        Some(_) => Some(0.0),
    })
}

/// Required text field: present and not blank.
pub(crate) fn required(value: Option<String>, field: &'static str) -> Result<String, InputError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(InputError::Missing(field)),
    }
}

/// Store `value` into `slot` when present and note `field` as changed.
pub(crate) fn assign<T>(slot: &mut T, value: Option<T>, field: &'static str, changed: &mut Vec<&'static str>) {
    if let Some(v) = value {
        *slot = v;
        changed.push(field);
    }
}

/// Optional query-string integer. Blank means absent.
pub fn query_int(value: Option<&str>, field: &'static str) -> Result<Option<i64>, InputError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_int(v).map(Some).ok_or_else(|| InputError::Invalid {
            field,
            reason: format!("\"{v}\" is not a number"),
        }),
    }
}

/// Lower-cased, trimmed search term, if any.
pub(crate) fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

pub(crate) fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct LooseFields {
        #[serde(default, deserialize_with = "loose_text")]
        text: Option<String>,
        #[serde(default, deserialize_with = "loose_int")]
        int: Option<i64>,
        #[serde(default, deserialize_with = "loose_float")]
        float: Option<f64>,
    }

    fn loose_fields(json: &str) -> LooseFields {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_loose_fields_accept_numbers_and_strings() {
        let p = loose_fields(r#"{"text": 12, "int": "7 phút", "float": "12.5"}"#);
        assert_eq!(p.text.as_deref(), Some("12"));
        assert_eq!(p.int, Some(7));
        assert_eq!(p.float, Some(12.5));

        let p = loose_fields(r#"{"text": "DR1", "int": 3.9, "float": 10000}"#);
        assert_eq!(p.text.as_deref(), Some("DR1"));
        assert_eq!(p.int, Some(3));
        assert_eq!(p.float, Some(10000.0));
    }

    #[test]
    fn test_loose_fields_absent_null_blank() {
        let p = loose_fields("{}");
        assert!(p.text.is_none() && p.int.is_none() && p.float.is_none());

        let p = loose_fields(r#"{"text": null, "int": "", "float": null}"#);
        assert!(p.text.is_none() && p.int.is_none() && p.float.is_none());

        let p = loose_fields(r#"{"int": "abc", "float": "n/a"}"#);
        assert_eq!(p.int, Some(0));
        assert_eq!(p.float, Some(0.0));
    }

    #[test]
    fn test_required_and_query_int() {
        assert_eq!(required(Some(" DR1 ".into()), "dress_code"), Ok("DR1".to_string()));
        assert_eq!(required(Some("  ".into()), "dress_code"), Err(InputError::Missing("dress_code")));
        assert_eq!(required(None, "name").unwrap_err().to_string(), "name is required");

        assert_eq!(query_int(Some("5"), "time_dap"), Ok(Some(5)));
        assert_eq!(query_int(Some(" "), "time_dap"), Ok(None));
        assert_eq!(query_int(None, "time_dap"), Ok(None));
        assert!(query_int(Some("x"), "time_dap").is_err());
    }

    #[test]
    fn test_search_term() {
        assert_eq!(search_term(Some("  LUXury ")).as_deref(), Some("luxury"));
        assert_eq!(search_term(Some("   ")), None);
        assert!(contains_ci("Váy cưới LUXURY", "luxury"));
    }
}
