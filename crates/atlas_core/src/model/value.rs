//! Opaque field values and their scalar projections.
//!
//! # Responsibility
//! - Keep stored item values untyped (`serde_json::Value`) until a field's
//!   schema type asks for an interpretation.
//! - Provide the shared scalar helpers used for identity matching and sorting.
//!
//! # Invariants
//! - Identity comparisons (option lookup, grouping, cell placement) always go
//!   through [`value_key`], so `1` and `"1"` address the same bucket.
//! - Null and blank strings are "empty" for every field type.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::cmp::Ordering;

/// Returns the string form used for identity comparisons.
///
/// Only scalars have a key; arrays, objects and null return `None`.
pub fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Returns whether a raw value counts as absent for display and grouping.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Interprets a raw value as a number, accepting numeric strings.
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Total order over raw values used by list sorting.
///
/// Numeric values (numbers and numeric strings) come first, ordered
/// numerically; every other value follows, ordered by its string key.
/// Callers handle missing values separately.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (value_number(left), value_number(right)) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        // Why: mixing numeric and lexical comparison per pair is not
        // transitive (`9 < 10`, `10 < 1a`, `1a < 9`), so the two ranks stay apart.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            let a = value_key(left).unwrap_or_default();
            let b = value_key(right).unwrap_or_default();
            a.cmp(&b)
        }
    }
}

/// Serde adapter accepting a string, number or boolean as a string.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_key(&value).ok_or_else(|| D::Error::custom("expected a scalar value"))
}

/// Serde adapter for optional scalar strings.
pub(crate) fn optional_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_key))
}
