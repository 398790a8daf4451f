//! Display value resolution for one field value.
//!
//! # Responsibility
//! - Turn a raw stored value plus its field schema into a human-readable
//!   string and, for select-like fields, the matching option.
//!
//! # Invariants
//! - Missing, null and blank values resolve to the empty sentinel for every
//!   field type.
//! - Unmapped option values fall back to their raw string form.
//! - Resolution is pure: the same `(schema, raw)` pair always resolves the
//!   same way.

use crate::config::{EngineConfig, DEFAULT_CURRENCY, DEFAULT_EMPTY_DISPLAY};
use crate::model::block::DataItem;
use crate::model::schema::{FieldSchema, FieldType, SelectOption};
use crate::model::value::{is_empty_value, value_key, value_number};
use crate::resolve::dates::{format_long_date, format_long_datetime, parse_local};
use crate::resolve::format::{format_currency, stringify};
use serde::Serialize;
use serde_json::Value;

/// Resolved form of one field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedValue {
    pub display_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<SelectOption>,
}

impl ResolvedValue {
    fn plain(display_value: String) -> Self {
        Self {
            display_value,
            option: None,
        }
    }
}

/// Resolves raw values into display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayValueResolver {
    empty_display: String,
    default_currency: String,
}

impl Default for DisplayValueResolver {
    fn default() -> Self {
        Self {
            empty_display: DEFAULT_EMPTY_DISPLAY.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl DisplayValueResolver {
    /// Builds a resolver from engine defaults.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            empty_display: config.empty_display.clone(),
            default_currency: config.default_currency.clone(),
        }
    }

    /// The sentinel used for empty values.
    pub fn empty_display(&self) -> &str {
        &self.empty_display
    }

    /// Resolves the value of `schema.key` on `item`.
    pub fn resolve_item(&self, schema: &FieldSchema, item: &DataItem) -> ResolvedValue {
        self.resolve(schema, item.fields.get(&schema.key))
    }

    /// Resolves one raw value; `None` stands for an absent key.
    pub fn resolve(&self, schema: &FieldSchema, raw: Option<&Value>) -> ResolvedValue {
        let Some(raw) = raw.filter(|value| !is_empty_value(value)) else {
            return self.empty();
        };

        match &schema.field_type {
            FieldType::Select | FieldType::Status => match value_key(raw) {
                Some(key) => {
                    let option = schema.option(&key).cloned();
                    let display_value = option
                        .as_ref()
                        .map(|option| option.label.clone())
                        .unwrap_or(key);
                    ResolvedValue {
                        display_value,
                        option,
                    }
                }
                None => self.resolve_multi(schema, raw),
            },
            FieldType::Multiselect => self.resolve_multi(schema, raw),
            FieldType::Date => match parse_local(raw) {
                Some(parsed) => ResolvedValue::plain(format_long_date(parsed.at.date())),
                None => ResolvedValue::plain(stringify(raw)),
            },
            FieldType::Datetime => match parse_local(raw) {
                Some(parsed) if parsed.date_only => {
                    ResolvedValue::plain(format_long_date(parsed.at.date()))
                }
                Some(parsed) => ResolvedValue::plain(format_long_datetime(parsed.at)),
                None => ResolvedValue::plain(stringify(raw)),
            },
            FieldType::Currency => match value_number(raw) {
                Some(amount) => {
                    let code = schema
                        .currency
                        .as_deref()
                        .filter(|code| !code.trim().is_empty())
                        .unwrap_or(&self.default_currency);
                    ResolvedValue::plain(format_currency(amount, code))
                }
                None => ResolvedValue::plain(stringify(raw)),
            },
            FieldType::Tags => {
                let tags = tag_list(raw);
                if tags.is_empty() {
                    self.empty()
                } else {
                    ResolvedValue::plain(tags.join(", "))
                }
            }
            _ => ResolvedValue::plain(stringify(raw)),
        }
    }

    fn resolve_multi(&self, schema: &FieldSchema, raw: &Value) -> ResolvedValue {
        let values = tag_list(raw);
        if values.is_empty() {
            return self.empty();
        }
        let mut first_option = None;
        let labels: Vec<String> = values
            .into_iter()
            .map(|value| match schema.option(&value) {
                Some(option) => {
                    if first_option.is_none() {
                        first_option = Some(option.clone());
                    }
                    option.label.clone()
                }
                None => value,
            })
            .collect();
        ResolvedValue {
            display_value: labels.join(", "),
            option: first_option,
        }
    }

    fn empty(&self) -> ResolvedValue {
        ResolvedValue::plain(self.empty_display.clone())
    }
}

/// Finds the option of `schema` matching a raw value's string form.
pub fn find_option<'a>(schema: &'a FieldSchema, raw: &Value) -> Option<&'a SelectOption> {
    value_key(raw).and_then(|key| schema.option(&key))
}

/// Interprets a raw value as a tag list.
///
/// Arrays are used as-is. Strings are first decoded as a JSON array and
/// otherwise split on commas. Blank entries are dropped.
pub fn tag_list(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(values) => values
            .iter()
            .filter_map(value_key)
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        Value::String(text) => {
            if let Ok(Value::Array(values)) = serde_json::from_str::<Value>(text) {
                return tag_list(&Value::Array(values));
            }
            text.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        }
        other => value_key(other).into_iter().collect(),
    }
}
