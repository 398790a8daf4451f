//! Field schema declarations for Atlas data blocks.
//!
//! # Responsibility
//! - Describe one column of a block: key, label, value type and options.
//! - Normalize option declarations so every view sees the same option list.
//!
//! # Invariants
//! - `key` is unique within one block; lookups take the first declaration.
//! - `options` is meaningful only for select-like field types.
//! - Option color is a symbolic token, never a concrete color value.

use crate::model::value::{optional_scalar_string, scalar_string, value_key};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Neutral palette token used when an option declares no usable color.
pub const NEUTRAL_COLOR: &str = "gray";

const COLOR_TOKENS: &[&str] = &[
    "gray", "red", "orange", "yellow", "green", "blue", "purple", "pink", "brown",
];

/// Returns the palette tokens renderers are expected to understand.
pub fn color_tokens() -> &'static [&'static str] {
    COLOR_TOKENS
}

/// Value kind declared by a field.
///
/// Unknown type strings are kept as [`FieldType::Other`] and rendered like text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Number,
    Date,
    Datetime,
    Select,
    Multiselect,
    Status,
    Tags,
    Currency,
    Url,
    Email,
    Phone,
    Boolean,
    Image,
    Avatar,
    File,
    Rating,
    Progress,
    Reference,
    Assignee,
    Object,
    Other(String),
}

impl FieldType {
    /// Parses a declared type string (case-insensitive).
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "string" => Self::Text,
            "textarea" | "longtext" => Self::Textarea,
            "number" => Self::Number,
            "date" => Self::Date,
            "datetime" => Self::Datetime,
            "select" => Self::Select,
            "multiselect" | "multi-select" => Self::Multiselect,
            "status" => Self::Status,
            "tags" => Self::Tags,
            "currency" => Self::Currency,
            "url" => Self::Url,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "boolean" | "checkbox" => Self::Boolean,
            "image" => Self::Image,
            "avatar" => Self::Avatar,
            "file" => Self::File,
            "rating" => Self::Rating,
            "progress" => Self::Progress,
            "reference" | "relation" => Self::Reference,
            "assignee" | "person" => Self::Assignee,
            "object" => Self::Object,
            other => Self::Other(other.to_string()),
        }
    }

    /// Stable string id for this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Status => "status",
            Self::Tags => "tags",
            Self::Currency => "currency",
            Self::Url => "url",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Boolean => "boolean",
            Self::Image => "image",
            Self::Avatar => "avatar",
            Self::File => "file",
            Self::Rating => "rating",
            Self::Progress => "progress",
            Self::Reference => "reference",
            Self::Assignee => "assignee",
            Self::Object => "object",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Whether values of this type are looked up in `options`.
    pub fn is_select_like(&self) -> bool {
        matches!(self, Self::Select | Self::Multiselect | Self::Status)
    }

    /// Whether values of this type hold a calendar date.
    pub fn is_date_like(&self) -> bool {
        matches!(self, Self::Date | Self::Datetime)
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

/// One enumerated value of a select-like field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl SelectOption {
    /// Creates an option whose label equals its value.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            color: None,
            icon: None,
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the color token.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Returns the palette token, falling back to [`NEUTRAL_COLOR`].
    pub fn color_token(&self) -> &str {
        self.color
            .as_deref()
            .map(str::trim)
            .filter(|color| COLOR_TOKENS.contains(color))
            .unwrap_or(NEUTRAL_COLOR)
    }

    /// Decodes either a bare scalar (`todo`) or a mapping with `value`.
    ///
    /// A missing label falls back to the value.
    pub fn from_value(raw: &Value) -> Option<Self> {
        if let Some(value) = value_key(raw) {
            return Some(Self::new(value));
        }
        let map = raw.as_object()?;
        let value = map.get("value").and_then(value_key)?;
        let label = map
            .get("label")
            .and_then(value_key)
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| value.clone());
        Some(Self {
            value,
            label,
            color: map.get("color").and_then(value_key),
            icon: map.get("icon").and_then(value_key),
        })
    }
}

impl<'de> Deserialize<'de> for SelectOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(&raw).ok_or_else(|| {
            D::Error::custom("select option must be a scalar or a mapping with `value`")
        })
    }
}

/// Declared shape of one column within a data block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(deserialize_with = "scalar_string")]
    pub key: String,
    /// Declared display label; blank means "not declared".
    #[serde(default, deserialize_with = "label_string")]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<String>,
}

impl FieldSchema {
    /// Creates a field with no label and no options.
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            field_type,
            options: Vec::new(),
            min: None,
            max: None,
            unit: None,
            currency: None,
            icon: None,
        }
    }

    /// Sets the declared label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replaces the option list.
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    /// Whether the field declares at least one option.
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Finds the option whose value equals `value` (first declaration wins).
    pub fn option(&self, value: &str) -> Option<&SelectOption> {
        self.options.iter().find(|option| option.value == value)
    }
}

fn label_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_scalar_string(deserializer)?.unwrap_or_default())
}
