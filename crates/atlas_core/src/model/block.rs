//! Atlas data block and data item records.
//!
//! # Responsibility
//! - Define the canonical block shape shared by every view transformer.
//! - Keep items as opaque key/value records addressed by a stable `id`.
//!
//! # Invariants
//! - `schema` and `data` are always present on a constructed block; the
//!   parser drops occurrences lacking either instead of defaulting them.
//! - `DataItem::id` is expected to be unique within a block. Duplicates are not
//!   rejected, but id-keyed outputs collapse them.
//! - Blocks are re-derived from document text on every scan and never mutated
//!   in place by transformers.

use crate::model::schema::{FieldSchema, FieldType};
use crate::model::value::{is_empty_value, value_key};
use serde::Serialize;
use serde_json::{Map, Value};

/// Declared block kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Tree,
    Graph,
    Gallery,
    KanbanSource,
    CalendarSource,
    #[default]
    Generic,
}

impl BlockKind {
    /// Parses a declared kind; unknown values map to [`BlockKind::Generic`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "graph" => Self::Graph,
            "gallery" => Self::Gallery,
            "kanban-source" | "kanban" => Self::KanbanSource,
            "calendar-source" | "calendar" => Self::CalendarSource,
            _ => Self::Generic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Graph => "graph",
            Self::Gallery => "gallery",
            Self::KanbanSource => "kanban-source",
            Self::CalendarSource => "calendar-source",
            Self::Generic => "generic",
        }
    }
}

/// Sort direction for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses `asc|desc` (long forms accepted); anything else is ascending.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "desc" | "descending" => Self::Desc,
            _ => Self::Asc,
        }
    }
}

/// One record of a data block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataItem {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DataItem {
    /// Creates an item with no fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Adds one field value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Decodes an item from a raw mapping.
    ///
    /// Returns `None` for non-mapping values. A missing or non-scalar `id`
    /// takes `fallback_id`.
    pub fn from_value(raw: &Value, fallback_id: impl Into<String>) -> Option<Self> {
        let map = raw.as_object()?;
        let id = map
            .get("id")
            .and_then(value_key)
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| fallback_id.into());
        let fields = map
            .iter()
            .filter(|(key, _)| key.as_str() != "id")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self { id, fields })
    }

    /// Returns the raw value for `key`, treating blank values as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !is_empty_value(value))
    }

    /// Returns the scalar string form of `key`.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_key)
    }
}

/// One embedded, schema-described data unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasDataBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub schema: Vec<FieldSchema>,
    pub data: Vec<DataItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swimlane_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_field: Option<String>,
}

impl AtlasDataBlock {
    /// Creates a block with the given schema and data and no view hints.
    pub fn new(
        id: impl Into<String>,
        kind: BlockKind,
        schema: Vec<FieldSchema>,
        data: Vec<DataItem>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            icon: None,
            schema,
            data,
            group_by: None,
            sort_by: None,
            sort_order: SortOrder::Asc,
            swimlane_by: None,
            date_field: None,
            end_date_field: None,
            cover_field: None,
        }
    }

    /// Looks up a field declaration by key.
    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.schema.iter().find(|field| field.key == key)
    }

    /// Returns the first field of the given type, in schema order.
    pub fn first_field_of(&self, field_type: &FieldType) -> Option<&FieldSchema> {
        self.schema
            .iter()
            .find(|field| &field.field_type == field_type)
    }
}
