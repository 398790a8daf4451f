//! Field label and icon lookup.
//!
//! # Responsibility
//! - Define the injected label/icon registry capability.
//! - Apply the label precedence every view must honor.
//!
//! # Invariants
//! - Label precedence: declared label, then registry lookup, then raw key.
//! - Icon precedence: declared icon, then registry lookup, then none.
//! - Blank strings never win a precedence tier.

use crate::model::schema::FieldSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// External label/icon registry consulted by field key.
pub trait LabelResolver {
    fn label_for(&self, key: &str) -> Option<String>;
    fn icon_for(&self, key: &str) -> Option<String>;
}

/// Registry with no entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLabels;

impl LabelResolver for NoLabels {
    fn label_for(&self, _key: &str) -> Option<String> {
        None
    }

    fn icon_for(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Key-indexed override table, usually read from document front-matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelTable {
    pub labels: BTreeMap<String, String>,
    pub icons: BTreeMap<String, String>,
}

impl LabelTable {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.icons.is_empty()
    }
}

impl LabelResolver for LabelTable {
    fn label_for(&self, key: &str) -> Option<String> {
        self.labels.get(key).cloned()
    }

    fn icon_for(&self, key: &str) -> Option<String> {
        self.icons.get(key).cloned()
    }
}

/// Resolves a label for `key` given an optional declared label.
pub fn resolve_label(key: &str, declared: Option<&str>, registry: &dyn LabelResolver) -> String {
    non_blank(declared.map(str::to_string))
        .or_else(|| non_blank(registry.label_for(key)))
        .unwrap_or_else(|| key.to_string())
}

/// Display label of a schema field.
pub fn field_label(field: &FieldSchema, registry: &dyn LabelResolver) -> String {
    resolve_label(&field.key, Some(field.label.as_str()), registry)
}

/// Icon of a schema field, if any tier provides one.
pub fn field_icon(field: &FieldSchema, registry: &dyn LabelResolver) -> Option<String> {
    non_blank(field.icon.clone()).or_else(|| non_blank(registry.icon_for(&field.key)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
