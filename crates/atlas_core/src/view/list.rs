//! Flat list view.
//!
//! # Invariants
//! - Without `sortBy` items keep source order; with it the sort is stable and
//!   items lacking the sort value go last in both directions.
//! - Grouping buckets by the literal raw value, in order of first appearance.
//! - Items lacking the grouping value land in an explicit ungrouped bucket
//!   (always last); nothing is dropped.

use crate::config::EngineConfig;
use crate::model::block::{AtlasDataBlock, DataItem, SortOrder};
use crate::model::schema::SelectOption;
use crate::model::value::{compare_values, value_key};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// List view output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub block_id: String,
    pub items: Vec<DataItem>,
    /// Empty unless the block declares `groupBy`.
    pub groups: Vec<ListGroup>,
}

/// One bucket of a grouped list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListGroup {
    /// Raw grouping value; `None` for the ungrouped bucket.
    pub key: Option<String>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<SelectOption>,
    pub items: Vec<DataItem>,
}

/// Builds the list view from the block's own sort/group hints.
pub fn build(block: &AtlasDataBlock, config: &EngineConfig) -> ListView {
    let items = match block.sort_by.as_deref() {
        Some(key) => sorted(&block.data, key, block.sort_order),
        None => block.data.clone(),
    };
    let groups = match block.group_by.as_deref() {
        Some(key) => group(block, &items, key, config),
        None => Vec::new(),
    };
    ListView {
        block_id: block.id.clone(),
        items,
        groups,
    }
}

/// Returns `items` stably sorted by the raw value of `key`.
pub fn sorted(items: &[DataItem], key: &str, order: SortOrder) -> Vec<DataItem> {
    let mut items = items.to_vec();
    items.sort_by(|a, b| compare_for_sort(a.get(key), b.get(key), order));
    items
}

fn compare_for_sort(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b);
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Buckets `items` by the raw value of `key`.
pub fn group(
    block: &AtlasDataBlock,
    items: &[DataItem],
    key: &str,
    config: &EngineConfig,
) -> Vec<ListGroup> {
    let field = block.field(key);
    let mut groups: Vec<ListGroup> = Vec::new();
    let mut ungrouped = Vec::new();

    for item in items {
        let Some(raw) = item.get(key).and_then(value_key) else {
            ungrouped.push(item.clone());
            continue;
        };
        if let Some(existing) = groups
            .iter_mut()
            .find(|group| group.key.as_deref() == Some(raw.as_str()))
        {
            existing.items.push(item.clone());
            continue;
        }
        let option = field.and_then(|field| field.option(&raw)).cloned();
        let label = option
            .as_ref()
            .map(|option| option.label.clone())
            .unwrap_or_else(|| raw.clone());
        groups.push(ListGroup {
            key: Some(raw),
            label,
            option,
            items: vec![item.clone()],
        });
    }

    if !ungrouped.is_empty() {
        groups.push(ListGroup {
            key: None,
            label: config.ungrouped_label.clone(),
            option: None,
            items: ungrouped,
        });
    }
    groups
}
