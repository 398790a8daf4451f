//! Tree outline view and its flattening into graph nodes.
//!
//! # Responsibility
//! - Build an owned node tree from nested `children` arrays.
//! - Flatten that tree for graph and mindmap consumers.
//!
//! # Invariants
//! - Roots have `level` 0; every child has its parent's level plus one.
//! - `type` and `status` resolve against the block schema at every depth.
//! - `flatten` is pre-order and yields exactly one node per tree node.
//! - Nodes own their children; there are no parent back-pointers.

use crate::model::block::{AtlasDataBlock, DataItem};
use crate::model::schema::SelectOption;
use serde::Serialize;
use serde_json::Value;

const CHILDREN_KEY: &str = "children";
const TYPE_KEY: &str = "type";
const STATUS_KEY: &str = "status";
const TITLE_KEYS: &[&str] = &["title", "name", "label"];

/// One node of the outline tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub title: String,
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_option: Option<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_option: Option<SelectOption>,
    /// Item fields without `children`.
    pub item: DataItem,
    pub children: Vec<TreeNode>,
}

/// Flattened tree node, as consumed by graph and mindmap views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_option: Option<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_option: Option<SelectOption>,
}

/// Builds the node tree from the block's items.
pub fn parse(block: &AtlasDataBlock) -> Vec<TreeNode> {
    block
        .data
        .iter()
        .map(|item| build_node(block, item.clone(), 0))
        .collect()
}

fn build_node(block: &AtlasDataBlock, mut item: DataItem, level: usize) -> TreeNode {
    let children = match item.fields.remove(CHILDREN_KEY) {
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                DataItem::from_value(entry, format!("{}-{}", item.id, position + 1))
            })
            .map(|child| build_node(block, child, level + 1))
            .collect(),
        _ => Vec::new(),
    };

    let (type_value, type_option) = resolve_option(block, &item, TYPE_KEY);
    let (status_value, status_option) = resolve_option(block, &item, STATUS_KEY);
    let title = TITLE_KEYS
        .iter()
        .find_map(|key| item.text(key))
        .unwrap_or_else(|| item.id.clone());

    TreeNode {
        id: item.id.clone(),
        title,
        level,
        type_value,
        type_option,
        status_value,
        status_option,
        item,
        children,
    }
}

fn resolve_option(
    block: &AtlasDataBlock,
    item: &DataItem,
    key: &str,
) -> (Option<String>, Option<SelectOption>) {
    let value = item.text(key);
    let option = value
        .as_deref()
        .and_then(|value| block.field(key)?.option(value))
        .cloned();
    (value, option)
}

/// Flattens `nodes` in pre-order.
pub fn flatten(nodes: &[TreeNode]) -> Vec<GraphNode> {
    let mut flat = Vec::with_capacity(count_nodes(nodes));
    for node in nodes {
        flatten_into(node, None, &mut flat);
    }
    flat
}

fn flatten_into(node: &TreeNode, parent_id: Option<&str>, flat: &mut Vec<GraphNode>) {
    flat.push(GraphNode {
        id: node.id.clone(),
        label: node.title.clone(),
        level: node.level,
        parent_id: parent_id.map(str::to_string),
        type_value: node.type_value.clone(),
        type_option: node.type_option.clone(),
        status_value: node.status_value.clone(),
        status_option: node.status_option.clone(),
    });
    for child in &node.children {
        flatten_into(child, Some(&node.id), flat);
    }
}

/// Total node count across all depths.
pub fn count_nodes(nodes: &[TreeNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

/// Deepest `level` present, or `None` for an empty forest.
pub fn max_depth(nodes: &[TreeNode]) -> Option<usize> {
    nodes
        .iter()
        .map(|node| max_depth(&node.children).unwrap_or(node.level))
        .max()
}
