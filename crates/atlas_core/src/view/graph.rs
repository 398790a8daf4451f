//! Relationship graph view.
//!
//! # Invariants
//! - `edges` yields one edge per item and does not check that endpoints name
//!   existing nodes; renderers decide what to do with dangling edges.
//! - The graph keeps only nodes referenced by at least one edge. The tree
//!   outline over the same data keeps every node.

use crate::model::block::AtlasDataBlock;
use crate::model::schema::SelectOption;
use crate::view::tree::{self, GraphNode};
use serde::Serialize;
use std::collections::HashSet;

const SOURCE_KEY: &str = "source";
const TARGET_KEY: &str = "target";
const RELATION_KEY: &str = "relation";
const HIERARCHY_RELATION: &str = "child";

/// One directed relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_option: Option<SelectOption>,
}

/// Nodes and edges ready for a graph renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Derives one edge per item of an edge-list block.
pub fn edges(block: &AtlasDataBlock) -> Vec<GraphEdge> {
    let relation_field = block.field(RELATION_KEY);
    block
        .data
        .iter()
        .map(|item| {
            let relation = item.text(RELATION_KEY);
            let relation_option = relation
                .as_deref()
                .and_then(|value| relation_field?.option(value))
                .cloned();
            GraphEdge {
                id: item.id.clone(),
                source: item.text(SOURCE_KEY).unwrap_or_default(),
                target: item.text(TARGET_KEY).unwrap_or_default(),
                relation,
                relation_option,
            }
        })
        .collect()
}

/// Parent-to-child edges implied by flattened tree nodes.
pub fn hierarchy_edges(nodes: &[GraphNode]) -> Vec<GraphEdge> {
    nodes
        .iter()
        .filter_map(|node| {
            let parent = node.parent_id.as_ref()?;
            Some(GraphEdge {
                id: format!("{parent}->{}", node.id),
                source: parent.clone(),
                target: node.id.clone(),
                relation: Some(HIERARCHY_RELATION.to_string()),
                relation_option: None,
            })
        })
        .collect()
}

/// Keeps the nodes referenced by at least one edge, in input order.
pub fn connected_nodes(nodes: Vec<GraphNode>, edges: &[GraphEdge]) -> Vec<GraphNode> {
    // Why: a node without edges has no position in a relationship layout;
    // the tree outline is where isolated roots stay visible.
    let referenced: HashSet<&str> = edges
        .iter()
        .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
        .collect();
    nodes
        .into_iter()
        .filter(|node| referenced.contains(node.id.as_str()))
        .collect()
}

/// Combines a tree block's nodes with an edge-list block's edges.
pub fn build(tree_block: &AtlasDataBlock, edge_block: &AtlasDataBlock) -> GraphView {
    let nodes = tree::flatten(&tree::parse(tree_block));
    let edge_list = edges(edge_block);
    GraphView {
        nodes: connected_nodes(nodes, &edge_list),
        edges: edge_list,
    }
}

/// Mindmap graph of a single tree block, linked by its hierarchy.
pub fn build_hierarchy(tree_block: &AtlasDataBlock) -> GraphView {
    let nodes = tree::flatten(&tree::parse(tree_block));
    let edge_list = hierarchy_edges(&nodes);
    GraphView {
        nodes: connected_nodes(nodes, &edge_list),
        edges: edge_list,
    }
}
