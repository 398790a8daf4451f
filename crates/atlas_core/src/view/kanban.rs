//! Kanban board view: one-dimensional columns and two-dimensional swimlanes.
//!
//! # Invariants
//! - Columns follow option declaration order and exist even when empty.
//! - Swimlanes hold the full cross-product of swimlane and column options.
//! - A grouping field without declared options yields an empty board.
//! - Items whose raw value matches no column (or no cell) are dropped.

use crate::model::block::{AtlasDataBlock, DataItem};
use crate::model::schema::{FieldSchema, SelectOption};
use log::debug;
use serde::Serialize;

/// One board column backed by a select option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KanbanColumn {
    /// Option value the column collects.
    pub id: String,
    pub title: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub items: Vec<DataItem>,
}

impl KanbanColumn {
    fn from_option(option: &SelectOption) -> Self {
        Self {
            id: option.value.clone(),
            title: option.label.clone(),
            color: option.color_token().to_string(),
            icon: option.icon.clone(),
            items: Vec::new(),
        }
    }
}

/// One horizontal lane holding a full set of columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KanbanSwimlane {
    pub id: String,
    pub title: String,
    pub color: String,
    pub columns: Vec<KanbanColumn>,
}

impl KanbanSwimlane {
    /// Items across every column of the lane.
    pub fn item_count(&self) -> usize {
        self.columns.iter().map(|column| column.items.len()).sum()
    }
}

/// Board layout chosen from the block's hints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", content = "lanes", rename_all = "snake_case")]
pub enum KanbanBoard {
    Columns(Vec<KanbanColumn>),
    Swimlanes(Vec<KanbanSwimlane>),
}

/// Builds columns for `group_field`.
pub fn columns(block: &AtlasDataBlock, group_field: &str) -> Vec<KanbanColumn> {
    let Some(field) = options_field(block, group_field) else {
        return Vec::new();
    };

    let mut columns: Vec<KanbanColumn> =
        field.options.iter().map(KanbanColumn::from_option).collect();
    let mut dropped = 0usize;

    for item in &block.data {
        let value = item.text(group_field);
        match columns
            .iter_mut()
            .find(|column| Some(column.id.as_str()) == value.as_deref())
        {
            Some(column) => column.items.push(item.clone()),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            "event=kanban_items_dropped module=view block={} field={} dropped={}",
            block.id, group_field, dropped
        );
    }
    columns
}

/// Builds the swimlane × column cross-product.
pub fn swimlanes(
    block: &AtlasDataBlock,
    group_field: &str,
    swimlane_field: &str,
) -> Vec<KanbanSwimlane> {
    let (Some(column_field), Some(lane_field)) = (
        options_field(block, group_field),
        options_field(block, swimlane_field),
    ) else {
        return Vec::new();
    };

    let mut lanes: Vec<KanbanSwimlane> = lane_field
        .options
        .iter()
        .map(|lane| KanbanSwimlane {
            id: lane.value.clone(),
            title: lane.label.clone(),
            color: lane.color_token().to_string(),
            columns: column_field
                .options
                .iter()
                .map(KanbanColumn::from_option)
                .collect(),
        })
        .collect();
    let mut dropped = 0usize;

    for item in &block.data {
        let lane_value = item.text(swimlane_field);
        let column_value = item.text(group_field);
        let cell = lanes
            .iter_mut()
            .find(|lane| Some(lane.id.as_str()) == lane_value.as_deref())
            .and_then(|lane| {
                lane.columns
                    .iter_mut()
                    .find(|column| Some(column.id.as_str()) == column_value.as_deref())
            });
        match cell {
            Some(column) => column.items.push(item.clone()),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            "event=kanban_items_dropped module=view block={} field={} swimlane={} dropped={}",
            block.id, group_field, swimlane_field, dropped
        );
    }
    lanes
}

/// Builds the board from `groupBy` and optional `swimlaneBy`.
///
/// Returns `None` when the block declares no `groupBy`.
pub fn board(block: &AtlasDataBlock) -> Option<KanbanBoard> {
    let group_field = block.group_by.as_deref()?;
    Some(match block.swimlane_by.as_deref() {
        Some(lane_field) => KanbanBoard::Swimlanes(swimlanes(block, group_field, lane_field)),
        None => KanbanBoard::Columns(columns(block, group_field)),
    })
}

fn options_field<'a>(block: &'a AtlasDataBlock, key: &str) -> Option<&'a FieldSchema> {
    block.field(key).filter(|field| field.has_options())
}
