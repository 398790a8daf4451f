//! Gallery view: shelf grouping, grid sorting and masonry columns.
//!
//! # Invariants
//! - Shelf groups appear in order of first appearance, keyed by resolved
//!   category label, then raw category, then the uncategorized label.
//! - Every sort key is a total order; ties keep source order.
//! - Masonry places each item in the currently shortest column, leftmost on
//!   ties, so column heights stay balanced.

use crate::config::{EngineConfig, MAX_MASONRY_COLUMNS};
use crate::model::block::{AtlasDataBlock, DataItem};
use crate::model::schema::{FieldType, SelectOption};
use crate::model::value::value_number;
use crate::resolve::dates::parse_datetime;
use crate::view::item_title;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;

const CATEGORY_KEY: &str = "category";
const DATE_KEY: &str = "date";
const LIKES_KEY: &str = "likes";
const HEIGHT_KEYS: &[&str] = &["height", "aspect"];
const DEFAULT_HEIGHT: f64 = 1.0;

/// One gallery card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_option: Option<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<f64>,
    /// Relative card height used for masonry balancing.
    pub height: f64,
    pub item: DataItem,
}

/// One shelf of the browse view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryGroup {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<SelectOption>,
    pub items: Vec<GalleryItem>,
}

/// Sort keys offered by grid and masonry layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GallerySort {
    /// Newest first.
    #[default]
    Date,
    /// Most liked first.
    Likes,
    /// A to Z, case-insensitive.
    Title,
}

impl GallerySort {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" | "newest" => Some(Self::Date),
            "likes" | "popular" => Some(Self::Likes),
            "title" | "name" => Some(Self::Title),
            _ => None,
        }
    }
}

/// Builds gallery cards in source order.
pub fn items(block: &AtlasDataBlock) -> Vec<GalleryItem> {
    let image_key = block
        .cover_field
        .clone()
        .or_else(|| {
            block
                .schema
                .iter()
                .find(|field| matches!(field.field_type, FieldType::Image | FieldType::Avatar))
                .map(|field| field.key.clone())
        });
    let date_key = block
        .date_field
        .clone()
        .or_else(|| {
            block
                .schema
                .iter()
                .find(|field| field.field_type.is_date_like())
                .map(|field| field.key.clone())
        })
        .unwrap_or_else(|| DATE_KEY.to_string());
    let category_field = block.field(CATEGORY_KEY);

    block
        .data
        .iter()
        .map(|item| {
            let category_value = item.text(CATEGORY_KEY);
            let category_option = category_value
                .as_deref()
                .and_then(|value| category_field?.option(value))
                .cloned();
            GalleryItem {
                id: item.id.clone(),
                title: item_title(block, item),
                image: image_key.as_deref().and_then(|key| item.text(key)),
                category_value,
                category_option,
                date: item.get(&date_key).and_then(parse_datetime),
                likes: item.get(LIKES_KEY).and_then(value_number),
                height: HEIGHT_KEYS
                    .iter()
                    .filter_map(|key| item.get(key).and_then(value_number))
                    .find(|height| *height > 0.0)
                    .unwrap_or(DEFAULT_HEIGHT),
                item: item.clone(),
            }
        })
        .collect()
}

/// Groups cards into shelves in order of first appearance.
pub fn group_by_category(items: &[GalleryItem], config: &EngineConfig) -> Vec<GalleryGroup> {
    let mut groups: Vec<GalleryGroup> = Vec::new();
    for item in items {
        let label = item
            .category_option
            .as_ref()
            .map(|option| option.label.clone())
            .or_else(|| item.category_value.clone())
            .unwrap_or_else(|| config.uncategorized_label.clone());
        match groups.iter_mut().find(|group| group.label == label) {
            Some(group) => group.items.push(item.clone()),
            None => groups.push(GalleryGroup {
                label,
                option: item.category_option.clone(),
                items: vec![item.clone()],
            }),
        }
    }
    groups
}

/// Returns `items` stably sorted by `sort`; cards missing the key go last.
pub fn sort_items(items: &[GalleryItem], sort: GallerySort) -> Vec<GalleryItem> {
    let mut sorted = items.to_vec();
    match sort {
        GallerySort::Date => sorted.sort_by(|a, b| descending_present(a.date, b.date)),
        GallerySort::Likes => sorted.sort_by(|a, b| descending_present(a.likes, b.likes)),
        GallerySort::Title => {
            sorted.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
    }
    sorted
}

fn descending_present<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Distributes cards over `column_count` masonry columns.
///
/// The count is capped at [`MAX_MASONRY_COLUMNS`]; zero yields no columns.
pub fn masonry(items: &[GalleryItem], column_count: usize) -> Vec<Vec<GalleryItem>> {
    if column_count == 0 {
        return Vec::new();
    }
    // Why: the count can come from a caller-built config that skipped
    // `validate`, so the column allocation must stay bounded.
    let column_count = column_count.min(MAX_MASONRY_COLUMNS);
    let mut columns: Vec<Vec<GalleryItem>> = vec![Vec::new(); column_count];
    let mut heights = vec![0.0_f64; column_count];

    for item in items {
        let mut shortest = 0;
        for (index, height) in heights.iter().enumerate() {
            if *height < heights[shortest] {
                shortest = index;
            }
        }
        heights[shortest] += item.height;
        columns[shortest].push(item.clone());
    }
    columns
}
