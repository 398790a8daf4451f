//! View transformers.
//!
//! # Responsibility
//! - Turn one [`AtlasDataBlock`] into the structure a view renderer paints.
//! - Dispatch a requested view mode to its transformer.
//!
//! # Invariants
//! - Transformers are pure functions of their inputs; nothing is cached or
//!   retained between calls.
//! - Outputs copy ids and values out of the block and never borrow from it.

pub mod calendar;
pub mod gallery;
pub mod graph;
pub mod kanban;
pub mod list;
pub mod timeline;
pub mod tree;

use crate::config::EngineConfig;
use crate::model::block::{AtlasDataBlock, DataItem};
use crate::model::schema::FieldType;
use calendar::{CalendarEvent, CalendarWeek};
use gallery::{GalleryGroup, GalleryItem, GallerySort};
use graph::GraphView;
use kanban::KanbanBoard;
use list::ListView;
use log::debug;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use timeline::{TimelineEvent, TimelineRoles};
use tree::TreeNode;

const TITLE_KEYS: &[&str] = &["title", "name"];

/// The seven structural views of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    List,
    Kanban,
    Calendar,
    Timeline,
    Tree,
    Graph,
    Gallery,
}

impl ViewMode {
    pub const ALL: [ViewMode; 7] = [
        Self::List,
        Self::Kanban,
        Self::Calendar,
        Self::Timeline,
        Self::Tree,
        Self::Graph,
        Self::Gallery,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Kanban => "kanban",
            Self::Calendar => "calendar",
            Self::Timeline => "timeline",
            Self::Tree => "tree",
            Self::Graph => "graph",
            Self::Gallery => "gallery",
        }
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View mode plus its per-view parameters.
#[derive(Debug, Clone)]
pub enum ViewRequest<'a> {
    List,
    Kanban,
    Calendar { year: i32, month: u32 },
    Timeline(TimelineRoles),
    Tree,
    /// With `edges`, nodes come from the rendered block and relationships from
    /// the edge-list block; without, the tree hierarchy supplies the edges.
    Graph { edges: Option<&'a AtlasDataBlock> },
    Gallery { sort: GallerySort },
}

impl ViewRequest<'_> {
    pub fn mode(&self) -> ViewMode {
        match self {
            Self::List => ViewMode::List,
            Self::Kanban => ViewMode::Kanban,
            Self::Calendar { .. } => ViewMode::Calendar,
            Self::Timeline(_) => ViewMode::Timeline,
            Self::Tree => ViewMode::Tree,
            Self::Graph { .. } => ViewMode::Graph,
            Self::Gallery { .. } => ViewMode::Gallery,
        }
    }
}

/// View-ready output of one transformer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ViewModel {
    List(ListView),
    Kanban { board: KanbanBoard },
    Calendar {
        events: Vec<CalendarEvent>,
        weeks: Vec<CalendarWeek>,
    },
    Timeline { events: Vec<TimelineEvent> },
    Tree { roots: Vec<TreeNode> },
    Graph(GraphView),
    Gallery {
        groups: Vec<GalleryGroup>,
        items: Vec<GalleryItem>,
        masonry: Vec<Vec<GalleryItem>>,
    },
}

/// Runs the transformer for `request` over `block`.
pub fn render(
    block: &AtlasDataBlock,
    request: &ViewRequest<'_>,
    config: &EngineConfig,
) -> ViewModel {
    let model = match request {
        ViewRequest::List => ViewModel::List(list::build(block, config)),
        ViewRequest::Kanban => ViewModel::Kanban {
            board: kanban::board(block).unwrap_or(KanbanBoard::Columns(Vec::new())),
        },
        ViewRequest::Calendar { year, month } => {
            let events = calendar::block_events(block);
            let weeks = calendar::assign_to_grid(&calendar::month_grid(*year, *month), &events);
            ViewModel::Calendar { events, weeks }
        }
        ViewRequest::Timeline(roles) => ViewModel::Timeline {
            events: timeline::build(block, roles),
        },
        ViewRequest::Tree => ViewModel::Tree {
            roots: tree::parse(block),
        },
        ViewRequest::Graph { edges } => ViewModel::Graph(match edges {
            Some(edge_block) => graph::build(block, edge_block),
            None => graph::build_hierarchy(block),
        }),
        ViewRequest::Gallery { sort } => {
            let cards = gallery::items(block);
            let sorted = gallery::sort_items(&cards, *sort);
            ViewModel::Gallery {
                groups: gallery::group_by_category(&cards, config),
                masonry: gallery::masonry(&sorted, config.masonry_columns),
                items: sorted,
            }
        }
    };
    debug!(
        "event=view_rendered module=view block={} mode={}",
        block.id,
        request.mode()
    );
    model
}

/// Display title of an item: `title`, `name`, the first text field, then id.
pub fn item_title(block: &AtlasDataBlock, item: &DataItem) -> String {
    TITLE_KEYS
        .iter()
        .find_map(|key| item.text(key))
        .or_else(|| {
            block
                .schema
                .iter()
                .filter(|field| field.field_type == FieldType::Text)
                .find_map(|field| item.text(&field.key))
        })
        .unwrap_or_else(|| item.id.clone())
}
