//! Atlas data block engine.
//!
//! Extracts schema-described data blocks from document text and transforms
//! each block into list, kanban, calendar, timeline, tree, graph and gallery
//! structures for external renderers.
//!
//! Every operation is synchronous and pure: callers pass a document snapshot
//! and receive freshly allocated output.

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod view;

pub use config::{ConfigError, EngineConfig};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::block::{AtlasDataBlock, BlockKind, DataItem, SortOrder};
pub use model::schema::{FieldSchema, FieldType, SelectOption};
pub use parser::{
    find_block, parse_blocks, parse_first_block, parse_front_matter, parse_report,
    BlockDecodeError, FrontMatter, ParseReport, SkippedBlock,
};
pub use resolve::display::{DisplayValueResolver, ResolvedValue};
pub use resolve::labels::{field_icon, field_label, LabelResolver, LabelTable, NoLabels};
pub use view::{render, ViewMode, ViewModel, ViewRequest};

/// Returns the engine crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
