//! Atlas data block extraction from document text.
//!
//! # Responsibility
//! - Find every fenced ```` ```atlas ```` block in a document body.
//! - Decode each block's YAML into an [`AtlasDataBlock`].
//! - Read the optional front-matter label/icon table and engine config.
//!
//! # Invariants
//! - One malformed block never prevents extraction of its siblings; it is
//!   skipped and reported, not raised.
//! - A block without a non-empty `schema` and `data` is dropped, not
//!   defaulted.
//! - Returned blocks keep their order of appearance in the source text.
//! - A block body ends at the first fence line; an unclosed block is reported
//!   and the next opening fence still starts its own block.

use crate::config::EngineConfig;
use crate::model::block::{AtlasDataBlock, BlockKind, DataItem, SortOrder};
use crate::model::schema::FieldSchema;
use crate::model::value::value_key;
use crate::resolve::labels::LabelTable;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const FENCE_MARKER: &str = "```";

static OPEN_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```atlas[ \t]*$").expect("valid opening fence regex"));
static CLOSE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[ \t]*$").expect("valid closing fence regex"));

/// Why one block occurrence was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockDecodeError {
    /// Block body is not valid YAML.
    Yaml(String),
    /// Top-level YAML value is not a mapping.
    NotAMapping,
    /// `schema` is absent, not a list, or empty.
    MissingSchema,
    /// `data` is absent, not a list, or has no mapping entries.
    MissingData,
    /// A present section has the wrong shape.
    InvalidShape(String),
    /// Opening fence has no closing fence before the next fence or the end.
    Unterminated,
}

impl Display for BlockDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml(message) => write!(f, "block body is not valid yaml: {message}"),
            Self::NotAMapping => write!(f, "block body must be a mapping"),
            Self::MissingSchema => write!(f, "block requires a non-empty `schema` list"),
            Self::MissingData => write!(f, "block requires a non-empty `data` list"),
            Self::InvalidShape(message) => write!(f, "block has invalid shape: {message}"),
            Self::Unterminated => write!(f, "block has no closing fence"),
        }
    }
}

impl Error for BlockDecodeError {}

/// One dropped block occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    /// 0-based index among all fenced occurrences.
    pub index: usize,
    /// 1-based line of the opening fence.
    pub line: usize,
    pub reason: BlockDecodeError,
}

/// Result of scanning a document: decoded blocks plus dropped occurrences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub blocks: Vec<AtlasDataBlock>,
    pub skipped: Vec<SkippedBlock>,
}

/// Scans document text and reports decoded and skipped blocks.
pub fn parse_report(document: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (index, fenced) in fenced_bodies(document).into_iter().enumerate() {
        let decoded = match fenced.body {
            Some(body) => decode_block(body, index),
            None => Err(BlockDecodeError::Unterminated),
        };
        match decoded {
            Ok(block) => report.blocks.push(block),
            Err(reason) => {
                warn!(
                    "event=block_skipped module=parser index={} line={} reason={}",
                    index, fenced.line, reason
                );
                report.skipped.push(SkippedBlock {
                    index,
                    line: fenced.line,
                    reason,
                });
            }
        }
    }

    debug!(
        "event=blocks_parsed module=parser parsed={} skipped={}",
        report.blocks.len(),
        report.skipped.len()
    );
    report
}

/// One ```` ```atlas ```` occurrence; `body` is `None` when unterminated.
struct FencedBody<'a> {
    line: usize,
    body: Option<&'a str>,
}

/// Splits `document` into atlas fence occurrences.
///
/// A body ends at the first line starting with a fence marker. When that line
/// is not a bare closing fence the block is unterminated, and the line is
/// scanned again as a possible opening fence.
fn fenced_bodies(document: &str) -> Vec<FencedBody<'_>> {
    let mut found = Vec::new();
    // (1-based line of the opening fence, byte offset where the body starts)
    let mut open: Option<(usize, usize)> = None;
    let mut offset = 0;

    for (number, raw) in document.split_inclusive('\n').enumerate() {
        let line = raw.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let line_start = offset;
        offset += raw.len();

        if let Some((open_line, body_start)) = open {
            if !line.starts_with(FENCE_MARKER) {
                continue;
            }
            open = None;
            if CLOSE_FENCE_RE.is_match(line) {
                found.push(FencedBody {
                    line: open_line,
                    body: Some(&document[body_start..line_start]),
                });
                continue;
            }
            // Why: an unclosed block must not swallow the sibling whose
            // opening fence ends it.
            found.push(FencedBody {
                line: open_line,
                body: None,
            });
        }

        if OPEN_FENCE_RE.is_match(line) {
            open = Some((number + 1, offset));
        }
    }

    if let Some((open_line, _)) = open {
        found.push(FencedBody {
            line: open_line,
            body: None,
        });
    }
    found
}

/// Returns every well-formed block in order of appearance.
pub fn parse_blocks(document: &str) -> Vec<AtlasDataBlock> {
    parse_report(document).blocks
}

/// Returns the first well-formed block.
pub fn parse_first_block(document: &str) -> Option<AtlasDataBlock> {
    parse_blocks(document).into_iter().next()
}

/// Returns the first well-formed block whose `id` equals `id`.
pub fn find_block(document: &str, id: &str) -> Option<AtlasDataBlock> {
    parse_blocks(document)
        .into_iter()
        .find(|block| block.id == id)
}

/// Decodes one block body.
///
/// `index` is used to derive an id for blocks that declare none.
pub fn decode_block(body: &str, index: usize) -> Result<AtlasDataBlock, BlockDecodeError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(body).map_err(|err| BlockDecodeError::Yaml(err.to_string()))?;
    let value =
        serde_json::to_value(yaml).map_err(|err| BlockDecodeError::InvalidShape(err.to_string()))?;
    let Value::Object(map) = value else {
        return Err(BlockDecodeError::NotAMapping);
    };

    let schema_value = match map.get("schema") {
        Some(Value::Array(fields)) if !fields.is_empty() => Value::Array(fields.clone()),
        _ => return Err(BlockDecodeError::MissingSchema),
    };
    let schema: Vec<FieldSchema> = serde_json::from_value(schema_value)
        .map_err(|err| BlockDecodeError::InvalidShape(format!("schema: {err}")))?;

    let data: Vec<DataItem> = match map.get("data") {
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                DataItem::from_value(entry, format!("item-{}", position + 1))
            })
            .collect(),
        _ => Vec::new(),
    };
    if data.is_empty() {
        return Err(BlockDecodeError::MissingData);
    }

    let id = text_field(&map, &["id"]).unwrap_or_else(|| format!("block-{}", index + 1));
    let mut block = AtlasDataBlock::new(
        id,
        text_field(&map, &["type"])
            .map(|kind| BlockKind::parse(&kind))
            .unwrap_or_default(),
        schema,
        data,
    );
    block.title = text_field(&map, &["title"]);
    block.icon = text_field(&map, &["icon"]);
    block.group_by = text_field(&map, &["groupBy", "group_by"]);
    block.sort_by = text_field(&map, &["sortBy", "sort_by"]);
    block.sort_order = text_field(&map, &["sortOrder", "sort_order"])
        .map(|order| SortOrder::parse(&order))
        .unwrap_or_default();
    block.swimlane_by = text_field(&map, &["swimlaneBy", "swimlane_by"]);
    block.date_field = text_field(&map, &["dateField", "date_field"]);
    block.end_date_field = text_field(&map, &["endDateField", "end_date_field"]);
    block.cover_field = text_field(&map, &["coverField", "cover_field"]);
    Ok(block)
}

fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .filter_map(value_key)
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

/// Atlas settings declared in a document's front-matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub labels: LabelTable,
    pub config: EngineConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatterRecord {
    #[serde(default)]
    atlas: Option<AtlasSection>,
}

#[derive(Debug, Default, Deserialize)]
struct AtlasSection {
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    icons: BTreeMap<String, String>,
    #[serde(default)]
    config: Option<EngineConfig>,
}

/// Reads the `atlas` table from a leading `---` front-matter section.
///
/// Missing or malformed front-matter yields the defaults.
pub fn parse_front_matter(document: &str) -> FrontMatter {
    let Some(body) = front_matter_body(document).filter(|body| !body.trim().is_empty()) else {
        return FrontMatter::default();
    };

    let record: FrontMatterRecord = match serde_yaml::from_str(body) {
        Ok(record) => record,
        Err(err) => {
            warn!(
                "event=front_matter_invalid module=parser reason={}",
                err.to_string().replace('\n', " ")
            );
            return FrontMatter::default();
        }
    };
    let Some(section) = record.atlas else {
        return FrontMatter::default();
    };

    let config = match section.config {
        Some(config) => match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!("event=front_matter_config_rejected module=parser reason={err}");
                EngineConfig::default()
            }
        },
        None => EngineConfig::default(),
    };

    FrontMatter {
        labels: LabelTable {
            labels: section.labels,
            icons: section.icons,
        },
        config,
    }
}

fn front_matter_body(document: &str) -> Option<&str> {
    let document = document.trim_start_matches('\u{feff}');
    let rest = document
        .strip_prefix("---\n")
        .or_else(|| document.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{decode_block, front_matter_body, BlockDecodeError};

    #[test]
    fn front_matter_requires_both_delimiters() {
        assert_eq!(
            front_matter_body("---\ntitle: x\n---\nbody"),
            Some("title: x\n")
        );
        assert_eq!(front_matter_body("---\r\ntitle: x\r\n---"), Some("title: x\r\n"));
        assert_eq!(front_matter_body("---\ntitle: x\n"), None);
        assert_eq!(front_matter_body("# heading\n---\n"), None);
    }

    #[test]
    fn decode_reports_each_structural_failure() {
        assert!(matches!(
            decode_block("schema: [", 0),
            Err(BlockDecodeError::Yaml(_))
        ));
        assert_eq!(
            decode_block("- just\n- a list\n", 0),
            Err(BlockDecodeError::NotAMapping)
        );
        assert_eq!(
            decode_block("data:\n  - id: a\n", 0),
            Err(BlockDecodeError::MissingSchema)
        );
        assert_eq!(
            decode_block("schema:\n  - key: title\ndata: []\n", 0),
            Err(BlockDecodeError::MissingData)
        );
        assert!(matches!(
            decode_block("schema:\n  - label: no key\ndata:\n  - id: a\n", 0),
            Err(BlockDecodeError::InvalidShape(_))
        ));
    }

    #[test]
    fn decode_fills_missing_ids() {
        let block = decode_block("schema:\n  - key: title\ndata:\n  - title: a\n  - id: 7\n", 2)
            .expect("block should decode");
        assert_eq!(block.id, "block-3");
        assert_eq!(block.data[0].id, "item-1");
        assert_eq!(block.data[1].id, "7");
    }
}
