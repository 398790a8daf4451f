//! Timeline view.
//!
//! Field roles come from [`TimelineRoles`] when set; otherwise they are
//! inferred from schema order:
//! - title: first `text` field not keyed `assignee`
//! - description: first `textarea` field
//! - team: first `tags` field
//! - progress: the field keyed `progress`
//!
//! Inference depends on schema ordering and naming, so its matching order is
//! kept fixed.

use crate::model::block::{AtlasDataBlock, DataItem};
use crate::model::schema::FieldType;
use crate::model::value::value_number;
use crate::resolve::dates::parse_datetime;
use crate::resolve::display::tag_list;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const PROGRESS_KEY: &str = "progress";
const ASSIGNEE_KEY: &str = "assignee";

/// Explicit role-to-field mapping. Unset roles fall back to inference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineRoles {
    pub date: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub team: Option<String>,
    pub progress: Option<String>,
}

/// One dated entry of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    pub id: String,
    pub date: NaiveDateTime,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub team: Vec<String>,
    /// Percentage in `0..=100`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    pub item: DataItem,
}

struct ResolvedRoles {
    date: String,
    title: Option<String>,
    description: Option<String>,
    team: Option<String>,
    progress: String,
}

/// Builds timeline events sorted ascending by date (stable).
///
/// Returns nothing when no date field can be determined.
pub fn build(block: &AtlasDataBlock, roles: &TimelineRoles) -> Vec<TimelineEvent> {
    let Some(roles) = resolve_roles(block, roles) else {
        return Vec::new();
    };

    let mut events: Vec<TimelineEvent> = block
        .data
        .iter()
        .filter_map(|item| {
            let date = parse_datetime(item.get(&roles.date)?)?;
            Some(TimelineEvent {
                id: item.id.clone(),
                date,
                title: roles
                    .title
                    .as_deref()
                    .and_then(|key| item.text(key))
                    .unwrap_or_else(|| item.id.clone()),
                description: roles.description.as_deref().and_then(|key| item.text(key)),
                team: roles
                    .team
                    .as_deref()
                    .and_then(|key| item.get(key))
                    .map(tag_list)
                    .unwrap_or_default(),
                progress: item
                    .get(&roles.progress)
                    .and_then(value_number)
                    .map(|value| value.clamp(0.0, 100.0)),
                item: item.clone(),
            })
        })
        .collect();
    events.sort_by(|a, b| a.date.cmp(&b.date));
    events
}

fn resolve_roles(block: &AtlasDataBlock, roles: &TimelineRoles) -> Option<ResolvedRoles> {
    let date = roles
        .date
        .clone()
        .or_else(|| block.date_field.clone())
        .or_else(|| {
            block
                .schema
                .iter()
                .find(|field| field.field_type.is_date_like())
                .map(|field| field.key.clone())
        })?;

    let title = roles.title.clone().or_else(|| {
        block
            .schema
            .iter()
            .find(|field| field.field_type == FieldType::Text && field.key != ASSIGNEE_KEY)
            .map(|field| field.key.clone())
    });
    let description = roles.description.clone().or_else(|| {
        block
            .first_field_of(&FieldType::Textarea)
            .map(|field| field.key.clone())
    });
    let team = roles
        .team
        .clone()
        .or_else(|| block.first_field_of(&FieldType::Tags).map(|field| field.key.clone()));
    let progress = roles
        .progress
        .clone()
        .unwrap_or_else(|| PROGRESS_KEY.to_string());

    Some(ResolvedRoles {
        date,
        title,
        description,
        team,
        progress,
    })
}
