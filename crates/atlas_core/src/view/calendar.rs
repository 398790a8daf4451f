//! Calendar view: event derivation, month grids and day assignment.
//!
//! # Responsibility
//! - Derive dated events from block items under the local wall-clock policy.
//! - Synthesize Sunday-first month grids padded with adjacent-month days.
//! - Place events on every grid day their span covers.
//!
//! # Invariants
//! - `month_grid` returns complete 7-day weeks, at most 6, covering the
//!   whole month.
//! - Events are sorted ascending by start; ties keep source order.
//! - An event end earlier than its start is clamped to the start.

use crate::model::block::{AtlasDataBlock, DataItem};
use crate::model::schema::FieldType;
use crate::resolve::dates::parse_local;
use crate::view::item_title;
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

const MAX_WEEKS: usize = 6;

/// One dated item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// Local wall-clock start.
    pub start: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    /// Start was given without a time of day.
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub item: DataItem,
}

impl CalendarEvent {
    /// Last instant the event covers (`end`, or `start` when absent).
    pub fn effective_end(&self) -> NaiveDateTime {
        self.end.unwrap_or(self.start)
    }

    /// Whether the event's span touches `day` at day granularity.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start.date() <= day && self.effective_end().date() >= day
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Day belongs to the requested month rather than the padding.
    pub in_month: bool,
    pub events: Vec<CalendarEvent>,
}

/// Seven consecutive days, Sunday first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarWeek {
    pub days: Vec<CalendarDay>,
}

/// Derives events from `date_field` (and optional `end_date_field`).
///
/// Items without a parseable start are dropped. The event color comes from
/// the first select-like field whose value maps to an option.
pub fn parse_events(
    block: &AtlasDataBlock,
    date_field: &str,
    end_date_field: Option<&str>,
) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = block
        .data
        .iter()
        .filter_map(|item| {
            let start = parse_local(item.get(date_field)?)?;
            // Why: an end before the start would make the event cover no
            // grid day; clamping keeps it visible on its start day.
            let end = end_date_field
                .and_then(|key| item.get(key))
                .and_then(parse_local)
                .map(|end| end.at.max(start.at));
            Some(CalendarEvent {
                id: item.id.clone(),
                title: item_title(block, item),
                start: start.at,
                end,
                all_day: start.date_only,
                color: event_color(block, item),
                item: item.clone(),
            })
        })
        .collect();
    events.sort_by(|a, b| a.start.cmp(&b.start));
    events
}

/// Derives events from the block's own `dateField`/`endDateField` hints,
/// falling back to the first date-typed field.
pub fn block_events(block: &AtlasDataBlock) -> Vec<CalendarEvent> {
    let date_field = block.date_field.clone().or_else(|| {
        block
            .schema
            .iter()
            .find(|field| field.field_type.is_date_like())
            .map(|field| field.key.clone())
    });
    match date_field {
        Some(date_field) => parse_events(block, &date_field, block.end_date_field.as_deref()),
        None => Vec::new(),
    }
}

fn event_color(block: &AtlasDataBlock, item: &DataItem) -> Option<String> {
    block
        .schema
        .iter()
        .filter(|field| matches!(field.field_type, FieldType::Select | FieldType::Status))
        .find_map(|field| {
            let value = item.text(&field.key)?;
            field.option(&value).map(|option| option.color_token().to_string())
        })
}

/// Builds the Sunday-first grid for `month` (1-12) of `year`.
///
/// Weeks are generated until one ends past the month's last day, capped at
/// six. An invalid month yields no weeks.
pub fn month_grid(year: i32, month: u32) -> Vec<CalendarWeek> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let Some(last) = last_day_of_month(first) else {
        return Vec::new();
    };

    let mut cursor = week_start(first);
    let mut weeks = Vec::new();
    while weeks.len() < MAX_WEEKS {
        let mut days = Vec::with_capacity(7);
        for _ in 0..7 {
            days.push(CalendarDay {
                date: cursor,
                in_month: cursor.month() == month && cursor.year() == year,
                events: Vec::new(),
            });
            let Some(next) = cursor.succ_opt() else {
                weeks.push(CalendarWeek { days });
                return weeks;
            };
            cursor = next;
        }
        weeks.push(CalendarWeek { days });
        if cursor > last {
            break;
        }
    }
    weeks
}

/// Returns `weeks` with each event placed on every day it covers.
pub fn assign_to_grid(weeks: &[CalendarWeek], events: &[CalendarEvent]) -> Vec<CalendarWeek> {
    weeks
        .iter()
        .map(|week| CalendarWeek {
            days: week
                .days
                .iter()
                .map(|day| CalendarDay {
                    date: day.date,
                    in_month: day.in_month,
                    events: events_on(events, day.date),
                })
                .collect(),
        })
        .collect()
}

/// Events whose span covers `day`, in input order.
pub fn events_on(events: &[CalendarEvent], day: NaiveDate) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|event| event.covers(day))
        .cloned()
        .collect()
}

/// The Sunday-to-Saturday week containing `anchor`, each at local midnight.
pub fn week_days(anchor: NaiveDate) -> [NaiveDateTime; 7] {
    let start = week_start(anchor);
    std::array::from_fn(|offset| {
        start
            .checked_add_days(Days::new(offset as u64))
            .unwrap_or(start)
            .and_time(NaiveTime::MIN)
    })
}

/// Moves `(year, month)` by `delta` months.
pub fn shift_month(year: i32, month: u32, delta: i32) -> Option<(i32, u32)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let shifted = if delta >= 0 {
        first.checked_add_months(Months::new(delta.unsigned_abs()))?
    } else {
        first.checked_sub_months(Months::new(delta.unsigned_abs()))?
    };
    Some((shifted.year(), shifted.month()))
}

fn week_start(day: NaiveDate) -> NaiveDate {
    let back = u64::from(day.weekday().num_days_from_sunday());
    day.checked_sub_days(Days::new(back)).unwrap_or(day)
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    first.checked_add_months(Months::new(1))?.pred_opt()
}
