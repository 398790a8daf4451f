//! Local wall-clock date parsing and long-form date formatting.
//!
//! # Invariants
//! - Timestamps without `Z` or an explicit offset are local wall-clock time:
//!   components are read individually and never shifted.
//! - Timestamps with `Z` or an offset are converted into local wall-clock.
//! - Numbers are epoch milliseconds.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[Tt ](\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?)?\s*(Z|z|[+-]\d{2}(?::?\d{2})?)?$",
    )
    .expect("valid timestamp regex")
});

/// A parsed timestamp in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimestamp {
    pub at: NaiveDateTime,
    /// Input carried no time-of-day component.
    pub date_only: bool,
}

/// Parses a raw value into a local wall-clock timestamp.
pub fn parse_local(raw: &Value) -> Option<LocalTimestamp> {
    match raw {
        Value::String(text) => parse_local_str(text),
        Value::Number(number) => {
            let millis = number.as_i64()?;
            let utc = DateTime::<Utc>::from_timestamp_millis(millis)?;
            Some(LocalTimestamp {
                at: utc.with_timezone(&Local).naive_local(),
                date_only: false,
            })
        }
        _ => None,
    }
}

/// Parses a raw value and returns only the timestamp.
pub fn parse_datetime(raw: &Value) -> Option<NaiveDateTime> {
    parse_local(raw).map(|parsed| parsed.at)
}

/// Parses `YYYY-MM-DD[THH:MM[:SS[.fff]]][Z|±HH[:MM]]`.
pub fn parse_local_str(text: &str) -> Option<LocalTimestamp> {
    let caps = TIMESTAMP_RE.captures(text.trim())?;
    let number = |index: usize| -> Option<u32> {
        caps.get(index).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?;
    let date_only = caps.get(4).is_none();
    let nanos = match caps.get(7) {
        Some(frac) => {
            let digits = frac.as_str();
            let scale = 10u32.pow(9 - digits.len() as u32);
            digits.parse::<u32>().ok()? * scale
        }
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(number(4)?, number(5)?, number(6)?, nanos)?;
    let wall_clock = date.and_time(time);

    let Some(offset) = caps.get(8) else {
        return Some(LocalTimestamp {
            at: wall_clock,
            date_only,
        });
    };

    let offset = parse_offset(offset.as_str())?;
    let fixed = offset.from_local_datetime(&wall_clock).single()?;
    Some(LocalTimestamp {
        at: fixed.with_timezone(&Local).naive_local(),
        date_only: false,
    })
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let digits: String = text[1..].chars().filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = match digits.get(2..4) {
        Some(value) => value.parse().ok()?,
        None => 0,
    };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Long en-US date form, e.g. `June 15, 2025`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Long en-US date form with a 12-hour time, e.g. `June 15, 2025 9:05 AM`.
pub fn format_long_datetime(at: NaiveDateTime) -> String {
    at.format("%B %-d, %Y %-I:%M %p").to_string()
}
