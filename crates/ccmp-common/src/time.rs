//! Calendar helpers: day windows around lattice buckets and date ranges.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How a day window is placed relative to its anchor date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAlignment {
    /// The window starts on the anchor date.
    #[default]
    Start,
    /// The window is centered on the anchor date (±3 days for a week).
    Centered,
}

/// Consecutive calendar days covering `days` days around `anchor`.
///
/// For a centered window of even length the extra day falls after the anchor.
pub fn day_window(anchor: NaiveDate, days: u32, alignment: WindowAlignment) -> Vec<NaiveDate> {
    let first = match alignment {
        WindowAlignment::Start => anchor,
        WindowAlignment::Centered => anchor - Duration::days(((days.max(1) - 1) / 2) as i64),
    };
    first.iter_days().take(days as usize).collect()
}

/// All days from `start` through `end`, inclusive. Empty when `end < start`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// All days of a calendar month, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(
        first
            .iter_days()
            .take_while(|d| d.month() == month)
            .collect(),
    )
}

/// Parse a timestamp as written in lattice tables.
///
/// Accepts RFC 3339 (`1993-01-17T00:00:00Z`, `1993-01-17T00:00:00.000Z`),
/// a naive datetime (assumed UTC), or a bare date.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// Epoch of a CF `hours since <timestamp>` units string.
pub fn hours_since_epoch(units: &str) -> Option<DateTime<Utc>> {
    let rest = units.trim().strip_prefix("hours since")?;
    parse_timestamp(rest).ok()
}

/// Decode CF hour offsets against `epoch`. Fractional hours are kept to the second.
pub fn decode_hours(epoch: DateTime<Utc>, hours: &[f64]) -> Vec<DateTime<Utc>> {
    hours
        .iter()
        .map(|h| epoch + Duration::seconds((h * 3600.0).round() as i64))
        .collect()
}

/// Format a bucket timestamp the way trial output lines print it.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}
