//! Calendar arithmetic on plain dates.
//!
//! Every helper works on `NaiveDate` values, so comparisons are by calendar
//! value and never by wall-clock instant. Day arithmetic goes through chrono,
//! which keeps results valid Gregorian dates instead of rolling a day-of-month
//! overflow into the next month.

mod month_key;

pub use month_key::{month_slot, MonthKey};

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::errors::{PlannerError, Result};

pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Number of cells in a month grid (six Monday-based weeks).
pub const MONTH_GRID_CELLS: usize = 42;

pub fn to_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` string. Out-of-range components (`2024-02-30`) are
/// rejected rather than normalized.
pub fn from_iso(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT)
        .map_err(|_| PlannerError::InvalidDateFormat(value.to_string()))
}

/// Signed whole-day difference `b - a`.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Builds the date for `day` in the given month, clamping to the month's last
/// day (the 31st becomes the 30th in April).
pub fn clamp_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let day = day.clamp(1, last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    let delta = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(delta)
}

/// Dates of the Monday-based week containing `date`.
pub fn week_days(date: NaiveDate) -> [NaiveDate; 7] {
    let start = monday_on_or_before(date);
    std::array::from_fn(|offset| add_days(start, offset as i64))
}

/// How many times `weekday` falls in `start..=end`. A reversed range counts
/// zero.
pub fn count_weekday_between(weekday: Weekday, start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let shift = (7 + i64::from(weekday.num_days_from_monday())
        - i64::from(start.weekday().num_days_from_monday()))
        % 7;
    let first = add_days(start, shift);
    if first > end {
        return 0;
    }
    1 + (days_between(first, end) / 7) as u32
}

/// The 42 cells of a month view, starting on the Monday on or before the 1st.
pub fn month_grid(year: i32, month: u32) -> Result<[NaiveDate; MONTH_GRID_CELLS]> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| PlannerError::InvalidMonthKey(format!("{year:04}-{month:02}")))?;
    let start = monday_on_or_before(first);
    Ok(std::array::from_fn(|offset| add_days(start, offset as i64)))
}

/// Serde adapter for optional dates stored as `YYYY-MM-DD`, where an empty
/// string (or `null`) means "not set".
pub mod optional_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.collect_str(&date.format(super::ISO_FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::from_iso(text).map(Some).map_err(de::Error::custom),
        }
    }
}
