use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{self, add_days, days_between};
use crate::errors::{PlannerError, Result};

use super::Priority;

const WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecurrenceKind {
    #[default]
    #[serde(alias = "days")]
    EveryNDays,
    Weekly,
}

/// A recurring event definition. Occurrences are derived on demand and never
/// stored, so edits apply to every past and future occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSeries {
    pub group_id: Uuid,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub time: String,
    #[serde(default, alias = "end")]
    pub end_time: String,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, alias = "kind")]
    pub recurrence_kind: RecurrenceKind,
    /// Day step for `EveryNDays`; ignored by `Weekly`.
    #[serde(default = "EventSeries::default_interval", alias = "every")]
    pub interval: u32,
    #[serde(default, with = "calendar::optional_date")]
    pub until: Option<NaiveDate>,
    /// Maximum number of occurrences; zero means unbounded.
    #[serde(default, alias = "times")]
    pub occurrence_limit: u32,
    #[serde(default)]
    pub canceled: bool,
}

/// In-place edit applied to a series. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SeriesPatch {
    pub text: Option<String>,
    pub time: Option<String>,
    pub end_time: Option<String>,
    pub priority: Option<Priority>,
    pub interval: Option<u32>,
    pub until: Option<Option<NaiveDate>>,
    pub occurrence_limit: Option<u32>,
}

impl EventSeries {
    fn default_interval() -> u32 {
        WEEK_DAYS as u32
    }

    pub fn every_n_days(start_date: NaiveDate, interval: u32, text: impl Into<String>) -> Self {
        Self {
            group_id: Uuid::new_v4(),
            start_date,
            time: String::new(),
            end_time: String::new(),
            text: text.into(),
            priority: Priority::default(),
            recurrence_kind: RecurrenceKind::EveryNDays,
            interval,
            until: None,
            occurrence_limit: 0,
            canceled: false,
        }
    }

    pub fn weekly(start_date: NaiveDate, text: impl Into<String>) -> Self {
        Self {
            recurrence_kind: RecurrenceKind::Weekly,
            interval: WEEK_DAYS as u32,
            ..Self::every_n_days(start_date, WEEK_DAYS as u32, text)
        }
    }

    pub fn with_until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.occurrence_limit = limit;
        self
    }

    /// Day step between consecutive occurrences, if the series is well formed.
    fn step(&self) -> Option<i64> {
        match self.recurrence_kind {
            RecurrenceKind::Weekly => Some(WEEK_DAYS),
            RecurrenceKind::EveryNDays if self.interval >= 2 => Some(i64::from(self.interval)),
            RecurrenceKind::EveryNDays => None,
        }
    }

    /// Decides whether the series produces an occurrence on `date`.
    ///
    /// A canceled series never occurs. An `EveryNDays` series with an interval
    /// below 2 is malformed and never occurs either.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        if self.canceled || date < self.start_date {
            return false;
        }
        let diff = days_between(self.start_date, date);
        let index = match self.recurrence_kind {
            RecurrenceKind::Weekly => {
                if date.weekday() != self.start_date.weekday() {
                    return false;
                }
                diff / WEEK_DAYS
            }
            RecurrenceKind::EveryNDays => {
                let Some(step) = self.step() else {
                    return false;
                };
                if diff % step != 0 {
                    return false;
                }
                diff / step
            }
        };
        if self.until.is_some_and(|until| date > until) {
            return false;
        }
        if self.occurrence_limit > 0 && index >= i64::from(self.occurrence_limit) {
            return false;
        }
        true
    }

    /// Stable identity of the synthesized occurrence on `date`.
    pub fn occurrence_id(&self, date: NaiveDate) -> String {
        format!("{}:{}", self.group_id, calendar::to_iso(date))
    }

    /// Occurrence dates within the inclusive range, ascending.
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let Some(step) = self.step() else {
            return Vec::new();
        };
        if self.canceled || to < from {
            return Vec::new();
        }
        let lower = from.max(self.start_date);
        let offset = days_between(self.start_date, lower);
        let first_index = (offset + step - 1).div_euclid(step);
        let mut cursor = add_days(self.start_date, first_index * step);
        let mut dates = Vec::new();
        while cursor <= to {
            if !self.occurs_on(cursor) {
                // Past `until` or the occurrence cap; nothing later can occur.
                break;
            }
            dates.push(cursor);
            cursor = add_days(cursor, step);
        }
        dates
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(PlannerError::Validation("event text is required".into()));
        }
        if self.recurrence_kind == RecurrenceKind::EveryNDays && self.interval < 2 {
            return Err(PlannerError::Validation(format!(
                "a repeating event must repeat every 2 days or more (got {})",
                self.interval
            )));
        }
        if self.until.is_some_and(|until| until < self.start_date) {
            return Err(PlannerError::Validation(
                "series end date precedes its start date".into(),
            ));
        }
        Ok(())
    }

    /// Applies `patch` in place, leaving the series untouched when the result
    /// would be invalid.
    pub fn apply(&mut self, patch: SeriesPatch) -> Result<()> {
        let mut updated = self.clone();
        if let Some(text) = patch.text {
            updated.text = text.trim().to_string();
        }
        if let Some(time) = patch.time {
            updated.time = time.trim().to_string();
        }
        if let Some(end_time) = patch.end_time {
            updated.end_time = end_time.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            updated.priority = priority;
        }
        if let Some(interval) = patch.interval {
            updated.interval = interval;
        }
        if let Some(until) = patch.until {
            updated.until = until;
        }
        if let Some(limit) = patch.occurrence_limit {
            updated.occurrence_limit = limit;
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn every_three_days_hits_only_the_step() {
        let series = EventSeries::every_n_days(date(2024, 1, 1), 3, "Water plants");
        let hits: Vec<u32> = (1..=10)
            .filter(|day| series.occurs_on(date(2024, 1, *day)))
            .collect();
        assert_eq!(hits, vec![1, 4, 7, 10]);
        assert!(!series.occurs_on(date(2023, 12, 29)));
    }

    #[test]
    fn weekly_ignores_interval() {
        // 2024-01-03 is a Wednesday.
        let mut series = EventSeries::weekly(date(2024, 1, 3), "Standup");
        series.interval = 3;
        for offset in 0..60 {
            let day = add_days(date(2024, 1, 3), offset);
            assert_eq!(
                series.occurs_on(day),
                day.weekday() == chrono::Weekday::Wed,
                "{day}"
            );
        }
    }

    #[test]
    fn canceled_series_never_occurs() {
        let mut series = EventSeries::every_n_days(date(2024, 1, 1), 2, "Gym");
        series.canceled = true;
        assert!(!series.occurs_on(date(2024, 1, 1)));
        assert!(series
            .occurrences_between(date(2024, 1, 1), date(2024, 12, 31))
            .is_empty());
    }

    #[test]
    fn until_is_inclusive() {
        let series = EventSeries::every_n_days(date(2024, 1, 1), 2, "Course")
            .with_until(date(2024, 1, 5));
        assert!(series.occurs_on(date(2024, 1, 5)));
        assert!(!series.occurs_on(date(2024, 1, 7)));
    }

    #[test]
    fn limit_caps_occurrence_count() {
        let series = EventSeries::weekly(date(2024, 1, 3), "Lesson").with_limit(3);
        let dates = series.occurrences_between(date(2023, 1, 1), date(2030, 1, 1));
        assert_eq!(
            dates,
            vec![date(2024, 1, 3), date(2024, 1, 10), date(2024, 1, 17)]
        );
    }

    #[test]
    fn malformed_interval_never_occurs() {
        let series = EventSeries::every_n_days(date(2024, 1, 1), 1, "Bad");
        assert!(!series.occurs_on(date(2024, 1, 1)));
        assert!(!series.occurs_on(date(2024, 1, 2)));
        assert!(series.validate().is_err());
        let zero = EventSeries::every_n_days(date(2024, 1, 1), 0, "Bad");
        assert!(!zero.occurs_on(date(2024, 1, 1)));
        assert!(zero
            .occurrences_between(date(2024, 1, 1), date(2024, 2, 1))
            .is_empty());
    }

    #[test]
    fn occurrences_between_aligns_to_the_step() {
        let series = EventSeries::every_n_days(date(2024, 1, 1), 5, "Backup");
        assert_eq!(
            series.occurrences_between(date(2024, 1, 3), date(2024, 1, 20)),
            vec![date(2024, 1, 6), date(2024, 1, 11), date(2024, 1, 16)]
        );
    }

    #[test]
    fn occurrence_id_is_group_and_date() {
        let series = EventSeries::weekly(date(2024, 1, 3), "Standup");
        assert_eq!(
            series.occurrence_id(date(2024, 1, 10)),
            format!("{}:2024-01-10", series.group_id)
        );
    }

    #[test]
    fn apply_rejects_invalid_patch_without_mutating() {
        let mut series = EventSeries::every_n_days(date(2024, 1, 1), 3, "Run");
        let err = series.apply(SeriesPatch {
            interval: Some(1),
            text: Some("Walk".into()),
            ..SeriesPatch::default()
        });
        assert!(err.is_err());
        assert_eq!(series.text, "Run");
        assert_eq!(series.interval, 3);

        series
            .apply(SeriesPatch {
                interval: Some(4),
                until: Some(Some(date(2024, 2, 1))),
                ..SeriesPatch::default()
            })
            .unwrap();
        assert!(series.occurs_on(date(2024, 1, 5)));
        assert!(!series.occurs_on(date(2024, 1, 4)));
    }

    #[test]
    fn loads_legacy_series_fields() {
        let raw = json!({
            "groupId": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "startDate": "2024-01-01",
            "time": "09:00",
            "end": "10:00",
            "text": "Class",
            "priority": "alta",
            "every": 7,
            "kind": "weekly",
            "until": "",
            "times": 0,
            "canceled": false
        });
        let series: EventSeries = serde_json::from_value(raw).unwrap();
        assert_eq!(series.recurrence_kind, RecurrenceKind::Weekly);
        assert_eq!(series.end_time, "10:00");
        assert_eq!(series.priority, Priority::High);
        assert_eq!(series.until, None);
        let back = serde_json::to_value(&series).unwrap();
        assert_eq!(back["recurrenceKind"], "weekly");
        assert_eq!(back["until"], "");
    }
}
