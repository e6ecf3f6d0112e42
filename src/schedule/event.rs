use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{PlannerError, Result};

use super::{EventSeries, Priority, RecurrenceKind};

const DEFAULT_DURATION_MINUTES: u32 = 60;
const LAST_MINUTE_OF_DAY: u32 = 23 * 60 + 59;

/// A one-off event stored under its date key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleEvent {
    pub id: Uuid,
    #[serde(default)]
    pub time: String,
    #[serde(default, alias = "end")]
    pub end_time: String,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
}

/// Form input for a new event; `repeat` turns it into a series.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub date: Option<NaiveDate>,
    pub time: String,
    pub end_time: String,
    pub text: String,
    pub priority: Priority,
    pub repeat: Option<RepeatRule>,
}

#[derive(Debug, Clone)]
pub struct RepeatRule {
    pub kind: RecurrenceKind,
    pub interval: u32,
    pub until: Option<NaiveDate>,
    pub occurrence_limit: u32,
}

/// What an [`EventDraft`] turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum NewEvent {
    Single(NaiveDate, SingleEvent),
    Series(EventSeries),
}

impl EventDraft {
    /// Builds the stored event. A missing end time defaults to one hour after
    /// the start time, capped at 23:59.
    pub fn build(self, fallback_date: NaiveDate) -> Result<NewEvent> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(PlannerError::Validation("event text is required".into()));
        }
        let date = self.date.unwrap_or(fallback_date);
        let time = self.time.trim().to_string();
        let mut end_time = self.end_time.trim().to_string();
        if end_time.is_empty() && !time.is_empty() {
            end_time = default_end_time(&time);
        }
        match self.repeat {
            Some(rule) => {
                let interval = match rule.kind {
                    RecurrenceKind::Weekly => 7,
                    RecurrenceKind::EveryNDays => rule.interval,
                };
                let series = EventSeries {
                    group_id: Uuid::new_v4(),
                    start_date: date,
                    time,
                    end_time,
                    text,
                    priority: self.priority,
                    recurrence_kind: rule.kind,
                    interval,
                    until: rule.until,
                    occurrence_limit: rule.occurrence_limit,
                    canceled: false,
                };
                series.validate()?;
                Ok(NewEvent::Series(series))
            }
            None => Ok(NewEvent::Single(
                date,
                SingleEvent {
                    id: Uuid::new_v4(),
                    time,
                    end_time,
                    text,
                    priority: self.priority,
                },
            )),
        }
    }
}

/// `HH:MM` plus the default duration, clamped to the same day. Unparseable
/// input is returned unchanged.
pub fn default_end_time(time: &str) -> String {
    add_minutes(time, DEFAULT_DURATION_MINUTES)
}

fn add_minutes(time: &str, minutes: u32) -> String {
    let Some((hours, mins)) = time.trim().split_once(':') else {
        return time.to_string();
    };
    let (Ok(hours), Ok(mins)) = (hours.parse::<u32>(), mins.parse::<u32>()) else {
        return time.to_string();
    };
    let total = (hours * 60 + mins + minutes).min(LAST_MINUTE_OF_DAY);
    format!("{:02}:{:02}", total / 60, total % 60)
}
