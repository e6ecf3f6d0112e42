//! Academic tasks that show up on the agenda, and weekly classes whose
//! session count follows from their term dates.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{self, count_weekday_between, days_between};
use crate::errors::{PlannerError, Result};

use super::{Occurrence, OccurrenceSource, Priority};

/// Days before the due date on which a study reminder appears.
pub const REMINDER_DAYS: [i64; 2] = [14, 7];

/// An exam, assignment or other dated coursework item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicTask {
    pub id: Uuid,
    /// Free-form kind such as "exam" or "tp", shown upper-cased.
    #[serde(rename = "type", default)]
    pub kind: String,
    pub title: String,
    pub date: NaiveDate,
}

impl AcademicTask {
    pub fn new(kind: &str, title: &str, date: NaiveDate) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PlannerError::Validation("task title is required".into()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind: kind.trim().to_string(),
            title: title.to_string(),
            date,
        })
    }

    fn label(&self) -> String {
        if self.kind.is_empty() {
            self.title.clone()
        } else {
            format!("{}: {}", self.kind.to_uppercase(), self.title)
        }
    }

    /// Whole days from `today` until the due date.
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        days_between(today, self.date)
    }

    /// The agenda entry this task contributes to `date`: the task itself on
    /// its due date, or a study reminder exactly 14 or 7 days before.
    pub fn occurrence_on(&self, date: NaiveDate) -> Option<Occurrence> {
        let key = calendar::to_iso(date);
        let days_left = self.days_left(date);
        if days_left == 0 {
            return Some(Occurrence {
                id: format!("task:{}:{key}", self.id),
                date,
                time: String::new(),
                end_time: String::new(),
                text: self.label(),
                priority: Priority::High,
                source: OccurrenceSource::Task(self.id),
            });
        }
        if !REMINDER_DAYS.contains(&days_left) {
            return None;
        }
        let lead = if days_left == 14 { "2 weeks left" } else { "1 week left" };
        Some(Occurrence {
            id: format!("taskwarn:{}:{key}", self.id),
            date,
            time: String::new(),
            end_time: String::new(),
            text: format!("Study ({lead}): {}", self.label()),
            priority: Priority::Medium,
            source: OccurrenceSource::TaskReminder(self.id),
        })
    }
}

/// A task whose reminder falls on the day asked about.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskAlert {
    pub task_id: Uuid,
    pub text: String,
    pub due: NaiveDate,
    pub days_left: i64,
}

/// Tasks exactly 7 or 14 days away from `today`, nearest first.
pub fn task_alerts(tasks: &[AcademicTask], today: NaiveDate) -> Vec<TaskAlert> {
    let mut alerts: Vec<TaskAlert> = tasks
        .iter()
        .filter(|task| REMINDER_DAYS.contains(&task.days_left(today)))
        .map(|task| TaskAlert {
            task_id: task.id,
            text: task.label(),
            due: task.date,
            days_left: task.days_left(today),
        })
        .collect();
    alerts.sort_by_key(|alert| alert.days_left);
    alerts
}

const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// A class held on the same weekday every week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyClass {
    pub id: Uuid,
    pub subject: String,
    /// 0 = Sunday.
    pub day: u32,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, with = "calendar::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "calendar::optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub done: u32,
}

impl WeeklyClass {
    pub fn new(subject: &str, weekday: Weekday, start: &str, end: &str) -> Result<Self> {
        let subject = subject.trim();
        if subject.is_empty() || start.trim().is_empty() || end.trim().is_empty() {
            return Err(PlannerError::Validation(
                "class needs a subject, a start and an end time".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            day: weekday.num_days_from_sunday(),
            start: start.trim().to_string(),
            end: end.trim().to_string(),
            color: String::new(),
            start_date: None,
            end_date: None,
            total: 0,
            done: 0,
        })
    }

    /// Sets the term and recounts the sessions it holds.
    pub fn with_term(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self.total = self
            .weekday()
            .map(|weekday| count_weekday_between(weekday, start_date, end_date))
            .unwrap_or(0);
        self
    }

    pub fn weekday(&self) -> Option<Weekday> {
        SUNDAY_FIRST.get(self.day as usize).copied()
    }

    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.done)
    }
}
