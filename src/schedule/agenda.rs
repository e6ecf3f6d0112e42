use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;

use super::{AcademicTask, EventSeries, Priority, SingleEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceSource {
    Single(Uuid),
    Series(Uuid),
    Task(Uuid),
    TaskReminder(Uuid),
}

/// A concrete entry on the agenda for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub id: String,
    pub date: NaiveDate,
    pub time: String,
    pub end_time: String,
    pub text: String,
    pub priority: Priority,
    pub source: OccurrenceSource,
}

impl Occurrence {
    pub fn is_recurring(&self) -> bool {
        matches!(self.source, OccurrenceSource::Series(_))
    }
}

/// Collects the one-off events stored under `date`, then every series
/// occurrence, then academic tasks due or flagged for study that day.
/// Computed on demand, nothing is cached.
pub fn events_for_date(
    singles: &BTreeMap<NaiveDate, Vec<SingleEvent>>,
    series: &[EventSeries],
    tasks: &[AcademicTask],
    date: NaiveDate,
) -> Vec<Occurrence> {
    let stored = singles.get(&date).into_iter().flatten().map(|event| Occurrence {
        id: event.id.to_string(),
        date,
        time: event.time.clone(),
        end_time: event.end_time.clone(),
        text: event.text.clone(),
        priority: event.priority,
        source: OccurrenceSource::Single(event.id),
    });
    let generated = series
        .iter()
        .filter(|item| item.occurs_on(date))
        .map(|item| Occurrence {
            id: item.occurrence_id(date),
            date,
            time: item.time.clone(),
            end_time: item.end_time.clone(),
            text: item.text.clone(),
            priority: item.priority,
            source: OccurrenceSource::Series(item.group_id),
        });
    let coursework = tasks.iter().filter_map(|task| task.occurrence_on(date));
    stored.chain(generated).chain(coursework).collect()
}

/// Orders by start time; untimed entries sort first. `HH:MM` strings compare
/// correctly as text.
pub fn sort_for_display(occurrences: &mut [Occurrence]) {
    occurrences.sort_by(|a, b| a.time.cmp(&b.time));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn single(time: &str, text: &str) -> SingleEvent {
        SingleEvent {
            id: Uuid::new_v4(),
            time: time.into(),
            end_time: String::new(),
            text: text.into(),
            priority: Priority::Medium,
        }
    }

    #[test]
    fn combines_singles_and_series() {
        let day = date(2024, 1, 4);
        let mut singles = BTreeMap::new();
        singles.insert(day, vec![single("18:00", "Dinner")]);
        singles.insert(date(2024, 1, 5), vec![single("10:00", "Other day")]);
        let mut series = EventSeries::every_n_days(date(2024, 1, 1), 3, "Run");
        series.time = "07:00".into();
        let skipped = EventSeries::every_n_days(date(2024, 1, 2), 2, "Skip");

        let mut agenda = events_for_date(&singles, &[series.clone(), skipped], &[], day);
        assert_eq!(agenda.len(), 2);
        assert!(!agenda[0].is_recurring());
        assert_eq!(agenda[1].id, format!("{}:2024-01-04", series.group_id));

        sort_for_display(&mut agenda);
        assert_eq!(agenda[0].text, "Run");
        assert_eq!(agenda[1].text, "Dinner");
    }

    #[test]
    fn untimed_entries_sort_first() {
        let day = date(2024, 1, 1);
        let mut singles = BTreeMap::new();
        singles.insert(day, vec![single("09:00", "Timed"), single("", "All day")]);
        let mut agenda = events_for_date(&singles, &[], &[], day);
        sort_for_display(&mut agenda);
        assert_eq!(agenda[0].text, "All day");
    }

    #[test]
    fn tasks_follow_events_on_their_days() {
        let day = date(2024, 5, 10);
        let mut singles = BTreeMap::new();
        singles.insert(day, vec![single("", "Laundry")]);
        let exam = AcademicTask::new("exam", "History", date(2024, 5, 17)).unwrap();
        let essay = AcademicTask::new("tp", "Essay", day).unwrap();

        let agenda = events_for_date(&singles, &[], &[exam.clone(), essay.clone()], day);
        assert_eq!(agenda.len(), 3);
        assert_eq!(agenda[0].text, "Laundry");
        assert_eq!(agenda[1].source, OccurrenceSource::TaskReminder(exam.id));
        assert_eq!(agenda[2].id, format!("task:{}:2024-05-10", essay.id));
        assert!(agenda.iter().all(|entry| !entry.is_recurring()));
    }
}
