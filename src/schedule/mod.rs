//! Recurring event series, one-off events, academic tasks, and the per-day
//! agenda built from them.

pub mod academic;
pub mod agenda;
pub mod event;
pub mod priority;
pub mod series;

pub use academic::{task_alerts, AcademicTask, TaskAlert, WeeklyClass, REMINDER_DAYS};
pub use agenda::{events_for_date, sort_for_display, Occurrence, OccurrenceSource};
pub use event::{default_end_time, EventDraft, NewEvent, RepeatRule, SingleEvent};
pub use priority::Priority;
pub use series::{EventSeries, RecurrenceKind, SeriesPatch};
