//! Business logic helpers for recurring series, one-off events, academic
//! tasks and weekly classes.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::state::PlannerState;
use crate::errors::PlannerError;
use crate::schedule::{
    AcademicTask, EventDraft, EventSeries, NewEvent, SeriesPatch, SingleEvent, WeeklyClass,
};

use super::ServiceResult;

/// Where a newly submitted event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedEvent {
    Single { date: NaiveDate, id: Uuid },
    Series { group_id: Uuid },
}

pub struct ScheduleService;

impl ScheduleService {
    /// Stores a submitted event as a one-off or a series depending on its
    /// repeat rule.
    pub fn add_event(
        state: &mut PlannerState,
        draft: EventDraft,
        fallback_date: NaiveDate,
    ) -> ServiceResult<CreatedEvent> {
        match draft.build(fallback_date)? {
            NewEvent::Single(date, event) => {
                let id = Self::add_single_event(state, date, event)?;
                Ok(CreatedEvent::Single { date, id })
            }
            NewEvent::Series(series) => {
                let group_id = Self::add_series(state, series)?;
                Ok(CreatedEvent::Series { group_id })
            }
        }
    }

    pub fn add_series(state: &mut PlannerState, series: EventSeries) -> ServiceResult<Uuid> {
        series.validate()?;
        if state.series.iter().any(|item| item.group_id == series.group_id) {
            return Err(PlannerError::Validation(format!(
                "series {} already exists",
                series.group_id
            )));
        }
        let id = series.group_id;
        tracing::debug!(group_id = %id, kind = ?series.recurrence_kind, "adding series");
        state.series.push(series);
        Ok(id)
    }

    /// Edits a series in place; the change applies to every occurrence.
    pub fn edit_series(state: &mut PlannerState, group_id: Uuid, patch: SeriesPatch) -> ServiceResult<()> {
        Self::series_mut(state, group_id)?.apply(patch)
    }

    /// Keeps the definition but stops it from producing occurrences.
    pub fn cancel_series(state: &mut PlannerState, group_id: Uuid) -> ServiceResult<()> {
        Self::series_mut(state, group_id)?.canceled = true;
        Ok(())
    }

    pub fn delete_series(state: &mut PlannerState, group_id: Uuid) -> ServiceResult<EventSeries> {
        let index = state
            .series
            .iter()
            .position(|item| item.group_id == group_id)
            .ok_or_else(|| PlannerError::not_found("series", group_id))?;
        Ok(state.series.remove(index))
    }

    pub fn add_single_event(
        state: &mut PlannerState,
        date: NaiveDate,
        event: SingleEvent,
    ) -> ServiceResult<Uuid> {
        if event.text.trim().is_empty() {
            return Err(PlannerError::Validation("event text is required".into()));
        }
        let id = event.id;
        state.singles.entry(date).or_default().push(event);
        Ok(id)
    }

    /// Removes a one-off event; an emptied date key is dropped.
    pub fn delete_single_event(
        state: &mut PlannerState,
        date: NaiveDate,
        id: Uuid,
    ) -> ServiceResult<SingleEvent> {
        let day = state
            .singles
            .get_mut(&date)
            .ok_or_else(|| PlannerError::not_found("event", id))?;
        let index = day
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| PlannerError::not_found("event", id))?;
        let removed = day.remove(index);
        if day.is_empty() {
            state.singles.remove(&date);
        }
        Ok(removed)
    }

    pub fn add_task(state: &mut PlannerState, task: AcademicTask) -> Uuid {
        let id = task.id;
        tracing::debug!(task = %id, due = %task.date, "adding academic task");
        state.tasks.push(task);
        state.tasks.sort_by_key(|item| item.date);
        id
    }

    pub fn delete_task(state: &mut PlannerState, id: Uuid) -> ServiceResult<AcademicTask> {
        let index = state
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| PlannerError::not_found("academic task", id))?;
        Ok(state.tasks.remove(index))
    }

    /// Stores a class; the list stays ordered by weekday, then start time.
    pub fn add_class(state: &mut PlannerState, class: WeeklyClass) -> Uuid {
        let id = class.id;
        state.classes.push(class);
        state
            .classes
            .sort_by(|a, b| a.day.cmp(&b.day).then_with(|| a.start.cmp(&b.start)));
        id
    }

    pub fn delete_class(state: &mut PlannerState, id: Uuid) -> ServiceResult<WeeklyClass> {
        let index = state
            .classes
            .iter()
            .position(|class| class.id == id)
            .ok_or_else(|| PlannerError::not_found("class", id))?;
        Ok(state.classes.remove(index))
    }

    fn series_mut(state: &mut PlannerState, group_id: Uuid) -> ServiceResult<&mut EventSeries> {
        state
            .series
            .iter_mut()
            .find(|item| item.group_id == group_id)
            .ok_or_else(|| PlannerError::not_found("series", group_id))
    }
}
