//! Business logic helpers for daily goals.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::state::PlannerState;
use crate::goals::{self, DailyGoal, GoalPatch, GoalProgress};
use crate::schedule::Priority;

use super::ServiceResult;

pub struct GoalService;

impl GoalService {
    pub fn add(
        state: &mut PlannerState,
        date: NaiveDate,
        title: &str,
        priority: Priority,
    ) -> ServiceResult<Uuid> {
        let goal = DailyGoal::new(title, priority)?;
        Ok(goals::add_goal(&mut state.goals, date, goal))
    }

    /// Returns the new completion state.
    pub fn toggle(state: &mut PlannerState, date: NaiveDate, id: Uuid) -> ServiceResult<bool> {
        Ok(goals::find_goal_mut(&mut state.goals, date, id)?.toggle())
    }

    pub fn update(
        state: &mut PlannerState,
        date: NaiveDate,
        id: Uuid,
        patch: GoalPatch,
    ) -> ServiceResult<()> {
        goals::find_goal_mut(&mut state.goals, date, id)?.apply(patch)
    }

    pub fn delete(state: &mut PlannerState, date: NaiveDate, id: Uuid) -> ServiceResult<DailyGoal> {
        goals::delete_goal(&mut state.goals, date, id)
    }

    pub fn add_step(
        state: &mut PlannerState,
        date: NaiveDate,
        id: Uuid,
        text: &str,
    ) -> ServiceResult<Uuid> {
        goals::find_goal_mut(&mut state.goals, date, id)?.add_step(text)
    }

    pub fn toggle_step(
        state: &mut PlannerState,
        date: NaiveDate,
        id: Uuid,
        step_id: Uuid,
    ) -> ServiceResult<bool> {
        goals::find_goal_mut(&mut state.goals, date, id)?.toggle_step(step_id)
    }

    pub fn delete_step(
        state: &mut PlannerState,
        date: NaiveDate,
        id: Uuid,
        step_id: Uuid,
    ) -> ServiceResult<()> {
        goals::find_goal_mut(&mut state.goals, date, id)?.delete_step(step_id)
    }

    pub fn progress(state: &PlannerState, date: NaiveDate, id: Uuid) -> ServiceResult<GoalProgress> {
        Ok(goals::find_goal(&state.goals, date, id)?.progress())
    }
}
