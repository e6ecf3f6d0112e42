use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{PlannerError, Result};
use crate::schedule::Priority;

/// Daily goals keyed by the day they are currently assigned to.
pub type DailyGoals = BTreeMap<NaiveDate, Vec<DailyGoal>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalStep {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGoal {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub steps: Vec<GoalStep>,
}

#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    pub all: usize,
    pub done: usize,
    pub percent: u8,
}

impl DailyGoal {
    pub fn new(title: &str, priority: Priority) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            title: required(title, "goal title")?,
            priority,
            notes: String::new(),
            done: false,
            steps: Vec::new(),
        })
    }

    /// Flips completion. Completing a goal completes all of its steps.
    pub fn toggle(&mut self) -> bool {
        self.done = !self.done;
        if self.done {
            self.steps.iter_mut().for_each(|step| step.done = true);
        }
        self.done
    }

    pub fn apply(&mut self, patch: GoalPatch) -> Result<()> {
        let title = match patch.title {
            Some(title) => Some(required(&title, "goal title")?),
            None => None,
        };
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes.trim().to_string();
        }
        Ok(())
    }

    pub fn add_step(&mut self, text: &str) -> Result<Uuid> {
        let step = GoalStep {
            id: Uuid::new_v4(),
            text: required(text, "step text")?,
            done: false,
        };
        let id = step.id;
        self.steps.push(step);
        Ok(id)
    }

    pub fn toggle_step(&mut self, step_id: Uuid) -> Result<bool> {
        let step = self
            .steps
            .iter_mut()
            .find(|step| step.id == step_id)
            .ok_or_else(|| PlannerError::not_found("goal step", step_id))?;
        step.done = !step.done;
        Ok(step.done)
    }

    pub fn delete_step(&mut self, step_id: Uuid) -> Result<()> {
        let before = self.steps.len();
        self.steps.retain(|step| step.id != step_id);
        if self.steps.len() == before {
            return Err(PlannerError::not_found("goal step", step_id));
        }
        Ok(())
    }

    /// Share of finished steps. A goal without steps is all or nothing.
    pub fn progress(&self) -> GoalProgress {
        let all = self.steps.len();
        let done = self.steps.iter().filter(|step| step.done).count();
        let percent = if all > 0 {
            ((done as f64 * 100.0) / all as f64).round() as u8
        } else if self.done {
            100
        } else {
            0
        };
        GoalProgress { all, done, percent }
    }
}

fn required(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PlannerError::Validation(format!("{what} is required")));
    }
    Ok(value.to_string())
}

pub fn find_goal(goals: &DailyGoals, date: NaiveDate, id: Uuid) -> Result<&DailyGoal> {
    goals
        .get(&date)
        .and_then(|day| day.iter().find(|goal| goal.id == id))
        .ok_or_else(|| PlannerError::not_found("goal", id))
}

pub fn find_goal_mut(goals: &mut DailyGoals, date: NaiveDate, id: Uuid) -> Result<&mut DailyGoal> {
    goals
        .get_mut(&date)
        .and_then(|day| day.iter_mut().find(|goal| goal.id == id))
        .ok_or_else(|| PlannerError::not_found("goal", id))
}

pub fn add_goal(goals: &mut DailyGoals, date: NaiveDate, goal: DailyGoal) -> Uuid {
    let id = goal.id;
    goals.entry(date).or_default().push(goal);
    id
}

/// Removes a goal; an emptied day key is dropped.
pub fn delete_goal(goals: &mut DailyGoals, date: NaiveDate, id: Uuid) -> Result<DailyGoal> {
    let day = goals
        .get_mut(&date)
        .ok_or_else(|| PlannerError::not_found("goal", id))?;
    let index = day
        .iter()
        .position(|goal| goal.id == id)
        .ok_or_else(|| PlannerError::not_found("goal", id))?;
    let removed = day.remove(index);
    if day.is_empty() {
        goals.remove(&date);
    }
    Ok(removed)
}

/// Goals of one day for display: pending first, then higher priority, then
/// title.
pub fn goals_for_date(goals: &DailyGoals, date: NaiveDate) -> Vec<DailyGoal> {
    let mut day = goals.get(&date).cloned().unwrap_or_default();
    day.sort_by(|a, b| {
        a.done
            .cmp(&b.done)
            .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
            .then_with(|| a.title.cmp(&b.title))
    });
    day
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn completing_goal_completes_steps() {
        let mut goal = DailyGoal::new("Tidy up", Priority::Medium).unwrap();
        let step = goal.add_step("Desk").unwrap();
        goal.add_step("Kitchen").unwrap();
        assert!(goal.toggle_step(step).unwrap());
        assert_eq!(goal.progress(), GoalProgress { all: 2, done: 1, percent: 50 });
        assert!(goal.toggle());
        assert_eq!(goal.progress().percent, 100);
        assert!(!goal.toggle());
        assert!(goal.steps.iter().all(|step| step.done));
    }

    #[test]
    fn progress_without_steps_follows_done() {
        let mut goal = DailyGoal::new("Call mom", Priority::High).unwrap();
        assert_eq!(goal.progress().percent, 0);
        goal.toggle();
        assert_eq!(goal.progress().percent, 100);
    }

    #[test]
    fn display_order_is_pending_priority_title() {
        let day = date(2024, 5, 1);
        let mut goals = DailyGoals::new();
        let mut finished = DailyGoal::new("Alpha", Priority::High).unwrap();
        finished.toggle();
        add_goal(&mut goals, day, finished);
        add_goal(&mut goals, day, DailyGoal::new("Zulu", Priority::Low).unwrap());
        add_goal(&mut goals, day, DailyGoal::new("Bravo", Priority::High).unwrap());
        add_goal(&mut goals, day, DailyGoal::new("Echo", Priority::Low).unwrap());

        let titles: Vec<String> = goals_for_date(&goals, day)
            .into_iter()
            .map(|goal| goal.title)
            .collect();
        assert_eq!(titles, vec!["Bravo", "Echo", "Zulu", "Alpha"]);
    }

    #[test]
    fn delete_drops_empty_day() {
        let day = date(2024, 5, 1);
        let mut goals = DailyGoals::new();
        let id = add_goal(&mut goals, day, DailyGoal::new("Read", Priority::Low).unwrap());
        assert!(delete_goal(&mut goals, day, Uuid::new_v4()).is_err());
        delete_goal(&mut goals, day, id).unwrap();
        assert!(goals.is_empty());
    }

    #[test]
    fn patch_validates_title() {
        let mut goal = DailyGoal::new("Read", Priority::Low).unwrap();
        assert!(goal
            .apply(GoalPatch {
                title: Some("  ".into()),
                notes: Some("chapter 3".into()),
                ..GoalPatch::default()
            })
            .is_err());
        assert_eq!(goal.notes, "");
        goal.apply(GoalPatch {
            priority: Some(Priority::High),
            notes: Some(" chapter 3 ".into()),
            ..GoalPatch::default()
        })
        .unwrap();
        assert_eq!(goal.priority, Priority::High);
        assert_eq!(goal.notes, "chapter 3");
    }
}
