//! Daily goals and the day rollover that carries unfinished goals forward.

pub mod daily;
pub mod midnight;
pub mod rollover;

pub use daily::{
    add_goal, delete_goal, find_goal, find_goal_mut, goals_for_date, DailyGoal, DailyGoals, GoalPatch,
    GoalProgress, GoalStep,
};
pub use midnight::{delay_until_next_rollover, MIN_DELAY};
pub use rollover::{catch_up, rollover_day, CatchUp};
