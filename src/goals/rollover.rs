use chrono::NaiveDate;

use crate::calendar::add_days;

use super::DailyGoals;

/// What a boot-time catch-up did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchUp {
    /// No previous open date was stored.
    FirstRun,
    UpToDate,
    Walked { days: i64, moved: usize },
    /// The stored date lies after today; the walk was skipped.
    ClockWentBack { last_open: NaiveDate },
}

/// Moves the pending goals of `from` onto the following day, appending them
/// after any goals already there. Completed goals stay on `from`; the key is
/// dropped when nothing remains. Returns how many goals moved.
pub fn rollover_day(goals: &mut DailyGoals, from: NaiveDate) -> usize {
    let Some(day) = goals.remove(&from) else {
        return 0;
    };
    let (done, pending): (Vec<_>, Vec<_>) = day.into_iter().partition(|goal| goal.done);
    let moved = pending.len();
    if !pending.is_empty() {
        goals.entry(add_days(from, 1)).or_default().extend(pending);
    }
    if !done.is_empty() {
        goals.insert(from, done);
    }
    moved
}

/// Walks every day from `last_open` up to, but excluding, `today`.
pub fn catch_up(goals: &mut DailyGoals, last_open: Option<NaiveDate>, today: NaiveDate) -> CatchUp {
    let Some(last_open) = last_open else {
        return CatchUp::FirstRun;
    };
    if last_open > today {
        return CatchUp::ClockWentBack { last_open };
    }
    let mut cursor = last_open;
    let mut moved = 0;
    while cursor < today {
        moved += rollover_day(goals, cursor);
        cursor = add_days(cursor, 1);
    }
    let days = (today - last_open).num_days();
    if days == 0 {
        CatchUp::UpToDate
    } else {
        CatchUp::Walked { days, moved }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::{add_goal, DailyGoal};
    use crate::schedule::Priority;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(title: &str, done: bool) -> DailyGoal {
        let mut goal = DailyGoal::new(title, Priority::Low).unwrap();
        goal.done = done;
        goal
    }

    #[test]
    fn pending_goals_move_and_done_goals_stay() {
        let day = date(2024, 1, 31);
        let mut goals = DailyGoals::new();
        add_goal(&mut goals, day, goal("Done", true));
        add_goal(&mut goals, day, goal("Pending", false));
        add_goal(&mut goals, date(2024, 2, 1), goal("Existing", false));

        assert_eq!(rollover_day(&mut goals, day), 1);
        assert_eq!(goals[&day].len(), 1);
        let next: Vec<&str> = goals[&date(2024, 2, 1)]
            .iter()
            .map(|goal| goal.title.as_str())
            .collect();
        assert_eq!(next, vec!["Existing", "Pending"]);
    }

    #[test]
    fn emptied_day_is_removed() {
        let day = date(2024, 1, 1);
        let mut goals = DailyGoals::new();
        add_goal(&mut goals, day, goal("Pending", false));
        rollover_day(&mut goals, day);
        assert!(!goals.contains_key(&day));
        assert_eq!(rollover_day(&mut goals, date(2023, 1, 1)), 0);
    }

    #[test]
    fn five_day_gap_lands_on_today() {
        let start = date(2024, 2, 27);
        let today = date(2024, 3, 3);
        let mut goals = DailyGoals::new();
        add_goal(&mut goals, start, goal("Carry", false));
        add_goal(&mut goals, start, goal("Keep", true));

        let outcome = catch_up(&mut goals, Some(start), today);
        assert_eq!(outcome, CatchUp::Walked { days: 5, moved: 5 });
        assert_eq!(goals[&today][0].title, "Carry");
        assert_eq!(goals[&start][0].title, "Keep");
        assert_eq!(goals.len(), 2);
    }

    #[test]
    fn backward_clock_skips_walk() {
        let mut goals = DailyGoals::new();
        let future = date(2024, 6, 10);
        add_goal(&mut goals, future, goal("Later", false));
        let outcome = catch_up(&mut goals, Some(future), date(2024, 6, 1));
        assert_eq!(outcome, CatchUp::ClockWentBack { last_open: future });
        assert_eq!(goals[&future].len(), 1);
    }

    #[test]
    fn same_day_and_first_run_do_nothing() {
        let mut goals = DailyGoals::new();
        let today = date(2024, 6, 1);
        add_goal(&mut goals, today, goal("Now", false));
        assert_eq!(catch_up(&mut goals, None, today), CatchUp::FirstRun);
        assert_eq!(catch_up(&mut goals, Some(today), today), CatchUp::UpToDate);
        assert_eq!(goals[&today].len(), 1);
    }
}
