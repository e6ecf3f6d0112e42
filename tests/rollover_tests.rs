mod common;

use common::{date, open_planner, setup_planner};
use planner_core::schedule::Priority;

#[test]
fn reopening_after_five_days_carries_pending_goals_to_today() {
    let start = date(2024, 5, 1);
    let (mut planner, clock, dir) = setup_planner(start);
    planner.add_goal(start, "Write report", Priority::High).unwrap();
    let done = planner.add_goal(start, "Buy milk", Priority::Low).unwrap();
    planner.toggle_goal(start, done).unwrap();
    drop(planner);

    clock.advance_days(5);
    let planner = open_planner(&dir, clock.clone());
    let today = date(2024, 5, 6);
    assert_eq!(planner.today(), today);

    let carried: Vec<String> = planner
        .goals_for_date(today)
        .into_iter()
        .map(|goal| goal.title)
        .collect();
    assert_eq!(carried, vec!["Write report"]);
    let kept: Vec<String> = planner
        .goals_for_date(start)
        .into_iter()
        .map(|goal| goal.title)
        .collect();
    assert_eq!(kept, vec!["Buy milk"]);
    for skipped in 2..=5 {
        assert!(planner.goals_for_date(date(2024, 5, skipped)).is_empty());
    }

    let stored = std::fs::read_to_string(dir.join("lastOpenDate.json")).unwrap();
    assert_eq!(stored.trim(), "\"2024-05-06\"");
}

#[test]
fn clock_going_back_leaves_goals_in_place() {
    let start = date(2024, 5, 10);
    let (mut planner, clock, dir) = setup_planner(start);
    planner.add_goal(start, "Plan trip", Priority::Medium).unwrap();
    drop(planner);

    clock.advance_days(-3);
    let planner = open_planner(&dir, clock.clone());
    assert_eq!(planner.today(), date(2024, 5, 7));
    assert_eq!(planner.goals_for_date(start).len(), 1);
    assert!(planner.goals_for_date(date(2024, 5, 7)).is_empty());
    drop(planner);

    // The stored date now matches the clock, so the next day rolls normally.
    clock.advance_days(1);
    let planner = open_planner(&dir, clock.clone());
    assert_eq!(planner.goals_for_date(start).len(), 1);
}

#[test]
fn midnight_on_new_year_opens_the_next_ledger() {
    let eve = date(2024, 12, 31);
    let (mut planner, clock, _dir) = setup_planner(eve);
    planner
        .add_bill(planner_core::bills::Bill::new("Rent", date(2024, 1, 1), 700.0, true))
        .unwrap();
    planner.add_goal(eve, "Reflect", Priority::Low).unwrap();
    assert!(!planner.state().ledgers.contains_key(&2025));

    clock.advance_days(1);
    assert_eq!(planner.roll_forward_to_clock().unwrap(), 1);
    assert_eq!(planner.today(), date(2025, 1, 1));
    assert_eq!(planner.goals_for_date(date(2025, 1, 1)).len(), 1);

    let ledger = planner.state().ledgers.get(&2025).unwrap();
    let rent = ledger.category_by_name("Rent").unwrap().id;
    assert_eq!(ledger.row_total(rent), 8400.0);
}

#[test]
fn goal_finished_mid_walk_stays_on_the_day_it_was_done() {
    let start = date(2024, 1, 1);
    let (mut planner, clock, dir) = setup_planner(start);
    let id = planner.add_goal(start, "Tidy desk", Priority::Medium).unwrap();
    drop(planner);

    clock.advance_days(2);
    let mut planner = open_planner(&dir, clock.clone());
    let mid = date(2024, 1, 3);
    assert_eq!(planner.goals_for_date(mid).len(), 1);
    assert!(planner.toggle_goal(mid, id).unwrap());
    drop(planner);

    clock.advance_days(3);
    let planner = open_planner(&dir, clock.clone());
    assert_eq!(planner.today(), date(2024, 1, 6));
    let kept = planner.goals_for_date(mid);
    assert_eq!(kept.len(), 1);
    assert!(kept[0].done);
    assert!(planner.goals_for_date(date(2024, 1, 6)).is_empty());
}
