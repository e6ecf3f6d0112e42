mod common;

use chrono::Weekday;
use common::{date, open_planner, setup_planner};
use planner_core::schedule::{
    AcademicTask, EventDraft, EventSeries, OccurrenceSource, Priority, RecurrenceKind,
    RepeatRule, SeriesPatch, WeeklyClass,
};

#[test]
fn every_n_days_respects_step_until_and_limit() {
    let series = EventSeries::every_n_days(date(2024, 1, 1), 3, "Water plants").with_limit(3);
    assert!(series.occurs_on(date(2024, 1, 1)));
    assert!(!series.occurs_on(date(2024, 1, 3)));
    assert!(series.occurs_on(date(2024, 1, 7)));
    assert!(!series.occurs_on(date(2024, 1, 10)), "fourth occurrence exceeds the limit");
    assert!(!series.occurs_on(date(2023, 12, 29)), "never before the start");

    let bounded = EventSeries::every_n_days(date(2024, 1, 1), 2, "Run").with_until(date(2024, 1, 5));
    assert_eq!(
        bounded.occurrences_between(date(2023, 12, 1), date(2024, 2, 1)),
        vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 5)]
    );
}

#[test]
fn weekly_series_keeps_its_weekday_across_months() {
    // 2024-01-31 is a Wednesday.
    let series = EventSeries::weekly(date(2024, 1, 31), "Choir");
    let dates = series.occurrences_between(date(2024, 2, 1), date(2024, 3, 1));
    assert_eq!(
        dates,
        vec![date(2024, 2, 7), date(2024, 2, 14), date(2024, 2, 21), date(2024, 2, 28)]
    );
    assert!(!series.occurs_on(date(2024, 2, 8)));
}

#[test]
fn malformed_interval_never_occurs() {
    let mut series = EventSeries::every_n_days(date(2024, 1, 1), 1, "Daily");
    assert!(series.validate().is_err());
    assert!(!series.occurs_on(date(2024, 1, 1)));
    series.interval = 0;
    assert!(series.occurrences_between(date(2024, 1, 1), date(2024, 1, 31)).is_empty());
}

#[test]
fn agenda_merges_singles_and_series_through_planner() {
    let today = date(2024, 3, 4);
    let (mut planner, _clock, _dir) = setup_planner(today);

    planner
        .add_event(EventDraft {
            date: Some(today),
            time: "09:00".into(),
            text: "Dentist".into(),
            priority: Priority::High,
            ..EventDraft::default()
        })
        .unwrap();
    planner
        .add_event(EventDraft {
            date: Some(today),
            text: "Standup".into(),
            time: "08:30".into(),
            repeat: Some(RepeatRule {
                kind: RecurrenceKind::Weekly,
                interval: 7,
                until: None,
                occurrence_limit: 0,
            }),
            ..EventDraft::default()
        })
        .unwrap();

    let agenda = planner.agenda(today);
    let texts: Vec<&str> = agenda.iter().map(|occ| occ.text.as_str()).collect();
    assert_eq!(texts, vec!["Standup", "Dentist"]);
    assert_eq!(agenda[1].end_time, "10:00");

    let next_week = planner.agenda(date(2024, 3, 11));
    assert_eq!(next_week.len(), 1);
    let OccurrenceSource::Series(group_id) = next_week[0].source else {
        panic!("expected a series occurrence");
    };

    planner
        .edit_series(
            group_id,
            SeriesPatch {
                text: Some("Team standup".into()),
                ..SeriesPatch::default()
            },
        )
        .unwrap();
    assert_eq!(planner.agenda(today)[0].text, "Team standup");

    planner.cancel_series(group_id).unwrap();
    assert!(planner.agenda(date(2024, 3, 11)).is_empty());
}

#[test]
fn coursework_joins_the_agenda_and_survives_a_restart() {
    let (mut planner, clock, dir) = setup_planner(date(2024, 6, 6));
    let exam = AcademicTask::new("exam", "Statistics", date(2024, 6, 20)).unwrap();
    let exam_id = planner.add_task(exam).unwrap();
    planner
        .add_class(
            WeeklyClass::new("Statistics", Weekday::Thu, "18:00", "20:00")
                .unwrap()
                .with_term(date(2024, 3, 1), date(2024, 6, 30)),
        )
        .unwrap();

    let alerts = planner.task_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].days_left, 14);
    let agenda = planner.agenda(date(2024, 6, 6));
    assert_eq!(agenda[0].source, OccurrenceSource::TaskReminder(exam_id));
    drop(planner);

    let mut planner = open_planner(&dir, clock.clone());
    assert_eq!(planner.weekly_classes()[0].total, 17);
    assert_eq!(planner.agenda(date(2024, 6, 20))[0].text, "EXAM: Statistics");
    assert!(planner.agenda(date(2024, 6, 19)).is_empty());

    planner.delete_task(exam_id).unwrap();
    let class_id = planner.weekly_classes()[0].id;
    planner.delete_class(class_id).unwrap();
    let planner = open_planner(&dir, clock);
    assert!(planner.agenda(date(2024, 6, 20)).is_empty());
    assert!(planner.weekly_classes().is_empty());
}
