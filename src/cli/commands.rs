use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::calendar::{add_days, month_slot, MonthKey};
use crate::core::{MidnightTimer, Planner};
use crate::errors::{PlannerError, Result};
use crate::ledger::MONTHS_PER_YEAR;
use crate::schedule::{AcademicTask, Priority, REMINDER_DAYS};
use crate::utils::build_info;

use super::output;

pub fn show_agenda(planner: &Planner, date: NaiveDate) {
    output::section(format!("Agenda {date}"));
    let occurrences = planner.agenda(date);
    if occurrences.is_empty() {
        output::info("Nothing scheduled.");
    }
    for occurrence in occurrences {
        let time = if occurrence.time.is_empty() {
            "all day".to_string()
        } else {
            format!("{}-{}", occurrence.time, occurrence.end_time)
        };
        let marker = if occurrence.is_recurring() { " (repeats)" } else { "" };
        output::info(format!(
            "{time:<12} {} [{}]{marker}",
            occurrence.text, occurrence.priority
        ));
    }
    for bill in planner.bills_due_on(date) {
        let status = bill.status_on(date, planner.today());
        output::info(format!(
            "bill         {} {} ({status:?})",
            bill.name,
            output::money(bill.amount_on(date))
        ));
    }
}

pub fn show_bills(planner: &Planner) {
    output::section("Bills this month");
    let upcoming = planner.upcoming_bills();
    if upcoming.is_empty() {
        output::info("No bills due.");
    }
    for bill in upcoming {
        let line = format!(
            "{} {:<20} {:>10} {}",
            bill.date,
            bill.name,
            output::money(bill.amount),
            bill.label
        );
        if bill.paid {
            output::success(format!("{line} paid"));
        } else if bill.label == crate::bills::DueLabel::Overdue {
            output::warning(line);
        } else {
            output::info(line);
        }
    }

    let totals = planner.bill_totals();
    output::info(format!(
        "Due in {} days: {}",
        crate::bills::upcoming::SHORT_WINDOW_DAYS,
        output::money(totals.short_window)
    ));
    output::info(format!(
        "Due in {} days: {}",
        totals.horizon_days,
        output::money(totals.horizon)
    ));

    let future = planner.future_summary();
    output::info(format!(
        "Rest of the year: income {} / bills {} / balance {}",
        output::money(future.income),
        output::money(future.expenses),
        output::money(future.balance())
    ));
    let month = MonthKey::of(planner.today());
    let summary = planner.month_summary(month);
    output::info(format!(
        "Transactions {month}: income {} / expenses {}",
        output::money(summary.income),
        output::money(summary.expenses)
    ));
}

pub fn show_ledger(planner: &mut Planner, year: i32) -> Result<()> {
    let ledger = planner.open_year(year)?;
    output::section(format!("Expenses {year}"));
    let header: String = (1..=MONTHS_PER_YEAR)
        .map(|month| format!("{:>9}", month_slot(month)))
        .collect();
    output::info(format!("{:<14}{header}{:>11}", "Category", "Total"));
    for category in &ledger.cats {
        let cells: String = (1..=MONTHS_PER_YEAR)
            .map(|month| format!("{:>9}", output::money(ledger.cell(category.id, month))))
            .collect();
        output::info(format!(
            "{:<14}{cells}{:>11}",
            category.name,
            output::money(ledger.row_total(category.id))
        ));
    }
    let totals: String = ledger
        .month_totals()
        .iter()
        .map(|total| format!("{:>9}", output::money(*total)))
        .collect();
    output::info(format!(
        "{:<14}{totals}{:>11}",
        "Total",
        output::money(ledger.grand_total())
    ));
    Ok(())
}

pub fn show_goals(planner: &Planner, date: NaiveDate) {
    output::section(format!("Goals {date}"));
    let goals = planner.goals_for_date(date);
    if goals.is_empty() {
        output::info("No goals.");
    }
    for goal in goals {
        let progress = goal.progress();
        let line = format!(
            "[{}] {} ({}, {}%)",
            if goal.done { "x" } else { " " },
            goal.title,
            goal.priority,
            progress.percent
        );
        if goal.done {
            output::success(line);
        } else {
            output::info(line);
        }
    }
}

pub fn add_goal(planner: &mut Planner, title: &str, priority: Priority) -> Result<()> {
    let today = planner.today();
    planner.add_goal(today, title, priority)?;
    output::success(format!("Goal added for {today}: {}", title.trim()));
    Ok(())
}

pub fn add_task(planner: &mut Planner, due: NaiveDate, kind: &str, title: &str) -> Result<()> {
    let task = AcademicTask::new(kind, title, due)?;
    let reminders: Vec<String> = REMINDER_DAYS
        .iter()
        .map(|days| add_days(due, -days).to_string())
        .collect();
    planner.add_task(task)?;
    output::success(format!(
        "Task added for {due}: {} (study reminders on {})",
        title.trim(),
        reminders.join(" and ")
    ));
    Ok(())
}

/// Keeps the planner open and rolls it over after every midnight until
/// Ctrl+C.
pub fn watch(planner: Planner) -> Result<()> {
    let buffer = Duration::from_secs(planner.config().rollover_buffer_secs);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let timer = MidnightTimer::new(Arc::new(Mutex::new(planner)), buffer);
        let handle = timer.start();
        output::info("Watching for midnight rollover. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c().await?;
        timer.shutdown_handle().notify_one();
        handle
            .await
            .map_err(|err| PlannerError::Validation(format!("rollover task failed: {err}")))?;
        output::success("Stopped.");
        Ok::<(), PlannerError>(())
    })
}

pub fn show_version() {
    output::info(build_info::STAMP);
}

pub fn show_help() {
    output::section("planner_cli");
    for line in [
        "agenda [YYYY-MM-DD]        events and bills of a day (default today)",
        "bills                      bills of the current month with totals",
        "ledger [YYYY]              yearly expense grid (default this year)",
        "goals [YYYY-MM-DD]         daily goals of a day (default today)",
        "goal-add TITLE [PRIORITY]  add a goal for today (low, medium, high)",
        "task-add DATE KIND TITLE   add an exam or assignment due on DATE",
        "watch                      stay open and roll over at midnight",
        "version                    build information",
        "help                       this list",
    ] {
        output::info(line);
    }
}
