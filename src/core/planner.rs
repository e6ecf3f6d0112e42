use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::bills::{self, Bill, BillTotals, FutureIncome, FutureSummary, UpcomingBill};
use crate::calendar::{add_days, MonthKey};
use crate::config::Config;
use crate::core::services::{
    AmountScope, BillService, CreatedEvent, GoalService, LedgerService, ScheduleService,
};
use crate::core::state::PlannerState;
use crate::core::time::Clock;
use crate::errors::{PlannerError, Result};
use crate::goals::{self, CatchUp, DailyGoal, GoalPatch, GoalProgress};
use crate::ledger::{self, FinanceSummary, FinanceTransaction, MoveDirection, YearLedger};
use crate::schedule::{
    events_for_date, sort_for_display, task_alerts, AcademicTask, EventDraft, EventSeries,
    Occurrence, Priority, SeriesPatch, TaskAlert, WeeklyClass,
};
use crate::storage::{self, Collection, KeyValueStore};

/// Facade that owns the loaded collections, routes every mutation through the
/// services, and persists each affected collection afterwards.
pub struct Planner {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: Config,
    today: NaiveDate,
    state: PlannerState,
}

impl Planner {
    /// Loads every collection, catches daily goals up from the last open date,
    /// and opens the current year's ledger.
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;
        let state = PlannerState::load(store.as_ref())?;
        let today = clock.today();
        let mut planner = Self {
            store,
            clock,
            config,
            today,
            state,
        };
        planner.catch_up()?;
        planner.open_year(today.year())?;
        tracing::info!(
            build = %crate::utils::build_info::STAMP,
            today = %today,
            series = planner.state.series.len(),
            bills = planner.state.bills.len(),
            "planner opened"
        );
        Ok(planner)
    }

    fn catch_up(&mut self) -> Result<()> {
        let last_open = storage::load_date(self.store.as_ref(), Collection::LastOpenDate)?;
        match goals::catch_up(&mut self.state.goals, last_open, self.today) {
            CatchUp::Walked { days, moved } => {
                tracing::info!(days, moved, "carried pending goals forward");
                self.persist(&[Collection::DailyGoals])?;
            }
            CatchUp::ClockWentBack { last_open } => {
                tracing::warn!(
                    last_open = %last_open,
                    today = %self.today,
                    "last open date is in the future; skipping goal rollover"
                );
            }
            CatchUp::FirstRun | CatchUp::UpToDate => {}
        }
        storage::save_date(self.store.as_ref(), Collection::LastOpenDate, self.today)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    fn persist(&self, collections: &[Collection]) -> Result<()> {
        for collection in collections {
            self.state.save(self.store.as_ref(), *collection)?;
        }
        Ok(())
    }

    // Day rollover

    /// Advances today by one day, carrying pending goals forward. Returns how
    /// many goals moved.
    pub fn on_midnight(&mut self) -> Result<usize> {
        let from = self.today;
        let moved = goals::rollover_day(&mut self.state.goals, from);
        self.today = add_days(from, 1);
        self.persist(&[Collection::DailyGoals])?;
        storage::save_date(self.store.as_ref(), Collection::LastOpenDate, self.today)?;
        if self.today.year() != from.year() {
            self.open_year(self.today.year())?;
        }
        tracing::info!(today = %self.today, moved, "day rolled over");
        Ok(moved)
    }

    /// Rolls forward one day at a time until today matches the clock. Returns
    /// the number of days advanced.
    pub fn roll_forward_to_clock(&mut self) -> Result<u32> {
        let target = self.clock.today();
        let mut days = 0;
        while self.today < target {
            self.on_midnight()?;
            days += 1;
        }
        Ok(days)
    }

    // Agenda

    /// Occurrences on `date`, ordered for display.
    pub fn agenda(&self, date: NaiveDate) -> Vec<Occurrence> {
        let state = &self.state;
        let mut occurrences = events_for_date(&state.singles, &state.series, &state.tasks, date);
        sort_for_display(&mut occurrences);
        occurrences
    }

    pub fn add_event(&mut self, draft: EventDraft) -> Result<CreatedEvent> {
        let created = ScheduleService::add_event(&mut self.state, draft, self.today)?;
        match created {
            CreatedEvent::Single { .. } => self.persist(&[Collection::AgendaEvents])?,
            CreatedEvent::Series { .. } => self.persist(&[Collection::RecurringEvents])?,
        }
        Ok(created)
    }

    pub fn add_series(&mut self, series: EventSeries) -> Result<Uuid> {
        let id = ScheduleService::add_series(&mut self.state, series)?;
        self.persist(&[Collection::RecurringEvents])?;
        Ok(id)
    }

    pub fn edit_series(&mut self, group_id: Uuid, patch: SeriesPatch) -> Result<()> {
        ScheduleService::edit_series(&mut self.state, group_id, patch)?;
        self.persist(&[Collection::RecurringEvents])
    }

    pub fn cancel_series(&mut self, group_id: Uuid) -> Result<()> {
        ScheduleService::cancel_series(&mut self.state, group_id)?;
        self.persist(&[Collection::RecurringEvents])
    }

    pub fn delete_series(&mut self, group_id: Uuid) -> Result<()> {
        ScheduleService::delete_series(&mut self.state, group_id)?;
        self.persist(&[Collection::RecurringEvents])
    }

    pub fn delete_single_event(&mut self, date: NaiveDate, id: Uuid) -> Result<()> {
        ScheduleService::delete_single_event(&mut self.state, date, id)?;
        self.persist(&[Collection::AgendaEvents])
    }

    // Coursework

    /// Tasks due in exactly one or two weeks, nearest first.
    pub fn task_alerts(&self) -> Vec<TaskAlert> {
        task_alerts(&self.state.tasks, self.today)
    }

    pub fn add_task(&mut self, task: AcademicTask) -> Result<Uuid> {
        let id = ScheduleService::add_task(&mut self.state, task);
        self.persist(&[Collection::AcademicTasks])?;
        Ok(id)
    }

    pub fn delete_task(&mut self, id: Uuid) -> Result<()> {
        ScheduleService::delete_task(&mut self.state, id)?;
        self.persist(&[Collection::AcademicTasks])
    }

    pub fn weekly_classes(&self) -> &[WeeklyClass] {
        &self.state.classes
    }

    pub fn add_class(&mut self, class: WeeklyClass) -> Result<Uuid> {
        let id = ScheduleService::add_class(&mut self.state, class);
        self.persist(&[Collection::WeeklyClasses])?;
        Ok(id)
    }

    pub fn delete_class(&mut self, id: Uuid) -> Result<()> {
        ScheduleService::delete_class(&mut self.state, id)?;
        self.persist(&[Collection::WeeklyClasses])
    }

    // Bills

    pub fn bills_due_on(&self, date: NaiveDate) -> Vec<&Bill> {
        BillService::due_on(&self.state, date)
    }

    pub fn upcoming_bills(&self) -> Vec<UpcomingBill> {
        bills::upcoming_bills(&self.state.bills, self.today, self.config.recent_paid_days)
    }

    pub fn bill_totals(&self) -> BillTotals {
        bills::bill_totals(&self.state.bills, self.today, self.config.upcoming_horizon_days)
    }

    pub fn future_summary(&self) -> FutureSummary {
        bills::future_summary(&self.state.bills, &self.state.incomes, self.today)
    }

    pub fn add_bill(&mut self, bill: Bill) -> Result<Uuid> {
        let Self { state, config, .. } = self;
        let id = BillService::add(state, bill, &config.default_categories)?;
        self.persist(&[Collection::Bills, Collection::ExpenseYearly])?;
        Ok(id)
    }

    pub fn edit_bill_amount(
        &mut self,
        id: Uuid,
        month: MonthKey,
        amount: f64,
        scope: AmountScope,
    ) -> Result<usize> {
        let Self { state, config, .. } = self;
        let months =
            BillService::edit_amount(state, id, month, amount, scope, &config.default_categories)?;
        self.persist(&[Collection::Bills, Collection::ExpenseYearly])?;
        Ok(months)
    }

    /// Marks the occurrence paid as of today.
    pub fn mark_bill_paid(&mut self, id: Uuid, occurrence: NaiveDate) -> Result<()> {
        let timestamp = self.clock.now().and_utc().timestamp_millis();
        BillService::mark_paid(&mut self.state, id, occurrence, self.today, timestamp)?;
        self.persist(&[Collection::Bills])
    }

    pub fn clear_bill_paid(&mut self, id: Uuid, occurrence: NaiveDate) -> Result<bool> {
        let cleared = BillService::clear_paid(&mut self.state, id, occurrence)?;
        self.persist(&[Collection::Bills])?;
        Ok(cleared)
    }

    pub fn set_bill_note(&mut self, id: Uuid, occurrence: NaiveDate, text: &str) -> Result<()> {
        BillService::set_note(&mut self.state, id, occurrence, text)?;
        self.persist(&[Collection::Bills])
    }

    pub fn delete_bill(&mut self, id: Uuid) -> Result<()> {
        BillService::remove(&mut self.state, id)?;
        self.persist(&[Collection::Bills, Collection::ExpenseYearly])
    }

    pub fn add_income(&mut self, income: FutureIncome) -> Result<Uuid> {
        let id = BillService::add_income(&mut self.state, income);
        self.persist(&[Collection::FutureIncomes])?;
        Ok(id)
    }

    pub fn delete_income(&mut self, id: Uuid) -> Result<()> {
        BillService::remove_income(&mut self.state, id)?;
        self.persist(&[Collection::FutureIncomes])
    }

    // Ledger

    /// Opens `year`, seeding it the first time and booking any bill amounts
    /// it is missing.
    pub fn open_year(&mut self, year: i32) -> Result<&YearLedger> {
        let is_new = !self.state.ledgers.contains_key(&year);
        let months =
            LedgerService::open_year(&mut self.state, year, &self.config.default_categories);
        if is_new || months > 0 {
            self.persist(&[Collection::Bills, Collection::ExpenseYearly])?;
        }
        self.state
            .ledgers
            .get(&year)
            .ok_or_else(|| PlannerError::not_found("ledger year", year))
    }

    pub fn add_category(&mut self, year: i32, name: &str) -> Result<Uuid> {
        let id = LedgerService::add_category(&mut self.state, year, name)?;
        self.persist(&[Collection::ExpenseYearly])?;
        Ok(id)
    }

    pub fn rename_category(&mut self, year: i32, id: Uuid, name: &str) -> Result<()> {
        LedgerService::rename_category(&mut self.state, year, id, name)?;
        self.persist(&[Collection::ExpenseYearly])
    }

    pub fn set_category_color(&mut self, year: i32, id: Uuid, color: Option<String>) -> Result<()> {
        LedgerService::set_category_color(&mut self.state, year, id, color)?;
        self.persist(&[Collection::ExpenseYearly])
    }

    pub fn move_category(&mut self, year: i32, id: Uuid, direction: MoveDirection) -> Result<bool> {
        let moved = LedgerService::move_category(&mut self.state, year, id, direction)?;
        if moved {
            self.persist(&[Collection::ExpenseYearly])?;
        }
        Ok(moved)
    }

    pub fn delete_category(&mut self, year: i32, id: Uuid) -> Result<()> {
        LedgerService::delete_category(&mut self.state, year, id)?;
        self.persist(&[Collection::ExpenseYearly])
    }

    pub fn set_cell(&mut self, year: i32, id: Uuid, month: u32, value: f64) -> Result<f64> {
        let stored = LedgerService::set_cell(&mut self.state, year, id, month, value)?;
        self.persist(&[Collection::ExpenseYearly])?;
        Ok(stored)
    }

    pub fn add_transaction(&mut self, transaction: FinanceTransaction) -> Result<Uuid> {
        let Self { state, config, .. } = self;
        let id = LedgerService::add_transaction(state, transaction, &config.default_categories)?;
        self.persist(&[Collection::FinanceTransactions, Collection::ExpenseYearly])?;
        Ok(id)
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> Result<()> {
        let Self { state, config, .. } = self;
        LedgerService::delete_transaction(state, id, &config.default_categories)?;
        self.persist(&[Collection::FinanceTransactions, Collection::ExpenseYearly])
    }

    pub fn month_summary(&self, month: MonthKey) -> FinanceSummary {
        ledger::month_summary(&self.state.transactions, month)
    }

    // Goals

    pub fn goals_for_date(&self, date: NaiveDate) -> Vec<DailyGoal> {
        goals::goals_for_date(&self.state.goals, date)
    }

    pub fn goal_progress(&self, date: NaiveDate, id: Uuid) -> Result<GoalProgress> {
        GoalService::progress(&self.state, date, id)
    }

    pub fn add_goal(&mut self, date: NaiveDate, title: &str, priority: Priority) -> Result<Uuid> {
        let id = GoalService::add(&mut self.state, date, title, priority)?;
        self.persist(&[Collection::DailyGoals])?;
        Ok(id)
    }

    pub fn toggle_goal(&mut self, date: NaiveDate, id: Uuid) -> Result<bool> {
        let done = GoalService::toggle(&mut self.state, date, id)?;
        self.persist(&[Collection::DailyGoals])?;
        Ok(done)
    }

    pub fn update_goal(&mut self, date: NaiveDate, id: Uuid, patch: GoalPatch) -> Result<()> {
        GoalService::update(&mut self.state, date, id, patch)?;
        self.persist(&[Collection::DailyGoals])
    }

    pub fn delete_goal(&mut self, date: NaiveDate, id: Uuid) -> Result<()> {
        GoalService::delete(&mut self.state, date, id)?;
        self.persist(&[Collection::DailyGoals])
    }

    pub fn add_goal_step(&mut self, date: NaiveDate, id: Uuid, text: &str) -> Result<Uuid> {
        let step = GoalService::add_step(&mut self.state, date, id, text)?;
        self.persist(&[Collection::DailyGoals])?;
        Ok(step)
    }

    pub fn toggle_goal_step(&mut self, date: NaiveDate, id: Uuid, step_id: Uuid) -> Result<bool> {
        let done = GoalService::toggle_step(&mut self.state, date, id, step_id)?;
        self.persist(&[Collection::DailyGoals])?;
        Ok(done)
    }

    pub fn delete_goal_step(&mut self, date: NaiveDate, id: Uuid, step_id: Uuid) -> Result<()> {
        GoalService::delete_step(&mut self.state, date, id, step_id)?;
        self.persist(&[Collection::DailyGoals])
    }
}
