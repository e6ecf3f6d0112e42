use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::bills::{Bill, FutureIncome};
use crate::errors::Result;
use crate::goals::DailyGoals;
use crate::ledger::{FinanceTransaction, YearlyLedgers};
use crate::schedule::{AcademicTask, EventSeries, SingleEvent, WeeklyClass};
use crate::storage::{self, Collection, KeyValueStore};

/// Every collection the planner keeps in memory between mutations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannerState {
    pub series: Vec<EventSeries>,
    pub singles: BTreeMap<NaiveDate, Vec<SingleEvent>>,
    pub bills: Vec<Bill>,
    pub ledgers: YearlyLedgers,
    pub goals: DailyGoals,
    pub transactions: Vec<FinanceTransaction>,
    pub incomes: Vec<FutureIncome>,
    pub tasks: Vec<AcademicTask>,
    pub classes: Vec<WeeklyClass>,
}

impl PlannerState {
    /// Reads all collections, skipping entries that no longer parse.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let mut ledgers: YearlyLedgers = storage::load_keyed(store, Collection::ExpenseYearly)?;
        for (year, ledger) in ledgers.iter_mut() {
            let orphaned = ledger.normalize();
            if orphaned > 0 {
                tracing::warn!(year, orphaned, "dropped cells without a category");
            }
        }
        Ok(Self {
            series: storage::load_list(store, Collection::RecurringEvents)?,
            singles: storage::load_dated_lists(store, Collection::AgendaEvents)?,
            bills: storage::load_list(store, Collection::Bills)?,
            ledgers,
            goals: storage::load_dated_lists(store, Collection::DailyGoals)?,
            transactions: storage::load_list(store, Collection::FinanceTransactions)?,
            incomes: storage::load_list(store, Collection::FutureIncomes)?,
            tasks: storage::load_list(store, Collection::AcademicTasks)?,
            classes: storage::load_list(store, Collection::WeeklyClasses)?,
        })
    }

    /// Writes one collection back as a whole.
    pub fn save(&self, store: &dyn KeyValueStore, collection: Collection) -> Result<()> {
        match collection {
            Collection::RecurringEvents => storage::save_collection(store, collection, &self.series),
            Collection::AgendaEvents => storage::save_collection(store, collection, &self.singles),
            Collection::Bills => storage::save_collection(store, collection, &self.bills),
            Collection::ExpenseYearly => storage::save_collection(store, collection, &self.ledgers),
            Collection::DailyGoals => storage::save_collection(store, collection, &self.goals),
            Collection::FinanceTransactions => {
                storage::save_collection(store, collection, &self.transactions)
            }
            Collection::FutureIncomes => storage::save_collection(store, collection, &self.incomes),
            Collection::AcademicTasks => storage::save_collection(store, collection, &self.tasks),
            Collection::WeeklyClasses => storage::save_collection(store, collection, &self.classes),
            // Owned by the planner, not by the collections.
            Collection::LastOpenDate => Ok(()),
        }
    }
}
