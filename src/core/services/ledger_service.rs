//! Business logic helpers for the yearly expense grid and the transactions
//! that feed it.

use chrono::Datelike;
use uuid::Uuid;

use crate::core::state::PlannerState;
use crate::errors::PlannerError;
use crate::ledger::{
    ensure_bills_applied_to_year, ensure_year_with_bills, forget_category, post_transaction,
    FinanceTransaction, MoveDirection, Posting, YearLedger,
};

use super::ServiceResult;

pub struct LedgerService;

impl LedgerService {
    /// Opens a year for viewing: seeds it the first time and reconciles every
    /// bill against it. Returns the number of ledger cells that moved.
    pub fn open_year(state: &mut PlannerState, year: i32, defaults: &[String]) -> usize {
        let PlannerState { bills, ledgers, .. } = state;
        let is_new = !ledgers.contains_key(&year);
        let months = ensure_bills_applied_to_year(ledgers, bills, year, defaults);
        if is_new {
            tracing::info!(year, months, "opened new ledger year");
        } else if months > 0 {
            tracing::info!(year, months, "brought ledger year in line with bills");
        }
        months
    }

    pub fn add_category(state: &mut PlannerState, year: i32, name: &str) -> ServiceResult<Uuid> {
        Self::year_mut(state, year)?.add_category(name)
    }

    pub fn rename_category(
        state: &mut PlannerState,
        year: i32,
        id: Uuid,
        name: &str,
    ) -> ServiceResult<()> {
        Self::year_mut(state, year)?.rename_category(id, name)
    }

    pub fn set_category_color(
        state: &mut PlannerState,
        year: i32,
        id: Uuid,
        color: Option<String>,
    ) -> ServiceResult<()> {
        Self::year_mut(state, year)?.set_category_color(id, color)
    }

    pub fn move_category(
        state: &mut PlannerState,
        year: i32,
        id: Uuid,
        direction: MoveDirection,
    ) -> ServiceResult<bool> {
        Self::year_mut(state, year)?.move_category(id, direction)
    }

    /// Deletes the row and makes bills that booked into it forget those
    /// amounts.
    pub fn delete_category(state: &mut PlannerState, year: i32, id: Uuid) -> ServiceResult<()> {
        let removed = Self::year_mut(state, year)?.delete_category(id)?;
        let bills = forget_category(&mut state.bills, year, &removed);
        tracing::info!(year, category = %removed.name, bills, "category deleted");
        Ok(())
    }

    pub fn set_cell(
        state: &mut PlannerState,
        year: i32,
        id: Uuid,
        month: u32,
        value: f64,
    ) -> ServiceResult<f64> {
        Self::year_mut(state, year)?.set_cell(id, month, value)
    }

    /// Records a transaction; expenses are added to their month's cell.
    pub fn add_transaction(
        state: &mut PlannerState,
        transaction: FinanceTransaction,
        defaults: &[String],
    ) -> ServiceResult<Uuid> {
        let id = transaction.id;
        if transaction.is_expense() {
            let year = transaction.date.year();
            ensure_year_with_bills(&mut state.ledgers, &mut state.bills, year, defaults);
        }
        post_transaction(&mut state.ledgers, &transaction, Posting::Apply, defaults);
        state.transactions.push(transaction);
        Ok(id)
    }

    /// Deletes a transaction; an expense is subtracted from its cell again.
    pub fn delete_transaction(
        state: &mut PlannerState,
        id: Uuid,
        defaults: &[String],
    ) -> ServiceResult<FinanceTransaction> {
        let index = state
            .transactions
            .iter()
            .position(|transaction| transaction.id == id)
            .ok_or_else(|| PlannerError::not_found("transaction", id))?;
        let removed = state.transactions.remove(index);
        if removed.is_expense() {
            let year = removed.date.year();
            ensure_year_with_bills(&mut state.ledgers, &mut state.bills, year, defaults);
        }
        post_transaction(&mut state.ledgers, &removed, Posting::Revert, defaults);
        Ok(removed)
    }

    fn year_mut(state: &mut PlannerState, year: i32) -> ServiceResult<&mut YearLedger> {
        state
            .ledgers
            .get_mut(&year)
            .ok_or_else(|| PlannerError::not_found("ledger year", year))
    }
}
