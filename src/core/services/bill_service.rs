//! Business logic helpers for bills, their payments, and future incomes.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::bills::{Bill, FutureIncome};
use crate::calendar::MonthKey;
use crate::core::state::PlannerState;
use crate::errors::PlannerError;
use crate::ledger::{
    apply_bill_to_anchor_year, ensure_year_with_bills, reconcile_bill, withdraw_bill,
};

use super::ServiceResult;

/// How far an amount edit reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountScope {
    OnlyThisMonth,
    FromThisMonthOn,
}

pub struct BillService;

impl BillService {
    /// Stores a new bill and books it into the ledger of its anchor year and
    /// of every year already opened. An anchor year seen for the first time
    /// is opened with the existing bills first.
    pub fn add(state: &mut PlannerState, mut bill: Bill, defaults: &[String]) -> ServiceResult<Uuid> {
        bill.validate()?;
        let id = bill.id;
        let anchor_year = bill.date.year();
        ensure_year_with_bills(&mut state.ledgers, &mut state.bills, anchor_year, defaults);
        let mut months = apply_bill_to_anchor_year(&mut state.ledgers, &mut bill, defaults);
        let open_years: Vec<i32> = state
            .ledgers
            .keys()
            .copied()
            .filter(|year| *year != anchor_year)
            .collect();
        for year in open_years {
            months += reconcile_bill(&mut state.ledgers, &mut bill, year, defaults);
        }
        tracing::info!(bill = %bill.name, monthly = bill.monthly, months, "bill added");
        state.bills.push(bill);
        Ok(id)
    }

    /// Changes the amount for `month` (or from `month` on) and reconciles the
    /// affected open years. Returns the number of ledger cells that moved.
    pub fn edit_amount(
        state: &mut PlannerState,
        id: Uuid,
        month: MonthKey,
        amount: f64,
        scope: AmountScope,
        defaults: &[String],
    ) -> ServiceResult<usize> {
        let PlannerState { bills, ledgers, .. } = state;
        find_mut(bills, id)?;
        ensure_year_with_bills(ledgers, bills, month.year(), defaults);
        let bill = find_mut(bills, id)?;
        let years: Vec<i32> = match scope {
            AmountScope::OnlyThisMonth => {
                bill.set_override(month, amount)?;
                vec![month.year()]
            }
            AmountScope::FromThisMonthOn => {
                bill.add_change(month, amount)?;
                // Later years already open carry the new amount too.
                std::iter::once(month.year())
                    .chain(ledgers.keys().copied().filter(|year| *year > month.year()))
                    .collect()
            }
        };
        Ok(years
            .into_iter()
            .map(|year| reconcile_bill(ledgers, bill, year, defaults))
            .sum())
    }

    pub fn mark_paid(
        state: &mut PlannerState,
        id: Uuid,
        occurrence: NaiveDate,
        paid_on: NaiveDate,
        timestamp: i64,
    ) -> ServiceResult<()> {
        let bill = find_mut(&mut state.bills, id)?;
        if !bill.occurs_on(occurrence) {
            return Err(PlannerError::Validation(format!(
                "{} is not due on {occurrence}",
                bill.name
            )));
        }
        bill.mark_paid(occurrence, paid_on, timestamp);
        Ok(())
    }

    pub fn clear_paid(state: &mut PlannerState, id: Uuid, occurrence: NaiveDate) -> ServiceResult<bool> {
        Ok(find_mut(&mut state.bills, id)?.clear_paid(occurrence))
    }

    pub fn set_note(
        state: &mut PlannerState,
        id: Uuid,
        occurrence: NaiveDate,
        text: &str,
    ) -> ServiceResult<()> {
        find_mut(&mut state.bills, id)?.set_note(occurrence, text);
        Ok(())
    }

    /// Removes the bill and takes its contributions back out of the ledger.
    pub fn remove(state: &mut PlannerState, id: Uuid) -> ServiceResult<Bill> {
        let index = state
            .bills
            .iter()
            .position(|bill| bill.id == id)
            .ok_or_else(|| PlannerError::not_found("bill", id))?;
        let mut bill = state.bills.remove(index);
        withdraw_bill(&mut state.ledgers, &mut bill);
        Ok(bill)
    }

    pub fn add_income(state: &mut PlannerState, income: FutureIncome) -> Uuid {
        let id = income.id;
        state.incomes.push(income);
        state.incomes.sort_by_key(|item| item.date);
        id
    }

    pub fn remove_income(state: &mut PlannerState, id: Uuid) -> ServiceResult<FutureIncome> {
        let index = state
            .incomes
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| PlannerError::not_found("income", id))?;
        Ok(state.incomes.remove(index))
    }

    /// Bills due on `date`.
    pub fn due_on(state: &PlannerState, date: NaiveDate) -> Vec<&Bill> {
        state.bills.iter().filter(|bill| bill.occurs_on(date)).collect()
    }
}

fn find_mut(bills: &mut [Bill], id: Uuid) -> ServiceResult<&mut Bill> {
    bills
        .iter_mut()
        .find(|bill| bill.id == id)
        .ok_or_else(|| PlannerError::not_found("bill", id))
}
