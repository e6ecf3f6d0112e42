use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::MonthKey;
use crate::errors::{PlannerError, Result};

use super::yearly::{ensure_year, YearlyLedgers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[serde(alias = "ingreso")]
    Income,
    #[serde(alias = "gasto")]
    Expense,
}

/// A recorded income or expense. Never edited in place; an edit is a delete
/// followed by a new transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceTransaction {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Category name, resolved against the grid of the transaction's year.
    pub category: String,
    #[serde(default)]
    pub desc: String,
    pub amount: f64,
}

impl FinanceTransaction {
    pub fn new(
        date: NaiveDate,
        kind: TransactionKind,
        category: impl Into<String>,
        desc: impl Into<String>,
        amount: f64,
    ) -> Result<Self> {
        let category = category.into().trim().to_string();
        if category.is_empty() {
            return Err(PlannerError::Validation("transaction category is required".into()));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(PlannerError::Validation(format!(
                "transaction amount must be positive (got {amount})"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            kind,
            category,
            desc: desc.into().trim().to_string(),
            amount,
        })
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posting {
    Apply,
    Revert,
}

/// Adds (or removes) an expense in its month's cell. Income never touches the
/// grid. Returns the new cell value for expenses.
pub fn post_transaction(
    ledgers: &mut YearlyLedgers,
    transaction: &FinanceTransaction,
    posting: Posting,
    defaults: &[String],
) -> Option<f64> {
    if !transaction.is_expense() {
        return None;
    }
    let ledger = ensure_year(ledgers, transaction.date.year(), defaults);
    let category = ledger.get_or_create_category(&transaction.category);
    let delta = match posting {
        Posting::Apply => transaction.amount,
        Posting::Revert => -transaction.amount,
    };
    let cell = ledger.adjust_cell(category, transaction.date.month(), delta);
    tracing::debug!(
        category = %transaction.category,
        date = %transaction.date,
        delta,
        cell,
        "posted expense"
    );
    Some(cell)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinanceSummary {
    pub income: f64,
    pub expenses: f64,
}

impl FinanceSummary {
    pub fn balance(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Income and expense totals for the transactions dated in `month`.
pub fn month_summary(transactions: &[FinanceTransaction], month: MonthKey) -> FinanceSummary {
    transactions
        .iter()
        .filter(|transaction| MonthKey::of(transaction.date) == month)
        .fold(FinanceSummary::default(), |mut summary, transaction| {
            match transaction.kind {
                TransactionKind::Income => summary.income += transaction.amount,
                TransactionKind::Expense => summary.expenses += transaction.amount,
            }
            summary
        })
}
