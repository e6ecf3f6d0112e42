use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{add_days, days_between, last_day_of_month};
use crate::errors::{PlannerError, Result};

use super::Bill;

/// Short window reported next to the configured horizon by [`bill_totals`].
pub const SHORT_WINDOW_DAYS: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueLabel {
    Overdue,
    Today,
    Tomorrow,
    InDays(i64),
}

impl DueLabel {
    fn for_offset(offset: i64) -> Self {
        match offset {
            i64::MIN..=-1 => DueLabel::Overdue,
            0 => DueLabel::Today,
            1 => DueLabel::Tomorrow,
            days => DueLabel::InDays(days),
        }
    }
}

impl fmt::Display for DueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueLabel::Overdue => f.write_str("Overdue"),
            DueLabel::Today => f.write_str("Today"),
            DueLabel::Tomorrow => f.write_str("Tomorrow"),
            DueLabel::InDays(days) => write!(f, "In {days} days"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingBill {
    pub bill_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub label: DueLabel,
    pub paid: bool,
}

/// Bill occurrences of the current month: everything from the 1st to
/// yesterday is labelled overdue, the rest by distance from today. Paid
/// occurrences stay listed only while paid within `recent_paid_days`.
pub fn upcoming_bills(bills: &[Bill], today: NaiveDate, recent_paid_days: i64) -> Vec<UpcomingBill> {
    let last = last_day_of_month(today.year(), today.month());
    (1..=last)
        .filter_map(|day| today.with_day(day))
        .flat_map(|date| {
            bills
                .iter()
                .filter(move |bill| bill.occurs_on(date))
                .map(move |bill| (bill, date))
        })
        .filter_map(|(bill, date)| {
            let paid = bill.is_paid_on(date);
            if paid && !bill.is_paid_recently(date, today, recent_paid_days) {
                return None;
            }
            Some(UpcomingBill {
                bill_id: bill.id,
                name: bill.name.clone(),
                date,
                amount: bill.amount_on(date),
                label: DueLabel::for_offset(days_between(today, date)),
                paid,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BillTotals {
    pub short_window: f64,
    pub horizon: f64,
    pub horizon_days: i64,
}

/// Sums resolved bill amounts due from today through `today + n` days for the
/// short window and for `horizon_days`.
pub fn bill_totals(bills: &[Bill], today: NaiveDate, horizon_days: i64) -> BillTotals {
    let mut totals = BillTotals {
        short_window: 0.0,
        horizon: 0.0,
        horizon_days,
    };
    for offset in 0..=horizon_days.max(SHORT_WINDOW_DAYS) {
        let date = add_days(today, offset);
        let day_sum: f64 = bills
            .iter()
            .filter(|bill| bill.occurs_on(date))
            .map(|bill| bill.amount_on(date))
            .sum();
        if offset <= horizon_days {
            totals.horizon += day_sum;
        }
        if offset <= SHORT_WINDOW_DAYS {
            totals.short_window += day_sum;
        }
    }
    totals
}

/// Expected income not yet received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureIncome {
    pub id: Uuid,
    pub date: NaiveDate,
    pub text: String,
    pub amount: f64,
    /// Likelihood in percent; zero when unknown.
    #[serde(default)]
    pub prob: u8,
}

impl FutureIncome {
    pub fn new(date: NaiveDate, text: impl Into<String>, amount: f64, prob: u8) -> Result<Self> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(PlannerError::Validation("income description is required".into()));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(PlannerError::Validation(format!(
                "income amount must be positive (got {amount})"
            )));
        }
        if prob > 100 {
            return Err(PlannerError::Validation(format!(
                "probability must be between 0 and 100 (got {prob})"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            text,
            amount,
            prob,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FutureSummary {
    pub income: f64,
    pub expenses: f64,
}

impl FutureSummary {
    pub fn balance(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Future incomes dated today or later against unpaid bill amounts for the
/// current month and the remaining months of the year.
pub fn future_summary(bills: &[Bill], incomes: &[FutureIncome], today: NaiveDate) -> FutureSummary {
    let income = incomes
        .iter()
        .filter(|item| item.date >= today)
        .map(|item| item.amount)
        .sum();
    let expenses = bills
        .iter()
        .flat_map(|bill| {
            (today.month()..=12)
                .filter_map(|month| bill.due_date_in_month(today.year(), month))
                .filter(|due| !bill.is_paid_on(*due))
                .map(|due| bill.amount_on(due))
        })
        .sum();
    FutureSummary { income, expenses }
}
