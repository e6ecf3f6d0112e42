use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{clamp_day, last_day_of_month, MonthKey};
use crate::errors::{PlannerError, Result};

use super::payment::{self, PaymentRecord};

/// A permanent amount change effective from `from` onward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountChange {
    pub from: MonthKey,
    pub amount: f64,
}

/// A one-off or monthly bill.
///
/// `applied` records, per month, the amount this bill last pushed into the
/// yearly ledger. Reconciliation only ever moves the ledger by the difference
/// between the desired amount and this record. `category_ids` remembers, per
/// year, which ledger row those amounts went into so a renamed row still
/// resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Uuid,
    pub name: String,
    /// Anchor date. Monthly bills only use its day of month.
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub monthly: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<MonthKey, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<AmountChange>,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "payment::deserialize_paid"
    )]
    pub paid: BTreeMap<NaiveDate, PaymentRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub applied: BTreeMap<MonthKey, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_ids: BTreeMap<i32, Uuid>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<NaiveDate, String>,
}

impl Bill {
    pub fn new(name: impl Into<String>, date: NaiveDate, amount: f64, monthly: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            amount,
            monthly,
            overrides: BTreeMap::new(),
            changes: Vec::new(),
            paid: BTreeMap::new(),
            applied: BTreeMap::new(),
            category_ids: BTreeMap::new(),
            notes: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlannerError::Validation("bill name is required".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(PlannerError::Validation(format!(
                "bill amount must be positive (got {})",
                self.amount
            )));
        }
        Ok(())
    }

    /// Whether the bill falls due on `date`. Monthly bills are due on the
    /// anchor's day of month, clamped to shorter months, in every month.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        if !self.monthly {
            return self.date == date;
        }
        let due_day = self
            .date
            .day()
            .min(last_day_of_month(date.year(), date.month()));
        date.day() == due_day
    }

    pub fn due_date_in_month(&self, year: i32, month: u32) -> Option<NaiveDate> {
        if self.monthly {
            return clamp_day(year, month, self.date.day());
        }
        (self.date.year() == year && self.date.month() == month).then_some(self.date)
    }

    /// Amount the bill takes on `date`: a month override wins, then the latest
    /// change effective by that month, then the base amount.
    pub fn amount_on(&self, date: NaiveDate) -> f64 {
        let month = MonthKey::of(date);
        if let Some(amount) = self.overrides.get(&month) {
            return *amount;
        }
        let mut changes: Vec<&AmountChange> = self.changes.iter().collect();
        changes.sort_by_key(|change| change.from);
        changes
            .into_iter()
            .filter(|change| change.from <= month)
            .last()
            .map(|change| change.amount)
            .unwrap_or(self.amount)
    }

    /// "Only this month" edit.
    pub fn set_override(&mut self, month: MonthKey, amount: f64) -> Result<()> {
        ensure_amount(amount)?;
        self.overrides.insert(month, amount);
        Ok(())
    }

    /// "From this month onward" edit.
    pub fn add_change(&mut self, from: MonthKey, amount: f64) -> Result<()> {
        ensure_amount(amount)?;
        self.changes.push(AmountChange { from, amount });
        Ok(())
    }

    pub fn mark_paid(&mut self, occurrence: NaiveDate, paid_on: NaiveDate, timestamp: i64) {
        self.paid.insert(
            occurrence,
            PaymentRecord {
                on: paid_on,
                ts: Some(timestamp),
            },
        );
    }

    pub fn clear_paid(&mut self, occurrence: NaiveDate) -> bool {
        self.paid.remove(&occurrence).is_some()
    }

    pub fn is_paid_on(&self, occurrence: NaiveDate) -> bool {
        self.paid.contains_key(&occurrence)
    }

    pub fn paid_info(&self, occurrence: NaiveDate) -> Option<&PaymentRecord> {
        self.paid.get(&occurrence)
    }

    /// True when the occurrence was paid no more than `days` days before `today`.
    pub fn is_paid_recently(&self, occurrence: NaiveDate, today: NaiveDate, days: i64) -> bool {
        self.paid_info(occurrence)
            .is_some_and(|record| (today - record.on).num_days() <= days)
    }

    /// Stores a note for an occurrence; blank text removes it.
    pub fn set_note(&mut self, occurrence: NaiveDate, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.notes.remove(&occurrence);
        } else {
            self.notes.insert(occurrence, text.to_string());
        }
    }

    pub fn note(&self, occurrence: NaiveDate) -> Option<&str> {
        self.notes.get(&occurrence).map(String::as_str)
    }

    /// Display state of the occurrence on `date` relative to `today`.
    pub fn status_on(&self, date: NaiveDate, today: NaiveDate) -> BillStatus {
        if self.is_paid_on(date) {
            BillStatus::Paid
        } else if date < today {
            BillStatus::Overdue
        } else if (date - today).num_days() <= SOON_DAYS {
            BillStatus::Soon
        } else {
            BillStatus::Pending
        }
    }
}

const SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillStatus {
    Paid,
    Overdue,
    Soon,
    Pending,
}

fn ensure_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(PlannerError::Validation(format!(
            "amount must be positive (got {amount})"
        )))
    }
}
