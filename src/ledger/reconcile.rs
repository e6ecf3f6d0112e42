use chrono::Datelike;
use uuid::Uuid;

use crate::bills::Bill;
use crate::calendar::MonthKey;

use super::category::Category;
use super::yearly::{ensure_year, YearLedger, YearlyLedgers, MONTHS_PER_YEAR};

/// Brings the ledger in line with what `bill` should contribute to `year`.
///
/// For each month the desired amount is the bill's resolved amount on its due
/// date (zero when not due that month). Only the difference from
/// `bill.applied` is written, so calling this repeatedly is harmless. Returns
/// the number of months whose cell moved.
pub fn reconcile_bill(
    ledgers: &mut YearlyLedgers,
    bill: &mut Bill,
    year: i32,
    defaults: &[String],
) -> usize {
    let ledger = ensure_year(ledgers, year, defaults);
    adopt_named_row(ledger, bill, year);
    let mut changed = 0;
    for month in 1..=MONTHS_PER_YEAR {
        let Ok(key) = MonthKey::new(year, month) else {
            continue;
        };
        let desired = bill
            .due_date_in_month(year, month)
            .map(|due| bill.amount_on(due))
            .unwrap_or(0.0);
        let previous = bill.applied.get(&key).copied().unwrap_or(0.0);
        let delta = desired - previous;
        if delta == 0.0 {
            continue;
        }
        let category = bill_row(ledger, bill, year);
        let cell = ledger.adjust_cell(category, month, delta);
        bill.applied.insert(key, desired);
        tracing::debug!(
            bill = %bill.name,
            month = %key,
            delta,
            cell,
            "reconciled bill amount"
        );
        changed += 1;
    }
    changed
}

/// Row `bill` books into for `year`: the recorded row while it still exists,
/// otherwise the row named after the bill, created on demand and recorded.
fn bill_row(ledger: &mut YearLedger, bill: &mut Bill, year: i32) -> Uuid {
    if let Some(id) = recorded_row(ledger, bill, year) {
        return id;
    }
    let id = ledger.get_or_create_category(&bill.name);
    bill.category_ids.insert(year, id);
    id
}

fn recorded_row(ledger: &YearLedger, bill: &Bill, year: i32) -> Option<Uuid> {
    bill.category_ids
        .get(&year)
        .copied()
        .filter(|id| ledger.category(*id).is_some())
}

// Stores written before rows were recorded only know the bill by name.
fn adopt_named_row(ledger: &YearLedger, bill: &mut Bill, year: i32) {
    if bill.category_ids.contains_key(&year) || !bill.applied.keys().any(|key| key.year() == year) {
        return;
    }
    if let Some(category) = ledger.category_by_name(&bill.name) {
        bill.category_ids.insert(year, category.id);
    }
}

/// Applies a newly created bill to the year of its anchor date.
pub fn apply_bill_to_anchor_year(
    ledgers: &mut YearlyLedgers,
    bill: &mut Bill,
    defaults: &[String],
) -> usize {
    let year = bill.date.year();
    reconcile_bill(ledgers, bill, year, defaults)
}

/// Seeds `year` if needed and reconciles every bill against it.
pub fn ensure_bills_applied_to_year(
    ledgers: &mut YearlyLedgers,
    bills: &mut [Bill],
    year: i32,
    defaults: &[String],
) -> usize {
    ensure_year(ledgers, year, defaults);
    bills
        .iter_mut()
        .map(|bill| reconcile_bill(ledgers, bill, year, defaults))
        .sum()
}

/// Creates `year` with every bill booked into it when it does not exist yet.
/// Any path that is about to write into a year goes through here first, so a
/// year never holds only part of the bills.
pub fn ensure_year_with_bills(
    ledgers: &mut YearlyLedgers,
    bills: &mut [Bill],
    year: i32,
    defaults: &[String],
) -> usize {
    if ledgers.contains_key(&year) {
        return 0;
    }
    let months = ensure_bills_applied_to_year(ledgers, bills, year, defaults);
    tracing::info!(year, months, "opened ledger year with existing bills");
    months
}

/// Takes back everything `bill` has contributed, e.g. before deleting it.
pub fn withdraw_bill(ledgers: &mut YearlyLedgers, bill: &mut Bill) {
    for (key, amount) in std::mem::take(&mut bill.applied) {
        let Some(ledger) = ledgers.get_mut(&key.year()) else {
            continue;
        };
        let category = recorded_row(ledger, bill, key.year())
            .or_else(|| ledger.category_by_name(&bill.name).map(|c| c.id));
        let Some(category) = category else {
            continue;
        };
        ledger.adjust_cell(category, key.month(), -amount);
        tracing::debug!(bill = %bill.name, month = %key, amount, "withdrew bill amount");
    }
    bill.category_ids.clear();
}

/// Forgets what bills booked into a row that was just deleted from `year`.
/// The cells went with the row, so the next reconcile starts from zero.
/// Returns how many bills were affected.
pub fn forget_category(bills: &mut [Bill], year: i32, removed: &Category) -> usize {
    let mut forgotten = 0;
    for bill in bills.iter_mut() {
        let booked_here = match bill.category_ids.get(&year) {
            Some(id) => *id == removed.id,
            None => removed.matches_name(&bill.name),
        };
        if !booked_here {
            continue;
        }
        bill.category_ids.remove(&year);
        bill.applied.retain(|key, _| key.year() != year);
        forgotten += 1;
    }
    forgotten
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn defaults() -> Vec<String> {
        vec!["Food".into()]
    }

    fn cell(ledgers: &YearlyLedgers, year: i32, name: &str, month: u32) -> f64 {
        let ledger = &ledgers[&year];
        ledger
            .category_by_name(name)
            .map(|c| ledger.cell(c.id, month))
            .unwrap_or(0.0)
    }

    #[test]
    fn monthly_bill_fills_every_month_once() {
        let mut ledgers = YearlyLedgers::new();
        let mut bill = Bill::new("Rent", date(2024, 3, 31), 800.0, true);
        assert_eq!(apply_bill_to_anchor_year(&mut ledgers, &mut bill, &defaults()), 12);
        assert_eq!(reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults()), 0);
        assert_eq!(ledgers[&2024].grand_total(), 9600.0);
        assert_eq!(bill.applied.len(), 12);
    }

    #[test]
    fn amount_change_moves_only_the_delta() {
        let mut ledgers = YearlyLedgers::new();
        let mut bill = Bill::new("Internet", date(2024, 1, 10), 30.0, true);
        reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults());

        // A manual top-up on the same cell survives reconciliation.
        let id = ledgers[&2024].category_by_name("internet").unwrap().id;
        ledgers.get_mut(&2024).unwrap().adjust_cell(id, 8, 5.0);

        bill.add_change(MonthKey::new(2024, 7).unwrap(), 40.0).unwrap();
        assert_eq!(reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults()), 6);
        assert_eq!(cell(&ledgers, 2024, "Internet", 6), 30.0);
        assert_eq!(cell(&ledgers, 2024, "Internet", 7), 40.0);
        assert_eq!(cell(&ledgers, 2024, "Internet", 8), 45.0);
    }

    #[test]
    fn one_off_bill_touches_its_month_only() {
        let mut ledgers = YearlyLedgers::new();
        let mut bill = Bill::new("Insurance", date(2024, 6, 15), 120.0, false);
        apply_bill_to_anchor_year(&mut ledgers, &mut bill, &defaults());
        assert_eq!(cell(&ledgers, 2024, "Insurance", 6), 120.0);
        assert_eq!(ledgers[&2024].grand_total(), 120.0);

        // Another year has nothing to apply and no category is created.
        assert_eq!(reconcile_bill(&mut ledgers, &mut bill, 2025, &defaults()), 0);
        assert!(ledgers[&2025].category_by_name("Insurance").is_none());
    }

    #[test]
    fn clamped_cells_never_go_negative() {
        let mut ledgers = YearlyLedgers::new();
        let mut bill = Bill::new("Gym", date(2024, 1, 5), 50.0, true);
        reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults());
        let id = ledgers[&2024].category_by_name("Gym").unwrap().id;
        ledgers.get_mut(&2024).unwrap().set_cell(id, 2, 10.0).unwrap();

        bill.set_override(MonthKey::new(2024, 2).unwrap(), 20.0).unwrap();
        reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults());
        assert_eq!(cell(&ledgers, 2024, "Gym", 2), 0.0);
        assert_eq!(bill.applied[&MonthKey::new(2024, 2).unwrap()], 20.0);
    }

    #[test]
    fn every_bill_lands_in_a_new_year() {
        let mut ledgers = YearlyLedgers::new();
        let mut bills = vec![
            Bill::new("Rent", date(2024, 1, 1), 500.0, true),
            Bill::new("Phone", date(2024, 1, 20), 10.0, true),
        ];
        assert_eq!(
            ensure_bills_applied_to_year(&mut ledgers, &mut bills, 2025, &defaults()),
            24
        );
        assert_eq!(ledgers[&2025].grand_total(), 6120.0);
    }

    #[test]
    fn withdraw_reverses_contributions() {
        let mut ledgers = YearlyLedgers::new();
        let mut bill = Bill::new("Rent", date(2024, 1, 1), 500.0, true);
        reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults());
        withdraw_bill(&mut ledgers, &mut bill);
        assert!(bill.applied.is_empty());
        assert_eq!(ledgers[&2024].grand_total(), 0.0);
    }

    #[test]
    fn base_amount_change_corrects_stale_months_once() {
        let mut ledgers = YearlyLedgers::new();
        let mut bill = Bill::new("Rent", date(2024, 1, 1), 500.0, true);
        reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults());

        bill.amount = 550.0;
        assert_eq!(reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults()), 12);
        assert_eq!(cell(&ledgers, 2024, "Rent", 4), 550.0);
        assert_eq!(ledgers[&2024].grand_total(), 6600.0);
        assert_eq!(reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults()), 0);
        assert_eq!(ledgers[&2024].grand_total(), 6600.0);
    }

    #[test]
    fn renamed_row_is_still_found() {
        let mut ledgers = YearlyLedgers::new();
        let mut bill = Bill::new("Rent", date(2024, 1, 1), 100.0, true);
        reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults());
        let id = ledgers[&2024].category_by_name("Rent").unwrap().id;
        ledgers.get_mut(&2024).unwrap().rename_category(id, "Housing").unwrap();

        bill.set_override(MonthKey::new(2024, 3).unwrap(), 150.0).unwrap();
        reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults());
        assert!(ledgers[&2024].category_by_name("Rent").is_none());
        assert_eq!(cell(&ledgers, 2024, "Housing", 3), 150.0);

        withdraw_bill(&mut ledgers, &mut bill);
        assert_eq!(ledgers[&2024].grand_total(), 0.0);
        assert!(bill.category_ids.is_empty());
    }

    #[test]
    fn rows_from_older_stores_are_adopted_by_name() {
        let mut ledgers = YearlyLedgers::new();
        let mut bill = Bill::new("Rent", date(2024, 1, 1), 100.0, true);
        reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults());
        bill.category_ids.clear();

        assert_eq!(reconcile_bill(&mut ledgers, &mut bill, 2024, &defaults()), 0);
        let id = ledgers[&2024].category_by_name("Rent").unwrap().id;
        assert_eq!(bill.category_ids[&2024], id);
    }

    #[test]
    fn deleted_row_is_forgotten_and_rebooked_in_full() {
        let mut ledgers = YearlyLedgers::new();
        let mut bills = vec![
            Bill::new("Rent", date(2024, 1, 1), 100.0, true),
            Bill::new("Phone", date(2024, 1, 9), 10.0, true),
        ];
        ensure_bills_applied_to_year(&mut ledgers, &mut bills, 2024, &defaults());
        ensure_bills_applied_to_year(&mut ledgers, &mut bills, 2025, &defaults());
        let id = ledgers[&2024].category_by_name("Rent").unwrap().id;
        let removed = ledgers.get_mut(&2024).unwrap().delete_category(id).unwrap();

        assert_eq!(forget_category(&mut bills, 2024, &removed), 1);
        assert!(bills[0].applied.keys().all(|key| key.year() == 2025));
        assert_eq!(bills[1].applied.len(), 24);

        bills[0].set_override(MonthKey::new(2024, 3).unwrap(), 650.0).unwrap();
        reconcile_bill(&mut ledgers, &mut bills[0], 2024, &defaults());
        assert_eq!(cell(&ledgers, 2024, "Rent", 3), 650.0);
        assert_eq!(cell(&ledgers, 2024, "Rent", 4), 100.0);
        assert_eq!(bills[0].applied[&MonthKey::new(2024, 3).unwrap()], 650.0);
    }

    #[test]
    fn year_with_bills_is_created_only_once() {
        let mut ledgers = YearlyLedgers::new();
        let mut bills = vec![Bill::new("Rent", date(2024, 1, 1), 100.0, true)];
        assert_eq!(ensure_year_with_bills(&mut ledgers, &mut bills, 2026, &defaults()), 12);
        assert_eq!(ensure_year_with_bills(&mut ledgers, &mut bills, 2026, &defaults()), 0);
        assert_eq!(ledgers[&2026].grand_total(), 1200.0);

        let mut none: Vec<Bill> = Vec::new();
        ensure_year_with_bills(&mut ledgers, &mut none, 2027, &defaults());
        assert_eq!(ledgers[&2027].cats.len(), 1);
    }
}
