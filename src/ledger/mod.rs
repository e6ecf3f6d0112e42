//! Yearly expense grid, bill reconciliation, and finance transactions.

pub mod category;
pub mod reconcile;
pub mod transaction;
pub mod yearly;

pub use category::{Category, MoveDirection};
pub use reconcile::{
    apply_bill_to_anchor_year, ensure_bills_applied_to_year, ensure_year_with_bills,
    forget_category, reconcile_bill, withdraw_bill,
};
pub use transaction::{
    month_summary, post_transaction, FinanceSummary, FinanceTransaction, Posting, TransactionKind,
};
pub use yearly::{ensure_year, MonthValues, YearLedger, YearlyLedgers, MONTHS_PER_YEAR};
