//! Bills, their per-date amounts and payment state, and the due-date views
//! built on top of them.

mod bill;
mod payment;
pub mod upcoming;

pub use bill::{AmountChange, Bill, BillStatus};
pub use payment::PaymentRecord;
pub use upcoming::{
    bill_totals, future_summary, upcoming_bills, BillTotals, DueLabel, FutureIncome,
    FutureSummary, UpcomingBill,
};
