pub mod bill_service;
pub mod goal_service;
pub mod ledger_service;
pub mod schedule_service;

pub use bill_service::{AmountScope, BillService};
pub use goal_service::GoalService;
pub use ledger_service::LedgerService;
pub use schedule_service::{CreatedEvent, ScheduleService};

pub type ServiceResult<T> = crate::errors::Result<T>;
