//! Planner facade, services, clock, and filesystem helpers.

pub mod midnight;
pub mod planner;
pub mod services;
pub mod state;
pub mod time;
pub mod utils;

pub use midnight::MidnightTimer;
pub use planner::Planner;
pub use state::PlannerState;
pub use time::{Clock, ManualClock, SystemClock};
