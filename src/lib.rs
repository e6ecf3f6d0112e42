#![doc(test(attr(deny(warnings))))]

//! Planner Core is the scheduling and bookkeeping engine of a personal
//! planner: recurring agenda events, bills with per-month amounts, yearly
//! expense ledgers reconciled against bill payments, and daily goals that
//! roll forward at midnight.

pub mod bills;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod goals;
pub mod ledger;
pub mod schedule;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(utils::DEFAULT_LOG_FILTER);
}

/// Initializes global tracing with `filter` and emits a startup info log.
/// Only the first call has any effect.
pub fn init_with_filter(filter: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        let stamp = utils::build_info::STAMP;
        tracing::info!(
            version = stamp.version,
            commit = stamp.commit,
            built_on = stamp.built_on,
            "Planner Core tracing initialized."
        );
    });
}
