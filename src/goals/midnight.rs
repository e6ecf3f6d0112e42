use std::time::Duration;

use chrono::NaiveDateTime;

use crate::calendar::add_days;

/// Shortest wait the timer ever schedules.
pub const MIN_DELAY: Duration = Duration::from_secs(1);

/// Time from `now` until the next local midnight plus `buffer`, never less
/// than [`MIN_DELAY`].
pub fn delay_until_next_rollover(now: NaiveDateTime, buffer: Duration) -> Duration {
    let next_midnight = add_days(now.date(), 1).and_time(chrono::NaiveTime::MIN);
    let until_midnight = (next_midnight - now).to_std().unwrap_or(Duration::ZERO);
    (until_midnight + buffer).max(MIN_DELAY)
}
