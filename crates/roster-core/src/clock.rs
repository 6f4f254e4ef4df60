//! Clock abstraction and the calendar-day rule

use chrono::{DateTime, FixedOffset, Utc};
use std::fmt::Debug;

/// Source of "now"
pub trait Clock: Send + Sync + Debug {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Whether `date` falls on today or a later calendar day.
///
/// "Today" is taken in `date`'s own offset and both sides are truncated to
/// the day, so 00:01 today passes while 23:59 yesterday does not.
#[must_use]
pub fn is_today_or_later(date: &DateTime<FixedOffset>, now: DateTime<Utc>) -> bool {
    let today = now.with_timezone(date.offset()).date_naive();
    date.date_naive() >= today
}
