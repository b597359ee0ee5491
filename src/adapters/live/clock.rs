//! Live clock for ingredient and cart timestamps.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Wall clock in UTC.
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
