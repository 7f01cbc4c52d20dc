use chrono::{DateTime, TimeZone, Utc};

use crate::port::Clock;

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Frozen at the given Unix milliseconds.
    ///
    /// # Panics
    ///
    /// Panics if `ms` is out of chrono's range.
    pub fn at_millis(ms: i64) -> Self {
        Self(Utc.timestamp_millis_opt(ms).single().expect("timestamp in range"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
