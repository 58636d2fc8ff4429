//! Time source used when no explicit window end is configured

use chrono::{NaiveDateTime, Utc};

pub trait Clock: Send + Sync {
    /// Current time as a naive UTC timestamp
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in UTC
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// A clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
