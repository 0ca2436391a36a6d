//! Clock seam for deterministic day-rollover tests.

use chrono::{DateTime, Local, NaiveDate, Utc};
use parking_lot::Mutex;

/// Calendar source injected into the engine.
///
/// Dates are client-local calendar dates with no timezone normalization,
/// matching how install/usage dates are compared on the client.
pub trait Clock: Send + Sync {
    /// Today's client-local calendar date.
    fn today(&self) -> NaiveDate;

    /// Current instant, used for premium expiry stamps.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and simulation.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Move the calendar forward by whole days.
    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock();
        *today = *today + chrono::Days::new(days);
    }

    pub fn set_today(&self, date: NaiveDate) {
        *self.today.lock() = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }

    fn now(&self) -> DateTime<Utc> {
        self.today
            .lock()
            .and_hms_opt(12, 0, 0)
            .expect("noon is a valid time")
            .and_utc()
    }
}
