//! Source of "today" for date defaults, injectable for tests.

use chrono::{Local, NaiveDate};

pub trait Clock: Send + Sync {
    /// Current business-calendar day.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the process' local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
