use chrono::{Datelike, Local, NaiveDate};

/// Source of "today" for date validation and the classifier's year hint.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
