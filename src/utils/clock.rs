use chrono::{DateTime, Local, NaiveDate, Utc};

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn time(&self) -> DateTime<Utc>;

    /// Calendar date as the user sees it. Week selection and export file names use this.
    fn today(&self) -> NaiveDate;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
