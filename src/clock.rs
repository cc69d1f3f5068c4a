use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current time for stamping plans and counting weeks to a due date.
pub trait Clock {
  fn now(&self) -> DateTime<Utc>;

  fn today(&self) -> NaiveDate {
    self.now().date_naive()
  }
}

pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
  /// Noon UTC on `date`
  pub fn on(date: NaiveDate) -> Self {
    let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
    Self(noon.and_utc())
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    self.0
  }
}
