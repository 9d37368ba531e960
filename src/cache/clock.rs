use chrono::{DateTime, Utc};

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
  use super::*;
  use chrono::Duration;
  use std::sync::Mutex;

  /// Clock that only moves when told to.
  pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
  }

  impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
      Self {
        now: Mutex::new(start),
      }
    }

    pub fn advance(&self, by: Duration) {
      let mut now = self.now.lock().unwrap();
      *now += by;
    }
  }

  impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
      *self.now.lock().unwrap()
    }
  }
}
