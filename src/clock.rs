//! Clock abstraction for day-boundary logic
//!
//! Streaks and challenge rotation are keyed by calendar days, so the engines
//! never read wall-clock time directly. Production code uses [`SystemClock`];
//! tests drive a [`FixedClock`] across midnight.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

/// Format used for day keys ("YYYY-MM-DD")
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Source of "now" and "today" for the engines
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar day
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Today's day key ("YYYY-MM-DD")
    fn today_key(&self) -> String {
        day_key(self.today())
    }

    /// Yesterday's day key ("YYYY-MM-DD")
    fn yesterday_key(&self) -> String {
        let today = self.today();
        day_key(today.pred_opt().unwrap_or(today))
    }
}

/// Wall-clock time; days roll over at local midnight
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(at) }
    }

    /// Clock fixed at noon (UTC) on the given day
    pub fn on_day(day: NaiveDate) -> Self {
        let at = day
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self::new(at)
    }

    pub fn advance(&self, delta: Duration) {
        *self.now.lock().expect("clock lock poisoned") += delta;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

/// Format a date as a day key
pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Running week counter: whole days since 1970-01-01 divided by seven.
///
/// This is not an ISO week; weeks start on Thursdays and never reset at
/// year boundaries.
pub fn week_number(day: NaiveDate) -> i64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    (day - epoch).num_days().div_euclid(7)
}
