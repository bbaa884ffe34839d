use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current time and the local calendar day.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The local calendar day that counts as "today".
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time in the local timezone.
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

/// A clock pinned to a single instant, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    today: NaiveDate,
}

impl FixedClock {
    /// Pins "today" to `today`, with `now` at midnight UTC of that day.
    pub fn on(today: NaiveDate) -> FixedClock {
        let now = today.and_time(chrono::NaiveTime::MIN).and_utc();
        FixedClock { now, today }
    }

    pub fn at(now: DateTime<Utc>, today: NaiveDate) -> FixedClock {
        FixedClock { now, today }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
