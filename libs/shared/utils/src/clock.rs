use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

/// Source of "now" for anything that compares against the current date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Offset of the wall clock appointment dates and times are written in.
    fn utc_offset(&self) -> FixedOffset {
        Utc.fix()
    }

    /// Current date on that wall clock, not in UTC.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.utc_offset()).date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn in_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::in_offset(Utc.fix())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn utc_offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Clock pinned to one instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    /// Midnight UTC of the given date, read on a UTC wall clock.
    pub fn on(date: NaiveDate) -> Self {
        Self::at(date.and_time(NaiveTime::default()).and_utc(), Utc.fix())
    }

    pub fn at(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { instant, offset }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn utc_offset(&self) -> FixedOffset {
        self.offset
    }
}
