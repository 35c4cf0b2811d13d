use chrono::{DateTime, Duration, Utc};

/// Closed-closed set of admissible start offsets `[start, start + duration]`.
///
/// This is not the running window of a task — it is the window of instants
/// at which a task may *begin*.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatetimeInterval {
    pub start: DateTime<Utc>,
    pub duration: Duration,
}

impl DatetimeInterval {
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Self {
        Self { start, duration }
    }

    /// A degenerate interval containing only `at`.
    pub fn at(at: DateTime<Utc>) -> Self {
        Self { start: at, duration: Duration::zero() }
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.duration
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end()
    }
}
