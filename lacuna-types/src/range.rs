use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new range. No ordering check is performed.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Length of the range; zero when `end <= start`.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        (self.end - self.start).max(TimeDelta::zero())
    }

    /// True when the range contains no instant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True if `ts` lies in `[start, end)`.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    /// True if the ranges overlap or touch end-to-start.
    #[must_use]
    pub fn touches(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Intersection with `other`, or `None` when empty.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let out = Self::new(self.start.max(other.start), self.end.min(other.end));
        (!out.is_empty()).then_some(out)
    }
}

impl From<(DateTime<Utc>, DateTime<Utc>)> for TimeRange {
    fn from((start, end): (DateTime<Utc>, DateTime<Utc>)) -> Self {
        Self::new(start, end)
    }
}

impl From<TimeRange> for (DateTime<Utc>, DateTime<Utc>) {
    fn from(r: TimeRange) -> Self {
        (r.start, r.end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
