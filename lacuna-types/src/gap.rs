//! Gap taxonomy and the per-gap value object produced by classification.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timeframe::Timeframe;

/// Closed classification of a time interval with no data.
///
/// Variants are declared in ascending "worth filling" priority, so the derived
/// `Ord` ranks `Unexpected` highest and `ExpectedWeekend` lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapClassification {
    /// The interval spans the market's weekly closure.
    ExpectedWeekend,
    /// The interval covers a single trading day adjacent to a weekend.
    ExpectedHoliday,
    /// A multi-day interval with no calendar explanation.
    MarketClosure,
    /// The interval falls outside regular and extended sessions.
    ExpectedTradingHours,
    /// Data should exist but does not.
    Unexpected,
}

impl GapClassification {
    /// All classifications in ascending priority.
    pub const ALL: [Self; 5] = [
        Self::ExpectedWeekend,
        Self::ExpectedHoliday,
        Self::MarketClosure,
        Self::ExpectedTradingHours,
        Self::Unexpected,
    ];

    /// Ordinal rank used by "worth filling" decisions (higher = more worth fetching).
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::ExpectedWeekend => 0,
            Self::ExpectedHoliday => 1,
            Self::MarketClosure => 2,
            Self::ExpectedTradingHours => 3,
            Self::Unexpected => 4,
        }
    }

    /// Wire label, e.g. `"EXPECTED_WEEKEND"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExpectedWeekend => "EXPECTED_WEEKEND",
            Self::ExpectedHoliday => "EXPECTED_HOLIDAY",
            Self::MarketClosure => "MARKET_CLOSURE",
            Self::ExpectedTradingHours => "EXPECTED_TRADING_HOURS",
            Self::Unexpected => "UNEXPECTED",
        }
    }

    /// True if the interval is explained by the trading calendar.
    #[must_use]
    pub const fn is_expected(self) -> bool {
        !matches!(self, Self::Unexpected)
    }
}

impl fmt::Display for GapClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analyzing one interval against a symbol's calendar.
///
/// Created per classification call; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapInfo {
    /// Interval start (UTC).
    pub start_time: DateTime<Utc>,
    /// Interval end (UTC).
    pub end_time: DateTime<Utc>,
    /// Assigned classification.
    pub classification: GapClassification,
    /// Estimated number of bars absent from the interval.
    pub bars_missing: u64,
    /// Wall-clock length of the interval in hours.
    pub duration_hours: f64,
    /// Human description of the weekdays involved, e.g. `"Saturday-Sunday"`.
    pub day_context: String,
    /// Symbol the interval belongs to.
    pub symbol: String,
    /// Timeframe the interval was evaluated at.
    pub timeframe: Timeframe,
    /// Short explanation of the rule that produced the classification.
    pub note: String,
}
