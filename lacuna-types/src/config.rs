//! Policy knobs shared by the analyzers and orchestrators.
//!
//! Heuristic thresholds live here as named values rather than literals at the
//! call sites; the defaults pin the currently observed behavior.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::LacunaError;
use crate::gap::GapClassification;

/// Retrieval mode deciding which gaps are eligible for fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum FetchMode {
    /// Use only held data; never fetch.
    #[default]
    Local,
    /// Extend past the end of held data and fill internal gaps.
    Tail,
    /// Extend before the start of held data; internal gaps are not scanned.
    Backfill,
    /// Leading and trailing boundaries plus internal gaps.
    Full,
}

impl FetchMode {
    /// Whether the gap before the first held bar is a candidate.
    #[must_use]
    pub const fn scans_leading(self) -> bool {
        matches!(self, Self::Backfill | Self::Full)
    }

    /// Whether the gap after the last held bar is a candidate.
    #[must_use]
    pub const fn scans_trailing(self) -> bool {
        matches!(self, Self::Tail | Self::Full)
    }

    /// Whether holes between held bars are candidates.
    #[must_use]
    pub const fn scans_internal(self) -> bool {
        matches!(self, Self::Tail | Self::Full)
    }

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Tail => "tail",
            Self::Backfill => "backfill",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchMode {
    type Err = LacunaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "tail" => Ok(Self::Tail),
            "backfill" => Ok(Self::Backfill),
            "full" => Ok(Self::Full),
            other => Err(LacunaError::invalid_arg(format!("unknown fetch mode '{other}'"))),
        }
    }
}

/// How the coordinator issues per-timeframe loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LoadStrategy {
    /// One timeframe after another; progress advances as each load finishes.
    #[default]
    Sequential,
    /// All loads in flight at once; results are processed in request order.
    Concurrent,
}

/// Thresholds used by gap classification and analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GapPolicy {
    /// Gaps longer than this without a calendar explanation are `MarketClosure`.
    pub market_closure_threshold_hours: i64,
    /// Number of missing trading days an `ExpectedHoliday` may cover.
    pub holiday_max_trading_days: u32,
    /// Longest interval, in hours, that can still be an `ExpectedHoliday`.
    ///
    /// One missing session plus the adjacent weekend, with an hour of DST slack.
    pub holiday_max_hours: i64,
    /// Gaps longer than this are always fetched regardless of classification.
    pub large_gap_override_hours: i64,
    /// Gaps shorter than this are dropped for symbols without calendar metadata.
    pub unknown_symbol_min_gap_hours: i64,
    /// Threshold used by the analyzer's "worth filling" filter.
    pub default_priority_threshold: GapClassification,
}

impl GapPolicy {
    /// `market_closure_threshold_hours` as a duration.
    #[must_use]
    pub fn market_closure_threshold(&self) -> TimeDelta {
        TimeDelta::hours(self.market_closure_threshold_hours)
    }

    /// `holiday_max_hours` as a duration.
    #[must_use]
    pub fn holiday_max(&self) -> TimeDelta {
        TimeDelta::hours(self.holiday_max_hours)
    }

    /// `large_gap_override_hours` as a duration.
    #[must_use]
    pub fn large_gap_override(&self) -> TimeDelta {
        TimeDelta::hours(self.large_gap_override_hours)
    }

    /// `unknown_symbol_min_gap_hours` as a duration.
    #[must_use]
    pub fn unknown_symbol_min_gap(&self) -> TimeDelta {
        TimeDelta::hours(self.unknown_symbol_min_gap_hours)
    }
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self {
            market_closure_threshold_hours: 72,
            holiday_max_trading_days: 1,
            holiday_max_hours: 92,
            large_gap_override_hours: 7 * 24,
            unknown_symbol_min_gap_hours: 48,
            default_priority_threshold: GapClassification::Unexpected,
        }
    }
}

/// Floors applied to the common coverage window of a multi-timeframe load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoveragePolicy {
    /// Minimum bars every timeframe must have inside the window.
    pub min_bars: usize,
    /// Minimum window span in days.
    pub min_days: i64,
}

impl Default for CoveragePolicy {
    fn default() -> Self {
        Self {
            min_bars: 50,
            min_days: 7,
        }
    }
}

/// Settings for the duration estimator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimationPolicy {
    /// Ring buffer capacity per key.
    pub max_history: usize,
    /// Minimum samples before an estimate is produced.
    pub min_samples: usize,
    /// `data_points` below this map to the `small` bucket.
    pub small_max_points: u64,
    /// `data_points` below this (and not small) map to the `medium` bucket.
    pub medium_max_points: u64,
    /// Records at most this many days old keep `recent_weight`.
    pub recent_days: i64,
    /// Records at most this many days old keep `aging_weight`.
    pub stale_days: i64,
    /// Decay factor for recent records.
    pub recent_weight: f64,
    /// Decay factor for aging records.
    pub aging_weight: f64,
    /// Decay factor for stale records.
    pub stale_weight: f64,
}

impl Default for EstimationPolicy {
    fn default() -> Self {
        Self {
            max_history: 10,
            min_samples: 2,
            small_max_points: 1_000,
            medium_max_points: 10_000,
            recent_days: 7,
            stale_days: 30,
            recent_weight: 1.0,
            aging_weight: 0.8,
            stale_weight: 0.5,
        }
    }
}

/// Aggregate configuration for a lacuna deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LacunaConfig {
    /// Gap classification and analysis thresholds.
    #[serde(default)]
    pub gaps: GapPolicy,
    /// Multi-timeframe coverage floors.
    #[serde(default)]
    pub coverage: CoveragePolicy,
    /// Duration estimator settings.
    #[serde(default)]
    pub estimation: EstimationPolicy,
    /// Loader fan-out strategy.
    #[serde(default)]
    pub load_strategy: LoadStrategy,
}
