//! Report envelopes produced by analyzers and orchestrators.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use paft::market::responses::history::HistoryResponse;
use serde::{Deserialize, Serialize};

use crate::error::LacunaError;
use crate::gap::GapClassification;
use crate::range::TimeRange;
use crate::timeframe::Timeframe;

/// Why a candidate gap was not selected for fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The classifier ranked the gap below the priority threshold.
    Classified(GapClassification),
    /// The symbol has no calendar and the gap is too short to tell apart from a closure.
    NoCalendarShortGap,
}

/// A candidate gap the analyzer decided not to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedGap {
    /// The merged candidate interval.
    pub range: TimeRange,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Outcome of a gap analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapAnalysisReport {
    /// Intervals to fetch, ascending and non-overlapping.
    pub fetch: Vec<TimeRange>,
    /// Candidates that were filtered out.
    pub skipped: Vec<SkippedGap>,
}

/// Coverage of one timeframe relative to the common window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeCoverage {
    /// First bar timestamp of the loaded series.
    pub start: DateTime<Utc>,
    /// Last bar timestamp of the loaded series.
    pub end: DateTime<Utc>,
    /// Bars in the loaded series.
    pub bars_total: usize,
    /// Bars inside the common window.
    pub bars_in_window: usize,
}

/// Largest interval for which every loaded timeframe has data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonCoverage {
    /// Window start (the latest first bar).
    pub start_date: DateTime<Utc>,
    /// Window end (the earliest last bar).
    pub end_date: DateTime<Utc>,
    /// Window length in fractional days.
    pub days: f64,
    /// Fewest bars any timeframe has inside the window.
    pub min_bars: usize,
    /// Most bars any timeframe has inside the window.
    pub max_bars: usize,
    /// Whether the window passes the configured floors.
    pub is_sufficient: bool,
    /// Per-timeframe breakdown.
    pub per_timeframe_detail: BTreeMap<Timeframe, TimeframeCoverage>,
}

/// Statistics returned by a timeframe synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SyncStats {
    /// Timeframes aligned onto the base grid.
    pub successfully_aligned: usize,
    /// Timeframes handed to the synchronizer.
    pub total_timeframes: usize,
    /// Mean alignment quality in `[0, 1]`.
    pub average_quality_score: f64,
}

/// Summary of a multi-timeframe load.
///
/// Carries the aligned series and any non-fatal issues encountered on the way:
/// timeframes that failed to load sit in `failures`, narrowing and base
/// reassignment notices in `warnings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTimeframeReport {
    /// Requested symbol.
    pub symbol: String,
    /// Base timeframe actually used (may differ from the requested one).
    pub base_timeframe: Timeframe,
    /// Aligned series per timeframe.
    pub data: BTreeMap<Timeframe, HistoryResponse>,
    /// Common coverage window when two or more timeframes loaded.
    pub coverage: Option<CommonCoverage>,
    /// Synchronizer statistics.
    pub sync: SyncStats,
    /// Timeframes that failed to load or loaded without bars.
    pub failures: BTreeMap<Timeframe, LacunaError>,
    /// Non-fatal issues encountered while building the report.
    pub warnings: Vec<LacunaError>,
}
