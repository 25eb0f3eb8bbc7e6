use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use paft::market::responses::history::{Candle, HistoryResponse};

use lacuna_types::{CommonCoverage, CoveragePolicy, Timeframe, TimeframeCoverage};

const DAY_MILLIS: f64 = 86_400_000.0;

/// Bar timestamps sorted ascending with duplicates removed.
#[must_use]
pub fn sorted_timestamps(candles: &[Candle]) -> Vec<DateTime<Utc>> {
    let mut ts: Vec<DateTime<Utc>> = candles.iter().map(|c| c.ts).collect();
    ts.sort_unstable();
    ts.dedup();
    ts
}

/// First and last bar timestamps regardless of input order.
#[must_use]
pub fn series_bounds(candles: &[Candle]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = candles.iter().map(|c| c.ts).min()?;
    let last = candles.iter().map(|c| c.ts).max()?;
    Some((first, last))
}

/// Bars with `start <= ts <= end`.
#[must_use]
pub fn bars_between(candles: &[Candle], start: DateTime<Utc>, end: DateTime<Utc>) -> usize {
    candles
        .iter()
        .filter(|c| start <= c.ts && c.ts <= end)
        .count()
}

/// Drop bars outside `[start, end]`, returning how many were removed.
pub fn rescope(history: &mut HistoryResponse, start: DateTime<Utc>, end: DateTime<Utc>) -> usize {
    let before = history.candles.len();
    history.candles.retain(|c| start <= c.ts && c.ts <= end);
    before - history.candles.len()
}

/// Largest window in which every series has data, measured against `policy`.
///
/// Returns `None` when `series` is empty or any series has no bars. The window
/// may be empty (`end_date <= start_date`); [`coverage_shortfall`] reports that.
#[must_use]
pub fn common_coverage(
    series: &BTreeMap<Timeframe, HistoryResponse>,
    policy: &CoveragePolicy,
) -> Option<CommonCoverage> {
    let mut bounds = Vec::with_capacity(series.len());
    for (tf, history) in series {
        let (first, last) = series_bounds(&history.candles)?;
        bounds.push((*tf, first, last, history));
    }
    let start_date = bounds.iter().map(|b| b.1).max()?;
    let end_date = bounds.iter().map(|b| b.2).min()?;

    let per_timeframe_detail: BTreeMap<Timeframe, TimeframeCoverage> = bounds
        .into_iter()
        .map(|(tf, first, last, history)| {
            let detail = TimeframeCoverage {
                start: first,
                end: last,
                bars_total: history.candles.len(),
                bars_in_window: bars_between(&history.candles, start_date, end_date),
            };
            (tf, detail)
        })
        .collect();
    let min_bars = per_timeframe_detail
        .values()
        .map(|d| d.bars_in_window)
        .min()
        .unwrap_or(0);
    let max_bars = per_timeframe_detail
        .values()
        .map(|d| d.bars_in_window)
        .max()
        .unwrap_or(0);

    let mut coverage = CommonCoverage {
        start_date,
        end_date,
        days: (end_date - start_date).num_milliseconds() as f64 / DAY_MILLIS,
        min_bars,
        max_bars,
        is_sufficient: false,
        per_timeframe_detail,
    };
    coverage.is_sufficient = coverage_shortfall(&coverage, policy).is_none();
    Some(coverage)
}

/// The first floor `coverage` violates, checked in order: empty window,
/// minimum bar count, minimum span.
#[must_use]
pub fn coverage_shortfall(coverage: &CommonCoverage, policy: &CoveragePolicy) -> Option<String> {
    if coverage.end_date <= coverage.start_date {
        return Some(format!(
            "common window {}..{} is empty",
            coverage.start_date.to_rfc3339(),
            coverage.end_date.to_rfc3339()
        ));
    }
    if coverage.min_bars < policy.min_bars {
        return Some(format!(
            "only {} bars in common window, need {}",
            coverage.min_bars, policy.min_bars
        ));
    }
    if coverage.days < policy.min_days as f64 {
        return Some(format!(
            "common window spans {:.2} days, need {}",
            coverage.days, policy.min_days
        ));
    }
    None
}
