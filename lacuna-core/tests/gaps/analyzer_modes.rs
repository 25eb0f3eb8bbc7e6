use chrono::{DateTime, TimeDelta, Utc};
use lacuna_core::{
    Candle, FetchMode, GapClassification, SkipReason, TimeRange, Timeframe,
};
use proptest::prelude::*;

use crate::helpers::{AAPL, UNKNOWN, analyzer, candle, dt};

fn bars(ts: &[DateTime<Utc>]) -> Vec<Candle> {
    ts.iter().copied().map(candle).collect()
}

#[test]
fn local_mode_never_fetches() {
    let held = bars(&[dt(2024, 1, 9, 15, 0)]);
    let out = analyzer().analyze_gaps(
        Some(held.as_slice()),
        dt(2024, 1, 1, 0, 0),
        dt(2024, 2, 1, 0, 0),
        Timeframe::H1,
        AAPL,
        FetchMode::Local,
    );
    assert!(out.is_empty());

    let none = analyzer().analyze_gaps(
        None,
        dt(2024, 1, 1, 0, 0),
        dt(2024, 2, 1, 0, 0),
        Timeframe::H1,
        AAPL,
        FetchMode::Local,
    );
    assert!(none.is_empty());
}

#[test]
fn inverted_request_yields_nothing() {
    let out = analyzer().analyze_gaps(
        None,
        dt(2024, 1, 9, 0, 0),
        dt(2024, 1, 8, 0, 0),
        Timeframe::H1,
        AAPL,
        FetchMode::Full,
    );
    assert!(out.is_empty());
}

#[test]
fn empty_history_requests_whole_window() {
    let start = dt(2024, 1, 9, 14, 0);
    let end = dt(2024, 1, 9, 20, 0);
    let a = analyzer();
    let none = a.analyze_gaps(None, start, end, Timeframe::H1, AAPL, FetchMode::Tail);
    let empty = a.analyze_gaps(Some(&[][..]), start, end, Timeframe::H1, AAPL, FetchMode::Tail);
    assert_eq!(none, vec![TimeRange::new(start, end)]);
    assert_eq!(none, empty);
}

#[test]
fn tail_skips_internal_weekend() {
    // Last Friday bar (15:00 New York) and first Monday bar (09:30 New York).
    let held = bars(&[dt(2024, 1, 5, 20, 0), dt(2024, 1, 8, 14, 30)]);
    let report = analyzer().analyze_gaps_detailed(
        Some(held.as_slice()),
        dt(2024, 1, 5, 20, 0),
        dt(2024, 1, 8, 15, 30),
        Timeframe::H1,
        AAPL,
        FetchMode::Tail,
    );
    assert!(report.fetch.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped[0].range,
        TimeRange::new(dt(2024, 1, 5, 21, 0), dt(2024, 1, 8, 14, 30))
    );
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::Classified(GapClassification::ExpectedWeekend)
    );
}

#[test]
fn tail_fetches_gaps_beyond_override_regardless_of_class() {
    let held = bars(&[dt(2024, 1, 2, 15, 0), dt(2024, 1, 16, 15, 0)]);
    let out = analyzer().analyze_gaps(
        Some(held.as_slice()),
        dt(2024, 1, 2, 15, 0),
        dt(2024, 1, 16, 16, 0),
        Timeframe::H1,
        AAPL,
        FetchMode::Tail,
    );
    assert_eq!(
        out,
        vec![TimeRange::new(dt(2024, 1, 2, 16, 0), dt(2024, 1, 16, 15, 0))]
    );
}

#[test]
fn tail_drops_closure_below_override() {
    let held = bars(&[dt(2024, 1, 9, 15, 0), dt(2024, 1, 15, 15, 0)]);
    let report = analyzer().analyze_gaps_detailed(
        Some(held.as_slice()),
        dt(2024, 1, 9, 15, 0),
        dt(2024, 1, 15, 16, 0),
        Timeframe::H1,
        AAPL,
        FetchMode::Tail,
    );
    assert!(report.fetch.is_empty());
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::Classified(GapClassification::MarketClosure)
    );
}

#[test]
fn backfill_only_reports_leading_gap() {
    let held = bars(&[dt(2024, 1, 9, 15, 0), dt(2024, 1, 9, 18, 0)]);
    let out = analyzer().analyze_gaps(
        Some(held.as_slice()),
        dt(2024, 1, 9, 14, 0),
        dt(2024, 1, 9, 20, 0),
        Timeframe::H1,
        AAPL,
        FetchMode::Backfill,
    );
    assert_eq!(
        out,
        vec![TimeRange::new(dt(2024, 1, 9, 14, 0), dt(2024, 1, 9, 15, 0))]
    );
}

#[test]
fn full_reports_leading_internal_and_trailing() {
    let held = bars(&[
        dt(2024, 1, 9, 18, 0),
        dt(2024, 1, 9, 15, 0),
        dt(2024, 1, 9, 15, 0),
    ]);
    let out = analyzer().analyze_gaps(
        Some(held.as_slice()),
        dt(2024, 1, 9, 14, 0),
        dt(2024, 1, 9, 20, 0),
        Timeframe::H1,
        AAPL,
        FetchMode::Full,
    );
    assert_eq!(
        out,
        vec![
            TimeRange::new(dt(2024, 1, 9, 14, 0), dt(2024, 1, 9, 15, 0)),
            TimeRange::new(dt(2024, 1, 9, 16, 0), dt(2024, 1, 9, 18, 0)),
            TimeRange::new(dt(2024, 1, 9, 19, 0), dt(2024, 1, 9, 20, 0)),
        ]
    );
}

#[test]
fn unknown_symbol_short_gaps_are_dropped() {
    let held = bars(&[dt(2024, 1, 9, 10, 0), dt(2024, 1, 9, 14, 0)]);
    let report = analyzer().analyze_gaps_detailed(
        Some(held.as_slice()),
        dt(2024, 1, 9, 10, 0),
        dt(2024, 1, 9, 15, 0),
        Timeframe::H1,
        UNKNOWN,
        FetchMode::Tail,
    );
    assert!(report.fetch.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::NoCalendarShortGap);
}

#[test]
fn unknown_symbol_multi_day_gap_is_fetched() {
    let held = bars(&[dt(2024, 1, 9, 0, 0), dt(2024, 1, 12, 0, 0)]);
    let out = analyzer().analyze_gaps(
        Some(held.as_slice()),
        dt(2024, 1, 9, 0, 0),
        dt(2024, 1, 13, 0, 0),
        Timeframe::D1,
        UNKNOWN,
        FetchMode::Tail,
    );
    assert_eq!(
        out,
        vec![TimeRange::new(dt(2024, 1, 10, 0, 0), dt(2024, 1, 12, 0, 0))]
    );
}

#[test]
fn lower_threshold_keeps_expected_gaps() {
    let held = bars(&[dt(2024, 1, 5, 20, 0), dt(2024, 1, 8, 14, 30)]);
    let out = analyzer()
        .with_priority_threshold(GapClassification::ExpectedWeekend)
        .analyze_gaps(
            Some(held.as_slice()),
            dt(2024, 1, 5, 20, 0),
            dt(2024, 1, 8, 15, 30),
            Timeframe::H1,
            AAPL,
            FetchMode::Tail,
        );
    assert_eq!(out.len(), 1);
}

/// Midnight-stamped D1 bars for the given January 2024 days.
fn daily(days: &[u32]) -> Vec<Candle> {
    days.iter().map(|d| candle(dt(2024, 1, *d, 0, 0))).collect()
}

#[test]
fn daily_tail_fetches_a_missing_friday() {
    // Monday 8th to Thursday 11th held, window runs to Saturday 13th.
    let held = daily(&[8, 9, 10, 11]);
    let out = analyzer().analyze_gaps(
        Some(held.as_slice()),
        dt(2024, 1, 8, 0, 0),
        dt(2024, 1, 13, 0, 0),
        Timeframe::D1,
        AAPL,
        FetchMode::Tail,
    );
    assert_eq!(
        out,
        vec![TimeRange::new(dt(2024, 1, 12, 0, 0), dt(2024, 1, 13, 0, 0))]
    );
}

#[test]
fn daily_weekend_between_bars_is_skipped() {
    let held = daily(&[11, 12, 15, 16]);
    let report = analyzer().analyze_gaps_detailed(
        Some(held.as_slice()),
        dt(2024, 1, 11, 0, 0),
        dt(2024, 1, 17, 0, 0),
        Timeframe::D1,
        AAPL,
        FetchMode::Tail,
    );
    assert!(report.fetch.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped[0].range,
        TimeRange::new(dt(2024, 1, 13, 0, 0), dt(2024, 1, 15, 0, 0))
    );
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::Classified(GapClassification::ExpectedWeekend)
    );
}

#[test]
fn daily_missing_monday_after_weekend_is_holiday() {
    let held = daily(&[11, 12, 16, 17]);
    let report = analyzer().analyze_gaps_detailed(
        Some(held.as_slice()),
        dt(2024, 1, 11, 0, 0),
        dt(2024, 1, 18, 0, 0),
        Timeframe::D1,
        AAPL,
        FetchMode::Tail,
    );
    assert!(report.fetch.is_empty());
    assert_eq!(
        report.skipped[0].range,
        TimeRange::new(dt(2024, 1, 13, 0, 0), dt(2024, 1, 16, 0, 0))
    );
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::Classified(GapClassification::ExpectedHoliday)
    );
}

#[test]
fn daily_backfill_fetches_a_missing_friday_but_not_a_weekend() {
    let held = daily(&[15, 16]);
    let a = analyzer();
    let from_friday = a.analyze_gaps(
        Some(held.as_slice()),
        dt(2024, 1, 12, 0, 0),
        dt(2024, 1, 17, 0, 0),
        Timeframe::D1,
        AAPL,
        FetchMode::Backfill,
    );
    assert_eq!(
        from_friday,
        vec![TimeRange::new(dt(2024, 1, 12, 0, 0), dt(2024, 1, 15, 0, 0))]
    );

    let from_saturday = a.analyze_gaps_detailed(
        Some(held.as_slice()),
        dt(2024, 1, 13, 0, 0),
        dt(2024, 1, 17, 0, 0),
        Timeframe::D1,
        AAPL,
        FetchMode::Backfill,
    );
    assert!(from_saturday.fetch.is_empty());
    assert_eq!(
        from_saturday.skipped[0].reason,
        SkipReason::Classified(GapClassification::ExpectedWeekend)
    );
}

#[test]
fn daily_full_fetches_edges_and_skips_bracketed_holiday() {
    // Wednesday 10th and Wednesday 17th are missing at the edges, Monday 15th inside.
    let held = daily(&[11, 12, 16]);
    let report = analyzer().analyze_gaps_detailed(
        Some(held.as_slice()),
        dt(2024, 1, 10, 0, 0),
        dt(2024, 1, 18, 0, 0),
        Timeframe::D1,
        AAPL,
        FetchMode::Full,
    );
    assert_eq!(
        report.fetch,
        vec![
            TimeRange::new(dt(2024, 1, 10, 0, 0), dt(2024, 1, 11, 0, 0)),
            TimeRange::new(dt(2024, 1, 17, 0, 0), dt(2024, 1, 18, 0, 0)),
        ]
    );
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::Classified(GapClassification::ExpectedHoliday)
    );
}

#[test]
fn bars_near_the_end_of_time_do_not_overflow() {
    let yearly: Timeframe = "52w".parse().unwrap();
    let end = DateTime::<Utc>::MAX_UTC;
    let held = bars(&[end - TimeDelta::days(30), end - TimeDelta::days(1)]);
    for mode in [FetchMode::Tail, FetchMode::Full] {
        let out = analyzer().analyze_gaps(
            Some(held.as_slice()),
            end - TimeDelta::days(30),
            end,
            yearly,
            AAPL,
            mode,
        );
        assert!(out.is_empty());
    }
}

fn mode_strategy() -> impl Strategy<Value = FetchMode> {
    prop_oneof![
        Just(FetchMode::Local),
        Just(FetchMode::Tail),
        Just(FetchMode::Backfill),
        Just(FetchMode::Full),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_is_ordered_disjoint_and_inside_request(
        offsets in proptest::collection::vec(0i64..2_000, 0..40),
        window in (0i64..2_000, 1i64..2_000),
        mode in mode_strategy(),
        known in any::<bool>(),
    ) {
        let origin = dt(2024, 1, 1, 0, 0);
        let held: Vec<Candle> = offsets
            .iter()
            .map(|h| candle(origin + TimeDelta::hours(*h)))
            .collect();
        let start = origin + TimeDelta::hours(window.0);
        let end = start + TimeDelta::hours(window.1);
        let symbol = if known { AAPL } else { UNKNOWN };

        let out = analyzer().analyze_gaps(Some(held.as_slice()), start, end, Timeframe::H1, symbol, mode);

        if mode == FetchMode::Local {
            prop_assert!(out.is_empty());
        }
        for r in &out {
            prop_assert!(!r.is_empty());
            prop_assert!(r.start >= start && r.end <= end);
        }
        for pair in out.windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }
        if mode == FetchMode::Backfill
            && let Some(first) = held.iter().map(|c| c.ts).min()
        {
            for r in &out {
                prop_assert!(r.end <= first.max(start));
            }
        }
    }
}
