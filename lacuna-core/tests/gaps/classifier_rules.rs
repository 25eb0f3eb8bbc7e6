use chrono::TimeDelta;
use lacuna_core::{GapClassification, Timeframe};

use crate::helpers::{AAPL, BROKEN, BTC_USD, EURUSD, UNKNOWN, classifier, dt};

#[test]
fn friday_close_to_monday_open_daily_is_weekend() {
    let gap = classifier()
        .analyze_gap(
            dt(2024, 1, 5, 21, 0),
            dt(2024, 1, 8, 14, 30),
            AAPL,
            Timeframe::D1,
        )
        .unwrap();
    assert_eq!(gap.classification, GapClassification::ExpectedWeekend);
    assert_eq!(gap.bars_missing, 1);
    assert!(gap.day_context.contains("Saturday"));
    assert!(gap.day_context.contains("Sunday"));
    assert!((gap.duration_hours - 65.5).abs() < 1e-9);
    assert_eq!(gap.symbol, AAPL);
    assert_eq!(gap.timeframe, Timeframe::D1);
}

#[test]
fn daily_bar_slot_counts_its_own_day() {
    // Friday's D1 bar is stamped at Friday 00:00 UTC.
    let c = classifier();
    let friday = c
        .analyze_gap(dt(2024, 1, 12, 0, 0), dt(2024, 1, 13, 0, 0), AAPL, Timeframe::D1)
        .unwrap();
    assert_ne!(friday.classification, GapClassification::ExpectedWeekend);
    assert_eq!(friday.classification, GapClassification::ExpectedHoliday);
    assert_eq!(friday.bars_missing, 1);

    let through_monday = c
        .classify_gap(dt(2024, 1, 12, 0, 0), dt(2024, 1, 16, 0, 0), AAPL, Timeframe::D1)
        .unwrap();
    assert_eq!(through_monday, GapClassification::MarketClosure);

    // Saturday and Sunday slots alone are the weekend.
    let weekend = c
        .analyze_gap(dt(2024, 1, 13, 0, 0), dt(2024, 1, 15, 0, 0), AAPL, Timeframe::D1)
        .unwrap();
    assert_eq!(weekend.classification, GapClassification::ExpectedWeekend);
    assert_eq!(weekend.bars_missing, 1);
}

#[test]
fn friday_close_to_monday_open_hourly_is_weekend() {
    let gap = classifier()
        .analyze_gap(
            dt(2024, 1, 5, 21, 0),
            dt(2024, 1, 8, 14, 30),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(gap.classification, GapClassification::ExpectedWeekend);
    assert_eq!(gap.bars_missing, 66);
    assert_eq!(gap.day_context, "Saturday-Sunday");
}

#[test]
fn overnight_between_post_and_pre_market_is_trading_hours() {
    // Tue 20:00 -> Wed 04:00 New York time.
    let gap = classifier()
        .analyze_gap(
            dt(2024, 1, 10, 1, 0),
            dt(2024, 1, 10, 9, 0),
            AAPL,
            Timeframe::M5,
        )
        .unwrap();
    assert_eq!(gap.classification, GapClassification::ExpectedTradingHours);
    assert_eq!(gap.bars_missing, 96);
    assert_eq!(gap.day_context, "Tuesday-Wednesday");
}

#[test]
fn hole_inside_regular_session_is_unexpected() {
    let gap = classifier()
        .analyze_gap(
            dt(2024, 1, 9, 15, 0),
            dt(2024, 1, 9, 17, 0),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(gap.classification, GapClassification::Unexpected);
    assert_eq!(gap.bars_missing, 2);
    assert_eq!(gap.day_context, "Tuesday");
}

#[test]
fn single_missing_trading_day_next_to_weekend_is_holiday() {
    // Thursday close before Good Friday to Monday open (EDT).
    let gap = classifier()
        .analyze_gap(
            dt(2024, 3, 28, 20, 0),
            dt(2024, 4, 1, 13, 30),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(gap.classification, GapClassification::ExpectedHoliday);
    assert_eq!(gap.day_context, "Friday-Sunday");
}

#[test]
fn holiday_needs_a_short_enough_gap() {
    // Thursday 10:00 to Monday 09:30 New York: one missing Friday but 95.5 hours.
    let gap = classifier()
        .analyze_gap(
            dt(2024, 1, 11, 15, 0),
            dt(2024, 1, 15, 14, 30),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert!((gap.duration_hours - 95.5).abs() < 1e-9);
    assert_eq!(gap.classification, GapClassification::MarketClosure);
}

#[test]
fn long_gap_with_trading_days_is_market_closure() {
    let class = classifier()
        .classify_gap(
            dt(2024, 1, 9, 15, 0),
            dt(2024, 1, 15, 15, 0),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(class, GapClassification::MarketClosure);
}

#[test]
fn forex_friday_to_sunday_reopen_is_weekend() {
    // Fri 17:00 -> Sun 17:00 New York time.
    let gap = classifier()
        .analyze_gap(
            dt(2024, 1, 5, 22, 0),
            dt(2024, 1, 7, 22, 0),
            EURUSD,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(gap.classification, GapClassification::ExpectedWeekend);
    assert_eq!(gap.day_context, "Saturday");
}

#[test]
fn crypto_weekend_hole_is_unexpected() {
    let class = classifier()
        .classify_gap(
            dt(2024, 1, 6, 10, 0),
            dt(2024, 1, 6, 14, 0),
            BTC_USD,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(class, GapClassification::Unexpected);
}

#[test]
fn unknown_symbol_uses_weekend_heuristic_only() {
    let c = classifier();
    assert!(c.get_symbol_trading_hours(UNKNOWN).is_none());

    let weekend = c
        .classify_gap(
            dt(2024, 1, 6, 10, 0),
            dt(2024, 1, 7, 10, 0),
            UNKNOWN,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(weekend, GapClassification::ExpectedWeekend);

    let midweek = c
        .classify_gap(
            dt(2024, 1, 9, 0, 0),
            dt(2024, 1, 11, 0, 0),
            UNKNOWN,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(midweek, GapClassification::Unexpected);

    let long = c
        .classify_gap(
            dt(2024, 1, 9, 0, 0),
            dt(2024, 1, 16, 0, 0),
            UNKNOWN,
            Timeframe::D1,
        )
        .unwrap();
    assert_eq!(long, GapClassification::Unexpected);
}

#[test]
fn unparseable_metadata_falls_back_to_heuristic() {
    let c = classifier();
    assert!(c.get_symbol_trading_hours(BROKEN).is_some());
    assert!(!c.has_calendar(BROKEN));
    let class = c
        .classify_gap(
            dt(2024, 1, 9, 15, 0),
            dt(2024, 1, 9, 18, 0),
            BROKEN,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(class, GapClassification::Unexpected);
}

#[test]
fn zero_length_intervals_are_well_defined() {
    let c = classifier();

    let saturday = c
        .analyze_gap(
            dt(2024, 1, 6, 15, 0),
            dt(2024, 1, 6, 15, 0),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(saturday.classification, GapClassification::ExpectedWeekend);
    assert_eq!(saturday.bars_missing, 0);
    assert_eq!(saturday.duration_hours, 0.0);
    assert_eq!(saturday.day_context, "Saturday");

    let in_session = c
        .classify_gap(
            dt(2024, 1, 9, 15, 0),
            dt(2024, 1, 9, 15, 0),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(in_session, GapClassification::Unexpected);

    // 22:00 New York on a Tuesday.
    let off_hours = c
        .classify_gap(
            dt(2024, 1, 10, 3, 0),
            dt(2024, 1, 10, 3, 0),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert_eq!(off_hours, GapClassification::ExpectedTradingHours);

    let friday = c
        .analyze_gap(
            dt(2024, 1, 5, 12, 0),
            dt(2024, 1, 5, 12, 0),
            AAPL,
            Timeframe::D1,
        )
        .unwrap();
    assert_eq!(friday.day_context, "Friday (pre-weekend)");
    assert_eq!(friday.bars_missing, 0);
}

#[test]
fn naive_bounds_match_utc_bounds() {
    let c = classifier();
    let start = dt(2024, 1, 5, 21, 0);
    let end = dt(2024, 1, 8, 14, 30);
    let aware = c.analyze_gap(start, end, AAPL, Timeframe::H1).unwrap();
    let naive = c
        .analyze_gap(start.naive_utc(), end.naive_utc(), AAPL, Timeframe::H1)
        .unwrap();
    assert_eq!(aware, naive);
}

#[test]
fn mixing_aware_and_naive_bounds_is_rejected() {
    let start = dt(2024, 1, 5, 21, 0);
    let end = dt(2024, 1, 8, 14, 30).naive_utc();
    let err = classifier()
        .classify_gap(start, end, AAPL, Timeframe::H1)
        .unwrap_err();
    assert!(err.is_validation_error());
}

#[test]
fn offset_bounds_are_normalized_to_utc() {
    let tz = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
    let start = dt(2024, 1, 5, 21, 0).with_timezone(&tz);
    let end = dt(2024, 1, 8, 14, 30).with_timezone(&tz);
    let class = classifier()
        .classify_gap(start, end, AAPL, Timeframe::H1)
        .unwrap();
    assert_eq!(class, GapClassification::ExpectedWeekend);
}

#[test]
fn worth_filling_compares_on_the_priority_scale() {
    let c = classifier();
    let weekend = c
        .analyze_gap(
            dt(2024, 1, 5, 21, 0),
            dt(2024, 1, 8, 14, 30),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert!(!c.is_gap_worth_filling_default(&weekend));
    assert!(!c.is_gap_worth_filling(&weekend, GapClassification::ExpectedHoliday));
    assert!(c.is_gap_worth_filling(&weekend, GapClassification::ExpectedWeekend));

    let hole = c
        .analyze_gap(
            dt(2024, 1, 9, 15, 0),
            dt(2024, 1, 9, 17, 0),
            AAPL,
            Timeframe::H1,
        )
        .unwrap();
    assert!(c.is_gap_worth_filling_default(&hole));
}

#[test]
fn closure_threshold_comes_from_policy() {
    use std::sync::Arc;

    use lacuna_core::{GapClassifier, GapPolicy};

    let policy = GapPolicy {
        market_closure_threshold_hours: 24 * 30,
        ..GapPolicy::default()
    };
    let c = GapClassifier::with_policy(Arc::new(crate::helpers::registry()), policy);
    let start = dt(2024, 1, 9, 15, 0);
    let class = c
        .classify_gap(start, start + TimeDelta::days(6), AAPL, Timeframe::H1)
        .unwrap();
    assert_eq!(class, GapClassification::Unexpected);
}

#[test]
fn holiday_bound_comes_from_policy() {
    use std::sync::Arc;

    use lacuna_core::{GapClassifier, GapPolicy};

    let start = dt(2024, 3, 28, 20, 0);
    let end = dt(2024, 4, 1, 13, 30);
    let tight = GapClassifier::with_policy(
        Arc::new(crate::helpers::registry()),
        GapPolicy {
            holiday_max_hours: 48,
            ..GapPolicy::default()
        },
    );
    assert_eq!(
        tight.classify_gap(start, end, AAPL, Timeframe::H1).unwrap(),
        GapClassification::MarketClosure
    );
    assert_eq!(
        classifier()
            .classify_gap(start, end, AAPL, Timeframe::H1)
            .unwrap(),
        GapClassification::ExpectedHoliday
    );
}
