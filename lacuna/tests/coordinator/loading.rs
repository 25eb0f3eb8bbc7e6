use std::sync::Arc;

use lacuna::{FetchMode, LacunaError, LoadStrategy, MultiTimeframeRequest, Timeframe};
use lacuna_mock::fixtures::history::uniform;
use lacuna_mock::{AsOfSynchronizer, MockLoader, ProgressEvent, RecordingProgress};

use crate::helpers::{
    AAPL, coordinator, coordinator_with, dt, hourly_and_four_hourly, monday,
};

#[tokio::test]
async fn narrows_and_aligns_onto_base() {
    let loader = Arc::new(hourly_and_four_hourly());
    let req = MultiTimeframeRequest::new(AAPL, [Timeframe::H1, Timeframe::H4], Timeframe::H1);

    let report = coordinator(loader.clone())
        .load_multi_timeframe_data(&req, None, None)
        .await
        .unwrap();

    assert_eq!(report.base_timeframe, Timeframe::H1);
    assert!(report.failures.is_empty());

    let coverage = report.coverage.as_ref().unwrap();
    assert_eq!(coverage.start_date, monday());
    assert_eq!(coverage.end_date, dt(2024, 1, 23, 12, 0));
    assert!((coverage.days - 15.5).abs() < 1e-9);
    assert_eq!(coverage.min_bars, 94);
    assert_eq!(coverage.max_bars, 373);
    assert!(coverage.is_sufficient);
    assert_eq!(coverage.per_timeframe_detail[&Timeframe::H4].bars_total, 100);

    assert_eq!(
        report.warnings,
        vec![LacunaError::CoverageNarrowed {
            symbol: AAPL.into(),
            start: monday(),
            end: dt(2024, 1, 23, 12, 0),
            dropped_rows: 33,
        }]
    );

    // Both series were forward-filled onto the 373-point hourly grid.
    assert_eq!(report.data[&Timeframe::H1].candles.len(), 373);
    assert_eq!(report.data[&Timeframe::H4].candles.len(), 373);
    assert_eq!(report.sync.successfully_aligned, 2);
    assert_eq!(report.sync.total_timeframes, 2);
    assert!((report.sync.average_quality_score - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn single_timeframe_skips_coverage() {
    let loader = Arc::new(
        MockLoader::new().with_series(Timeframe::D1, uniform(monday(), Timeframe::D1, 3)),
    );
    let req = MultiTimeframeRequest::new(AAPL, [Timeframe::D1], Timeframe::D1);

    let report = coordinator(loader)
        .load_multi_timeframe_data(&req, None, None)
        .await
        .unwrap();
    assert!(report.coverage.is_none());
    assert!(report.warnings.is_empty());
    assert_eq!(report.data[&Timeframe::D1].candles.len(), 3);
}

#[tokio::test]
async fn forwards_request_parameters_to_loader() {
    let loader = Arc::new(hourly_and_four_hourly());
    let start = dt(2024, 1, 1, 0, 0);
    let end = dt(2024, 2, 1, 0, 0);
    let req = MultiTimeframeRequest::new(AAPL, [Timeframe::H1, Timeframe::H4], Timeframe::H1)
        .period(start, end)
        .mode(FetchMode::Backfill)
        .repair(true);

    coordinator(loader.clone())
        .load_multi_timeframe_data(&req, None, None)
        .await
        .unwrap();

    let calls = loader.calls().await;
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert_eq!(call.symbol, AAPL);
        assert_eq!(call.start, Some(start));
        assert_eq!(call.end, Some(end));
        assert_eq!(call.mode, FetchMode::Backfill);
        assert!(call.validate);
        assert!(call.repair);
    }
}

#[tokio::test]
async fn duplicate_timeframes_load_once() {
    let loader = Arc::new(hourly_and_four_hourly());
    let req = MultiTimeframeRequest::new(
        AAPL,
        [Timeframe::H4, Timeframe::H1, Timeframe::H4],
        Timeframe::H1,
    );

    coordinator(loader.clone())
        .load_multi_timeframe_data(&req, None, None)
        .await
        .unwrap();
    assert_eq!(
        loader.requested_timeframes().await,
        vec![Timeframe::H4, Timeframe::H1]
    );
}

#[tokio::test]
async fn progress_runs_over_every_step_and_completes() {
    let loader = Arc::new(hourly_and_four_hourly());
    let progress = RecordingProgress::new();
    let req = MultiTimeframeRequest::new(AAPL, [Timeframe::H1, Timeframe::H4], Timeframe::H1);

    coordinator(loader)
        .load_multi_timeframe_data(&req, None, Some(&progress))
        .await
        .unwrap();

    let events = progress.events();
    match &events[0] {
        ProgressEvent::Started {
            operation_id,
            total_steps,
            context,
        } => {
            assert_eq!(operation_id, "multi_timeframe_load:AAPL");
            assert_eq!(*total_steps, 3);
            assert_eq!(context["symbol"], AAPL);
            assert_eq!(context["base_timeframe"], "1h");
        }
        other => panic!("expected Started first, got {other:?}"),
    }
    assert_eq!(progress.steps(), vec![1, 2, 3]);
    assert!(progress.completed());
}

#[tokio::test]
async fn concurrent_strategy_matches_sequential() {
    let sequential = coordinator(Arc::new(hourly_and_four_hourly()));
    let concurrent = coordinator_with(
        Arc::new(hourly_and_four_hourly()),
        Arc::new(AsOfSynchronizer),
        LoadStrategy::Concurrent,
    );
    let req = MultiTimeframeRequest::new(AAPL, [Timeframe::H1, Timeframe::H4], Timeframe::H1);
    let progress = RecordingProgress::new();

    let a = sequential
        .load_multi_timeframe_data(&req, None, None)
        .await
        .unwrap();
    let b = concurrent
        .load_multi_timeframe_data(&req, None, Some(&progress))
        .await
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(progress.steps(), vec![1, 2, 3]);
}
