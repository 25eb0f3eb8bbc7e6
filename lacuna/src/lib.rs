//! Lacuna loads market history at several timeframes and keeps it usable.
//!
//! Overview
//! - [`MultiTimeframeCoordinator`] drives an injected loader once per timeframe,
//!   narrows every series to the window they all cover and hands them to a
//!   synchronizer that aligns them onto a base timeframe.
//! - [`TimeEstimationEngine`] learns how long recurring operations take and
//!   predicts the next run from a recency-weighted history.
//! - Gap classification and analysis live in `lacuna-core` and are re-exported here.
//!
//! Key behaviors and trade-offs
//! - Load strategy:
//!   - `Sequential`: one load at a time; stops as soon as the token is cancelled.
//!   - `Concurrent`: all loads at once; lower latency, loaders must honor the token.
//! - Only the base timeframe is mandatory. Other timeframes that fail are reported
//!   in `MultiTimeframeReport::failures` and the load carries on.
//! - Narrowing to the common window discards rows; the count is surfaced as a
//!   `CoverageNarrowed` warning rather than silently.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use lacuna::{MultiTimeframeCoordinator, MultiTimeframeRequest, Timeframe};
//!
//! let coordinator = MultiTimeframeCoordinator::builder()
//!     .loader(Arc::new(my_loader))
//!     .synchronizer(Arc::new(my_synchronizer))
//!     .build()?;
//!
//! let req = MultiTimeframeRequest::new(
//!     "AAPL",
//!     [Timeframe::M5, Timeframe::H1, Timeframe::D1],
//!     Timeframe::M5,
//! );
//! let report = coordinator.load_multi_timeframe_data(&req, None, None).await?;
//! for warning in &report.warnings {
//!     eprintln!("{warning}");
//! }
//! ```
//!
//! Estimating a run before starting it:
//! ```rust,ignore
//! use lacuna::TimeEstimationEngine;
//! use serde_json::json;
//!
//! let engine = TimeEstimationEngine::new(Some("cache/estimates.json".into()));
//! let ctx = json!({ "data_points": 25_000 });
//! let eta = engine.estimate_duration_or("gap_fill", &ctx, 30.0);
//! // ... run the operation ...
//! engine.record_operation_completion("gap_fill", &ctx, elapsed.as_secs_f64());
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
/// Multi-timeframe load requests and orchestration.
pub mod coordinator;
/// Operation duration history and estimates.
pub mod estimation;

pub use coordinator::request::MultiTimeframeRequest;
pub use crate::core::{MultiTimeframeCoordinator, MultiTimeframeCoordinatorBuilder};
pub use estimation::{OperationHistoryRecord, TimeEstimationEngine};

// Re-export core types for convenience
pub use lacuna_core::{
    // Collaborators
    CalendarRegistry,
    CancellationToken,
    // Reports
    CommonCoverage,
    // Configuration
    CoveragePolicy,
    EstimationPolicy,
    FetchMode,
    GapAnalysisReport,
    GapAnalyzer,
    GapBound,
    GapClassification,
    GapClassifier,
    GapInfo,
    GapPolicy,
    HistoryResponse,
    LacunaConfig,
    LacunaError,
    LoadRequest,
    LoadStrategy,
    MultiTimeframeReport,
    ProgressContext,
    ProgressSink,
    SkipReason,
    SkippedGap,
    StaticCalendarRegistry,
    SymbolCalendar,
    SyncStats,
    TimeRange,
    Timeframe,
    TimeframeCoverage,
    TimeframeLoader,
    TimeframeSynchronizer,
    TradingHours,
    TradingSession,
};
