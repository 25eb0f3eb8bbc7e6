//! lacuna-core
//!
//! Collaborator traits, trading calendars and gap classification shared across
//! the lacuna ecosystem.
//!
//! - `types`: re-exports of the value types from `lacuna-types` and `paft`.
//! - `connector`: traits for the calendar registry, loader, synchronizer and progress sink.
//! - `calendar`: an in-memory registry and timezone-aware session math.
//! - `gaps`: the gap classifier and the fetch-planning analyzer.
//! - `timeseries`: coverage helpers for multi-timeframe loads.
//!
//! Cancellation
//! ------------
//! Loaders receive a `tokio_util::sync::CancellationToken`; nothing else in this
//! crate depends on an async runtime.
#![warn(missing_docs)]

/// Calendar registries and session calendars.
pub mod calendar;
/// Collaborator traits implemented outside this crate.
pub mod connector;
/// Gap classification and analysis.
pub mod gaps;
/// Time-series coverage utilities.
pub mod timeseries;
pub mod types;

pub use calendar::StaticCalendarRegistry;
pub use calendar::session::SessionCalendar;
pub use connector::{
    CalendarRegistry, LoadRequest, ProgressContext, ProgressSink, TimeframeLoader,
    TimeframeSynchronizer,
};
pub use gaps::analyzer::GapAnalyzer;
pub use gaps::bound::GapBound;
pub use gaps::classifier::GapClassifier;
pub use timeseries::coverage::{
    bars_between, common_coverage, coverage_shortfall, rescope, series_bounds, sorted_timestamps,
};
pub use tokio_util::sync::CancellationToken;
pub use types::*;
