//! Lacuna-specific data transfer objects, policies and errors built on top of `paft`.
#![warn(missing_docs)]

mod calendar;
mod config;
mod error;
mod gap;
mod range;
mod reports;
mod timeframe;

pub use calendar::{SymbolCalendar, TradingHours, TradingSession};
pub use config::{
    CoveragePolicy, EstimationPolicy, FetchMode, GapPolicy, LacunaConfig, LoadStrategy,
};
pub use error::LacunaError;
pub use gap::{GapClassification, GapInfo};
pub use range::TimeRange;
pub use reports::{
    CommonCoverage, GapAnalysisReport, MultiTimeframeReport, SkipReason, SkippedGap, SyncStats,
    TimeframeCoverage,
};
pub use timeframe::{Timeframe, TimeframeUnit};
