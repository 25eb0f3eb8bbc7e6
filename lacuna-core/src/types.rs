//! Re-export of foundational types from `paft` and `lacuna-types`.
// Consolidated re-exports so downstream crates can depend on `lacuna-core` only

pub use lacuna_types::{
    CommonCoverage, CoveragePolicy, EstimationPolicy, FetchMode, GapAnalysisReport,
    GapClassification, GapInfo, GapPolicy, LacunaConfig, LacunaError, LoadStrategy,
    MultiTimeframeReport, SkipReason, SkippedGap, SymbolCalendar, SyncStats, TimeRange,
    Timeframe, TimeframeCoverage, TimeframeUnit, TradingHours, TradingSession,
};

pub use paft::money::{Currency, IsoCurrency, Money};
pub use paft::market::responses::history::{Candle, HistoryResponse};
