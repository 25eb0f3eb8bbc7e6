use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use lacuna_types::{FetchMode, LacunaError, SymbolCalendar, SyncStats, Timeframe};
use paft::market::responses::history::HistoryResponse;

/// Read-only lookup of per-symbol trading calendars.
///
/// Returning `None` means the symbol is unknown; the classifier then falls back
/// to a Monday-to-Friday UTC weekend heuristic.
pub trait CalendarRegistry: Send + Sync {
    /// Calendar record for `symbol`, if any.
    fn get(&self, symbol: &str) -> Option<SymbolCalendar>;
}

/// Parameters for a single-timeframe load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Symbol to load.
    pub symbol: String,
    /// Bar granularity.
    pub timeframe: Timeframe,
    /// Optional inclusive lower bound.
    pub start: Option<DateTime<Utc>>,
    /// Optional inclusive upper bound.
    pub end: Option<DateTime<Utc>>,
    /// Retrieval mode forwarded to the loader.
    pub mode: FetchMode,
    /// Ask the loader to validate rows.
    pub validate: bool,
    /// Ask the loader to repair what validation flags.
    pub repair: bool,
}

/// Loads the series of one symbol at one timeframe.
#[async_trait]
pub trait TimeframeLoader: Send + Sync {
    /// Load `req`. Implementations should return promptly with
    /// [`LacunaError::Cancelled`] once `cancel` fires.
    async fn load(
        &self,
        req: &LoadRequest,
        cancel: &CancellationToken,
    ) -> Result<HistoryResponse, LacunaError>;
}

/// Aligns several timeframes onto the grid of a base timeframe.
pub trait TimeframeSynchronizer: Send + Sync {
    /// Align `data` onto `base` and report how well it went.
    ///
    /// # Errors
    /// Implementation-defined; the coordinator wraps it in
    /// [`LacunaError::SynchronizationFailed`].
    fn synchronize_multiple_timeframes(
        &self,
        data: BTreeMap<Timeframe, HistoryResponse>,
        base: Timeframe,
    ) -> Result<(BTreeMap<Timeframe, HistoryResponse>, SyncStats), LacunaError>;
}

/// Free-form key/value context attached to a progress operation.
pub type ProgressContext = BTreeMap<String, String>;

/// Receives progress notifications for long-running operations.
///
/// Steps are reported in non-decreasing order within one operation.
pub trait ProgressSink: Send + Sync {
    /// A new operation with `total_steps` steps has begun.
    fn start_operation(&self, operation_id: &str, total_steps: usize, context: &ProgressContext);
    /// Step `step` of the current operation has been reached.
    fn update_progress(&self, step: usize, message: &str);
    /// The current operation finished successfully.
    fn complete_operation(&self);
}
