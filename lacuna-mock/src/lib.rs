//! Deterministic collaborators for exercising lacuna without a data source.
//!
//! - [`MockLoader`] serves per-timeframe fixtures and records every request.
//! - [`AsOfSynchronizer`] forward-fills each series onto the base grid.
//! - [`RecordingProgress`] keeps every progress notification for inspection.
//! - [`fixtures`] holds calendars for a few venues and synthetic bar series.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use lacuna_core::{
    CancellationToken, HistoryResponse, LacunaError, LoadRequest, Timeframe, TimeframeLoader,
};

pub mod fixtures;
mod progress;
mod sync;

pub use progress::{ProgressEvent, RecordingProgress};
pub use sync::{AsOfSynchronizer, FailingSynchronizer};

/// Instruction for how a load should behave for a given timeframe.
#[derive(Clone)]
pub enum MockBehavior {
    /// Return the provided series immediately.
    Return(HistoryResponse),
    /// Fail immediately with the provided error.
    Fail(LacunaError),
    /// Wait until the cancellation token fires.
    Hang,
}

#[derive(Default)]
struct CallState {
    calls: Vec<LoadRequest>,
    cancel_after: Option<(usize, CancellationToken)>,
}

/// Loader returning scripted results per timeframe.
///
/// Timeframes without a rule fail with `NotFound`.
#[derive(Default)]
pub struct MockLoader {
    rules: HashMap<Timeframe, MockBehavior>,
    state: Mutex<CallState>,
}

impl MockLoader {
    /// Loader with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `series` for `timeframe`.
    #[must_use]
    pub fn with_series(mut self, timeframe: Timeframe, series: HistoryResponse) -> Self {
        self.rules.insert(timeframe, MockBehavior::Return(series));
        self
    }

    /// Fail loads of `timeframe` with `error`.
    #[must_use]
    pub fn with_failure(mut self, timeframe: Timeframe, error: LacunaError) -> Self {
        self.rules.insert(timeframe, MockBehavior::Fail(error));
        self
    }

    /// Block loads of `timeframe` until cancelled.
    #[must_use]
    pub fn with_hang(mut self, timeframe: Timeframe) -> Self {
        self.rules.insert(timeframe, MockBehavior::Hang);
        self
    }

    /// Cancel `token` once `calls` loads have been issued.
    #[must_use]
    pub fn cancel_after(self, calls: usize, token: CancellationToken) -> Self {
        Self {
            state: Mutex::new(CallState {
                calls: Vec::new(),
                cancel_after: Some((calls, token)),
            }),
            ..self
        }
    }

    /// Every request received so far, in arrival order.
    pub async fn calls(&self) -> Vec<LoadRequest> {
        self.state.lock().await.calls.clone()
    }

    /// Timeframes requested so far, in arrival order.
    pub async fn requested_timeframes(&self) -> Vec<Timeframe> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .map(|r| r.timeframe)
            .collect()
    }
}

#[async_trait]
impl TimeframeLoader for MockLoader {
    async fn load(
        &self,
        req: &LoadRequest,
        cancel: &CancellationToken,
    ) -> Result<HistoryResponse, LacunaError> {
        {
            let mut guard = self.state.lock().await;
            guard.calls.push(req.clone());
            if let Some((limit, token)) = &guard.cancel_after
                && guard.calls.len() >= *limit
            {
                token.cancel();
            }
        }
        match self.rules.get(&req.timeframe) {
            Some(MockBehavior::Return(series)) => Ok(series.clone()),
            Some(MockBehavior::Fail(err)) => Err(err.clone()),
            Some(MockBehavior::Hang) => {
                cancel.cancelled().await;
                Err(LacunaError::Cancelled)
            }
            None => Err(LacunaError::not_found(format!(
                "{} {} fixture",
                req.symbol, req.timeframe
            ))),
        }
    }
}
