use std::collections::BTreeMap;

use lacuna_core::{
    CancellationToken, CommonCoverage, HistoryResponse, LacunaError, LoadStrategy,
    MultiTimeframeReport, ProgressContext, ProgressSink, Timeframe, common_coverage,
    coverage_shortfall, rescope,
};

use crate::coordinator::request::MultiTimeframeRequest;
use crate::core::MultiTimeframeCoordinator;

#[derive(Default)]
struct LoadOutcome {
    loaded: BTreeMap<Timeframe, HistoryResponse>,
    failures: Vec<(Timeframe, LacunaError)>,
}

fn progress_context(req: &MultiTimeframeRequest, timeframes: &[Timeframe]) -> ProgressContext {
    let labels: Vec<String> = timeframes.iter().map(ToString::to_string).collect();
    let mut ctx = ProgressContext::new();
    ctx.insert("symbol".into(), req.symbol.clone());
    ctx.insert("timeframes".into(), labels.join(","));
    ctx.insert("base_timeframe".into(), req.base_timeframe.to_string());
    ctx.insert("mode".into(), req.mode.to_string());
    ctx
}

/// Fold one load result into `outcome`.
///
/// Empty series are soft failures. A loader error on the base timeframe and a
/// cancellation abort the whole call.
fn absorb(
    req: &MultiTimeframeRequest,
    timeframe: Timeframe,
    result: Result<HistoryResponse, LacunaError>,
    outcome: &mut LoadOutcome,
) -> Result<&'static str, LacunaError> {
    match result {
        Ok(series) if series.candles.is_empty() => {
            #[cfg(feature = "tracing")]
            tracing::warn!(symbol = %req.symbol, timeframe = %timeframe, "loader returned an empty series");
            outcome.failures.push((
                timeframe,
                LacunaError::data(format!("empty series for {} {timeframe}", req.symbol)),
            ));
            Ok("empty")
        }
        Ok(series) => {
            outcome.loaded.insert(timeframe, series);
            Ok("loaded")
        }
        Err(LacunaError::Cancelled) => Err(LacunaError::Cancelled),
        Err(err) if timeframe == req.base_timeframe => Err(LacunaError::BaseTimeframeFailed {
            symbol: req.symbol.clone(),
            timeframe,
            source: Box::new(err),
        }),
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(symbol = %req.symbol, timeframe = %timeframe, error = %err, "timeframe load failed");
            outcome.failures.push((timeframe, err));
            Ok("failed")
        }
    }
}

fn report_step(progress: Option<&dyn ProgressSink>, step: usize, timeframe: Timeframe, status: &str) {
    if let Some(p) = progress {
        p.update_progress(step, &format!("{timeframe} {status}"));
    }
}

impl MultiTimeframeCoordinator {
    /// Load `req.symbol` at every requested timeframe, narrow the series to
    /// their common coverage window and align them onto the base timeframe.
    ///
    /// Behavior:
    /// - Non-base timeframes that fail, or load without bars, are recorded in
    ///   `failures` and do not abort the call.
    /// - If the base timeframe loads without bars, the first other timeframe
    ///   that loaded (in request order) becomes the base and a
    ///   `BaseTimeframeReassigned` warning is attached.
    /// - With two or more series, all are cut to the window in which every
    ///   series has data; a `CoverageNarrowed` warning reports dropped rows.
    /// - Progress runs over `timeframes + 1` steps and is only completed on success.
    ///
    /// # Errors
    /// - `InvalidArg` for an empty symbol or timeframe list, or a base timeframe not requested.
    /// - `Cancelled` once the token fires before a load, or a loader reports it.
    /// - `BaseTimeframeFailed` when the base timeframe's loader errors.
    /// - `NoTimeframesLoaded` when nothing loaded with bars.
    /// - `InsufficientCoverage` when the common window violates the coverage floors.
    /// - `SynchronizationFailed` when the synchronizer errors.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "lacuna::coordinator::load_multi_timeframe_data",
            skip(self, req, cancel, progress),
            fields(
                symbol = %req.symbol,
                base = %req.base_timeframe,
                mode = %req.mode,
                timeframes = req.timeframes.len(),
            ),
        )
    )]
    pub async fn load_multi_timeframe_data(
        &self,
        req: &MultiTimeframeRequest,
        cancel: Option<&CancellationToken>,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<MultiTimeframeReport, LacunaError> {
        let timeframes = req.unique_timeframes()?;
        let total_steps = timeframes.len() + 1;
        let detached = CancellationToken::new();
        let cancel = cancel.unwrap_or(&detached);

        if let Some(p) = progress {
            p.start_operation(
                &format!("multi_timeframe_load:{}", req.symbol),
                total_steps,
                &progress_context(req, &timeframes),
            );
        }

        let LoadOutcome {
            mut loaded,
            failures,
        } = match self.strategy {
            LoadStrategy::Concurrent => {
                self.load_concurrent(req, &timeframes, cancel, progress)
                    .await?
            }
            _ => {
                self.load_sequential(req, &timeframes, cancel, progress)
                    .await?
            }
        };

        if loaded.is_empty() {
            return Err(LacunaError::NoTimeframesLoaded {
                symbol: req.symbol.clone(),
                timeframes,
                failures,
            });
        }

        let mut warnings = Vec::new();
        let coverage = if loaded.len() >= 2 {
            Some(self.narrow_to_common_window(&req.symbol, &mut loaded, &mut warnings)?)
        } else {
            None
        };

        let base = if loaded.contains_key(&req.base_timeframe) {
            req.base_timeframe
        } else {
            let to = timeframes
                .iter()
                .copied()
                .find(|tf| loaded.contains_key(tf))
                .ok_or_else(|| LacunaError::data("no loaded timeframe can serve as base"))?;
            #[cfg(feature = "tracing")]
            tracing::warn!(from = %req.base_timeframe, to = %to, "base timeframe reassigned");
            warnings.push(LacunaError::BaseTimeframeReassigned {
                from: req.base_timeframe,
                to,
            });
            to
        };

        let aligned: Vec<Timeframe> = loaded.keys().copied().collect();
        let (data, sync) = self
            .synchronizer
            .synchronize_multiple_timeframes(loaded, base)
            .map_err(|e| LacunaError::SynchronizationFailed {
                symbol: req.symbol.clone(),
                timeframes: aligned,
                source: Box::new(e),
            })?;

        if let Some(p) = progress {
            p.update_progress(
                total_steps,
                &format!(
                    "synchronized {}/{} timeframes",
                    sync.successfully_aligned, sync.total_timeframes
                ),
            );
            p.complete_operation();
        }

        Ok(MultiTimeframeReport {
            symbol: req.symbol.clone(),
            base_timeframe: base,
            data,
            coverage,
            sync,
            failures: failures.into_iter().collect(),
            warnings,
        })
    }

    async fn load_sequential(
        &self,
        req: &MultiTimeframeRequest,
        timeframes: &[Timeframe],
        cancel: &CancellationToken,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<LoadOutcome, LacunaError> {
        let mut outcome = LoadOutcome::default();
        for (idx, tf) in timeframes.iter().copied().enumerate() {
            if cancel.is_cancelled() {
                return Err(LacunaError::Cancelled);
            }
            let result = self.loader.load(&req.load_request(tf), cancel).await;
            let status = absorb(req, tf, result, &mut outcome)?;
            report_step(progress, idx + 1, tf, status);
        }
        Ok(outcome)
    }

    async fn load_concurrent(
        &self,
        req: &MultiTimeframeRequest,
        timeframes: &[Timeframe],
        cancel: &CancellationToken,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<LoadOutcome, LacunaError> {
        if cancel.is_cancelled() {
            return Err(LacunaError::Cancelled);
        }
        let requests: Vec<_> = timeframes.iter().map(|tf| req.load_request(*tf)).collect();
        let results =
            futures::future::join_all(requests.iter().map(|r| self.loader.load(r, cancel))).await;

        let mut outcome = LoadOutcome::default();
        for (idx, (tf, result)) in timeframes.iter().copied().zip(results).enumerate() {
            let status = absorb(req, tf, result, &mut outcome)?;
            report_step(progress, idx + 1, tf, status);
        }
        Ok(outcome)
    }

    fn narrow_to_common_window(
        &self,
        symbol: &str,
        loaded: &mut BTreeMap<Timeframe, HistoryResponse>,
        warnings: &mut Vec<LacunaError>,
    ) -> Result<CommonCoverage, LacunaError> {
        let insufficient = |detail: String| LacunaError::InsufficientCoverage {
            symbol: symbol.to_string(),
            timeframes: loaded.keys().copied().collect(),
            detail,
        };
        let coverage = common_coverage(loaded, &self.coverage)
            .ok_or_else(|| insufficient("a loaded series has no bars".to_string()))?;
        if let Some(detail) = coverage_shortfall(&coverage, &self.coverage) {
            return Err(insufficient(detail));
        }

        let dropped_rows: usize = loaded
            .values_mut()
            .map(|h| rescope(h, coverage.start_date, coverage.end_date))
            .sum();
        if dropped_rows > 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!(symbol, dropped_rows, "series narrowed to common coverage");
            warnings.push(LacunaError::CoverageNarrowed {
                symbol: symbol.to_string(),
                start: coverage.start_date,
                end: coverage.end_date,
                dropped_rows,
            });
        }
        Ok(coverage)
    }
}
