use std::collections::BTreeMap;

use lacuna_core::{
    HistoryResponse, LacunaError, SyncStats, Timeframe, TimeframeSynchronizer, sorted_timestamps,
};

/// Aligns every series onto the base timeframe's bar grid by carrying the
/// latest bar at or before each grid point forward.
///
/// A series' quality score is the share of grid points it could fill; the
/// base series scores 1.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsOfSynchronizer;

impl TimeframeSynchronizer for AsOfSynchronizer {
    fn synchronize_multiple_timeframes(
        &self,
        data: BTreeMap<Timeframe, HistoryResponse>,
        base: Timeframe,
    ) -> Result<(BTreeMap<Timeframe, HistoryResponse>, SyncStats), LacunaError> {
        let grid = data
            .get(&base)
            .map(|h| sorted_timestamps(&h.candles))
            .ok_or_else(|| LacunaError::invalid_arg(format!("base timeframe {base} not loaded")))?;
        if grid.is_empty() {
            return Err(LacunaError::data(format!("base timeframe {base} is empty")));
        }

        let total_timeframes = data.len();
        let mut aligned = 0usize;
        let mut quality_sum = 0.0f64;
        let mut out = BTreeMap::new();
        for (tf, history) in data {
            if tf == base {
                aligned += 1;
                quality_sum += 1.0;
                out.insert(tf, history);
                continue;
            }
            let mut source = history.candles.clone();
            source.sort_by_key(|c| c.ts);
            let mut filled = Vec::with_capacity(grid.len());
            let mut next = 0usize;
            for ts in &grid {
                while next < source.len() && source[next].ts <= *ts {
                    next += 1;
                }
                if let Some(prev) = next.checked_sub(1).and_then(|i| source.get(i)) {
                    let mut bar = prev.clone();
                    bar.ts = *ts;
                    filled.push(bar);
                }
            }
            if !filled.is_empty() {
                aligned += 1;
            }
            quality_sum += filled.len() as f64 / grid.len() as f64;
            let mut history = history;
            history.candles = filled;
            out.insert(tf, history);
        }

        let stats = SyncStats {
            successfully_aligned: aligned,
            total_timeframes,
            average_quality_score: quality_sum / total_timeframes as f64,
        };
        Ok((out, stats))
    }
}

/// Synchronizer that always fails with the configured error.
#[derive(Debug, Clone)]
pub struct FailingSynchronizer(pub LacunaError);

impl TimeframeSynchronizer for FailingSynchronizer {
    fn synchronize_multiple_timeframes(
        &self,
        _data: BTreeMap<Timeframe, HistoryResponse>,
        _base: Timeframe,
    ) -> Result<(BTreeMap<Timeframe, HistoryResponse>, SyncStats), LacunaError> {
        Err(self.0.clone())
    }
}
