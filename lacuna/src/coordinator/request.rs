use chrono::{DateTime, Utc};

use lacuna_core::{FetchMode, LacunaError, LoadRequest, Timeframe};

/// Parameters of a multi-timeframe load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiTimeframeRequest {
    /// Symbol to load.
    pub symbol: String,
    /// Timeframes in priority order; duplicates are ignored.
    pub timeframes: Vec<Timeframe>,
    /// Optional inclusive lower bound forwarded to the loader.
    pub start: Option<DateTime<Utc>>,
    /// Optional inclusive upper bound forwarded to the loader.
    pub end: Option<DateTime<Utc>>,
    /// Timeframe whose grid the others are aligned onto. Must be in `timeframes`.
    pub base_timeframe: Timeframe,
    /// Retrieval mode forwarded to the loader.
    pub mode: FetchMode,
    /// Ask the loader to validate rows.
    pub validate: bool,
    /// Ask the loader to repair what validation flags.
    pub repair: bool,
}

impl MultiTimeframeRequest {
    /// Request with an open period, `local` mode, validation on and repair off.
    pub fn new(
        symbol: impl Into<String>,
        timeframes: impl IntoIterator<Item = Timeframe>,
        base_timeframe: Timeframe,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframes: timeframes.into_iter().collect(),
            start: None,
            end: None,
            base_timeframe,
            mode: FetchMode::Local,
            validate: true,
            repair: false,
        }
    }

    /// Restrict the loaded period.
    #[must_use]
    pub const fn period(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Retrieval mode forwarded to the loader.
    #[must_use]
    pub const fn mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Toggle loader-side validation.
    #[must_use]
    pub const fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Toggle loader-side repair.
    #[must_use]
    pub const fn repair(mut self, repair: bool) -> Self {
        self.repair = repair;
        self
    }

    /// Check the request and return its timeframes without duplicates, in first-seen order.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the symbol or the timeframe list is empty, the
    /// base timeframe is not listed, or `start` is after `end`.
    pub fn unique_timeframes(&self) -> Result<Vec<Timeframe>, LacunaError> {
        if self.symbol.trim().is_empty() {
            return Err(LacunaError::invalid_arg("symbol must not be empty"));
        }
        if self.timeframes.is_empty() {
            return Err(LacunaError::invalid_arg("at least one timeframe is required"));
        }
        if !self.timeframes.contains(&self.base_timeframe) {
            return Err(LacunaError::invalid_arg(format!(
                "base timeframe {} is not among the requested timeframes",
                self.base_timeframe
            )));
        }
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(LacunaError::invalid_arg("start must not be after end"));
        }
        let mut out: Vec<Timeframe> = Vec::with_capacity(self.timeframes.len());
        for tf in &self.timeframes {
            if !out.contains(tf) {
                out.push(*tf);
            }
        }
        Ok(out)
    }

    pub(crate) fn load_request(&self, timeframe: Timeframe) -> LoadRequest {
        LoadRequest {
            symbol: self.symbol.clone(),
            timeframe,
            start: self.start,
            end: self.end,
            mode: self.mode,
            validate: self.validate,
            repair: self.repair,
        }
    }
}
