use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timeframe::Timeframe;

/// Unified error type for the lacuna workspace.
///
/// Variants fall into three groups:
/// - validation errors for malformed caller input ([`LacunaError::InvalidArg`]),
/// - structured data errors carrying the symbol, timeframes and underlying cause,
/// - non-fatal warnings that are only ever attached to reports, never returned.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LacunaError {
    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with the returned or expected data (missing fields, empty series, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "calendar for AAPL".
        what: String,
    },

    /// The loader collaborator failed for a single timeframe.
    #[error("loader failed for {timeframe}: {msg}")]
    Loader {
        /// Timeframe that was being loaded.
        timeframe: Timeframe,
        /// Human-readable error message.
        msg: String,
    },

    /// The caller cancelled the operation through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// The base timeframe could not be loaded; the whole call is aborted.
    #[error("base timeframe {timeframe} failed for {symbol}: {source}")]
    BaseTimeframeFailed {
        /// Requested symbol.
        symbol: String,
        /// The base timeframe that failed.
        timeframe: Timeframe,
        /// Original loader error.
        source: Box<LacunaError>,
    },

    /// Every requested timeframe failed (or loaded empty).
    #[error("no timeframes loaded for {symbol}: {timeframes:?}")]
    NoTimeframesLoaded {
        /// Requested symbol.
        symbol: String,
        /// Requested timeframes.
        timeframes: Vec<Timeframe>,
        /// Per-timeframe failures in request order.
        failures: Vec<(Timeframe, LacunaError)>,
    },

    /// The common coverage window across timeframes is too small to be useful.
    #[error("insufficient coverage for {symbol} {timeframes:?}: {detail}")]
    InsufficientCoverage {
        /// Requested symbol.
        symbol: String,
        /// Timeframes that took part in the coverage computation.
        timeframes: Vec<Timeframe>,
        /// Which floor was violated.
        detail: String,
    },

    /// The synchronizer collaborator failed.
    #[error("synchronization failed for {symbol} {timeframes:?}: {source}")]
    SynchronizationFailed {
        /// Requested symbol.
        symbol: String,
        /// Timeframes handed to the synchronizer.
        timeframes: Vec<Timeframe>,
        /// Original synchronizer error.
        source: Box<LacunaError>,
    },

    /// Warning: series were narrowed to the common coverage window.
    #[error("coverage narrowed for {symbol} to {start}..{end} ({dropped_rows} rows dropped)")]
    CoverageNarrowed {
        /// Requested symbol.
        symbol: String,
        /// Window start (inclusive).
        start: DateTime<Utc>,
        /// Window end (inclusive).
        end: DateTime<Utc>,
        /// Total rows discarded across all timeframes.
        dropped_rows: usize,
    },

    /// Warning: the base timeframe had no usable data and was replaced.
    #[error("base timeframe reassigned from {from} to {to}")]
    BaseTimeframeReassigned {
        /// Requested base timeframe.
        from: Timeframe,
        /// Timeframe used as base instead.
        to: Timeframe,
    },
}

impl LacunaError {
    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: build a `Data` error.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Loader` error tagged with the timeframe being loaded.
    pub fn loader(timeframe: Timeframe, msg: impl Into<String>) -> Self {
        Self::Loader {
            timeframe,
            msg: msg.into(),
        }
    }

    /// Stable machine-readable code for the variant.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArg(_) => "invalid_argument",
            Self::Data(_) => "data",
            Self::NotFound { .. } => "not_found",
            Self::Loader { .. } => "loader_failed",
            Self::Cancelled => "cancelled",
            Self::BaseTimeframeFailed { .. } => "base_timeframe_failed",
            Self::NoTimeframesLoaded { .. } => "no_timeframes_loaded",
            Self::InsufficientCoverage { .. } => "insufficient_coverage",
            Self::SynchronizationFailed { .. } => "synchronization_failed",
            Self::CoverageNarrowed { .. } => "coverage_narrowed",
            Self::BaseTimeframeReassigned { .. } => "base_timeframe_reassigned",
        }
    }

    /// Returns true for errors caused by malformed caller input.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::InvalidArg(_))
    }

    /// Returns true for environmental or data failures surfaced with structured detail.
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Data(_)
                | Self::BaseTimeframeFailed { .. }
                | Self::NoTimeframesLoaded { .. }
                | Self::InsufficientCoverage { .. }
                | Self::SynchronizationFailed { .. }
        )
    }

    /// Returns true for variants that only ever appear as report warnings.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::CoverageNarrowed { .. } | Self::BaseTimeframeReassigned { .. }
        )
    }
}
