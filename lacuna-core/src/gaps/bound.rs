use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use lacuna_types::LacunaError;

/// One end of an interval handed to the classifier.
///
/// Callers may pass timezone-aware instants or naive wall-clock values read
/// from storage. Both ends of one interval must be of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapBound {
    /// A timezone-aware instant, normalized to UTC.
    Aware(DateTime<Utc>),
    /// A naive timestamp, interpreted as UTC.
    Naive(NaiveDateTime),
}

impl<Tz: TimeZone> From<DateTime<Tz>> for GapBound {
    fn from(value: DateTime<Tz>) -> Self {
        Self::Aware(value.with_timezone(&Utc))
    }
}

impl From<NaiveDateTime> for GapBound {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

/// Resolve a pair of bounds to UTC instants.
///
/// # Errors
/// Returns `InvalidArg` when one bound is aware and the other naive.
pub fn resolve_bounds(
    start: GapBound,
    end: GapBound,
) -> Result<(DateTime<Utc>, DateTime<Utc>), LacunaError> {
    match (start, end) {
        (GapBound::Aware(s), GapBound::Aware(e)) => Ok((s, e)),
        (GapBound::Naive(s), GapBound::Naive(e)) => Ok((s.and_utc(), e.and_utc())),
        _ => Err(LacunaError::invalid_arg(
            "gap bounds mix timezone-aware and naive timestamps",
        )),
    }
}
