//! Trading-hours metadata as served by a calendar registry.

use serde::{Deserialize, Serialize};

/// One named session window in the symbol's local timezone.
///
/// `start` and `end` are `"HH:MM"` strings. A window whose end is not after its
/// start wraps past midnight (e.g. futures `"18:00"`..`"17:00"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSession {
    /// Local open time, `"HH:MM"`.
    pub start: String,
    /// Local close time, `"HH:MM"`.
    pub end: String,
    /// Display name, e.g. `"regular"` or `"pre-market"`.
    #[serde(default)]
    pub name: String,
}

impl TradingSession {
    /// Convenience constructor.
    pub fn new(start: impl Into<String>, end: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            name: name.into(),
        }
    }
}

/// Trading hours for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingHours {
    /// IANA timezone name, e.g. `"America/New_York"`.
    pub timezone: String,
    /// Main session.
    pub regular_hours: TradingSession,
    /// Pre/post-market or overnight sessions.
    #[serde(default)]
    pub extended_hours: Vec<TradingSession>,
    /// Weekdays the market opens, `0 = Monday` through `6 = Sunday`.
    pub trading_days: Vec<u8>,
}

/// Registry record for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolCalendar {
    /// Asset class, e.g. `"stock"`, `"forex"`, `"crypto"`.
    #[serde(default)]
    pub asset_type: String,
    /// Listing exchange or venue.
    #[serde(default)]
    pub exchange: String,
    /// Session metadata.
    pub trading_hours: TradingHours,
}
