//! Calendar registries and compiled session calendars.

/// Timezone-aware session math.
pub mod session;

use std::collections::HashMap;
use std::path::Path;

use lacuna_types::{LacunaError, SymbolCalendar};

use crate::connector::CalendarRegistry;

/// In-memory calendar registry keyed by upper-cased symbol.
#[derive(Debug, Clone, Default)]
pub struct StaticCalendarRegistry {
    entries: HashMap<String, SymbolCalendar>,
}

impl StaticCalendarRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, symbol: &str, calendar: SymbolCalendar) -> Self {
        self.insert(symbol, calendar);
        self
    }

    /// Insert or replace the calendar for `symbol`.
    pub fn insert(&mut self, symbol: &str, calendar: SymbolCalendar) -> Option<SymbolCalendar> {
        self.entries.insert(symbol.to_ascii_uppercase(), calendar)
    }

    /// Number of registered symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no symbol is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a JSON object mapping symbols to calendar records.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the document is not a valid symbol map.
    pub fn from_json_str(json: &str) -> Result<Self, LacunaError> {
        let raw: HashMap<String, SymbolCalendar> = serde_json::from_str(json)
            .map_err(|e| LacunaError::invalid_arg(format!("calendar registry: {e}")))?;
        let mut out = Self::new();
        for (symbol, calendar) in raw {
            out.insert(&symbol, calendar);
        }
        Ok(out)
    }

    /// Read and parse a JSON registry file.
    ///
    /// # Errors
    /// Returns `NotFound` when the file cannot be read, `InvalidArg` when it
    /// does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LacunaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LacunaError::not_found(format!("calendar file {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }
}

impl CalendarRegistry for StaticCalendarRegistry {
    fn get(&self, symbol: &str) -> Option<SymbolCalendar> {
        self.entries.get(&symbol.to_ascii_uppercase()).cloned()
    }
}
