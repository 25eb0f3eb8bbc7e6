//! Static calendars and synthetic series.
/// Calendar records for a handful of venues.
pub mod calendars;
/// Synthetic bar series.
pub mod history;
