//! Time-series utilities shared by the analyzer and the coordinator.
//!
//! - `coverage`: timestamp ordering, common coverage windows and rescoping
/// Coverage windows across several series.
pub mod coverage;
