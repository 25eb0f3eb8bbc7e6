//! Gap classification and fetch planning.
//!
//! - `bound`: aware/naive interval bounds accepted by the classifier.
//! - `classifier`: assigns a [`lacuna_types::GapClassification`] to one interval.
//! - `analyzer`: builds candidate intervals from held data and filters them.
/// Interval planning for fetchers.
pub mod analyzer;
/// Interval bound normalization.
pub mod bound;
/// Single-interval classification.
pub mod classifier;
