//! Scoring and draft lifecycle.

pub mod aggregator;

pub use aggregator::*;
