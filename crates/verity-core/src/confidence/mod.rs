//! Confidence scoring and the three-way auto-confirmation decision.
//!
//! The confidence engine combines five factor scores into a single
//! confidence value, maps it to a decision zone, and processes batches with
//! per-record failure isolation.

mod engine;
mod factors;

pub use engine::{BatchOptions, ConfidenceEngine, HIGH_CRITICALITY_SIGNIFICANCE};
