//! Error type for the pure core algorithms.
//!
//! The taxonomy is deliberately small: bad chunking or threshold parameters
//! and invalid feedback weights. Everything else in the core is total over
//! its documented domain.

use thiserror::Error;

/// Errors raised by the core crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Parameters that would not terminate or make no sense
    /// (`chunk_size == 0`, `overlap >= chunk_size`, unordered tier thresholds).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A feedback weight multiplier that is zero, negative, or not finite.
    #[error("invalid weight multiplier {multiplier} for {feedback_type}/{feedback_category}")]
    InvalidWeight {
        feedback_type: String,
        feedback_category: String,
        multiplier: f64,
    },
}
