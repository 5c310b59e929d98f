//! Errors raised by the overlap pipeline.

use thiserror::Error;

/// Why a zone could not be built from its entity.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ZoneDefect {
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    #[error("center ({0}, {1}) is not finite")]
    NonFiniteCenter(f64, f64),

    #[error("a circle needs at least 3 points, got {0}")]
    TooFewPoints(usize),
}

/// Errors that can occur while finding overlaps.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OverlapError {
    #[error("Invalid zone '{name}': {defect}")]
    InvalidZone {
        name: String,
        #[source]
        defect: ZoneDefect,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Arrangement invariant violated: {0}")]
    ArrangementInvariant(String),
}

/// Result type for overlap operations.
pub type OverlapResult<T> = Result<T, OverlapError>;
