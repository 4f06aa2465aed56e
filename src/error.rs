//! Error types for scoring, persistence, and location lookups.

use thiserror::Error;

/// Errors raised by the catalog and the aggregator.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("Unknown category: {code}")]
    UnknownCategory { code: String },

    #[error("Unknown indicator {indicator} in category {category}")]
    UnknownIndicator { category: String, indicator: String },

    #[error("Category {code} has no indicators")]
    EmptyCategory { code: String },

    #[error("Value {value} for indicator {indicator} is out of range (|value| <= {max})")]
    InvalidValue { indicator: String, value: f64, max: f64 },

    #[error("Duplicate category code: {code}")]
    DuplicateCategory { code: String },

    #[error("Duplicate indicator {indicator} in category {category}")]
    DuplicateIndicator { category: String, indicator: String },

    #[error("Invalid weight {weight} for category {code}: must be in (0, 1]")]
    InvalidWeight { code: String, weight: f64 },

    #[error("Category weights sum to {sum}, expected 1.0")]
    WeightSum { sum: f64 },
}

/// Errors raised by the assessment store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Assessment has no id; finalize it before saving")]
    MissingId,

    #[error("Assessment not found: {id}")]
    NotFound { id: String },
}

/// Errors raised by the AMap client.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("AMap key is not configured. Set [amap].key or AMAP_KEY")]
    MissingKey,

    #[error("Request to AMap failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("AMap returned status {status}: {info}")]
    Api { status: String, info: String },

    #[error("Malformed location {value:?}")]
    MalformedLocation { value: String },
}

pub type ScoringResult<T> = std::result::Result<T, ScoringError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
