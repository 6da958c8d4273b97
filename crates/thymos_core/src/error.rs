//! Typed error kinds for the recommendation core.
//!
//! None of these may terminate an in-progress session: callers degrade to
//! empty results, fallback coordinates, or an empty model. The single
//! exception is `Configuration`, which is only ever raised before the first
//! session starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThymosError {
    /// Dialogue or place service unreachable or erroring. Degraded to empty
    /// results / visible error text by the session.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Geocoding produced nothing for the requested location.
    #[error("could not resolve location: {0}")]
    InvalidLocation(String),

    /// Persisted model blob could not be parsed back into a Q-table.
    #[error("corrupt model snapshot at {path}: {reason}")]
    CorruptModel { path: String, reason: String },

    /// Missing required credentials or invalid parameters, fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),
}
