//! Error types for conversions and rate resolution.
use thiserror::Error;

/// Failure to turn a value in one unit or currency into another.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The units are unknown or belong to different dimensions.
    #[error("Conversion not possible between {from} and {to}")]
    NotConvertible { from: String, to: String },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Currency code missing from the rate snapshot in use.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Input text is not a number the converter accepts.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Reasons a rate snapshot could not come from the network or a cache.
///
/// The resolver never returns these for `resolve`; they travel as the
/// warning on a degraded snapshot instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    Malformed(String),

    /// Self-imposed minimum interval between network requests.
    #[error("Rate limited: next refresh allowed in {retry_in_secs}s")]
    RateLimited { retry_in_secs: u64 },

    #[error("No cached exchange rates available")]
    CacheMiss,

    #[error("Exchange rate API key not configured")]
    MissingApiKey,
}
