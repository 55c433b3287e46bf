//! Core conversion logic and abstractions

pub mod cache;
pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod log;
pub mod measure;
pub mod quick;
pub mod units;

// Re-export main types for cleaner imports
pub use cache::{Cache, CachedRates};
pub use currency::{Provenance, RateProvider, RateSnapshot};
pub use error::{ConversionError, RateError};
