//! Currency rate snapshots and the provider abstraction

use crate::core::error::{ConversionError, RateError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use tracing::warn;

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Which tier supplied a rate snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Live,
    Cache,
    PersistedCache,
    ExpiredCache,
    Fallback,
}

impl Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Provenance::Live => "live",
                Provenance::Cache => "cache",
                Provenance::PersistedCache => "persisted-cache",
                Provenance::ExpiredCache => "expired-cache",
                Provenance::Fallback => "fallback",
            }
        )
    }
}

impl Provenance {
    /// True when the rates are not known to be current.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Provenance::ExpiredCache | Provenance::Fallback)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub base: String,
    pub rates: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
    pub source: Provenance,
    /// Why the snapshot is degraded, if it is.
    pub warning: Option<String>,
}

impl RateSnapshot {
    pub fn new(
        base: &str,
        rates: impl IntoIterator<Item = (String, f64)>,
        timestamp: DateTime<Utc>,
        source: Provenance,
    ) -> Self {
        let mut rates: BTreeMap<String, f64> = rates
            .into_iter()
            .filter(|(_, rate)| is_usable_rate(*rate))
            .collect();
        if !rates.is_empty() && !rates.contains_key(base) {
            warn!("Rates are not quoted against {base}, cross rates may be wrong");
        }
        // Rates quoted against another currency are rebased onto `base`
        if let Some(base_rate) = rates.get(base).copied().filter(|r| *r != 1.0) {
            for rate in rates.values_mut() {
                *rate /= base_rate;
            }
        }
        rates.insert(base.to_string(), 1.0);
        Self {
            base: base.to_string(),
            rates,
            timestamp,
            source,
            warning: None,
        }
    }

    /// The static table used when nothing better is available.
    pub fn fallback(base: &str, warning: Option<String>) -> Self {
        Self {
            warning,
            ..Self::new(base, fallback_rates(), Utc::now(), Provenance::Fallback)
        }
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }

    pub fn rate(&self, code: &str) -> Result<f64, ConversionError> {
        self.rates
            .get(&code.to_uppercase())
            .copied()
            .ok_or_else(|| ConversionError::UnknownCurrency(code.to_string()))
    }

    /// Units of `to` per unit of `from`.
    pub fn exchange_rate(&self, from: &str, to: &str) -> Result<f64, ConversionError> {
        Ok(self.rate(to)? / self.rate(from)?)
    }

    /// Converts through the base currency: divide by the source rate, then
    /// multiply by the target rate.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        if amount == 0.0 {
            return Ok(0.0);
        }
        Ok(amount / from_rate * to_rate)
    }
}

/// Rates must be finite and positive to convert through.
pub fn is_usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

pub fn fallback_rates() -> Vec<(String, f64)> {
    [
        ("USD", 1.0),
        ("EUR", 0.85),
        ("GBP", 0.73),
        ("JPY", 110.0),
        ("CAD", 1.25),
        ("AUD", 1.35),
        ("CHF", 0.92),
        ("CNY", 6.45),
        ("INR", 74.5),
        ("BRL", 5.2),
        ("RUB", 75.0),
        ("KRW", 1180.0),
        ("MXN", 20.0),
        ("SGD", 1.35),
        ("NZD", 1.42),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

const fn currency(code: &'static str, name: &'static str, symbol: &'static str) -> CurrencyInfo {
    CurrencyInfo { code, name, symbol }
}

pub static CURRENCIES: &[CurrencyInfo] = &[
    currency("USD", "US Dollar", "$"),
    currency("EUR", "Euro", "€"),
    currency("GBP", "British Pound", "£"),
    currency("JPY", "Japanese Yen", "¥"),
    currency("CAD", "Canadian Dollar", "C$"),
    currency("AUD", "Australian Dollar", "A$"),
    currency("CHF", "Swiss Franc", "CHF"),
    currency("CNY", "Chinese Yuan", "¥"),
    currency("INR", "Indian Rupee", "₹"),
    currency("BRL", "Brazilian Real", "R$"),
    currency("RUB", "Russian Ruble", "₽"),
    currency("KRW", "South Korean Won", "₩"),
    currency("MXN", "Mexican Peso", "$"),
    currency("SGD", "Singapore Dollar", "S$"),
    currency("NZD", "New Zealand Dollar", "NZ$"),
];

pub fn currency_info(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Source of the latest rates relative to the provider's base currency.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<HashMap<String, f64>, RateError>;

    /// API key in use, if any. Only ever shown masked.
    fn api_key(&self) -> Option<&str> {
        None
    }
}
