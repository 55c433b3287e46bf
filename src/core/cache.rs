use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::Hash;

/// Key under which the latest rates are stored in every tier.
pub const RATES_CACHE_KEY: &str = "currency_rates_cache";

/// Key under which the time of the last network attempt is stored.
pub const LAST_REQUEST_KEY: &str = "currency_rates_last_request";

/// A key-value cache tier. Freshness is decided by the caller.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;
    async fn put(&self, key: K, value: V);
    async fn remove(&self, key: &K);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesPayload {
    pub rates: BTreeMap<String, f64>,
}

/// Rates as stored in the cache tiers, serialized as
/// `{"data":{"rates":{..}},"timestamp":<epoch millis>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRates {
    pub data: RatesPayload,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl CachedRates {
    pub fn new(rates: BTreeMap<String, f64>, timestamp: DateTime<Utc>) -> Self {
        Self {
            data: RatesPayload { rates },
            timestamp,
        }
    }

    /// Age relative to `now`; entries stamped in the future count as new.
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.timestamp).to_std().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cached_rates_wire_format() {
        let timestamp = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let cached = CachedRates::new(BTreeMap::from([("USD".to_string(), 1.0)]), timestamp);

        let json = serde_json::to_value(&cached).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"data": {"rates": {"USD": 1.0}}, "timestamp": 1_700_000_000_123i64})
        );

        let parsed: CachedRates = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, cached);
    }

    #[test]
    fn test_age_never_negative() {
        let now = Utc::now();
        let future = CachedRates::new(BTreeMap::new(), now + chrono::Duration::minutes(5));
        assert_eq!(future.age(now), std::time::Duration::ZERO);

        let past = CachedRates::new(BTreeMap::new(), now - chrono::Duration::seconds(90));
        assert_eq!(past.age(now).as_secs(), 90);
    }
}
