//! Read-through resolution of currency rates over the memory tier, the
//! persisted tier and the network, degrading to the static fallback table.
use crate::core::cache::{Cache, CachedRates, LAST_REQUEST_KEY, RATES_CACHE_KEY};
use crate::core::config::AppConfig;
use crate::core::currency::{Provenance, RateProvider, RateSnapshot};
use crate::core::error::RateError;
use crate::store::{RateStore, RatesCache, RequestLog};
use crate::store::memory::MemoryCache;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub base_currency: String,
    pub ttl: Duration,
    pub min_refresh_interval: Duration,
}

impl From<&AppConfig> for ResolverSettings {
    fn from(config: &AppConfig) -> Self {
        ResolverSettings {
            base_currency: config.base_currency.to_uppercase(),
            ttl: config.cache.ttl(),
            min_refresh_interval: config.cache.min_refresh_interval(),
        }
    }
}

/// What the resolver has done so far, for status output.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageInfo {
    pub last_request: Option<DateTime<Utc>>,
    pub memory_entries: usize,
    pub has_persisted: bool,
    /// API key masked to its first characters.
    pub api_key: String,
}

pub struct RateResolver<P: RateProvider> {
    provider: P,
    memory: MemoryCache<String, CachedRates>,
    persistent: RatesCache,
    requests: RequestLog,
    settings: ResolverSettings,
    // Serializes the rate-limit check with recording the attempt
    attempt: Mutex<()>,
}

impl<P: RateProvider> RateResolver<P> {
    pub fn new(provider: P, store: RateStore, settings: ResolverSettings) -> Self {
        Self {
            provider,
            memory: MemoryCache::new(),
            persistent: store.rates,
            requests: store.requests,
            settings,
            attempt: Mutex::new(()),
        }
    }

    fn key() -> String {
        RATES_CACHE_KEY.to_string()
    }

    fn last_request_key() -> String {
        LAST_REQUEST_KEY.to_string()
    }

    /// Time left before another network attempt is allowed, if any.
    fn retry_in(&self, last_request: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
        // A last request stamped in the future doesn't hold back a fetch
        let elapsed = (now - last_request).to_std().ok()?;
        self.settings
            .min_refresh_interval
            .checked_sub(elapsed)
            .filter(|remaining| !remaining.is_zero())
    }

    fn is_fresh(&self, entry: &CachedRates, now: DateTime<Utc>) -> bool {
        entry.age(now) < self.settings.ttl
    }

    fn snapshot(&self, entry: CachedRates, source: Provenance) -> RateSnapshot {
        RateSnapshot::new(
            &self.settings.base_currency,
            entry.data.rates,
            entry.timestamp,
            source,
        )
    }

    /// Returns the best rates available. Never fails: problems are reported
    /// through the snapshot's provenance and warning.
    ///
    /// `force_refresh` skips both cache tiers but not the minimum refresh
    /// interval.
    pub async fn resolve(&self, force_refresh: bool) -> RateSnapshot {
        let now = Utc::now();

        if !force_refresh {
            if let Some(entry) = self.memory.get(&Self::key()).await {
                if self.is_fresh(&entry, now) {
                    debug!("Using cached exchange rates");
                    return self.snapshot(entry, Provenance::Cache);
                }
            }

            if let Some(entry) = self.persistent.get(&Self::key()).await {
                if self.is_fresh(&entry, now) {
                    debug!("Using persisted exchange rates");
                    self.memory.put(Self::key(), entry.clone()).await;
                    return self.snapshot(entry, Provenance::PersistedCache);
                }
            }
        }

        {
            let _attempt = self.attempt.lock().await;
            let last_request = self.requests.get(&Self::last_request_key()).await;
            if let Some(remaining) = last_request.and_then(|last| self.retry_in(last, now)) {
                let reason = RateError::RateLimited {
                    retry_in_secs: remaining.as_secs_f64().ceil() as u64,
                };
                warn!("{reason}, using cached or fallback rates");
                return self.degrade(reason).await;
            }
            self.requests.put(Self::last_request_key(), now).await;
        }

        info!("Fetching fresh exchange rates");
        match self.provider.fetch_latest().await {
            Ok(rates) => {
                let snapshot =
                    RateSnapshot::new(&self.settings.base_currency, rates, now, Provenance::Live);
                let entry = CachedRates::new(snapshot.rates.clone(), now);
                self.memory.put(Self::key(), entry.clone()).await;
                self.persistent.put(Self::key(), entry).await;
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch exchange rates");
                self.degrade(e).await
            }
        }
    }

    /// Newest entry across both tiers, regardless of age.
    async fn newest_cached(&self) -> Option<CachedRates> {
        let memory = self.memory.get(&Self::key()).await;
        let persisted = self.persistent.get(&Self::key()).await;
        match (memory, persisted) {
            (Some(m), Some(p)) => Some(if p.timestamp > m.timestamp { p } else { m }),
            (m, p) => m.or(p),
        }
    }

    async fn degrade(&self, reason: RateError) -> RateSnapshot {
        let warning = Some(reason.to_string());
        match self.newest_cached().await {
            Some(entry) => {
                info!("Using cached rates due to: {reason}");
                let source = self.cached_provenance(&entry);
                self.snapshot(entry, source).with_warning(warning)
            }
            None => {
                info!("Using fallback exchange rates due to: {reason}");
                RateSnapshot::fallback(&self.settings.base_currency, warning)
            }
        }
    }

    /// Best cached rates without touching the network or the refresh
    /// interval.
    pub async fn cached(&self) -> Result<RateSnapshot, RateError> {
        let entry = self.newest_cached().await.ok_or(RateError::CacheMiss)?;
        let source = self.cached_provenance(&entry);
        Ok(self.snapshot(entry, source))
    }

    fn cached_provenance(&self, entry: &CachedRates) -> Provenance {
        if self.is_fresh(entry, Utc::now()) {
            Provenance::Cache
        } else {
            Provenance::ExpiredCache
        }
    }

    pub async fn clear_cache(&self) {
        self.memory.remove(&Self::key()).await;
        self.persistent.remove(&Self::key()).await;
        info!("Cleared exchange rate caches");
    }

    pub async fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            last_request: self.requests.get(&Self::last_request_key()).await,
            memory_entries: self.memory.len().await,
            has_persisted: self.persistent.get(&Self::key()).await.is_some(),
            api_key: mask_api_key(self.provider.api_key()),
        }
    }
}

fn mask_api_key(key: Option<&str>) -> String {
    match key {
        Some(key) if !key.is_empty() => {
            let prefix: String = key.chars().take(8).collect();
            format!("{prefix}...")
        }
        _ => "Not configured".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::disk::DiskCache;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        call_count: Arc<AtomicUsize>,
        result: Result<HashMap<String, f64>, RateError>,
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        async fn fetch_latest(&self) -> Result<HashMap<String, f64>, RateError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        fn api_key(&self) -> Option<&str> {
            Some("0123456789abcdef")
        }
    }

    fn live_rates() -> HashMap<String, f64> {
        HashMap::from([
            ("USD".to_string(), 1.0),
            ("EUR".to_string(), 0.9),
            ("GBP".to_string(), 0.8),
        ])
    }

    fn settings(ttl_secs: u64, min_interval_secs: u64) -> ResolverSettings {
        ResolverSettings {
            base_currency: "USD".to_string(),
            ttl: Duration::from_secs(ttl_secs),
            min_refresh_interval: Duration::from_secs(min_interval_secs),
        }
    }

    struct Harness {
        resolver: RateResolver<MockProvider>,
        persistent: Arc<MemoryCache<String, CachedRates>>,
        requests: Arc<MemoryCache<String, DateTime<Utc>>>,
        calls: Arc<AtomicUsize>,
    }

    fn mock_provider(
        result: Result<HashMap<String, f64>, RateError>,
    ) -> (MockProvider, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = MockProvider {
            call_count: Arc::clone(&calls),
            result,
        };
        (provider, calls)
    }

    fn harness(
        result: Result<HashMap<String, f64>, RateError>,
        settings: ResolverSettings,
    ) -> Harness {
        let (provider, calls) = mock_provider(result);
        let persistent: Arc<MemoryCache<String, CachedRates>> = Arc::new(MemoryCache::new());
        let requests: Arc<MemoryCache<String, DateTime<Utc>>> = Arc::new(MemoryCache::new());
        let store = RateStore {
            rates: Arc::clone(&persistent) as RatesCache,
            requests: Arc::clone(&requests) as RequestLog,
        };
        Harness {
            resolver: RateResolver::new(provider, store, settings),
            persistent,
            requests,
            calls,
        }
    }

    fn cached_entry(age: chrono::Duration, eur: f64) -> CachedRates {
        CachedRates::new(
            BTreeMap::from([("USD".to_string(), 1.0), ("EUR".to_string(), eur)]),
            Utc::now() - age,
        )
    }

    #[tokio::test]
    async fn test_second_request_within_ttl_is_cached() {
        let h = harness(Ok(live_rates()), settings(1800, 60));

        let first = h.resolver.resolve(false).await;
        assert_eq!(first.source, Provenance::Live);
        assert!(first.warning.is_none());

        let second = h.resolver.resolve(false).await;
        assert_eq!(second.source, Provenance::Cache);
        assert_eq!(second.rates, first.rates);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);

        // Both tiers were written
        assert!(h.persistent.get(&RATES_CACHE_KEY.to_string()).await.is_some());
    }

    #[tokio::test]
    async fn test_failure_without_cache_uses_fallback() {
        let h = harness(
            Err(RateError::Network("connection refused".to_string())),
            settings(1800, 60),
        );

        let snapshot = h.resolver.resolve(false).await;
        assert_eq!(snapshot.source, Provenance::Fallback);
        assert_eq!(snapshot.rate("USD"), Ok(1.0));
        assert_eq!(snapshot.rate("EUR"), Ok(0.85));
        assert_eq!(
            snapshot.warning.as_deref(),
            Some("Network error: connection refused")
        );
    }

    #[tokio::test]
    async fn test_fresh_persisted_entry_is_promoted() {
        let h = harness(Ok(live_rates()), settings(1800, 60));
        h.persistent
            .put(
                RATES_CACHE_KEY.to_string(),
                cached_entry(chrono::Duration::minutes(5), 0.95),
            )
            .await;

        let snapshot = h.resolver.resolve(false).await;
        assert_eq!(snapshot.source, Provenance::PersistedCache);
        assert_eq!(snapshot.rate("EUR"), Ok(0.95));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);

        let again = h.resolver.resolve(false).await;
        assert_eq!(again.source, Provenance::Cache);
        assert_eq!(h.resolver.usage_info().await.memory_entries, 1);
    }

    #[tokio::test]
    async fn test_expired_persisted_entry_is_refreshed() {
        let h = harness(Ok(live_rates()), settings(1800, 60));
        h.persistent
            .put(
                RATES_CACHE_KEY.to_string(),
                cached_entry(chrono::Duration::minutes(31), 0.95),
            )
            .await;

        let snapshot = h.resolver.resolve(false).await;
        assert_eq!(snapshot.source, Provenance::Live);
        assert_eq!(snapshot.rate("EUR"), Ok(0.9));
        assert_eq!(
            h.persistent
                .get(&RATES_CACHE_KEY.to_string())
                .await
                .unwrap()
                .data
                .rates["EUR"],
            0.9
        );
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_expired_cache() {
        let h = harness(
            Err(RateError::Malformed("response has no rates".to_string())),
            settings(1800, 60),
        );
        h.persistent
            .put(
                RATES_CACHE_KEY.to_string(),
                cached_entry(chrono::Duration::hours(3), 0.95),
            )
            .await;

        let snapshot = h.resolver.resolve(false).await;
        assert_eq!(snapshot.source, Provenance::ExpiredCache);
        assert_eq!(snapshot.rate("EUR"), Ok(0.95));
        assert!(snapshot.warning.unwrap().contains("response has no rates"));
    }

    #[tokio::test]
    async fn test_rate_limit_skips_network() {
        // Zero TTL: nothing is ever fresh, so only the rate limit stops a fetch
        let h = harness(Ok(live_rates()), settings(0, 60));

        let first = h.resolver.resolve(false).await;
        assert_eq!(first.source, Provenance::Live);

        let second = h.resolver.resolve(false).await;
        assert_eq!(second.source, Provenance::ExpiredCache);
        assert_eq!(second.rates, first.rates);
        assert!(second.warning.unwrap().starts_with("Rate limited"));
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_without_cache_uses_fallback() {
        let h = harness(
            Err(RateError::Network("timeout".to_string())),
            settings(1800, 60),
        );

        assert_eq!(h.resolver.resolve(false).await.source, Provenance::Fallback);
        let second = h.resolver.resolve(false).await;
        assert_eq!(second.source, Provenance::Fallback);
        assert!(second.warning.unwrap().starts_with("Rate limited"));
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let h = harness(Ok(live_rates()), settings(1800, 0));

        h.resolver.resolve(false).await;
        let refreshed = h.resolver.resolve(true).await;
        assert_eq!(refreshed.source, Provenance::Live);
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_respects_rate_limit() {
        let h = harness(Ok(live_rates()), settings(1800, 60));

        h.resolver.resolve(false).await;
        let refreshed = h.resolver.resolve(true).await;
        // Still within TTL, so not reported as expired
        assert_eq!(refreshed.source, Provenance::Cache);
        assert!(refreshed.warning.unwrap().starts_with("Rate limited"));
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_survives_a_new_resolver() {
        let h = harness(
            Err(RateError::Network("API Error: 503".to_string())),
            settings(1800, 60),
        );
        assert_eq!(h.resolver.resolve(false).await.source, Provenance::Fallback);

        // A second process sees the attempt recorded by the first
        let (provider, calls) = mock_provider(Ok(live_rates()));
        let store = RateStore {
            rates: Arc::clone(&h.persistent) as RatesCache,
            requests: Arc::clone(&h.requests) as RequestLog,
        };
        let second = RateResolver::new(provider, store, settings(1800, 60));

        let snapshot = second.resolve(false).await;
        assert_eq!(snapshot.source, Provenance::Fallback);
        assert!(snapshot.warning.unwrap().starts_with("Rate limited"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(second.usage_info().await.last_request.is_some());
    }

    #[tokio::test]
    async fn test_rate_limit_expires() {
        let h = harness(Ok(live_rates()), settings(1800, 60));
        h.requests
            .put(
                LAST_REQUEST_KEY.to_string(),
                Utc::now() - chrono::Duration::seconds(61),
            )
            .await;

        assert_eq!(h.resolver.resolve(false).await.source, Provenance::Live);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_future_last_request_does_not_block_fetch() {
        let h = harness(Ok(live_rates()), settings(1800, 60));
        h.requests
            .put(
                LAST_REQUEST_KEY.to_string(),
                Utc::now() + chrono::Duration::hours(1),
            )
            .await;

        assert_eq!(h.resolver.resolve(false).await.source, Provenance::Live);
    }

    #[tokio::test]
    async fn test_unreadable_persisted_entry_still_resolves_live() {
        let dir = tempfile::tempdir().unwrap();
        let disk = DiskCache::<String, CachedRates>::open(dir.path(), "rates").unwrap();
        disk.insert_raw(&RATES_CACHE_KEY.to_string(), b"\x00garbage")
            .unwrap();
        let disk = Arc::new(disk);

        let (provider, calls) = mock_provider(Ok(live_rates()));
        let store = RateStore {
            rates: Arc::clone(&disk) as RatesCache,
            requests: Arc::new(MemoryCache::<String, DateTime<Utc>>::new()),
        };
        let resolver = RateResolver::new(provider, store, settings(1800, 60));

        let snapshot = resolver.resolve(false).await;
        assert_eq!(snapshot.source, Provenance::Live);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // The bad entry is overwritten by the fresh one
        assert_eq!(
            disk.get(&RATES_CACHE_KEY.to_string()).await.unwrap().data.rates["EUR"],
            0.9
        );
    }

    #[tokio::test]
    async fn test_live_rates_gain_base_currency() {
        let h = harness(
            Ok(HashMap::from([("EUR".to_string(), 0.9)])),
            settings(1800, 60),
        );

        let snapshot = h.resolver.resolve(false).await;
        assert_eq!(snapshot.rate("USD"), Ok(1.0));
    }

    #[tokio::test]
    async fn test_cached_and_clear_cache() {
        let h = harness(Ok(live_rates()), settings(1800, 60));
        assert_eq!(h.resolver.cached().await, Err(RateError::CacheMiss));

        h.resolver.resolve(false).await;
        let cached = h.resolver.cached().await.unwrap();
        assert_eq!(cached.source, Provenance::Cache);

        h.resolver.clear_cache().await;
        assert_eq!(h.resolver.cached().await, Err(RateError::CacheMiss));
        assert!(!h.resolver.usage_info().await.has_persisted);
    }

    #[tokio::test]
    async fn test_usage_info() {
        let h = harness(Ok(live_rates()), settings(1800, 60));

        let before = h.resolver.usage_info().await;
        assert!(before.last_request.is_none());
        assert_eq!(before.api_key, "01234567...");

        h.resolver.resolve(false).await;
        let after = h.resolver.usage_info().await;
        assert!(after.last_request.is_some());
        assert!(after.has_persisted);
        assert_eq!(after.memory_entries, 1);
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key(None), "Not configured");
        assert_eq!(mask_api_key(Some("")), "Not configured");
        assert_eq!(mask_api_key(Some("abc")), "abc...");
    }
}
