pub mod disk;
pub mod memory;

use crate::core::cache::{Cache, CachedRates};
use anyhow::Result;
use chrono::{DateTime, Utc};
use disk::DiskCache;
use memory::MemoryCache;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub type RatesCache = Arc<dyn Cache<String, CachedRates>>;

/// When rates were last requested from the network.
pub type RequestLog = Arc<dyn Cache<String, DateTime<Utc>>>;

const RATES_PARTITION: &str = "rates";
const REQUESTS_PARTITION: &str = "requests";

/// The tiers that outlive a single resolver.
#[derive(Clone)]
pub struct RateStore {
    pub rates: RatesCache,
    pub requests: RequestLog,
}

impl RateStore {
    pub fn in_memory() -> Self {
        Self {
            rates: Arc::new(MemoryCache::<String, CachedRates>::new()),
            requests: Arc::new(MemoryCache::<String, DateTime<Utc>>::new()),
        }
    }

    fn on_disk(path: &Path) -> Result<Self> {
        let keyspace = disk::open_keyspace(path)?;
        Ok(Self {
            rates: Arc::new(DiskCache::<String, CachedRates>::with_keyspace(
                &keyspace,
                RATES_PARTITION,
            )?),
            requests: Arc::new(DiskCache::<String, DateTime<Utc>>::with_keyspace(
                &keyspace,
                REQUESTS_PARTITION,
            )?),
        })
    }
}

/// Opens the persistent store under `data_path/cache`.
///
/// Falls back to a process-local store when the directory can't be opened,
/// so rates still resolve, just without surviving the process.
pub fn open_rate_store(data_path: Option<&Path>) -> RateStore {
    let Some(data_path) = data_path else {
        warn!("No data directory available, rates will not be persisted");
        return RateStore::in_memory();
    };

    match RateStore::on_disk(&data_path.join("cache")) {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "Failed to open persistent cache, rates will not be persisted");
            RateStore::in_memory()
        }
    }
}
