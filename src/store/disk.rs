use crate::core::cache::Cache;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, warn};

/// Persistent cache tier backed by a fjall partition. Keys and values are
/// stored as JSON.
///
/// Storage errors are logged and reported as misses so a broken cache
/// directory never fails a lookup.
pub struct DiskCache<K, V>
where
    K: Eq + Hash + Send + Sync + Serialize + DeserializeOwned + Debug + 'static,
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<(K, V)>,
}

pub fn open_keyspace(path: &Path) -> Result<Keyspace> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create cache directory: {}", path.display()))?;

    let keyspace = Config::new(path)
        .open()
        .with_context(|| format!("Failed to open cache at {}", path.display()))?;
    debug!("Opened disk cache at {}", path.display());
    Ok(keyspace)
}

impl<K, V> DiskCache<K, V>
where
    K: Eq + Hash + Send + Sync + Serialize + DeserializeOwned + Debug,
    V: Clone + Send + Sync + Serialize + DeserializeOwned,
{
    pub fn open(path: &Path, partition: &str) -> Result<Self> {
        Self::with_keyspace(&open_keyspace(path)?, partition)
    }

    /// Opens `partition` in an already open keyspace, so several caches can
    /// share one directory.
    pub fn with_keyspace(keyspace: &Keyspace, partition: &str) -> Result<Self> {
        let handle = keyspace
            .open_partition(partition, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open cache partition: {partition}"))?;

        Ok(Self {
            keyspace: keyspace.clone(),
            partition: handle,
            _marker: PhantomData,
        })
    }

    fn read(&self, key: &K) -> Result<Option<V>> {
        let Some(bytes) = self.partition.get(serde_json::to_vec(key)?)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn write(&self, key: &K, value: &V) -> Result<()> {
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(value)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn delete(&self, key: &K) -> Result<()> {
        self.partition.remove(serde_json::to_vec(key)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, key: &K, bytes: &[u8]) -> Result<()> {
        self.partition.insert(serde_json::to_vec(key)?, bytes)?;
        Ok(())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Eq + Hash + Send + Sync + Serialize + DeserializeOwned + Debug + 'static,
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        match self.read(key) {
            Ok(Some(value)) => {
                debug!("Disk cache HIT for key: {:?}", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Disk cache MISS for key: {:?}", key);
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read disk cache for key: {:?}", key);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V) {
        match self.write(&key, &value) {
            Ok(()) => debug!("Disk cache PUT for key: {:?}", key),
            Err(e) => warn!(error = %e, "Failed to write disk cache for key: {:?}", key),
        }
    }

    async fn remove(&self, key: &K) {
        match self.delete(key) {
            Ok(()) => debug!("Disk cache REMOVE for key: {:?}", key),
            Err(e) => warn!(error = %e, "Failed to clear disk cache for key: {:?}", key),
        }
    }
}
