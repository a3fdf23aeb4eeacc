//! Managed Cache Wrapper
//!
//! The resilience layer every backend gets for free. A backend adapter
//! implements only the primitive operations of [`CacheBackend`];
//! [`ManagedCache`] wraps it with key namespacing, health gating, uniform
//! error containment, hit/miss logging and idempotent disposal, so that
//! every backend exposes identical failure semantics through the
//! [`Cache`] contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::contract::Cache;
use crate::error::{Error, Result};
use crate::health::HealthMonitor;
use crate::stats::CacheStatistics;

/// Primitive operations a concrete backend adapter implements
///
/// Primitives report failures as `Err`; the wrapper contains them. None of
/// these methods is reachable after the owning wrapper is disposed.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a single value
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>>;

    /// Bulk fetch. The default resolves each key with [`fetch`],
    /// treating a per-key failure as a logged miss so one bad key cannot
    /// poison the batch. Backends with a native multi-get override this.
    ///
    /// [`fetch`]: CacheBackend::fetch
    async fn fetch_many(&self, keys: &[String]) -> Result<HashMap<String, Option<Bytes>>> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            let value = match self.fetch(key).await {
                Ok(value) => value,
                Err(err) => {
                    warn!("bulk fetch for '{}' failed, treating as miss: {}", key, err);
                    None
                }
            };
            found.insert(key.clone(), value);
        }
        Ok(found)
    }

    /// Store a single value. A zero TTL means "no expiry".
    async fn store(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()>;

    /// Delete a single key
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove all entries
    async fn flush(&self) -> Result<()>;

    /// Retrieve backend statistics
    async fn backend_statistics(&self) -> Result<CacheStatistics>;
}

/// Resilient wrapper turning a [`CacheBackend`] into a [`Cache`]
///
/// State machine per instance: `Active → Disposed` (terminal). All
/// operations except `dispose` are rejected once disposed.
pub struct ManagedCache {
    name: String,
    backend: Arc<dyn CacheBackend>,
    monitor: Arc<dyn HealthMonitor>,
    disposed: AtomicBool,
}

impl ManagedCache {
    /// Wrap a backend. `name` becomes the key namespace; an empty name
    /// applies no prefix.
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn CacheBackend>,
        monitor: Arc<dyn HealthMonitor>,
    ) -> Self {
        monitor.start();
        Self {
            name: name.into(),
            backend,
            monitor,
            disposed: AtomicBool::new(false),
        }
    }

    /// Physical key for a caller key: `"{name}.{key}"`, or the key itself
    /// when the instance name is empty
    pub fn prepare_cache_key(&self, key: &str) -> String {
        if self.name.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.name, key)
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::Relaxed) {
            return Err(Error::Disposed {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    fn available(&self, operation: &str) -> bool {
        if self.monitor.is_available() {
            return true;
        }
        debug!(
            "cache '{}' unavailable, {} degraded to no-op",
            self.name, operation
        );
        false
    }
}

#[async_trait]
impl Cache for ManagedCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.ensure_live()?;
        if !self.available("get") {
            return Ok(None);
        }

        let cache_key = self.prepare_cache_key(key);
        match self.backend.fetch(&cache_key).await {
            Ok(Some(value)) => {
                debug!("cache '{}' hit for '{}'", self.name, key);
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("cache '{}' miss for '{}'", self.name, key);
                Ok(None)
            }
            Err(err) => {
                warn!("cache '{}' get for '{}' failed: {}", self.name, key, err);
                Ok(None)
            }
        }
    }

    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Option<Bytes>>> {
        self.ensure_live()?;
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let all_missed = || keys.iter().map(|k| (k.clone(), None)).collect();
        if !self.available("bulk get") {
            return Ok(all_missed());
        }

        let prepared: Vec<(String, String)> = keys
            .iter()
            .map(|k| (k.clone(), self.prepare_cache_key(k)))
            .collect();
        let cache_keys: Vec<String> = prepared.iter().map(|(_, p)| p.clone()).collect();

        match self.backend.fetch_many(&cache_keys).await {
            Ok(mut found) => {
                let result: HashMap<String, Option<Bytes>> = prepared
                    .into_iter()
                    .map(|(original, physical)| {
                        (original, found.remove(&physical).flatten())
                    })
                    .collect();
                let hits = result.values().filter(|v| v.is_some()).count();
                debug!(
                    "cache '{}' bulk get: {}/{} hits",
                    self.name,
                    hits,
                    result.len()
                );
                Ok(result)
            }
            Err(err) => {
                warn!("cache '{}' bulk get failed: {}", self.name, err);
                Ok(all_missed())
            }
        }
    }

    async fn put(&self, key: &str, value: Option<Bytes>, ttl: Duration) -> Result<()> {
        self.ensure_live()?;
        if ttl.is_zero() {
            return Err(Error::InvalidTtl { ttl });
        }

        // A missing value is a semantic remove, never a stored entry
        let Some(value) = value else {
            return self.remove(key).await;
        };

        if !self.available("put") {
            return Ok(());
        }

        let cache_key = self.prepare_cache_key(key);
        if let Err(err) = self.backend.store(&cache_key, value, ttl).await {
            warn!("cache '{}' put for '{}' failed: {}", self.name, key, err);
        }
        Ok(())
    }

    async fn put_many(&self, entries: &[(String, Option<Bytes>)], ttl: Duration) -> Result<()> {
        self.ensure_live()?;
        if entries.is_empty() {
            return Ok(());
        }
        if !self.available("bulk put") {
            return Ok(());
        }

        for (key, value) in entries {
            let cache_key = self.prepare_cache_key(key);
            let outcome = match value {
                Some(value) => self.backend.store(&cache_key, value.clone(), ttl).await,
                None => self.backend.delete(&cache_key).await,
            };
            if let Err(err) = outcome {
                warn!(
                    "cache '{}' bulk put entry '{}' failed: {}",
                    self.name, key, err
                );
            }
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_live()?;
        if !self.available("remove") {
            return Ok(());
        }

        let cache_key = self.prepare_cache_key(key);
        if let Err(err) = self.backend.delete(&cache_key).await {
            warn!("cache '{}' remove for '{}' failed: {}", self.name, key, err);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_live()?;
        if !self.available("clear") {
            return Ok(());
        }

        if let Err(err) = self.backend.flush().await {
            warn!("cache '{}' clear failed: {}", self.name, err);
        }
        Ok(())
    }

    async fn statistics(&self) -> Result<CacheStatistics> {
        self.ensure_live()?;
        if !self.available("statistics") {
            return Ok(CacheStatistics::unavailable());
        }

        match self.backend.backend_statistics().await {
            Ok(stats) => Ok(stats),
            Err(err) => {
                warn!("cache '{}' statistics failed: {}", self.name, err);
                Ok(CacheStatistics::unavailable())
            }
        }
    }

    fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            debug!("cache '{}' disposed", self.name);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
