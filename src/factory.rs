//! Cache Factory
//!
//! Resolves named cache instances exactly once per (factory, name) pair
//! and owns their lifecycle. Each instance is a two-tier composite
//! fronting a caller-provided backing cache with an in-memory local tier;
//! disabled settings produce a shared no-op cache instead.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::base::ManagedCache;
use crate::config::CacheSettings;
use crate::contract::{Cache, NullCache};
use crate::error::{Error, Result};
use crate::health::AlwaysAvailable;
use crate::memory::MemoryBackend;
use crate::tiered::TieredCache;

/// Creates the backing-tier cache for a named instance
///
/// Backend adapters (distributed stores, wire clients) live outside this
/// crate; the composition root supplies them through this hook.
pub type BackingProvider = dyn Fn(&str) -> Arc<dyn Cache> + Send + Sync;

/// Factory owning named cache instances
pub struct CacheFactory {
    settings: CacheSettings,
    backing: Box<BackingProvider>,
    instances: Mutex<HashMap<String, Arc<dyn Cache>>>,
    disposed: AtomicBool,
}

impl CacheFactory {
    /// Create a factory from settings and a backing-cache provider
    pub fn new(
        settings: CacheSettings,
        backing: impl Fn(&str) -> Arc<dyn Cache> + Send + Sync + 'static,
    ) -> Self {
        Self {
            settings,
            backing: Box::new(backing),
            instances: Mutex::new(HashMap::new()),
            disposed: AtomicBool::new(false),
        }
    }

    /// Warm the default instance
    pub fn initialize(&self) -> Result<()> {
        self.cache(None).map(|_| ())
    }

    /// Resolve a named instance, creating it on first request. `None`
    /// resolves the configured default name.
    pub fn cache(&self, instance_name: Option<&str>) -> Result<Arc<dyn Cache>> {
        if self.disposed.load(Ordering::Relaxed) {
            return Err(Error::Disposed {
                name: "cache-factory".to_string(),
            });
        }

        let name = instance_name.unwrap_or(&self.settings.default_instance);

        let mut instances = self.instances.lock();
        if let Some(existing) = instances.get(name) {
            return Ok(existing.clone());
        }

        let created = self.create(name)?;
        instances.insert(name.to_string(), created.clone());
        Ok(created)
    }

    fn create(&self, name: &str) -> Result<Arc<dyn Cache>> {
        if !self.settings.enabled {
            info!("caching disabled, instance '{}' is a no-op", name);
            return Ok(Arc::new(NullCache::new(name)));
        }

        let strategy = self.settings.local.timeout.build()?;
        let local_name = format!("{}.local", name);
        let local: Arc<dyn Cache> = Arc::new(ManagedCache::new(
            local_name.clone(),
            Arc::new(MemoryBackend::new(local_name)),
            Arc::new(AlwaysAvailable),
        ));
        let backing = (self.backing)(name);

        let mut composite = TieredCache::new(name, local, backing, strategy);
        if self.settings.dev_mode {
            composite = composite.with_dev_prefix();
        }

        info!("cache instance '{}' created", name);
        Ok(Arc::new(composite))
    }

    /// Number of instances created so far
    pub fn instance_count(&self) -> usize {
        self.instances.lock().len()
    }

    /// Dispose every created instance. Idempotent; the factory rejects
    /// further resolution afterwards.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        for cache in self.instances.lock().values() {
            cache.dispose();
        }
    }
}

impl Drop for CacheFactory {
    fn drop(&mut self) {
        self.dispose();
    }
}

// =============================================================================
// Tests
// =============================================================================
