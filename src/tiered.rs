//! Two-Tier Composite Cache
//!
//! Fronts a slow/shared "backing" cache with a smaller/faster "local"
//! cache while keeping both eventually coherent. Reads go local-first and
//! populate the local tier on a backing hit; writes land in both tiers,
//! with the local TTL derived from the caller's TTL by a
//! [`TimeoutStrategy`]. Both tiers are plain [`Cache`] implementations, so
//! every tier failure has already been contained below this layer.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::future::BoxFuture;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::contract::Cache;
use crate::error::{Error, Result};
use crate::stats::CacheStatistics;
use crate::timeout::TimeoutStrategy;

static DEV_KEY_PREFIX: OnceCell<String> = OnceCell::new();

/// Process-lifetime-stable developer key prefix
///
/// Derived from host identity plus a start-time disambiguator, falling
/// back to a random identifier when the host name is unavailable. Computed
/// exactly once per process so every key written by this process shares
/// one prefix; separate developer instances writing to a shared backing
/// store cannot collide.
pub fn dev_key_prefix() -> &'static str {
    DEV_KEY_PREFIX.get_or_init(|| {
        match hostname::get().ok().and_then(|h| h.into_string().ok()) {
            Some(host) if !host.is_empty() => {
                format!("{}-{}", host, Utc::now().format("%y%m%d%H%M"))
            }
            _ => format!("dev-{}", Uuid::new_v4().simple()),
        }
    })
}

/// Two-tier composite cache
pub struct TieredCache {
    name: String,
    local: Arc<dyn Cache>,
    backing: Arc<dyn Cache>,
    strategy: Arc<dyn TimeoutStrategy>,
    dev_prefix: bool,
}

impl TieredCache {
    /// Compose a local and a backing cache under one contract
    pub fn new(
        name: impl Into<String>,
        local: Arc<dyn Cache>,
        backing: Arc<dyn Cache>,
        strategy: Arc<dyn TimeoutStrategy>,
    ) -> Self {
        let cache = Self {
            name: name.into(),
            local,
            backing,
            strategy,
            dev_prefix: false,
        };
        debug!(
            "tiered cache '{}' composed: local '{}', backing '{}', strategy {}",
            cache.name,
            cache.local.name(),
            cache.backing.name(),
            cache.strategy.describe()
        );
        cache
    }

    /// Prefix every physical key with the process-stable developer prefix
    pub fn with_dev_prefix(mut self) -> Self {
        self.dev_prefix = true;
        self
    }

    fn physical_key(&self, key: &str) -> String {
        if self.dev_prefix {
            format!("{}.{}", dev_key_prefix(), key)
        } else {
            key.to_string()
        }
    }

    /// TTL used when populating the local tier from a backing read: the
    /// original backing TTL is not retrievable from a plain get, so the
    /// strategy's default (zero-input) timeout applies.
    fn populate_ttl(&self) -> Duration {
        self.strategy.local_timeout(Duration::ZERO)
    }

    fn local_node_name(&self) -> String {
        if self.local.name().is_empty() {
            "local".to_string()
        } else {
            self.local.name().to_string()
        }
    }
}

#[async_trait]
impl Cache for TieredCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let cache_key = self.physical_key(key);

        if let Some(value) = self.local.get(&cache_key).await? {
            return Ok(Some(value));
        }

        match self.backing.get(&cache_key).await? {
            Some(value) => {
                if let Err(err) = self
                    .local
                    .put(&cache_key, Some(value.clone()), self.populate_ttl())
                    .await
                {
                    warn!(
                        "tiered cache '{}' local populate for '{}' failed: {}",
                        self.name, key, err
                    );
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Option<Bytes>>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let physical: Vec<(String, String)> = keys
            .iter()
            .map(|k| (k.clone(), self.physical_key(k)))
            .collect();
        let cache_keys: Vec<String> = physical.iter().map(|(_, p)| p.clone()).collect();

        let local_found = self.local.get_many(&cache_keys).await?;

        let mut result = HashMap::with_capacity(keys.len());
        let mut missing: Vec<(String, String)> = Vec::new();
        for (original, cache_key) in physical {
            match local_found.get(&cache_key).cloned().flatten() {
                Some(value) => {
                    result.insert(original, Some(value));
                }
                None => missing.push((original, cache_key)),
            }
        }
        if missing.is_empty() {
            return Ok(result);
        }

        let missing_keys: Vec<String> = missing.iter().map(|(_, p)| p.clone()).collect();
        let backing_found = self.backing.get_many(&missing_keys).await?;

        let populate_ttl = self.populate_ttl();
        let mut maintenance: Vec<BoxFuture<'_, ()>> = Vec::new();
        for (original, cache_key) in missing {
            let value = backing_found.get(&cache_key).cloned().flatten();
            match value.clone() {
                Some(value) => {
                    maintenance.push(Box::pin(async move {
                        if let Err(err) = self
                            .local
                            .put(&cache_key, Some(value), populate_ttl)
                            .await
                        {
                            warn!(
                                "tiered cache '{}' local populate for '{}' failed: {}",
                                self.name, cache_key, err
                            );
                        }
                    }));
                }
                None => {
                    // The backing tier is authoritative for absence: drop
                    // any stale local copy the bulk read skipped past.
                    maintenance.push(Box::pin(async move {
                        if let Err(err) = self.local.remove(&cache_key).await {
                            warn!(
                                "tiered cache '{}' local invalidate for '{}' failed: {}",
                                self.name, cache_key, err
                            );
                        }
                    }));
                }
            }
            result.insert(original, value);
        }
        futures::future::join_all(maintenance).await;

        Ok(result)
    }

    async fn put(&self, key: &str, value: Option<Bytes>, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(Error::InvalidTtl { ttl });
        }

        let cache_key = self.physical_key(key);
        let local_ttl = self.strategy.local_timeout(ttl);

        self.local.put(&cache_key, value.clone(), local_ttl).await?;
        self.backing.put(&cache_key, value, ttl).await?;
        Ok(())
    }

    async fn put_many(&self, entries: &[(String, Option<Bytes>)], ttl: Duration) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let physical: Vec<(String, Option<Bytes>)> = entries
            .iter()
            .map(|(k, v)| (self.physical_key(k), v.clone()))
            .collect();
        let local_ttl = self.strategy.local_timeout(ttl);

        // Neither tier write depends on the other: issue both concurrently
        // and join. A partial-tier failure degrades, it does not fail the
        // caller's call.
        let (local_result, backing_result) = tokio::join!(
            self.local.put_many(&physical, local_ttl),
            self.backing.put_many(&physical, ttl),
        );
        if let Err(err) = local_result {
            warn!("tiered cache '{}' local bulk put failed: {}", self.name, err);
        }
        if let Err(err) = backing_result {
            warn!(
                "tiered cache '{}' backing bulk put failed: {}",
                self.name, err
            );
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let cache_key = self.physical_key(key);
        self.local.remove(&cache_key).await?;
        self.backing.remove(&cache_key).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.local.clear().await?;
        self.backing.clear().await?;
        Ok(())
    }

    async fn statistics(&self) -> Result<CacheStatistics> {
        let (local_stats, backing_stats) =
            tokio::join!(self.local.statistics(), self.backing.statistics());
        let local_stats = local_stats?;
        let backing_stats = backing_stats?;

        if !local_stats.success {
            return Ok(backing_stats);
        }

        // Surface the whole local tier as one synthetic node next to the
        // backing store's real nodes.
        let local_rollup = CacheStatistics {
            nodes: vec![local_stats.as_node(self.local_node_name())],
            ..local_stats
        };
        Ok(backing_stats.merge(&local_rollup))
    }

    fn dispose(&self) {
        self.local.dispose();
        self.backing.dispose();
    }
}

// =============================================================================
// Tests
// =============================================================================
