//! Cache Contract
//!
//! The uniform interface every backend wrapper and composite satisfies.
//! Values are opaque [`Bytes`] payloads bounded by an absolute TTL; a
//! `None` value on write is a semantic remove, never a stored entry.
//!
//! # Error semantics
//!
//! `Err` is reserved for caller errors: precondition violations (zero TTL
//! on a single-entry write) and operations on a disposed instance. Backend
//! failures never surface here: implementations contain them and report a
//! miss/no-op, so the cache is never a source of application failure.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::stats::CacheStatistics;

/// The cache contract
#[async_trait]
pub trait Cache: Send + Sync {
    /// Instance name; used as the key namespace prefix
    fn name(&self) -> &str;

    /// Get a single value; `None` on miss or when the backend is down
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Bulk get. The result contains every requested key, with `None` for
    /// misses or when the backend is down. Empty input yields an empty map.
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Option<Bytes>>>;

    /// Put a single value with a strictly positive TTL.
    /// A `None` value removes the key instead of storing anything.
    async fn put(&self, key: &str, value: Option<Bytes>, ttl: Duration) -> Result<()>;

    /// Bulk put; entries with a `None` value are removed. Empty input is a
    /// no-op. A zero TTL is accepted here and means "no expiry".
    async fn put_many(&self, entries: &[(String, Option<Bytes>)], ttl: Duration) -> Result<()>;

    /// Remove a single key; idempotent
    async fn remove(&self, key: &str) -> Result<()>;

    /// Clear all entries; best-effort
    async fn clear(&self) -> Result<()>;

    /// Retrieve aggregate statistics; `success == false` when unavailable
    async fn statistics(&self) -> Result<CacheStatistics>;

    /// Release the instance. Idempotent; implementations that hold backend
    /// resources reject further operations afterwards.
    fn dispose(&self) {}
}

/// No-op cache used when caching is disabled
///
/// Constructed and injected by the composition root; every read misses and
/// every write is accepted and discarded.
#[derive(Debug, Default)]
pub struct NullCache {
    name: String,
}

impl NullCache {
    /// Create a null cache with the given instance name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Cache for NullCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, _key: &str) -> Result<Option<Bytes>> {
        Ok(None)
    }

    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Option<Bytes>>> {
        Ok(keys.iter().map(|k| (k.clone(), None)).collect())
    }

    async fn put(&self, _key: &str, _value: Option<Bytes>, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn put_many(&self, _entries: &[(String, Option<Bytes>)], _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn statistics(&self) -> Result<CacheStatistics> {
        Ok(CacheStatistics::empty())
    }
}

// =============================================================================
// Tests
// =============================================================================
