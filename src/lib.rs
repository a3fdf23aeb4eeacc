//! StrataCache - Pluggable Two-Tier Caching Abstraction
//!
//! A caching abstraction that lets application code read and write named,
//! namespaced, TTL-bounded key-value data through one contract while the
//! actual storage (in-process memory, a distributed store, or a two-tier
//! combination) is swapped transparently.
//!
//! # Architecture
//!
//! ```text
//! Application → Cache contract (TieredCache or single tier)
//!                  │
//!                  ├── local tier:   ManagedCache ── MemoryBackend
//!                  └── backing tier: ManagedCache ── adapter (external)
//! ```
//!
//! [`ManagedCache`] is the resilience layer: backend adapters implement
//! only the primitive operations of [`CacheBackend`] and get key
//! namespacing, health gating, error containment and logging for free.
//! [`TieredCache`] composes two such caches, translating caller TTLs to
//! local-tier TTLs through a [`TimeoutStrategy`] and keeping the tiers
//! eventually coherent. [`CacheFactory`] resolves named instances once
//! and owns their disposal.
//!
//! Cache operations are designed to never be a source of application
//! failure: the worst case is a silent miss or an uncached value, with
//! diagnostics available through logs and [`CacheStatistics`].
//!
//! # Modules
//!
//! - [`base`] - Backend primitives and the resilient wrapper
//! - [`config`] - Settings structs consumed by the factory
//! - [`contract`] - The cache contract and the no-op cache
//! - [`error`] - Error types
//! - [`factory`] - Named-instance factory and lifecycle
//! - [`health`] - Backend health monitoring
//! - [`memory`] - In-memory backend with lazy TTL expiry
//! - [`pool`] - Bounded lock-free object pool
//! - [`serializer`] - Pooled serializers with buffer-size policy
//! - [`stats`] - Statistics aggregation
//! - [`tiered`] - Two-tier composite cache
//! - [`timeout`] - Local-TTL translation strategies

pub mod base;
pub mod config;
pub mod contract;
pub mod error;
pub mod factory;
pub mod health;
pub mod memory;
pub mod pool;
pub mod serializer;
pub mod stats;
pub mod tiered;
pub mod timeout;

// Re-export commonly used types
pub use base::{CacheBackend, ManagedCache};
pub use config::{CacheSettings, LocalTierSettings, TimeoutPolicy};
pub use contract::{Cache, NullCache};
pub use error::{Error, Result};
pub use factory::CacheFactory;
pub use health::{AlwaysAvailable, FlagMonitor, HealthMonitor};
pub use memory::MemoryBackend;
pub use pool::{ObjectPool, PooledObject};
pub use serializer::{JsonSerializer, SerializerPool};
pub use stats::{CacheNodeStatistics, CacheStatistics};
pub use tiered::TieredCache;
pub use timeout::{FixedTimeout, ProportionalTimeout, TimeoutStrategy};
