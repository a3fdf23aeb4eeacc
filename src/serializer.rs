//! Pooled Serializers
//!
//! Serializers keep an internal scratch buffer that grows to fit the
//! largest payload they have handled, which makes them worth pooling and
//! also dangerous to pool: one oversized payload would otherwise pin that
//! memory for the pool's lifetime. [`SerializerPool`] strengthens the base
//! pool policy so a ballooned serializer is dropped instead of kept.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::pool::{ObjectPool, PooledObject};

/// Default ceiling on a pooled serializer's retained buffer (1 MiB)
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// JSON serializer with a reusable scratch buffer
///
/// All mutable state is reset on entry to `serialize`, so an instance is
/// safe to reuse across arbitrary unrelated calls.
#[derive(Debug, Default)]
pub struct JsonSerializer {
    buf: Vec<u8>,
}

impl JsonSerializer {
    /// Create a serializer with an empty scratch buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize a value into an owned byte payload
    pub fn serialize<T: Serialize>(&mut self, value: &T) -> Result<Bytes> {
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, value)?;
        Ok(Bytes::copy_from_slice(&self.buf))
    }

    /// Deserialize a value from a byte payload
    pub fn deserialize<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Bytes currently allocated by the scratch buffer. `Vec::clear` keeps
    /// capacity, so this reflects the largest payload handled so far.
    pub fn allocated_size(&self) -> usize {
        self.buf.capacity()
    }
}

/// Bounded pool of [`JsonSerializer`] instances
///
/// Return policy: besides the base pool's size bound, a serializer whose
/// retained buffer exceeds the configured ceiling is dropped rather than
/// pooled, even when the pool has room.
pub struct SerializerPool {
    pool: Arc<ObjectPool<JsonSerializer>>,
    max_buffer_size: usize,
}

impl SerializerPool {
    /// Create a serializer pool. `max_pool_size` follows the base pool
    /// bounds; `max_buffer_size` caps the scratch buffer a pooled
    /// serializer may retain.
    pub fn new(max_pool_size: usize, max_buffer_size: usize) -> Result<Self> {
        let pool = ObjectPool::with_retain_policy(
            max_pool_size,
            JsonSerializer::new,
            move |serializer: &JsonSerializer| serializer.allocated_size() <= max_buffer_size,
        )?;
        Ok(Self {
            pool: Arc::new(pool),
            max_buffer_size,
        })
    }

    /// Borrow a serializer behind an RAII guard
    pub fn acquire(&self) -> PooledObject<JsonSerializer> {
        self.pool.acquire_guarded()
    }

    /// Number of serializers currently pooled
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether the pool is currently empty
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Configured buffer-size ceiling
    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        user: String,
        score: u32,
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut serializer = JsonSerializer::new();
        let payload = Payload {
            user: "alice".into(),
            score: 100,
        };

        let bytes = serializer.serialize(&payload).unwrap();
        let decoded: Payload = serializer.deserialize(&bytes).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_buffer_capacity_survives_clear() {
        let mut serializer = JsonSerializer::new();
        let big = vec![7u8; 64 * 1024];

        serializer.serialize(&big).unwrap();
        let grown = serializer.allocated_size();
        assert!(grown >= 64 * 1024);

        // A small payload afterwards does not shrink the buffer
        serializer.serialize(&1u8).unwrap();
        assert_eq!(serializer.allocated_size(), grown);
    }

    #[test]
    fn test_ballooned_serializer_is_not_pooled() {
        let pool = SerializerPool::new(4, 1024).unwrap();

        {
            let mut guard = pool.acquire();
            let big = vec![7u8; 16 * 1024];
            guard.serialize(&big).unwrap();
        }

        // Returned over the ceiling, so it was dropped despite room
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_small_serializer_is_pooled_and_reused() {
        let pool = SerializerPool::new(4, DEFAULT_MAX_BUFFER_SIZE).unwrap();

        {
            let mut guard = pool.acquire();
            guard.serialize(&"small").unwrap();
        }
        assert_eq!(pool.len(), 1);

        {
            let mut guard = pool.acquire();
            guard.serialize(&"again").unwrap();
        }
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_deserialize_error_surfaces() {
        let serializer = JsonSerializer::new();
        let result: crate::error::Result<Payload> = serializer.deserialize(b"not json");
        assert!(result.is_err());
    }
}
