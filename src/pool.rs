//! Bounded Object Pool
//!
//! Thread-safe reuse pool for expensive-to-construct helper objects. The
//! internal bag is a lock-free queue; borrow and return from any number of
//! threads needs no external locking, and acquisition never blocks; an
//! empty bag simply constructs a fresh object.
//!
//! A returned object is kept only while the pool is below its maximum size
//! and the optional retain policy accepts it; otherwise it is dropped.
//! Pooled objects must reset their own mutable state on use, since the
//! pool performs no reset itself.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crossbeam::queue::SegQueue;

use crate::error::{Error, Result};

/// Minimum accepted pool size (exclusive)
const MIN_POOL_SIZE: usize = 2;

/// Maximum accepted pool size (inclusive)
const MAX_POOL_SIZE: usize = 10_000;

/// Bounded, lock-free object pool
pub struct ObjectPool<T> {
    bag: SegQueue<T>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    max_size: usize,
    retain: Option<Box<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("len", &self.bag.len())
            .field("max_size", &self.max_size)
            .field("has_retain", &self.retain.is_some())
            .finish()
    }
}

impl<T> ObjectPool<T> {
    /// Create a pool with the given maximum size and object factory.
    /// `max_size` must be greater than 2 and at most 10000.
    pub fn new(
        max_size: usize,
        factory: impl Fn() -> T + Send + Sync + 'static,
    ) -> Result<Self> {
        Self::build(max_size, Box::new(factory), None)
    }

    /// Create a pool with an additional retain policy: a returned object is
    /// pooled only if the policy accepts it, even when the pool has room.
    pub fn with_retain_policy(
        max_size: usize,
        factory: impl Fn() -> T + Send + Sync + 'static,
        retain: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Self> {
        Self::build(max_size, Box::new(factory), Some(Box::new(retain)))
    }

    fn build(
        max_size: usize,
        factory: Box<dyn Fn() -> T + Send + Sync>,
        retain: Option<Box<dyn Fn(&T) -> bool + Send + Sync>>,
    ) -> Result<Self> {
        if max_size <= MIN_POOL_SIZE || max_size > MAX_POOL_SIZE {
            return Err(Error::InvalidPoolSize { size: max_size });
        }
        Ok(Self {
            bag: SegQueue::new(),
            factory,
            max_size,
            retain,
        })
    }

    /// Borrow an object: pop from the bag, or construct when empty.
    /// Never blocks.
    pub fn acquire(&self) -> T {
        self.bag.pop().unwrap_or_else(|| (self.factory)())
    }

    /// Return an object to the pool. Kept only if the pool is below its
    /// maximum size and the retain policy (if any) accepts it; otherwise
    /// the object is dropped.
    pub fn release(&self, obj: T) {
        if self.should_store(&obj) {
            self.bag.push(obj);
        }
    }

    /// Borrow an object behind an RAII guard that returns it on drop
    pub fn acquire_guarded(self: &Arc<Self>) -> PooledObject<T> {
        PooledObject {
            value: Some(self.acquire()),
            pool: Arc::clone(self),
        }
    }

    fn should_store(&self, obj: &T) -> bool {
        if self.bag.len() >= self.max_size {
            return false;
        }
        self.retain.as_ref().map_or(true, |policy| policy(obj))
    }

    /// Number of objects currently pooled
    pub fn len(&self) -> usize {
        self.bag.len()
    }

    /// Whether the bag is currently empty
    pub fn is_empty(&self) -> bool {
        self.bag.is_empty()
    }

    /// Configured maximum pool size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

/// RAII handle for a borrowed pool object
///
/// Dereferences to the inner value; dropping the handle returns the value
/// to its pool exactly once. Ownership makes use-after-return
/// unrepresentable.
pub struct PooledObject<T> {
    value: Option<T>,
    pool: Arc<ObjectPool<T>>,
}

impl<T> PooledObject<T> {
    /// Take the value out permanently; it will not be returned to the pool
    pub fn detach(mut self) -> T {
        self.value.take().expect("pooled value already detached")
    }
}

impl<T> Deref for PooledObject<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value.as_ref().expect("pooled value already detached")
    }
}

impl<T> DerefMut for PooledObject<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("pooled value already detached")
    }
}

impl<T> Drop for PooledObject<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.release(value);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tracked {
        id: usize,
    }

    fn counting_factory() -> (Arc<AtomicUsize>, impl Fn() -> Tracked + Send + Sync + 'static) {
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = constructed.clone();
        let factory = move || Tracked {
            id: counter.fetch_add(1, Ordering::SeqCst),
        };
        (constructed, factory)
    }

    #[test]
    fn test_pool_size_bounds() {
        let make = |size| ObjectPool::new(size, || 0u8);

        assert_matches!(make(0), Err(Error::InvalidPoolSize { size: 0 }));
        assert_matches!(make(2), Err(Error::InvalidPoolSize { size: 2 }));
        assert!(make(3).is_ok());
        assert!(make(10_000).is_ok());
        assert_matches!(make(10_001), Err(Error::InvalidPoolSize { size: 10_001 }));
    }

    #[test]
    fn test_acquire_constructs_once_when_empty() {
        let (constructed, factory) = counting_factory();
        let pool = ObjectPool::new(4, factory).unwrap();

        let obj = pool.acquire();
        assert_eq!(obj.id, 0);
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_then_acquire_reuses_same_instance() {
        let (constructed, factory) = counting_factory();
        let pool = ObjectPool::new(4, factory).unwrap();

        let obj = pool.acquire();
        let id = obj.id;
        pool.release(obj);

        let again = pool.acquire();
        assert_eq!(again.id, id);
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_drops_when_full() {
        let (_, factory) = counting_factory();
        let pool = ObjectPool::new(3, factory).unwrap();

        for _ in 0..5 {
            pool.release(pool.acquire());
        }
        // acquire/release pairs reuse one slot; force the bag over capacity
        let extras: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        for obj in extras {
            pool.release(obj);
        }

        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_retain_policy_discards() {
        let pool =
            ObjectPool::with_retain_policy(4, || 0usize, |value| *value < 10).unwrap();

        pool.release(5);
        assert_eq!(pool.len(), 1);

        pool.release(50);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_guard_returns_on_drop() {
        let (constructed, factory) = counting_factory();
        let pool = Arc::new(ObjectPool::new(4, factory).unwrap());

        {
            let guard = pool.acquire_guarded();
            assert_eq!(guard.id, 0);
            assert_eq!(pool.len(), 0);
        }

        assert_eq!(pool.len(), 1);
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_detach_skips_return() {
        let (_, factory) = counting_factory();
        let pool = Arc::new(ObjectPool::new(4, factory).unwrap());

        let guard = pool.acquire_guarded();
        let value = guard.detach();
        assert_eq!(value.id, 0);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_end_to_end_borrow_return_cycle() {
        let (constructed, factory) = counting_factory();
        let pool = ObjectPool::new(3, factory).unwrap();

        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();
        assert_eq!(constructed.load(Ordering::SeqCst), 3);

        pool.release(a);
        pool.release(b);
        pool.release(c);
        assert_eq!(pool.len(), 3);

        let _again = pool.acquire();
        assert_eq!(constructed.load(Ordering::SeqCst), 3);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_concurrent_borrow_return() {
        let (_, factory) = counting_factory();
        let pool = Arc::new(ObjectPool::new(64, factory).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let obj = pool.acquire();
                        pool.release(obj);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(pool.len() <= pool.max_size());
    }
}
