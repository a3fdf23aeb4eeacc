//! Error types for the caching abstraction

use std::time::Duration;

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the caching abstraction
///
/// Only precondition violations and disposed-instance access ever reach a
/// caller through the cache contract; backend operation failures are
/// contained at the wrapper layer and degrade to a miss/no-op.
#[derive(Error, Debug)]
pub enum Error {
    /// Operation invoked on a disposed cache instance
    #[error("Cache instance '{name}' is disposed")]
    Disposed { name: String },

    /// TTL must be strictly positive for single-entry writes
    #[error("TTL must be strictly positive, got {ttl:?}")]
    InvalidTtl { ttl: Duration },

    /// Pool size outside the supported bounds
    #[error("Pool size must be greater than 2 and at most 10000, got {size}")]
    InvalidPoolSize { size: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend operation failed
    #[error("Backend operation failed: {0}")]
    Backend(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
