//! Local-Tier Timeout Strategies
//!
//! Pure policies mapping a caller-supplied (shared-cache) TTL to a TTL
//! appropriate for the faster, smaller local tier. A zero shared TTL means
//! "unknown/default"; the composite passes it when populating the local
//! tier from a plain backing read, where the original TTL is not
//! retrievable.

use std::time::Duration;

use crate::error::{Error, Result};

/// Maps a shared-cache TTL to a local-tier TTL
pub trait TimeoutStrategy: Send + Sync {
    /// Local TTL for an entry whose backing TTL is `shared_ttl`
    /// (`Duration::ZERO` when the backing TTL is unknown)
    fn local_timeout(&self, shared_ttl: Duration) -> Duration;

    /// Human-readable description for diagnostics
    fn describe(&self) -> String;
}

/// Fixed ceiling: local TTL is the shared TTL capped at a constant
#[derive(Debug, Clone)]
pub struct FixedTimeout {
    ceiling: Duration,
}

impl FixedTimeout {
    /// Create a fixed strategy with the given ceiling
    pub fn new(ceiling: Duration) -> Result<Self> {
        if ceiling.is_zero() {
            return Err(Error::Config(
                "Fixed timeout ceiling must be greater than zero".to_string(),
            ));
        }
        Ok(Self { ceiling })
    }
}

impl TimeoutStrategy for FixedTimeout {
    fn local_timeout(&self, shared_ttl: Duration) -> Duration {
        if shared_ttl.is_zero() {
            return self.ceiling;
        }
        shared_ttl.min(self.ceiling)
    }

    fn describe(&self) -> String {
        format!("fixed(ceiling={:?})", self.ceiling)
    }
}

/// Proportional: local TTL tracks the shared TTL at a percentage, clamped
/// to `[min, max]` so the local tier neither thrashes nor hoards memory
#[derive(Debug, Clone)]
pub struct ProportionalTimeout {
    percent: u32,
    min: Duration,
    max: Duration,
}

impl ProportionalTimeout {
    /// Create a proportional strategy. `percent` is in whole percent units
    /// (10 means 10%) and must be greater than zero; `min` must not exceed
    /// `max`.
    pub fn new(min: Duration, max: Duration, percent: u32) -> Result<Self> {
        if percent == 0 {
            return Err(Error::Config(
                "Proportional timeout percentage must be greater than zero".to_string(),
            ));
        }
        if min > max {
            return Err(Error::Config(format!(
                "Proportional timeout bounds are inverted: min {:?} > max {:?}",
                min, max
            )));
        }
        Ok(Self { percent, min, max })
    }
}

impl TimeoutStrategy for ProportionalTimeout {
    fn local_timeout(&self, shared_ttl: Duration) -> Duration {
        if shared_ttl.is_zero() {
            return self.min;
        }
        let scaled = shared_ttl.mul_f64(self.percent as f64 / 100.0);
        scaled.clamp(self.min, self.max)
    }

    fn describe(&self) -> String {
        format!(
            "proportional(percent={}, min={:?}, max={:?})",
            self.percent, self.min, self.max
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
