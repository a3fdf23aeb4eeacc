//! Configuration Surface
//!
//! Plain value structs consumed by the factory. No file format is implied;
//! the host application parses whatever source it uses and hands these in.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::timeout::{FixedTimeout, ProportionalTimeout, TimeoutStrategy};

/// Top-level cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Master switch; disabled settings produce a no-op cache
    pub enabled: bool,
    /// Instance name resolved when the caller does not supply one
    pub default_instance: String,
    /// Prefix physical keys with the process-stable developer prefix
    pub dev_mode: bool,
    /// Local tier settings
    pub local: LocalTierSettings,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_instance: "default".to_string(),
            dev_mode: false,
            local: LocalTierSettings::default(),
        }
    }
}

/// Settings for the composite's local tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalTierSettings {
    /// How local TTLs are derived from caller TTLs
    pub timeout: TimeoutPolicy,
}

impl Default for LocalTierSettings {
    fn default() -> Self {
        Self {
            timeout: TimeoutPolicy::default(),
        }
    }
}

/// Local-TTL translation policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Cap the caller TTL at a constant ceiling
    Fixed { ceiling: Duration },
    /// Scale the caller TTL by a percentage, clamped to `[min, max]`
    Proportional {
        min: Duration,
        max: Duration,
        percent: u32,
    },
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::Proportional {
            min: Duration::from_secs(5),
            max: Duration::from_secs(300),
            percent: 10,
        }
    }
}

impl TimeoutPolicy {
    /// Build the matching strategy, validating preconditions
    pub fn build(&self) -> Result<Arc<dyn TimeoutStrategy>> {
        match *self {
            TimeoutPolicy::Fixed { ceiling } => Ok(Arc::new(FixedTimeout::new(ceiling)?)),
            TimeoutPolicy::Proportional { min, max, percent } => {
                Ok(Arc::new(ProportionalTimeout::new(min, max, percent)?))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
