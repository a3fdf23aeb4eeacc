//! Cache Statistics
//!
//! Aggregate counters surfaced through the cache contract. A statistics
//! value carries a success flag (false when the backend was unreachable)
//! plus an ordered list of per-node entries, one per physical shard or
//! tier.

use serde::{Deserialize, Serialize};

/// Statistics for a single physical node (shard or tier)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheNodeStatistics {
    /// Node name (shard address, tier label, ...)
    pub name: String,
    /// Get operations that found a value
    pub hits: u64,
    /// Total get operations
    pub gets: u64,
    /// Total put operations
    pub puts: u64,
    /// Items currently stored
    pub items: u64,
}

/// Aggregate cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStatistics {
    /// False when the backend was unavailable or the retrieval failed
    pub success: bool,
    /// Get operations that found a value
    pub hits: u64,
    /// Total get operations
    pub gets: u64,
    /// Total put operations
    pub puts: u64,
    /// Items currently stored
    pub items: u64,
    /// Per-node breakdown, ordered
    pub nodes: Vec<CacheNodeStatistics>,
}

impl CacheStatistics {
    /// Successful statistics with zeroed counters
    pub fn empty() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Statistics reported when the backend is unreachable
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Hit rate in `[0.0, 1.0]`; zero when unsuccessful or no gets recorded
    pub fn hit_rate(&self) -> f64 {
        if !self.success || self.gets == 0 {
            return 0.0;
        }
        self.hits as f64 / self.gets as f64
    }

    /// Element-wise sum of counters; node lists are concatenated in order.
    /// The result is successful only if both inputs were.
    pub fn merge(&self, other: &CacheStatistics) -> CacheStatistics {
        let mut nodes = self.nodes.clone();
        nodes.extend(other.nodes.iter().cloned());
        CacheStatistics {
            success: self.success && other.success,
            hits: self.hits + other.hits,
            gets: self.gets + other.gets,
            puts: self.puts + other.puts,
            items: self.items + other.items,
            nodes,
        }
    }

    /// Collapse these statistics into a single named node entry
    pub fn as_node(&self, name: impl Into<String>) -> CacheNodeStatistics {
        CacheNodeStatistics {
            name: name.into(),
            hits: self.hits,
            gets: self.gets,
            puts: self.puts,
            items: self.items,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_zero_when_no_gets() {
        let stats = CacheStatistics::empty();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_zero_when_unsuccessful() {
        let stats = CacheStatistics {
            hits: 5,
            gets: 10,
            ..CacheStatistics::unavailable()
        };
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStatistics {
            hits: 3,
            gets: 4,
            ..CacheStatistics::empty()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_sums_counters() {
        let a = CacheStatistics {
            hits: 1,
            gets: 2,
            puts: 3,
            items: 4,
            ..CacheStatistics::empty()
        };
        let b = CacheStatistics {
            hits: 10,
            gets: 20,
            puts: 30,
            items: 40,
            ..CacheStatistics::empty()
        };

        let merged = a.merge(&b);
        assert!(merged.success);
        assert_eq!(merged.hits, 11);
        assert_eq!(merged.gets, 22);
        assert_eq!(merged.puts, 33);
        assert_eq!(merged.items, 44);
    }

    #[test]
    fn test_merge_concatenates_nodes_in_order() {
        let a = CacheStatistics {
            nodes: vec![CacheNodeStatistics {
                name: "shard-0".into(),
                ..Default::default()
            }],
            ..CacheStatistics::empty()
        };
        let b = CacheStatistics {
            nodes: vec![CacheNodeStatistics {
                name: "shard-1".into(),
                ..Default::default()
            }],
            ..CacheStatistics::empty()
        };

        let merged = a.merge(&b);
        let names: Vec<_> = merged.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["shard-0", "shard-1"]);
    }

    #[test]
    fn test_merge_propagates_failure() {
        let ok = CacheStatistics::empty();
        let failed = CacheStatistics::unavailable();
        assert!(!ok.merge(&failed).success);
    }

    #[test]
    fn test_as_node() {
        let stats = CacheStatistics {
            hits: 7,
            gets: 9,
            puts: 2,
            items: 1,
            ..CacheStatistics::empty()
        };
        let node = stats.as_node("local");
        assert_eq!(node.name, "local");
        assert_eq!(node.hits, 7);
        assert_eq!(node.gets, 9);
        assert_eq!(node.puts, 2);
        assert_eq!(node.items, 1);
    }
}
