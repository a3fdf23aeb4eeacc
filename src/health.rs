//! Backend Health Monitoring
//!
//! A health monitor answers one question: is the backend usable right now?
//! Every cache operation consults it before touching the backend, so an
//! unreachable store degrades to silent misses instead of request failures.

use std::sync::atomic::{AtomicBool, Ordering};

/// Boolean health signal consulted before every backend operation
pub trait HealthMonitor: Send + Sync {
    /// Whether the backend is currently reachable/usable
    fn is_available(&self) -> bool;

    /// Start background health checking, if the monitor has any
    fn start(&self) {}
}

/// Monitor that always reports the backend as available
///
/// The right choice for in-process backends that cannot be "down".
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAvailable;

impl HealthMonitor for AlwaysAvailable {
    fn is_available(&self) -> bool {
        true
    }
}

/// Manually toggled health flag
///
/// Backend adapters flip this from their own connection-state callbacks;
/// tests use it to simulate outages.
#[derive(Debug, Default)]
pub struct FlagMonitor {
    available: AtomicBool,
}

impl FlagMonitor {
    /// Create a monitor with the given initial state
    pub fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
        }
    }

    /// Mark the backend as available
    pub fn set_available(&self) {
        self.available.store(true, Ordering::Relaxed);
    }

    /// Mark the backend as unavailable
    pub fn set_unavailable(&self) {
        self.available.store(false, Ordering::Relaxed);
    }
}

impl HealthMonitor for FlagMonitor {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_available() {
        let monitor = AlwaysAvailable;
        assert!(monitor.is_available());
        monitor.start();
        assert!(monitor.is_available());
    }

    #[test]
    fn test_flag_monitor_toggles() {
        let monitor = FlagMonitor::new(true);
        assert!(monitor.is_available());

        monitor.set_unavailable();
        assert!(!monitor.is_available());

        monitor.set_available();
        assert!(monitor.is_available());
    }

    #[test]
    fn test_flag_monitor_default_is_down() {
        let monitor = FlagMonitor::default();
        assert!(!monitor.is_available());
    }
}
