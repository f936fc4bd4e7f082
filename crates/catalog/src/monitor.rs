// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Progress monitors
//!
//! Every catalog call is a suspension point and receives a
//! [`ProgressMonitor`]. The monitor carries two pieces of state:
//!
//! - a shared cancellation flag, checked between catalog calls; a
//!   cancelled monitor turns the whole completion run into
//!   [`CatalogError::Cancelled`]
//! - a force-cache bit; a cache-only monitor (obtained through
//!   [`ProgressMonitor::local_cache`]) tells drivers to answer from
//!   already-cached metadata and refuse live reads
//!
//! Cloned monitors share the cancellation flag, so cancelling through a
//! [`CancelHandle`] reaches every derived monitor.

use crate::error::{CatalogError, CatalogResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation and cache-policy handle passed to every catalog call.
#[derive(Debug, Clone, Default)]
pub struct ProgressMonitor {
    cancelled: Arc<AtomicBool>,
    force_cache: bool,
}

impl ProgressMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that can cancel this monitor (and every clone of it).
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Fail with [`CatalogError::Cancelled`] if the monitor was cancelled.
    pub fn check_cancelled(&self) -> CatalogResult<()> {
        if self.is_cancelled() {
            Err(CatalogError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// True if drivers must answer from local caches only.
    pub fn is_force_cache_usage(&self) -> bool {
        self.force_cache
    }

    /// Derive a cache-only monitor sharing this monitor's cancellation
    /// flag.
    pub fn local_cache(&self) -> ProgressMonitor {
        ProgressMonitor {
            cancelled: Arc::clone(&self.cancelled),
            force_cache: true,
        }
    }
}

/// Cancels a [`ProgressMonitor`] from another task.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_cancellation_is_shared() {
        let monitor = ProgressMonitor::new();
        let cache_monitor = monitor.local_cache();
        assert!(monitor.check_cancelled().is_ok());

        monitor.cancel_handle().cancel();
        assert!(monitor.is_cancelled());
        assert!(cache_monitor.is_cancelled());
        assert!(matches!(
            cache_monitor.check_cancelled(),
            Err(CatalogError::Cancelled)
        ));
    }

    #[test]
    fn test_local_cache_flag() {
        let monitor = ProgressMonitor::new();
        assert!(!monitor.is_force_cache_usage());
        assert!(monitor.local_cache().is_force_cache_usage());
    }
}
