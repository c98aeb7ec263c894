//! Receive progress tracking.
//!
//! Tracks per-worker item counts reported by the receiver's
//! deserialization workers, plus a total expected count learned at most
//! once per attempt. The derived fraction is the average of the worker
//! counts over the total.
//!
//! # Thread Safety
//!
//! Progress notifications may arrive from non-UI threads while the UI
//! thread reads the derived fraction, so counts live in a concurrent map
//! and the total is atomic.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Denominator used until the receiver reports the real total.
pub const DEFAULT_TOTAL: u64 = 1;

/// Thread-safe progress state for one receive attempt.
#[derive(Debug)]
pub struct ProgressState {
    counts: DashMap<String, u64>,
    total: AtomicU64,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressState {
    /// Creates a state with no worker counts and the default total of 1.
    pub fn new() -> Self {
        Self {
            counts: DashMap::new(),
            total: AtomicU64::new(DEFAULT_TOTAL),
        }
    }

    /// Stores the total expected object count.
    ///
    /// Expected to fire at most once per attempt. A zero total is ignored
    /// to keep the denominator valid.
    pub fn set_total(&self, total: u64) {
        if total > 0 {
            self.total.store(total, Ordering::SeqCst);
        }
    }

    /// The current denominator.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Merges a per-worker progress snapshot into the state.
    pub fn update(&self, counts: &std::collections::HashMap<String, u64>) {
        for (worker, count) in counts {
            self.counts.insert(worker.clone(), *count);
        }
    }

    /// Average items processed across workers, 0 if none reported yet.
    pub fn average(&self) -> f64 {
        let n = self.counts.len();
        if n == 0 {
            return 0.0;
        }
        let sum: u64 = self.counts.iter().map(|entry| *entry.value()).sum();
        sum as f64 / n as f64
    }

    /// Derived completion fraction, clamped to [0, 1].
    pub fn fraction(&self) -> f64 {
        (self.average() / self.total() as f64).clamp(0.0, 1.0)
    }
}
