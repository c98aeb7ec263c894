//! Progress surface capability and deferred UI mutation.
//!
//! The modal progress indicator is process-wide singleton UI state. It is
//! modeled here as an injected [`ProgressSurface`]
//! capability so tests can substitute a recorder, and so only one component
//! owns the surface.
//!
//! Notification callbacks may arrive from non-UI threads. UI-mutating
//! reactions are therefore never applied inline: they are pushed onto an
//! [`IdleQueue`] which the UI thread drains on its idle tick via
//! [`IdleQueue::run_pending`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Whether the user hit the cancel affordance on the progress surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelRequest {
    /// Keep going.
    Continue,
    /// The user asked to cancel the operation.
    Cancel,
}

impl CancelRequest {
    /// Returns true if cancellation was requested.
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel)
    }
}

/// Modal progress indicator with a title, status line, fractional
/// completion, and a cancel affordance.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the orchestrator shares the
/// surface with its deferred-update closures. All mutation is expected to
/// happen on the UI thread (inline during conversion, via the idle queue
/// during the receive).
pub trait ProgressSurface: Send + Sync {
    /// Shows the surface with the given title at zero progress.
    fn begin(&self, title: &str);

    /// Updates the status line and fraction; returns whether the user hit
    /// the cancel affordance.
    fn update(&self, title: &str, status: &str, fraction: f64) -> CancelRequest;

    /// Hides the surface. Idempotent.
    fn clear(&self);
}

type DeferredCall = Box<dyn FnOnce() + Send>;

/// Deferred-call queue for UI mutations originating off the UI thread.
///
/// Calls queued while a drain is in progress run on the next drain, so a
/// deferred call may itself defer (e.g. a cancel affordance deferring the
/// surface clear).
#[derive(Default)]
pub struct IdleQueue {
    pending: Mutex<Vec<DeferredCall>>,
}

impl IdleQueue {
    /// Creates a shared queue.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a call for the next idle tick.
    pub fn defer(&self, call: impl FnOnce() + Send + 'static) {
        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.push(Box::new(call));
    }

    /// Runs all calls queued so far, in order. Returns how many ran.
    ///
    /// Must be invoked from the UI thread; the queue lock is released
    /// before any call runs.
    pub fn run_pending(&self) -> usize {
        let drained: Vec<DeferredCall> = {
            let mut pending = match self.pending.lock() {
                Ok(pending) => pending,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::take(&mut *pending)
        };
        let count = drained.len();
        for call in drained {
            call();
        }
        count
    }

    /// Number of calls currently queued.
    pub fn pending_count(&self) -> usize {
        match self.pending.lock() {
            Ok(pending) => pending.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// Recorded surface interaction, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    /// `begin(title)` was invoked.
    Begin {
        /// Title shown.
        title: String,
    },
    /// `update(title, status, fraction)` was invoked.
    Update {
        /// Title shown.
        title: String,
        /// Status line shown.
        status: String,
        /// Fraction shown.
        fraction: f64,
    },
    /// `clear()` was invoked.
    Clear,
}

/// Surface that records calls instead of rendering.
///
/// Used by tests in place of a real modal dialog. The cancel affordance is
/// simulated with [`RecordingSurface::request_cancel`]: once requested,
/// every subsequent update reports [`CancelRequest::Cancel`].
#[derive(Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    cancel_requested: AtomicBool,
}

impl RecordingSurface {
    /// Creates a shared recording surface.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulates the user holding the cancel affordance.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Snapshot of all recorded calls, in order.
    pub fn calls(&self) -> Vec<SurfaceCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Recorded update fractions for the given title, in order.
    pub fn fractions_for(&self, title: &str) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Update {
                    title: t, fraction, ..
                } if t == title => Some(fraction),
                _ => None,
            })
            .collect()
    }

    /// True if the surface was cleared at least once.
    pub fn cleared(&self) -> bool {
        self.calls().iter().any(|c| matches!(c, SurfaceCall::Clear))
    }

    fn record(&self, call: SurfaceCall) {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }
}

impl ProgressSurface for RecordingSurface {
    fn begin(&self, title: &str) {
        self.record(SurfaceCall::Begin {
            title: title.to_string(),
        });
    }

    fn update(&self, title: &str, status: &str, fraction: f64) -> CancelRequest {
        self.record(SurfaceCall::Update {
            title: title.to_string(),
            status: status.to_string(),
            fraction,
        });
        if self.cancel_requested.load(Ordering::SeqCst) {
            CancelRequest::Cancel
        } else {
            CancelRequest::Continue
        }
    }

    fn clear(&self) {
        self.record(SurfaceCall::Clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_queue_runs_in_order() {
        let queue = IdleQueue::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = Arc::clone(&seen);
            queue.defer(move || seen.lock().unwrap().push(i));
        }
        assert_eq!(queue.pending_count(), 3);

        let ran = queue.run_pending();
        assert_eq!(ran, 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_idle_queue_nested_defer_runs_next_drain() {
        let queue = IdleQueue::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        {
            let queue2 = Arc::clone(&queue);
            let seen = Arc::clone(&seen);
            queue.defer(move || {
                let seen2 = Arc::clone(&seen);
                seen.lock().unwrap().push("outer");
                queue2.defer(move || seen2.lock().unwrap().push("inner"));
            });
        }

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["outer"]);

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_recording_surface_records_calls() {
        let surface = RecordingSurface::default();
        surface.begin("Receiving...");
        surface.update("Receiving...", "1/10", 0.1);
        surface.clear();

        let calls = surface.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            SurfaceCall::Begin {
                title: "Receiving...".to_string()
            }
        );
        assert!(surface.cleared());
    }

    #[test]
    fn test_recording_surface_cancel_affordance() {
        let surface = RecordingSurface::default();
        assert_eq!(
            surface.update("t", "s", 0.0),
            CancelRequest::Continue
        );

        surface.request_cancel();
        assert_eq!(surface.update("t", "s", 0.5), CancelRequest::Cancel);
        assert_eq!(surface.update("t", "s", 0.6), CancelRequest::Cancel);
    }

    #[test]
    fn test_fractions_for_filters_by_title() {
        let surface = RecordingSurface::default();
        surface.update("a", "", 0.1);
        surface.update("b", "", 0.2);
        surface.update("a", "", 0.3);

        assert_eq!(surface.fractions_for("a"), vec![0.1, 0.3]);
        assert_eq!(surface.fractions_for("b"), vec![0.2]);
    }
}
