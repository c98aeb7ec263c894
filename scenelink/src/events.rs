//! Receive notification channels.
//!
//! The receiver collaborator emits notifications through a listener
//! abstraction rather than presenting them itself — the receiver doesn't
//! know how events are consumed. Three channels exist: total-count-known,
//! per-worker progress, and error.
//!
//! Subscriptions are scoped: [`ReceiveEvents::subscribe`] returns a
//! [`ListenerGuard`] that deregisters the listener when dropped, so every
//! exit path of an attempt (success, failure, cancellation, panic)
//! releases its registration.

use crate::error::ReceiveError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Callbacks for receive notifications.
///
/// # Thread Safety
///
/// Callbacks may be invoked from non-UI threads. Implementations must not
/// mutate UI state inline; defer through an idle queue instead.
pub trait ReceiveListener: Send + Sync {
    /// The total expected object count is known. Fires at most once per
    /// attempt, replacing the default of 1.
    fn on_total_children_known(&self, total: u64);

    /// A progress snapshot: items processed per deserialization worker.
    fn on_progress(&self, counts: &HashMap<String, u64>);

    /// The receive failed. `cause` may be a cancellation, which is a
    /// normal termination path.
    fn on_error(&self, message: &str, cause: &ReceiveError);
}

type ListenerSlot = (u64, Arc<dyn ReceiveListener>);

/// Registry for the three receive notification channels.
///
/// Emission snapshots the listener list before invoking callbacks so that
/// no registry lock is held while foreign code runs.
#[derive(Default)]
pub struct ReceiveEvents {
    listeners: Arc<RwLock<Vec<ListenerSlot>>>,
    next_id: AtomicU64,
}

impl ReceiveEvents {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for all three channels.
    ///
    /// The returned guard deregisters the listener when dropped.
    #[must_use = "dropping the guard immediately deregisters the listener"]
    pub fn subscribe(&self, listener: Arc<dyn ReceiveListener>) -> ListenerGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match self.listeners.write() {
            Ok(mut slots) => slots.push((id, listener)),
            Err(poisoned) => poisoned.into_inner().push((id, listener)),
        }
        ListenerGuard {
            listeners: Arc::clone(&self.listeners),
            id,
        }
    }

    /// Number of live registrations. Returns to zero after every attempt.
    pub fn listener_count(&self) -> usize {
        self.snapshot().len()
    }

    /// Emits the total expected object count.
    pub fn emit_total_children_known(&self, total: u64) {
        for listener in self.snapshot() {
            listener.on_total_children_known(total);
        }
    }

    /// Emits a per-worker progress snapshot.
    pub fn emit_progress(&self, counts: &HashMap<String, u64>) {
        for listener in self.snapshot() {
            listener.on_progress(counts);
        }
    }

    /// Emits an error notification.
    pub fn emit_error(&self, message: &str, cause: &ReceiveError) {
        for listener in self.snapshot() {
            listener.on_error(message, cause);
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn ReceiveListener>> {
        match self.listeners.read() {
            Ok(slots) => slots.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(poisoned) => poisoned
                .get_ref()
                .iter()
                .map(|(_, l)| Arc::clone(l))
                .collect(),
        }
    }
}

/// Scoped listener registration.
///
/// Dropping the guard removes the listener from the registry. Holds no
/// reference to the listener itself beyond the registry slot.
pub struct ListenerGuard {
    listeners: Arc<RwLock<Vec<ListenerSlot>>>,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let mut slots = match self.listeners.write() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };
        slots.retain(|(id, _)| *id != self.id);
    }
}
