//! The receive-and-convert flow.
//!
//! # Flow
//!
//! ```text
//! receive(target)
//!   │ cancel prior attempt (at-most-one invariant)
//!   │ validate selection ──── invalid → warn, Ok(None)
//!   │ fresh OperationHandle
//!   │ surface.begin("Receiving data from {server}...")
//!   │ subscribe listener (total/progress/error)   ┐ scoped: released
//!   │ await receiver.receive(token)               ┘ on every exit path
//!   │   null graph → warn, Ok(None)
//!   │   cancellation → Ok(None)
//!   │   failure → Err (already logged by the error listener)
//!   │ convert graph, attach under target's parent
//!   └ clear surface (deferred to the idle tick)
//! ```
//!
//! Notification callbacks may arrive from non-UI threads, so every
//! UI-mutating reaction to them goes through the idle queue. The begin
//! call and the conversion updates run on the caller's (UI) thread and
//! apply inline.

use crate::convert::NativeConverter;
use crate::error::ReceiveError;
use crate::events::ReceiveListener;
use crate::graph::{GraphNode, NativeObject, ObjectGraph};
use crate::log::Logger;
use crate::progress::ProgressState;
use crate::receiver::{CommitReceiver, Selection};
use crate::surface::{IdleQueue, ProgressSurface};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use super::handle::OperationHandle;

/// Title shown on the progress surface while converting.
pub const CONVERT_PROGRESS_TITLE: &str = "Converting to native...";

/// Coordinates one cancellable receive-and-convert attempt.
///
/// # Example
///
/// ```ignore
/// use scenelink::log::TracingLogger;
/// use scenelink::orchestrator::ReceiveOrchestrator;
/// use scenelink::receiver::SimulatedReceiver;
/// use scenelink::surface::{IdleQueue, RecordingSurface};
/// use std::sync::Arc;
///
/// let idle = IdleQueue::new();
/// let orchestrator = ReceiveOrchestrator::new(
///     RecordingSurface::new(),
///     Arc::clone(&idle),
///     Arc::new(TracingLogger),
/// );
/// let receiver = SimulatedReceiver::default();
/// let native = orchestrator.receive(&receiver).await?;
/// ```
pub struct ReceiveOrchestrator {
    surface: Arc<dyn ProgressSurface>,
    idle: Arc<IdleQueue>,
    logger: Arc<dyn Logger>,
    active: Mutex<Option<OperationHandle>>,
}

impl ReceiveOrchestrator {
    /// Creates an orchestrator with no active attempt.
    ///
    /// # Arguments
    ///
    /// * `surface` - The progress indicator capability
    /// * `idle` - The queue the UI thread drains on its idle tick
    /// * `logger` - Log sink for warnings and errors of the workflow
    pub fn new(
        surface: Arc<dyn ProgressSurface>,
        idle: Arc<IdleQueue>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            surface,
            idle,
            logger,
            active: Mutex::new(None),
        }
    }

    /// Runs one receive-and-convert attempt against `target`.
    ///
    /// Any previously active attempt is cancelled before this one starts.
    /// Returns `Ok(None)` when the selection is invalid, the receive
    /// yields no graph, or the attempt is cancelled; returns `Err` only
    /// for non-cancellation receive failures and conversion failures.
    pub async fn receive<T>(&self, target: &T) -> Result<Option<NativeObject>, ReceiveError>
    where
        T: CommitReceiver + NativeConverter,
    {
        // Starting a new attempt invalidates any prior signal first.
        self.cancel_active();

        let selection = match target.selection() {
            Ok(selection) => selection,
            Err(error) => {
                self.logger
                    .warn(format_args!("not ready to receive: {}", error));
                return Ok(None);
            }
        };

        let token = self.activate();
        let graph = match self.receive_commit(target, &selection, token).await? {
            Some(graph) => graph,
            None => return Ok(None),
        };

        let native = self.convert(target, graph, &selection.commit_id)?;
        self.logger.info(format_args!(
            "successfully received and converted {}",
            selection.commit_id
        ));
        Ok(Some(native))
    }

    /// Cancels the active attempt, if any. Idempotent.
    pub fn cancel_active(&self) {
        if let Some(handle) = self.lock_active().take() {
            handle.cancel();
        }
    }

    fn activate(&self) -> CancellationToken {
        let handle = OperationHandle::new();
        let token = handle.token();
        *self.lock_active() = Some(handle);
        token
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<OperationHandle>> {
        match self.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn receive_commit<T: CommitReceiver>(
        &self,
        target: &T,
        selection: &Selection,
        token: CancellationToken,
    ) -> Result<Option<ObjectGraph>, ReceiveError> {
        let title = format!("Receiving data from {}...", selection.server_url);
        self.surface.begin(&title);

        // Dropped on every exit path, deferring the surface clear to the
        // idle tick: the surface is singleton UI state and must not be
        // mutated from a notification callback's call stack.
        let _clear = ClearOnDrop {
            surface: Arc::clone(&self.surface),
            idle: Arc::clone(&self.idle),
        };
        let listener = Arc::new(AttemptListener {
            title,
            state: ProgressState::new(),
            surface: Arc::clone(&self.surface),
            idle: Arc::clone(&self.idle),
            token: token.clone(),
            logger: Arc::clone(&self.logger),
        });
        let _listeners = target.events().subscribe(listener);

        match target.receive(token).await {
            Ok(Some(graph)) => Ok(Some(graph)),
            Ok(None) => {
                self.logger
                    .warn(format_args!("receive returned no object graph"));
                Ok(None)
            }
            Err(error) if error.is_cancellation() => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn convert<T: NativeConverter>(
        &self,
        target: &T,
        graph: ObjectGraph,
        name: &str,
    ) -> Result<NativeObject, ReceiveError> {
        let total = graph.total_children().max(1);
        let mut converted: u64 = 0;
        let surface = Arc::clone(&self.surface);
        let mut before_convert = |node: &GraphNode| {
            // Known approximation: the declared child count over-counts
            // what is actually convertible.
            let fraction = (converted as f64 / total as f64).clamp(0.0, 1.0);
            let status = format!("{} - {}", node.kind, node.id);
            // Conversion runs on the UI thread; updates apply inline and
            // the conversion bar has no cancel affordance.
            let _ = surface.update(CONVERT_PROGRESS_TITLE, &status, fraction);
            converted += 1;
        };

        let mut native = target.convert_to_native(&graph, name, &mut before_convert)?;
        native.set_parent(target.parent_handle());
        Ok(native)
    }
}

impl Drop for ReceiveOrchestrator {
    // Teardown cancels fire-and-forget; no further UI cleanup is
    // guaranteed once the orchestrator is gone.
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(handle) = active.take() {
                handle.cancel();
            }
        }
    }
}

/// Per-attempt listener wired to the receiver's notification channels.
struct AttemptListener {
    title: String,
    state: ProgressState,
    surface: Arc<dyn ProgressSurface>,
    idle: Arc<IdleQueue>,
    token: CancellationToken,
    logger: Arc<dyn Logger>,
}

impl ReceiveListener for AttemptListener {
    fn on_total_children_known(&self, total: u64) {
        self.state.set_total(total);
    }

    fn on_progress(&self, counts: &HashMap<String, u64>) {
        self.state.update(counts);
        let current = self.state.average();
        let total = self.state.total();
        let fraction = self.state.fraction();

        let title = self.title.clone();
        let surface = Arc::clone(&self.surface);
        let idle = Arc::clone(&self.idle);
        let token = self.token.clone();
        self.idle.defer(move || {
            let status = format!("{:.0}/{}", current, total);
            if surface.update(&title, &status, fraction).is_cancel() {
                token.cancel();
                let surface = Arc::clone(&surface);
                idle.defer(move || surface.clear());
            }
        });
    }

    fn on_error(&self, message: &str, cause: &ReceiveError) {
        if !cause.is_cancellation() {
            self.logger
                .error(format_args!("receive failed: {}: {}", message, cause));
        }
        self.token.cancel();

        let surface = Arc::clone(&self.surface);
        self.idle.defer(move || surface.clear());
    }
}

/// Defers a surface clear to the idle tick when dropped.
struct ClearOnDrop {
    surface: Arc<dyn ProgressSurface>,
    idle: Arc<IdleQueue>,
}

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        let surface = Arc::clone(&self.surface);
        self.idle.defer(move || surface.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemoryLogger;
    use crate::receiver::{SimulatedReceiver, SimulatedReceiverConfig};
    use crate::surface::RecordingSurface;

    fn orchestrator(
        surface: &Arc<RecordingSurface>,
        idle: &Arc<IdleQueue>,
        logger: &Arc<MemoryLogger>,
    ) -> ReceiveOrchestrator {
        ReceiveOrchestrator::new(
            Arc::clone(surface) as Arc<dyn ProgressSurface>,
            Arc::clone(idle),
            Arc::clone(logger) as Arc<dyn Logger>,
        )
    }

    #[test]
    fn test_cancel_active_without_attempt_is_noop() {
        let surface = RecordingSurface::new();
        let idle = IdleQueue::new();
        let logger = Arc::new(MemoryLogger::new());
        let orchestrator = orchestrator(&surface, &idle, &logger);

        orchestrator.cancel_active();
        assert!(surface.calls().is_empty());
    }

    #[tokio::test]
    async fn test_drop_cancels_active_token() {
        let surface = RecordingSurface::new();
        let idle = IdleQueue::new();
        let logger = Arc::new(MemoryLogger::new());
        let orchestrator = orchestrator(&surface, &idle, &logger);

        let receiver =
            SimulatedReceiver::new(SimulatedReceiverConfig::default().with_children(3));
        orchestrator.receive(&receiver).await.unwrap();

        let token = receiver.last_receive_token().expect("token");
        assert!(!token.is_cancelled());

        drop(orchestrator);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_successful_receive_logs_info() {
        let surface = RecordingSurface::new();
        let idle = IdleQueue::new();
        let logger = Arc::new(MemoryLogger::new());
        let orchestrator = orchestrator(&surface, &idle, &logger);

        let receiver = SimulatedReceiver::default();
        let native = orchestrator.receive(&receiver).await.unwrap();

        assert!(native.is_some());
        assert!(logger.contains_message("successfully received and converted c0ffee1"));
    }
}
