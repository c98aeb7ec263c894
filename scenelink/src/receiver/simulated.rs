//! In-process receiver with configurable behavior.
//!
//! [`SimulatedReceiver`] stands in for a real server connector: it fakes
//! the deserialization of a commit with a set number of child objects and
//! workers, emits the same notifications a real connector would, observes
//! cancellation cooperatively, and supports failure injection. The CLI
//! drives it for demos; tests drive it for the orchestration properties.
//!
//! It also carries the conversion entry point ([`NativeConverter`]), as a
//! real connector component would.

use crate::convert::NativeConverter;
use crate::error::{ConvertError, ReceiveError, SelectionError};
use crate::events::ReceiveEvents;
use crate::graph::{GraphNode, NativeObject, NodeHandle, ObjectGraph};
use crate::receiver::{CommitReceiver, Selection};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Interchange kinds cycled through when building the simulated graph.
const OBJECT_KINDS: [&str; 4] = ["Mesh", "Brep", "Curve", "Point"];

/// Failure injection for the simulated receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Receive runs to completion.
    #[default]
    None,
    /// Fail with a non-cancellation error at the given object index.
    FailAt(u64),
    /// Fail with a cancellation-shaped error at the given object index,
    /// as if the server aborted the operation.
    CancelAt(u64),
}

/// Configuration for [`SimulatedReceiver`].
#[derive(Debug, Clone)]
pub struct SimulatedReceiverConfig {
    /// Child objects in the produced graph.
    pub children: u64,
    /// Simulated deserialization workers (minimum 1).
    pub workers: usize,
    /// Delay between progress notifications. Zero means the receive has
    /// no suspension points.
    pub step_delay: Duration,
    /// Failure injection.
    pub failure: FailureMode,
    /// Complete normally but yield no graph.
    pub return_null: bool,
    /// Whether the total-count-known notification fires.
    pub announce_total: bool,
}

impl Default for SimulatedReceiverConfig {
    fn default() -> Self {
        Self {
            children: 10,
            workers: 4,
            step_delay: Duration::ZERO,
            failure: FailureMode::None,
            return_null: false,
            announce_total: true,
        }
    }
}

impl SimulatedReceiverConfig {
    /// Sets the child object count.
    pub fn with_children(mut self, children: u64) -> Self {
        self.children = children;
        self
    }

    /// Sets the worker count (clamped to at least 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets the delay between progress notifications.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Sets the failure injection mode.
    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    /// Makes the receive complete with no graph.
    pub fn with_null_result(mut self) -> Self {
        self.return_null = true;
        self
    }

    /// Suppresses the total-count-known notification.
    pub fn without_total_announcement(mut self) -> Self {
        self.announce_total = false;
        self
    }
}

/// Simulated interchange receiver and converter.
pub struct SimulatedReceiver {
    config: SimulatedReceiverConfig,
    events: ReceiveEvents,
    selection: Result<Selection, SelectionError>,
    parent: NodeHandle,
    unconvertible: HashSet<String>,
    last_token: Mutex<Option<CancellationToken>>,
}

impl Default for SimulatedReceiver {
    fn default() -> Self {
        Self::new(SimulatedReceiverConfig::default())
    }
}

impl SimulatedReceiver {
    /// Creates a receiver with a valid default selection.
    pub fn new(config: SimulatedReceiverConfig) -> Self {
        Self {
            config,
            events: ReceiveEvents::new(),
            selection: Ok(Selection {
                server_url: "https://demo.scenelink.local".to_string(),
                branch: "main".to_string(),
                commit_id: "c0ffee1".to_string(),
            }),
            parent: NodeHandle::new("receiver-root"),
            unconvertible: HashSet::new(),
            last_token: Mutex::new(None),
        }
    }

    /// Replaces the selection.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Ok(selection);
        self
    }

    /// Makes selection validation fail.
    pub fn with_selection_error(mut self, error: SelectionError) -> Self {
        self.selection = Err(error);
        self
    }

    /// Sets the scene node converted results attach under.
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = parent;
        self
    }

    /// Marks an interchange kind as unconvertible; its nodes are skipped
    /// during conversion without a before-convert callback.
    pub fn with_unconvertible_kind(mut self, kind: impl Into<String>) -> Self {
        self.unconvertible.insert(kind.into());
        self
    }

    /// The cancellation token passed to the most recent receive, if any.
    pub fn last_receive_token(&self) -> Option<CancellationToken> {
        match self.last_token.lock() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record_token(&self, token: &CancellationToken) {
        match self.last_token.lock() {
            Ok(mut slot) => *slot = Some(token.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(token.clone()),
        }
    }

    fn cancelled(&self) -> ReceiveError {
        let err = ReceiveError::Cancelled;
        self.events.emit_error("receive cancelled", &err);
        err
    }

    fn build_graph(&self, commit_id: &str) -> ObjectGraph {
        let mut root = GraphNode::new(format!("root-{}", commit_id), "Collection");
        for i in 0..self.config.children {
            let kind = OBJECT_KINDS[(i as usize) % OBJECT_KINDS.len()];
            root.children.push(GraphNode::new(format!("obj-{}", i), kind));
        }
        ObjectGraph::with_declared_children(root, self.config.children)
    }

    fn convert_node(
        &self,
        node: &GraphNode,
        before_convert: &mut dyn FnMut(&GraphNode),
    ) -> Option<NativeObject> {
        if self.unconvertible.contains(&node.kind) {
            return None;
        }
        before_convert(node);
        let mut native = NativeObject::new(node.id.clone(), node.kind.clone());
        for child in &node.children {
            if let Some(converted) = self.convert_node(child, before_convert) {
                native.add_child(converted);
            }
        }
        Some(native)
    }
}

impl CommitReceiver for SimulatedReceiver {
    fn selection(&self) -> Result<Selection, SelectionError> {
        self.selection.clone()
    }

    fn receive(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Option<ObjectGraph>, ReceiveError>> + Send {
        async move {
            self.record_token(&cancel);

            if self.config.announce_total {
                self.events
                    .emit_total_children_known(self.config.children);
            }

            let workers = self.config.workers.max(1);
            let mut counts: HashMap<String, u64> = (0..workers)
                .map(|w| (format!("worker-{}", w), 0))
                .collect();

            for step in 0..self.config.children {
                if cancel.is_cancelled() {
                    return Err(self.cancelled());
                }
                match self.config.failure {
                    FailureMode::FailAt(n) if step == n => {
                        let err = ReceiveError::failed(format!("object obj-{} unreadable", step));
                        self.events
                            .emit_error("failed to deserialize commit object", &err);
                        return Err(err);
                    }
                    FailureMode::CancelAt(n) if step == n => {
                        return Err(self.cancelled());
                    }
                    _ => {}
                }

                let worker = format!("worker-{}", (step as usize) % workers);
                if let Some(count) = counts.get_mut(&worker) {
                    *count += 1;
                }
                self.events.emit_progress(&counts);

                if !self.config.step_delay.is_zero() {
                    tokio::time::sleep(self.config.step_delay).await;
                }
            }

            if cancel.is_cancelled() {
                return Err(self.cancelled());
            }
            if self.config.return_null {
                return Ok(None);
            }

            let commit_id = self
                .selection
                .as_ref()
                .map(|s| s.commit_id.clone())
                .unwrap_or_default();
            Ok(Some(self.build_graph(&commit_id)))
        }
    }

    fn events(&self) -> &ReceiveEvents {
        &self.events
    }
}

impl NativeConverter for SimulatedReceiver {
    fn convert_to_native(
        &self,
        graph: &ObjectGraph,
        name: &str,
        before_convert: &mut dyn FnMut(&GraphNode),
    ) -> Result<NativeObject, ConvertError> {
        let root = graph.root();
        if self.unconvertible.contains(&root.kind) {
            return Err(ConvertError::UnconvertibleRoot(root.id.clone()));
        }

        let mut native = NativeObject::new(name, root.kind.clone());
        for child in &root.children {
            if let Some(converted) = self.convert_node(child, before_convert) {
                native.add_child(converted);
            }
        }
        Ok(native)
    }

    fn parent_handle(&self) -> NodeHandle {
        self.parent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ReceiveListener;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        totals: Mutex<Vec<u64>>,
        snapshots: Mutex<Vec<HashMap<String, u64>>>,
        errors: Mutex<Vec<(String, bool)>>,
    }

    impl ReceiveListener for Recorder {
        fn on_total_children_known(&self, total: u64) {
            self.totals.lock().unwrap().push(total);
        }

        fn on_progress(&self, counts: &HashMap<String, u64>) {
            self.snapshots.lock().unwrap().push(counts.clone());
        }

        fn on_error(&self, message: &str, cause: &ReceiveError) {
            self.errors
                .lock()
                .unwrap()
                .push((message.to_string(), cause.is_cancellation()));
        }
    }

    #[test]
    fn test_default_selection_is_valid() {
        let receiver = SimulatedReceiver::default();
        let selection = receiver.selection().unwrap();
        assert_eq!(selection.commit_id, "c0ffee1");
        assert_eq!(selection.branch, "main");
    }

    #[test]
    fn test_selection_error_injection() {
        let receiver =
            SimulatedReceiver::default().with_selection_error(SelectionError::NoCommit);
        assert_eq!(receiver.selection(), Err(SelectionError::NoCommit));
    }

    #[tokio::test]
    async fn test_receive_produces_graph() {
        let receiver =
            SimulatedReceiver::new(SimulatedReceiverConfig::default().with_children(5));
        let graph = receiver
            .receive(CancellationToken::new())
            .await
            .unwrap()
            .expect("graph");

        assert_eq!(graph.total_children(), 5);
        assert_eq!(graph.root().children.len(), 5);
        assert_eq!(graph.root().children[0].id, "obj-0");
    }

    #[tokio::test]
    async fn test_receive_emits_total_and_progress() {
        let receiver = SimulatedReceiver::new(
            SimulatedReceiverConfig::default()
                .with_children(6)
                .with_workers(2),
        );
        let recorder = Arc::new(Recorder::default());
        let _guard = receiver
            .events()
            .subscribe(Arc::clone(&recorder) as Arc<dyn ReceiveListener>);

        receiver.receive(CancellationToken::new()).await.unwrap();

        assert_eq!(*recorder.totals.lock().unwrap(), vec![6]);
        let snapshots = recorder.snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 6);
        let last = snapshots.last().unwrap();
        assert_eq!(last.values().sum::<u64>(), 6);
    }

    #[tokio::test]
    async fn test_receive_null_result() {
        let receiver =
            SimulatedReceiver::new(SimulatedReceiverConfig::default().with_null_result());
        let result = receiver.receive(CancellationToken::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_receive_fail_injection_emits_error() {
        let receiver = SimulatedReceiver::new(
            SimulatedReceiverConfig::default().with_failure(FailureMode::FailAt(3)),
        );
        let recorder = Arc::new(Recorder::default());
        let _guard = receiver
            .events()
            .subscribe(Arc::clone(&recorder) as Arc<dyn ReceiveListener>);

        let err = receiver
            .receive(CancellationToken::new())
            .await
            .unwrap_err();
        assert!(!err.is_cancellation());

        let errors = recorder.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(!errors[0].1, "cause should not be a cancellation");
    }

    #[tokio::test]
    async fn test_receive_cancel_injection_emits_cancellation() {
        let receiver = SimulatedReceiver::new(
            SimulatedReceiverConfig::default().with_failure(FailureMode::CancelAt(2)),
        );
        let recorder = Arc::new(Recorder::default());
        let _guard = receiver
            .events()
            .subscribe(Arc::clone(&recorder) as Arc<dyn ReceiveListener>);

        let err = receiver
            .receive(CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_cancellation());
        assert!(recorder.errors.lock().unwrap()[0].1);
    }

    #[tokio::test]
    async fn test_receive_observes_pre_cancelled_token() {
        let receiver = SimulatedReceiver::default();
        let token = CancellationToken::new();
        token.cancel();

        let err = receiver.receive(token).await.unwrap_err();
        assert!(err.is_cancellation());
    }

    #[tokio::test]
    async fn test_last_receive_token_recorded() {
        let receiver = SimulatedReceiver::default();
        assert!(receiver.last_receive_token().is_none());

        let token = CancellationToken::new();
        receiver.receive(token.clone()).await.unwrap();

        let recorded = receiver.last_receive_token().expect("token");
        token.cancel();
        assert!(recorded.is_cancelled());
    }

    #[tokio::test]
    async fn test_convert_invokes_callback_per_child() {
        let receiver =
            SimulatedReceiver::new(SimulatedReceiverConfig::default().with_children(10));
        let graph = receiver
            .receive(CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        let mut seen = Vec::new();
        let native = receiver
            .convert_to_native(&graph, "c0ffee1", &mut |node| seen.push(node.id.clone()))
            .unwrap();

        assert_eq!(seen.len(), 10);
        assert_eq!(native.children.len(), 10);
        assert_eq!(native.name, "c0ffee1");
    }

    #[tokio::test]
    async fn test_convert_skips_unconvertible_kinds() {
        let receiver = SimulatedReceiver::new(
            SimulatedReceiverConfig::default().with_children(8),
        )
        .with_unconvertible_kind("Point");
        let graph = receiver
            .receive(CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        let mut callbacks = 0;
        let native = receiver
            .convert_to_native(&graph, "c0ffee1", &mut |_| callbacks += 1)
            .unwrap();

        // Kinds cycle Mesh/Brep/Curve/Point: 2 of 8 children are Points.
        assert_eq!(callbacks, 6);
        assert_eq!(native.children.len(), 6);
    }

    #[test]
    fn test_parent_handle() {
        let receiver = SimulatedReceiver::default().with_parent(NodeHandle::new("anchor"));
        assert_eq!(receiver.parent_handle().as_str(), "anchor");
    }
}
