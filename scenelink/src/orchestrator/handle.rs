//! Handle for a single receive attempt.

use tokio_util::sync::CancellationToken;

/// One receive attempt: a cancellation signal plus liveness.
///
/// At most one handle is active per orchestrator. Activating a new one
/// cancels and discards the previous handle's signal, so two operations
/// never run concurrently under one orchestrator.
#[derive(Debug)]
pub struct OperationHandle {
    token: CancellationToken,
}

impl OperationHandle {
    /// Creates a handle with a fresh, uncancelled signal.
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// A clone of the attempt's cancellation signal.
    ///
    /// All parties to the attempt (the receive future, the cancel
    /// affordance, the error listener) share this one signal.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Requests cooperative termination of the attempt. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once the attempt's signal has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
