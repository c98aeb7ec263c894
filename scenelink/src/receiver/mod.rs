//! Receiver collaborator contract.
//!
//! A [`CommitReceiver`] talks to an interchange server: it validates the
//! current selection, asynchronously receives a commit's object graph, and
//! emits notifications (total-known, progress, error) through its
//! [`ReceiveEvents`] registry while the receive is in flight.
//!
//! The network protocol and deserialization format are the receiver's
//! concern; this crate only orchestrates.

mod simulated;

pub use simulated::{FailureMode, SimulatedReceiver, SimulatedReceiverConfig};

use crate::error::{ReceiveError, SelectionError};
use crate::events::ReceiveEvents;
use crate::graph::ObjectGraph;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// The validated server selection a receive attempt targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Server URL, used to title the progress surface.
    pub server_url: String,
    /// Branch the commit lives on.
    pub branch: String,
    /// Commit identifier to receive.
    pub commit_id: String,
}

/// Collaborator that receives commit object graphs from a server.
///
/// # Cancellation
///
/// `receive` observes the passed token cooperatively: cancelling it asks
/// the implementation to terminate early, typically by firing the error
/// channel with a cancellation cause and returning
/// [`ReceiveError::Cancelled`].
pub trait CommitReceiver: Send + Sync {
    /// Validates the current selection, returning the server identifier
    /// or a descriptive error.
    fn selection(&self) -> Result<Selection, SelectionError>;

    /// Receives the selected commit's object graph.
    ///
    /// Returns `Ok(None)` when the server produced no graph for the
    /// commit. Progress and errors are reported through [`Self::events`]
    /// while the future is pending.
    fn receive(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Option<ObjectGraph>, ReceiveError>> + Send;

    /// The notification registry listeners subscribe to for the duration
    /// of an attempt.
    fn events(&self) -> &ReceiveEvents;
}
