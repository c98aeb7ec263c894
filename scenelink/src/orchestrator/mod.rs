//! Receive-and-convert orchestration.
//!
//! Coordinates one in-flight receive attempt against a receiver
//! collaborator: owns the cancellation lifetime, subscribes to the
//! receiver's notification channels for the duration of the attempt,
//! drives the progress surface, and converts the received graph into
//! native scene objects.

mod handle;
mod receive;

pub use handle::OperationHandle;
pub use receive::{ReceiveOrchestrator, CONVERT_PROGRESS_TITLE};
