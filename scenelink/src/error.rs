//! Error types for the receive workflow.
//!
//! Errors are split by phase: selection validation (before an attempt
//! starts), the receive itself, and conversion. Cancellation is modeled as
//! an error variant but is a normal termination path for the orchestrator,
//! never logged as a failure.

use thiserror::Error;

/// Errors that can occur while validating the target's selection.
///
/// Selection errors prevent an attempt from starting: no cancellation
/// signal is created and no progress surface is shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// No account/client is configured for the interchange server
    #[error("no account selected")]
    NoAccount,

    /// No stream/branch is selected
    #[error("no branch selected")]
    NoBranch,

    /// No commit is selected to receive
    #[error("no commit selected")]
    NoCommit,
}

/// Errors that can occur during a receive attempt.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// The receive was cancelled (user affordance, replacement attempt,
    /// or orchestrator teardown). Normal termination, never logged as an
    /// error.
    #[error("receive cancelled")]
    Cancelled,

    /// The receive failed for a non-cancellation reason
    #[error("receive failed: {message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },

    /// Converting the received graph to native objects failed
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),
}

impl ReceiveError {
    /// Creates a non-cancellation failure with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Returns true if this error represents a cancellation signal.
    ///
    /// Cancellation suppresses error logging and maps to an absent result
    /// rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors from converting an object graph to native scene objects.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The graph root itself has no native representation
    #[error("root node '{0}' is not convertible")]
    UnconvertibleRoot(String),

    /// A node failed to convert
    #[error("failed to convert node '{node_id}': {message}")]
    NodeFailed {
        /// Identifier of the failing node.
        node_id: String,
        /// Converter-provided failure description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_cancellation() {
        assert!(ReceiveError::Cancelled.is_cancellation());
    }

    #[test]
    fn test_failed_is_not_cancellation() {
        assert!(!ReceiveError::failed("boom").is_cancellation());
    }

    #[test]
    fn test_convert_error_is_not_cancellation() {
        let err = ReceiveError::from(ConvertError::UnconvertibleRoot("root".into()));
        assert!(!err.is_cancellation());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", ReceiveError::failed("object unreadable")),
            "receive failed: object unreadable"
        );
        assert_eq!(format!("{}", ReceiveError::Cancelled), "receive cancelled");
        assert_eq!(
            format!("{}", SelectionError::NoCommit),
            "no commit selected"
        );
    }

    #[test]
    fn test_convert_error_display() {
        let err = ConvertError::NodeFailed {
            node_id: "abc".into(),
            message: "unsupported geometry".into(),
        };
        assert_eq!(
            format!("{}", err),
            "failed to convert node 'abc': unsupported geometry"
        );
    }
}
