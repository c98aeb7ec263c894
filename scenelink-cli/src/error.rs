//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use scenelink::error::ReceiveError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// The receive attempt failed
    Receive(ReceiveError),
    /// The attempt produced no result (invalid selection, empty commit,
    /// or cancelled)
    NoResult,
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::NoResult => {
                eprintln!();
                eprintln!("Possible causes:");
                eprintln!("  1. The selection was invalid (check --server/--commit)");
                eprintln!("  2. The commit contained no object graph");
                eprintln!("  3. The receive was cancelled (Ctrl-C or --cancel-at)");
                process::exit(2)
            }
            CliError::Receive(_) => process::exit(1),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Receive(e) => write!(f, "Receive failed: {}", e),
            CliError::NoResult => write!(f, "No result received"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_error_display() {
        let err = CliError::Receive(ReceiveError::failed("object unreadable"));
        assert_eq!(
            format!("{}", err),
            "Receive failed: receive failed: object unreadable"
        );
    }

    #[test]
    fn test_no_result_display() {
        assert_eq!(format!("{}", CliError::NoResult), "No result received");
    }
}
