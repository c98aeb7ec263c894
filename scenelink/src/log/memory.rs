//! In-memory capture logger for tests.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;
use std::sync::Mutex;

/// Logger that captures formatted messages for later inspection.
///
/// The receive workflow's contract includes what must *not* be logged
/// (cancellation is never an error); this sink makes those assertions
/// possible.
///
/// # Example
///
/// ```
/// use scenelink::log::{LogLevel, Logger, MemoryLogger};
///
/// let logger = MemoryLogger::new();
/// logger.warn(format_args!("not ready to receive"));
///
/// assert_eq!(logger.messages_at(LogLevel::Warn).len(), 1);
/// assert!(logger.messages_at(LogLevel::Error).is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    /// Creates an empty capture logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured entries, in order.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Captured messages at the given level, in order.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    /// True if any captured message contains `needle`.
    pub fn contains_message(&self, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        let message = format!("{}", args);
        match self.entries.lock() {
            Ok(mut entries) => entries.push((level, message)),
            Err(poisoned) => poisoned.into_inner().push((level, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_captures_in_order() {
        let logger = MemoryLogger::new();
        logger.info(format_args!("first"));
        logger.error(format_args!("second"));

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (LogLevel::Info, "first".to_string()));
        assert_eq!(entries[1], (LogLevel::Error, "second".to_string()));
    }

    #[test]
    fn test_messages_at_filters_by_level() {
        let logger = MemoryLogger::new();
        logger.warn(format_args!("w1"));
        logger.error(format_args!("e1"));
        logger.warn(format_args!("w2"));

        assert_eq!(logger.messages_at(LogLevel::Warn), vec!["w1", "w2"]);
        assert_eq!(logger.messages_at(LogLevel::Error), vec!["e1"]);
    }

    #[test]
    fn test_contains_message() {
        let logger = MemoryLogger::new();
        logger.warn(format_args!("not ready to receive: no commit selected"));

        assert!(logger.contains_message("no commit selected"));
        assert!(!logger.contains_message("network"));
    }

    #[test]
    fn test_memory_logger_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemoryLogger>();
    }
}
