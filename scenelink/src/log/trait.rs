//! Logger trait definition.

use std::fmt::Arguments;

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Verbose debugging information
    Trace,
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Warning messages
    Warn,
    /// Error messages
    Error,
}

/// Log sink for workflow components.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the orchestrator's notification
/// listeners log from whatever thread delivers the callback.
pub trait Logger: Send + Sync {
    /// Log a message at the specified level.
    ///
    /// This is the core method; the convenience methods delegate to it.
    fn log(&self, level: LogLevel, args: Arguments<'_>);

    /// Log a trace-level message.
    fn trace(&self, args: Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }

    /// Log a debug-level message.
    fn debug(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    /// Log an info-level message.
    fn info(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    /// Log a warning-level message.
    fn warn(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    /// Log an error-level message.
    fn error(&self, args: Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_convenience_methods_delegate() {
        use std::sync::Mutex;

        #[derive(Default)]
        struct Capture(Mutex<Vec<LogLevel>>);

        impl Logger for Capture {
            fn log(&self, level: LogLevel, _args: Arguments<'_>) {
                self.0.lock().unwrap().push(level);
            }
        }

        let capture = Capture::default();
        capture.trace(format_args!("t"));
        capture.debug(format_args!("d"));
        capture.info(format_args!("i"));
        capture.warn(format_args!("w"));
        capture.error(format_args!("e"));

        assert_eq!(
            *capture.0.lock().unwrap(),
            vec![
                LogLevel::Trace,
                LogLevel::Debug,
                LogLevel::Info,
                LogLevel::Warn,
                LogLevel::Error,
            ]
        );
    }
}
