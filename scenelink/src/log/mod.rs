//! Logging abstraction for the receive workflow.
//!
//! Warnings and errors of the workflow are written to a log sink
//! associated with the orchestrated target, decoupled from any specific
//! logging backend:
//!
//! - [`Logger`] trait: the sink interface the orchestrator writes to
//! - [`TracingLogger`]: production adapter delegating to the `tracing` crate
//! - [`NoOpLogger`]: silent sink for benchmarks and quiet tests
//! - [`MemoryLogger`]: capture sink for asserting what was (not) logged
//!
//! # Usage
//!
//! Components that log accept an `Arc<dyn Logger>`:
//!
//! ```
//! use scenelink::log::{Logger, NoOpLogger};
//! use std::sync::Arc;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! logger.warn(format_args!("not ready to receive"));
//! ```

mod memory;
mod noop;
mod tracing_adapter;
mod r#trait;

pub use memory::MemoryLogger;
pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
