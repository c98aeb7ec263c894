//! Scenelink - receive-and-convert orchestration for 3D interchange data
//!
//! This library coordinates a single cancellable "receive and convert"
//! operation against an interchange server: an external receiver collaborator
//! produces an object graph, progress is reported through an injected UI
//! surface, and the graph is converted into host-native scene objects.
//!
//! # High-Level API
//!
//! The [`orchestrator`] module provides the entry point:
//!
//! ```ignore
//! use scenelink::log::TracingLogger;
//! use scenelink::orchestrator::ReceiveOrchestrator;
//! use scenelink::receiver::SimulatedReceiver;
//! use scenelink::surface::{IdleQueue, RecordingSurface};
//! use std::sync::Arc;
//!
//! let surface = Arc::new(RecordingSurface::default());
//! let idle = IdleQueue::new();
//! let orchestrator =
//!     ReceiveOrchestrator::new(surface, idle, Arc::new(TracingLogger));
//!
//! let receiver = SimulatedReceiver::default();
//! let native = orchestrator.receive(&receiver).await?;
//! ```

pub mod convert;
pub mod error;
pub mod events;
pub mod graph;
pub mod log;
pub mod orchestrator;
pub mod progress;
pub mod receiver;
pub mod surface;

/// Version of the scenelink library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
