//! Conversion seam between received graphs and native scene objects.
//!
//! The actual geometry conversion lives behind [`NativeConverter`]; this
//! crate only defines the contract the orchestrator drives. The
//! before-convert callback is the hook conversion progress hangs off.

use crate::error::ConvertError;
use crate::graph::{GraphNode, NativeObject, NodeHandle, ObjectGraph};

/// Converts a received object graph into host-native scene objects.
pub trait NativeConverter {
    /// Converts the graph into a native object named `name`.
    ///
    /// `before_convert` is invoked immediately before each convertible
    /// node is converted. Unconvertible nodes are skipped without a
    /// callback, which is why a denominator taken from the graph's
    /// declared child count over-counts in general.
    fn convert_to_native(
        &self,
        graph: &ObjectGraph,
        name: &str,
        before_convert: &mut dyn FnMut(&GraphNode),
    ) -> Result<NativeObject, ConvertError>;

    /// The scene node converted results are attached under.
    fn parent_handle(&self) -> NodeHandle;
}
