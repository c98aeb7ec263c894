//! Object graph and native scene object model.
//!
//! An [`ObjectGraph`] is the tree of interchange-format nodes received from
//! the server, prior to conversion. A [`NativeObject`] is the host-side
//! result of converting that graph; it is attached under a designated
//! parent via a [`NodeHandle`].

/// Handle to a native scene node that converted objects attach under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle(String);

impl NodeHandle {
    /// Creates a handle from a scene node identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying node identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single node of the received object graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Server-assigned object identifier.
    pub id: String,
    /// Interchange type name (e.g. "Mesh", "Brep").
    pub kind: String,
    /// Child nodes.
    pub children: Vec<GraphNode>,
}

impl GraphNode {
    /// Creates a leaf node.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            children: Vec::new(),
        }
    }

    /// Adds a child node, returning self for chaining.
    pub fn with_child(mut self, child: GraphNode) -> Self {
        self.children.push(child);
        self
    }

    /// Counts all descendants of this node.
    pub fn descendant_count(&self) -> u64 {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

/// An object graph received from the interchange server.
///
/// Carries the server-declared total child count separately from the tree
/// itself: the declaration arrives with the commit metadata and may
/// over-count what is actually convertible.
#[derive(Debug, Clone)]
pub struct ObjectGraph {
    root: GraphNode,
    total_children: u64,
}

impl ObjectGraph {
    /// Creates a graph whose declared child count is derived from the tree.
    pub fn new(root: GraphNode) -> Self {
        let total_children = root.descendant_count();
        Self {
            root,
            total_children,
        }
    }

    /// Creates a graph with a server-declared child count.
    pub fn with_declared_children(root: GraphNode, total_children: u64) -> Self {
        Self {
            root,
            total_children,
        }
    }

    /// The root node of the graph.
    pub fn root(&self) -> &GraphNode {
        &self.root
    }

    /// Declared total child count of the root.
    pub fn total_children(&self) -> u64 {
        self.total_children
    }
}

/// A host-native scene object produced by conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeObject {
    /// Display name (typically the commit id for the root).
    pub name: String,
    /// Interchange type the object was converted from.
    pub kind: String,
    /// Converted child objects.
    pub children: Vec<NativeObject>,
    parent: Option<NodeHandle>,
}

impl NativeObject {
    /// Creates an unparented native object.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Adds a converted child object.
    pub fn add_child(&mut self, child: NativeObject) {
        self.children.push(child);
    }

    /// Attaches this object under the given scene node.
    pub fn set_parent(&mut self, parent: NodeHandle) {
        self.parent = Some(parent);
    }

    /// The scene node this object is attached under, if any.
    pub fn parent(&self) -> Option<&NodeHandle> {
        self.parent.as_ref()
    }

    /// Total number of converted objects in this subtree, excluding self.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}
