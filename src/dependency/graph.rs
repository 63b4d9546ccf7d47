//! Verbose dependency graph data structures
//!
//! The graph is an arena of [`DependencyNode`]s addressed by [`NodeId`]. Every
//! non-root node has exactly one parent; the same artifact reached through two
//! different parents is two distinct nodes. A node's `NodeId` is its identity
//! (used for cycle detection), while its coordinate string is its value key
//! (used for duplicate and conflict detection).

use std::fmt;

use crate::dependency::coordinate::{Coordinate, DependencyDeclaration, Exclusion, Scope};

/// Identity of a node inside a [`DependencyGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a node would not make it into the resolved dependency set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Omission {
    /// The exact same coordinate and scope was already included
    Duplicate { of: Coordinate },
    /// The same artifact and version was already included under another scope
    ScopeConflict { with: Scope },
    /// The same artifact was already included at another version
    VersionConflict { with: String },
    /// The node re-introduces one of its own ancestors
    Cycle { with: Coordinate },
    /// Optional dependencies are never pulled in transitively
    OptionalDependency,
    /// The node carries no coordinate
    Malformed,
}

impl fmt::Display for Omission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Omission::Duplicate { .. } => write!(f, "omitted for duplicate"),
            Omission::ScopeConflict { with } => write!(f, "omitted for conflict with {}", with),
            Omission::VersionConflict { with } => write!(f, "omitted for conflict with {}", with),
            Omission::Cycle { with } => write!(f, "omitted for introducing a cycle with {}", with),
            Omission::OptionalDependency => write!(f, "omitted due to optional dependency"),
            Omission::Malformed => write!(f, "omitted for malformed node"),
        }
    }
}

/// Outcome of conflict annotation for a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeStatus {
    /// Not reached by the annotator (inside an omitted subtree, or not annotated yet)
    #[default]
    Unvisited,
    /// First occurrence of its artifact; wins mediation
    Included,
    /// Loses mediation for the given reason
    Omitted(Omission),
}

/// A node in the verbose dependency graph
#[derive(Debug, Clone, Default)]
pub struct DependencyNode {
    /// Artifact coordinate; `None` only for malformed nodes
    pub coordinate: Option<Coordinate>,

    /// Declared scope (`None` for the project root)
    pub scope: Option<Scope>,

    pub optional: bool,

    /// Recorded exclusions (informational)
    pub exclusions: Vec<Exclusion>,

    /// Non-owning back-reference
    pub parent: Option<NodeId>,

    /// Children in discovery order
    pub children: Vec<NodeId>,

    /// Version forced by dependency management
    pub managed_version: Option<String>,

    /// Scope forced by dependency management
    pub managed_scope: Option<Scope>,

    /// Set on cycle markers: the ancestor this node re-introduces
    pub cycle_of: Option<NodeId>,

    pub status: NodeStatus,
}

impl DependencyNode {
    /// Node for the project itself
    pub fn root(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            ..Default::default()
        }
    }

    /// Node for a declared dependency
    pub fn from_declaration(declaration: &DependencyDeclaration) -> Self {
        Self {
            coordinate: Some(declaration.coordinate.clone()),
            scope: Some(declaration.scope),
            optional: declaration.optional,
            exclusions: declaration.exclusions.clone(),
            ..Default::default()
        }
    }

    /// Node without a coordinate
    pub fn malformed() -> Self {
        Self::default()
    }

    /// Version after dependency management
    pub fn effective_version(&self) -> Option<&str> {
        self.managed_version
            .as_deref()
            .or_else(|| self.coordinate.as_ref().map(|c| c.version.as_str()))
    }

    /// Scope after dependency management
    pub fn effective_scope(&self) -> Option<Scope> {
        self.managed_scope.or(self.scope)
    }

    /// `group:name:type[:classifier]:version[:scope]` using managed values
    pub fn coordinate_string(&self) -> Option<String> {
        let coordinate = self.coordinate.as_ref()?;
        let version = self.effective_version().unwrap_or(&coordinate.version);
        Some(coordinate.coordinate_string(version, self.effective_scope()))
    }

    pub fn versionless_key(&self) -> Option<String> {
        self.coordinate.as_ref().map(Coordinate::versionless_key)
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self.status, NodeStatus::Omitted(_))
    }

    pub fn omission(&self) -> Option<&Omission> {
        match &self.status {
            NodeStatus::Omitted(omission) => Some(omission),
            _ => None,
        }
    }
}

/// Arena-backed verbose dependency graph rooted at the project
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
}

impl DependencyGraph {
    /// Create a graph containing only the project root
    pub fn new(root: Coordinate) -> Self {
        Self::with_root(DependencyNode::root(root))
    }

    /// Create a graph from an arbitrary root node
    pub fn with_root(mut root: DependencyNode) -> Self {
        root.parent = None;
        root.children.clear();
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &DependencyNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut DependencyNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Append `node` as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, mut node: DependencyNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Detach every child of `id` (cycle break)
    pub fn truncate_children(&mut self, id: NodeId) {
        self.nodes[id.0].children.clear();
    }

    /// Keep only the children of `id` for which `keep` returns true
    pub fn retain_children<F>(&mut self, id: NodeId, mut keep: F)
    where
        F: FnMut(&DependencyNode) -> bool,
    {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        let kept = children
            .into_iter()
            .filter(|child| keep(&self.nodes[child.0]))
            .collect();
        self.nodes[id.0].children = kept;
    }

    /// Distance from the root (root = 0)
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Iterate over the ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id.0].parent, move |p| self.nodes[p.0].parent)
    }

    /// Nodes reachable from the root, in depth-first pre-order
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Every arena slot, including nodes detached by pruning
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DependencyNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Get statistics about the reachable graph
    pub fn stats(&self) -> DependencyStats {
        let reachable = self.preorder();
        let direct_count = self.children(self.root()).len();
        let max_depth = reachable
            .iter()
            .map(|id| self.depth(*id))
            .max()
            .unwrap_or(0);

        DependencyStats {
            node_count: reachable.len(),
            direct_count,
            transitive_count: reachable.len().saturating_sub(direct_count + 1),
            max_depth,
        }
    }
}

/// Statistics about a verbose dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyStats {
    /// Nodes reachable from the root, root included
    pub node_count: usize,

    /// Dependencies declared by the project itself
    pub direct_count: usize,

    /// Reachable nodes below the first level
    pub transitive_count: usize,

    /// Maximum depth in the dependency tree
    pub max_depth: usize,
}
