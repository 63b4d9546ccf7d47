//! Depth-first traversal shared by every output format
//!
//! The walker decides which nodes are rendered and in which order; an
//! [`GraphEmitter`] decides what text each visit produces.

use crate::dependency::coordinate::Scope;
use crate::dependency::graph::{DependencyGraph, NodeId};

/// Position of a node in the rendered tree
#[derive(Debug)]
pub struct Visit<'a> {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// For each level below the root down to this node: whether the node at
    /// that level is the last rendered sibling
    pub lineage: &'a [bool],
}

impl Visit<'_> {
    pub fn depth(&self) -> usize {
        self.lineage.len()
    }

    pub fn is_last(&self) -> bool {
        self.lineage.last().copied().unwrap_or(true)
    }
}

/// Format-specific output strategy driven by [`walk`]
pub trait GraphEmitter {
    /// Called once per rendered node, parents before children
    fn node(&mut self, graph: &DependencyGraph, visit: &Visit<'_>);

    /// Called once per rendered parent/child pair, right after the child's `node`
    fn edge(&mut self, _graph: &DependencyGraph, _parent: NodeId, _child: NodeId) {}

    /// Called after all of a node's children were visited
    fn leave(&mut self, _graph: &DependencyGraph, _id: NodeId) {}
}

/// Walk `graph` from its root in children order.
///
/// Omitted and malformed nodes are rendered but never descended into. Below
/// the first level, test-scoped children are skipped.
pub fn walk<E: GraphEmitter + ?Sized>(graph: &DependencyGraph, emitter: &mut E) {
    let mut lineage = Vec::new();
    visit(graph, graph.root(), None, &mut lineage, emitter);
}

fn visit<E: GraphEmitter + ?Sized>(
    graph: &DependencyGraph,
    id: NodeId,
    parent: Option<NodeId>,
    lineage: &mut Vec<bool>,
    emitter: &mut E,
) {
    emitter.node(
        graph,
        &Visit {
            id,
            parent,
            lineage: lineage.as_slice(),
        },
    );
    if let Some(parent) = parent {
        emitter.edge(graph, parent, id);
    }

    let node = graph.node(id);
    if node.coordinate.is_some() && !node.is_omitted() {
        let children = rendered_children(graph, id);
        let count = children.len();
        for (index, child) in children.into_iter().enumerate() {
            lineage.push(index + 1 == count);
            visit(graph, child, Some(id), lineage, emitter);
            lineage.pop();
        }
    }

    emitter.leave(graph, id);
}

/// Children of `id` that will be rendered
pub fn rendered_children(graph: &DependencyGraph, id: NodeId) -> Vec<NodeId> {
    let below_first_level = id != graph.root();
    graph
        .children(id)
        .iter()
        .copied()
        .filter(|child| {
            !(below_first_level && graph.node(*child).effective_scope() == Some(Scope::Test))
        })
        .collect()
}
