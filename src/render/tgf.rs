//! Trivial Graph Format output: node table, `#`, edge table

use super::label::{edge_label, node_label};
use super::walker::{GraphEmitter, Visit};
use crate::dependency::graph::{DependencyGraph, NodeId};

#[derive(Debug, Default)]
pub struct TgfEmitter {
    nodes: String,
    edges: String,
}

impl TgfEmitter {
    pub fn finish(self) -> String {
        let mut out = self.nodes;
        out.push_str("#\n");
        out.push_str(&self.edges);
        out
    }
}

impl GraphEmitter for TgfEmitter {
    fn node(&mut self, graph: &DependencyGraph, visit: &Visit<'_>) {
        self.nodes.push_str(&format!(
            "{} {}\n",
            visit.id,
            node_label(graph.node(visit.id))
        ));
    }

    fn edge(&mut self, graph: &DependencyGraph, parent: NodeId, child: NodeId) {
        self.edges.push_str(&format!(
            "{} {} {}\n",
            parent,
            child,
            edge_label(graph.node(child))
        ));
    }
}
