//! Graphviz DOT output
//!
//! Nodes are identified by their full annotated label, so an omitted node is
//! an edge into a label carrying the omission text.

use super::label::node_label;
use super::walker::{GraphEmitter, Visit};
use crate::dependency::graph::{DependencyGraph, NodeId};

#[derive(Debug, Default)]
pub struct DotEmitter {
    out: String,
}

impl DotEmitter {
    pub fn finish(mut self) -> String {
        self.out.push_str("}\n");
        self.out
    }
}

fn quote(label: &str) -> String {
    format!("\"{}\"", label.replace('\\', "\\\\").replace('"', "\\\""))
}

impl GraphEmitter for DotEmitter {
    fn node(&mut self, graph: &DependencyGraph, visit: &Visit<'_>) {
        if visit.parent.is_none() {
            self.out.push_str(&format!(
                "digraph {} {{\n",
                quote(&node_label(graph.node(visit.id)))
            ));
        }
    }

    fn edge(&mut self, graph: &DependencyGraph, parent: NodeId, child: NodeId) {
        self.out.push_str(&format!(
            "\t{} -> {} ;\n",
            quote(&node_label(graph.node(parent))),
            quote(&node_label(graph.node(child)))
        ));
    }
}
