//! Indented text tree

use super::label::node_label;
use super::walker::{GraphEmitter, Visit};
use crate::dependency::graph::DependencyGraph;

#[derive(Debug, Default)]
pub struct TextEmitter {
    out: String,
}

impl TextEmitter {
    pub fn finish(self) -> String {
        self.out
    }
}

impl GraphEmitter for TextEmitter {
    fn node(&mut self, graph: &DependencyGraph, visit: &Visit<'_>) {
        if let Some((_, ancestors)) = visit.lineage.split_last() {
            for last in ancestors {
                self.out.push_str(if *last { "   " } else { "|  " });
            }
            self.out.push_str(if visit.is_last() { "\\- " } else { "+- " });
        }
        self.out.push_str(&node_label(graph.node(visit.id)));
        self.out.push('\n');
    }
}
