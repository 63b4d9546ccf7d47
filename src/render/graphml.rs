//! GraphML output with yEd node and edge graphics

use super::label::{edge_label, node_label};
use super::walker::{GraphEmitter, Visit};
use crate::dependency::graph::{DependencyGraph, NodeId};

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:y="http://www.yworks.com/xml/graphml" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">
  <key for="node" id="d0" yfiles.type="nodegraphics"/>
  <key for="edge" id="d1" yfiles.type="edgegraphics"/>
  <graph id="dependencies" edgedefault="directed">
"#;

const FOOTER: &str = "  </graph>\n</graphml>\n";

/// Escape XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[derive(Debug)]
pub struct GraphmlEmitter {
    out: String,
}

impl Default for GraphmlEmitter {
    fn default() -> Self {
        Self {
            out: HEADER.to_string(),
        }
    }
}

impl GraphmlEmitter {
    pub fn finish(mut self) -> String {
        self.out.push_str(FOOTER);
        self.out
    }
}

impl GraphEmitter for GraphmlEmitter {
    fn node(&mut self, graph: &DependencyGraph, visit: &Visit<'_>) {
        self.out.push_str(&format!(
            "    <node id=\"n{}\"><data key=\"d0\"><y:ShapeNode><y:NodeLabel>{}</y:NodeLabel></y:ShapeNode></data></node>\n",
            visit.id,
            escape_xml(&node_label(graph.node(visit.id)))
        ));
    }

    fn edge(&mut self, graph: &DependencyGraph, parent: NodeId, child: NodeId) {
        self.out.push_str(&format!(
            "    <edge source=\"n{}\" target=\"n{}\"><data key=\"d1\"><y:PolyLineEdge><y:EdgeLabel>{}</y:EdgeLabel></y:PolyLineEdge></data></edge>\n",
            parent,
            child,
            escape_xml(&edge_label(graph.node(child)))
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("\"q\" 'a'"), "&quot;q&quot; &apos;a&apos;");
    }
}
