//! Nested JSON output
//!
//! Same traversal and labels as the other formats, with the omission reason
//! and management notes carried as separate fields.

use serde::Serialize;

use super::label::node_label;
use super::walker::{GraphEmitter, Visit};
use crate::dependency::coordinate::{Coordinate, Exclusion, Scope};
use crate::dependency::graph::{DependencyGraph, NodeId, NodeStatus, Omission};

/// One rendered node; children are attached when the walker leaves it
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NodeJson {
    label: String,
    /// Coordinate with the effective version
    #[serde(flatten)]
    coordinate: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<Scope>,
    #[serde(skip_serializing_if = "is_false")]
    optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_managed_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope_managed_from: Option<Scope>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclusions: Vec<Exclusion>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    omission: Option<String>,
    dependencies: Vec<NodeJson>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Default)]
pub struct JsonEmitter {
    stack: Vec<NodeJson>,
    root: Option<NodeJson>,
}

impl JsonEmitter {
    pub fn finish(self) -> String {
        // Only strings, bools and unit enums: serialization cannot fail
        let mut out = serde_json::to_string_pretty(&self.root).unwrap_or_default();
        out.push('\n');
        out
    }
}

fn status_name(status: &NodeStatus) -> &'static str {
    match status {
        NodeStatus::Unvisited => "unvisited",
        NodeStatus::Included => "included",
        NodeStatus::Omitted(Omission::Duplicate { .. }) => "duplicate",
        NodeStatus::Omitted(Omission::ScopeConflict { .. }) => "scope-conflict",
        NodeStatus::Omitted(Omission::VersionConflict { .. }) => "version-conflict",
        NodeStatus::Omitted(Omission::Cycle { .. }) => "cycle",
        NodeStatus::Omitted(Omission::OptionalDependency) => "optional",
        NodeStatus::Omitted(Omission::Malformed) => "malformed",
    }
}

impl GraphEmitter for JsonEmitter {
    fn node(&mut self, graph: &DependencyGraph, visit: &Visit<'_>) {
        let node = graph.node(visit.id);

        let coordinate = node.coordinate.as_ref().map(|coordinate| {
            let mut effective = coordinate.clone();
            if let Some(version) = node.effective_version() {
                effective.version = version.to_string();
            }
            effective
        });

        self.stack.push(NodeJson {
            label: node_label(node),
            coordinate,
            scope: node.effective_scope(),
            optional: node.optional,
            version_managed_from: node
                .managed_version
                .as_ref()
                .and(node.coordinate.as_ref())
                .map(|coordinate| coordinate.version.clone()),
            scope_managed_from: node.managed_scope.and(node.scope),
            exclusions: node.exclusions.clone(),
            status: status_name(&node.status),
            omission: node.omission().map(|omission| omission.to_string()),
            dependencies: Vec::new(),
        });
    }

    fn leave(&mut self, _graph: &DependencyGraph, _id: NodeId) {
        let Some(entry) = self.stack.pop() else {
            return;
        };

        match self.stack.last_mut() {
            Some(parent) => parent.dependencies.push(entry),
            None => self.root = Some(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::coordinate::DependencyDeclaration;
    use crate::dependency::graph::DependencyNode;
    use crate::render::walker::walk;

    fn render(graph: &DependencyGraph) -> serde_json::Value {
        let mut emitter = JsonEmitter::default();
        walk(graph, &mut emitter);
        serde_json::from_str(&emitter.finish()).unwrap()
    }

    #[test]
    fn test_managed_node_fields() {
        let mut graph = DependencyGraph::new(Coordinate::new("org", "app", "jar", "1"));
        let root = graph.root();
        let mut node = DependencyNode::from_declaration(
            &DependencyDeclaration::new(
                Coordinate::new("org", "lib", "jar", "1.0").with_classifier("tests"),
                Scope::Compile,
            )
            .with_exclusions(vec!["org.slf4j:slf4j-api".parse().unwrap()]),
        );
        node.managed_version = Some("2.0".to_string());
        node.managed_scope = Some(Scope::Runtime);
        node.status = NodeStatus::Included;
        graph.add_child(root, node);

        let json = render(&graph);
        let lib = &json["dependencies"][0];

        assert_eq!(lib["type"], "jar");
        assert_eq!(lib["classifier"], "tests");
        assert_eq!(lib["version"], "2.0");
        assert_eq!(lib["versionManagedFrom"], "1.0");
        assert_eq!(lib["scope"], "runtime");
        assert_eq!(lib["scopeManagedFrom"], "compile");
        assert_eq!(lib["exclusions"][0]["group"], "org.slf4j");
        assert_eq!(lib["exclusions"][0]["name"], "slf4j-api");
        assert!(lib.get("optional").is_none());
        assert!(lib.get("omission").is_none());
    }

    #[test]
    fn test_root_has_no_scope() {
        let graph = DependencyGraph::new(Coordinate::new("org", "app", "jar", "1"));
        let json = render(&graph);

        assert_eq!(json["name"], "app");
        assert!(json.get("scope").is_none());
        assert!(json.get("classifier").is_none());
        assert_eq!(json["dependencies"].as_array().unwrap().len(), 0);
    }
}
