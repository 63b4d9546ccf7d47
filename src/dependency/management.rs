//! Dependency management overlay
//!
//! Applies the project's dependency management table to a raw verbose graph,
//! recording forced versions and scopes on matching nodes.

use std::collections::HashMap;

use tracing::debug;

use crate::dependency::coordinate::Scope;
use crate::dependency::graph::DependencyGraph;

/// A version and/or scope forced by dependency management
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedDependency {
    pub version: Option<String>,
    pub scope: Option<Scope>,
}

/// Dependency management table keyed by `group:name:type[:classifier]`
#[derive(Debug, Clone, Default)]
pub struct DependencyManagement {
    entries: HashMap<String, ManagedDependency>,
}

impl DependencyManagement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an override; a later entry for the same key replaces the earlier one
    pub fn insert(&mut self, key: impl Into<String>, managed: ManagedDependency) {
        self.entries.insert(key.into(), managed);
    }

    pub fn get(&self, key: &str) -> Option<&ManagedDependency> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Mark every matching non-root node with the managed version/scope.
    ///
    /// A field is only set when the override differs from what the node declared,
    /// so a node is never reported as "managed from" its own value. Returns the
    /// number of nodes that were changed.
    pub fn apply(&self, graph: &mut DependencyGraph) -> usize {
        if self.entries.is_empty() {
            return 0;
        }

        let root = graph.root();
        let mut changed = 0;

        for id in graph.preorder() {
            if id == root {
                continue;
            }

            let node = graph.node_mut(id);
            let Some(coordinate) = node.coordinate.as_ref() else {
                continue;
            };
            let Some(managed) = self.entries.get(&coordinate.management_key()) else {
                continue;
            };

            let mut touched = false;

            if let Some(version) = &managed.version {
                if *version != coordinate.version {
                    node.managed_version = Some(version.clone());
                    touched = true;
                }
            }

            if let Some(scope) = managed.scope {
                if node.scope != Some(scope) {
                    node.managed_scope = Some(scope);
                    touched = true;
                }
            }

            if touched {
                debug!(
                    coordinate = %coordinate,
                    version = ?node.managed_version,
                    scope = ?node.managed_scope,
                    "applied dependency management"
                );
                changed += 1;
            }
        }

        changed
    }
}

impl FromIterator<(String, ManagedDependency)> for DependencyManagement {
    fn from_iter<I: IntoIterator<Item = (String, ManagedDependency)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::coordinate::{Coordinate, DependencyDeclaration};
    use crate::dependency::graph::DependencyNode;

    fn graph_with(declarations: &[DependencyDeclaration]) -> DependencyGraph {
        let mut graph = DependencyGraph::new(Coordinate::new("com.example", "app", "jar", "1.0"));
        let root = graph.root();
        for declaration in declarations {
            graph.add_child(root, DependencyNode::from_declaration(declaration));
        }
        graph
    }

    #[test]
    fn test_overrides_differing_version_and_scope() {
        let declaration = DependencyDeclaration::new(
            Coordinate::new("org.lib", "core", "jar", "1.0"),
            Scope::Compile,
        );
        let mut graph = graph_with(&[declaration]);

        let mut management = DependencyManagement::new();
        management.insert(
            "org.lib:core:jar",
            ManagedDependency {
                version: Some("2.0".to_string()),
                scope: Some(Scope::Runtime),
            },
        );

        assert_eq!(management.apply(&mut graph), 1);

        let child = graph.children(graph.root())[0];
        let node = graph.node(child);
        assert_eq!(node.managed_version.as_deref(), Some("2.0"));
        assert_eq!(node.managed_scope, Some(Scope::Runtime));
        assert_eq!(node.coordinate.as_ref().unwrap().version, "1.0");
    }

    #[test]
    fn test_matching_override_leaves_node_untouched() {
        let declaration = DependencyDeclaration::new(
            Coordinate::new("org.lib", "core", "jar", "1.0"),
            Scope::Compile,
        );
        let mut graph = graph_with(&[declaration]);

        let management: DependencyManagement = [(
            "org.lib:core:jar".to_string(),
            ManagedDependency {
                version: Some("1.0".to_string()),
                scope: Some(Scope::Compile),
            },
        )]
        .into_iter()
        .collect();

        assert_eq!(management.apply(&mut graph), 0);

        let child = graph.children(graph.root())[0];
        assert!(graph.node(child).managed_version.is_none());
        assert!(graph.node(child).managed_scope.is_none());
    }

    #[test]
    fn test_classifier_is_part_of_key() {
        let declaration = DependencyDeclaration::new(
            Coordinate::new("org.lib", "core", "jar", "1.0").with_classifier("tests"),
            Scope::Test,
        );
        let mut graph = graph_with(&[declaration]);

        let mut management = DependencyManagement::new();
        management.insert(
            "org.lib:core:jar",
            ManagedDependency {
                version: Some("2.0".to_string()),
                scope: None,
            },
        );
        assert_eq!(management.apply(&mut graph), 0);

        management.insert(
            "org.lib:core:jar:tests",
            ManagedDependency {
                version: Some("3.0".to_string()),
                scope: None,
            },
        );
        assert_eq!(management.apply(&mut graph), 1);
        let child = graph.children(graph.root())[0];
        assert_eq!(graph.node(child).managed_version.as_deref(), Some("3.0"));
        assert!(graph.node(child).managed_scope.is_none());
    }
}
