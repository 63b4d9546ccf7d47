//! Verbose dependency graph builder
//!
//! Expands a project's direct dependencies into the complete, non-deduplicated
//! transitive graph by calling the collector for every node. Each direct
//! dependency is expanded independently, so one branch never hides edges of
//! another. Expansion stops at a dependency that already occurs on its own
//! ancestor chain: that edge becomes a cycle marker pointing at the ancestor.

use thiserror::Error;
use tracing::debug;

use crate::config::Project;
use crate::dependency::collector::{CollectError, DependencyCollector};
use crate::dependency::coordinate::{Coordinate, Scope};
use crate::dependency::graph::{DependencyGraph, DependencyNode, NodeId};

/// Failure while building the verbose graph
#[derive(Error, Debug)]
pub enum BuildError {
    /// The collector could not expand a dependency; no partial graph is returned
    #[error("failed to collect dependencies of '{coordinate}'")]
    Collect {
        coordinate: Coordinate,
        #[source]
        source: CollectError,
    },
}

impl BuildError {
    /// The coordinate whose expansion failed
    pub fn coordinate(&self) -> &Coordinate {
        match self {
            BuildError::Collect { coordinate, .. } => coordinate,
        }
    }
}

/// Builds the raw verbose graph for a project
pub struct VerboseGraphBuilder<'a> {
    collector: &'a dyn DependencyCollector,
}

impl<'a> VerboseGraphBuilder<'a> {
    pub fn new(collector: &'a dyn DependencyCollector) -> Self {
        Self { collector }
    }

    /// Expand every direct dependency of `project`, then drop transitive test dependencies
    pub fn build(&self, project: &Project) -> Result<DependencyGraph, BuildError> {
        let mut graph = DependencyGraph::new(project.coordinate.clone());
        let root = graph.root();

        for declaration in &project.dependencies {
            let id = graph.add_child(root, DependencyNode::from_declaration(declaration));
            let mut path = vec![(project.coordinate.clone(), root)];
            self.expand(&mut graph, id, &mut path)?;
        }

        let pruned = prune_transitive_test_dependencies(&mut graph);
        debug!(
            project = %project.coordinate,
            nodes = graph.stats().node_count,
            pruned,
            "built verbose dependency graph"
        );

        Ok(graph)
    }

    /// Depth-first expansion of `id`; `path` holds the ancestor chain
    fn expand(
        &self,
        graph: &mut DependencyGraph,
        id: NodeId,
        path: &mut Vec<(Coordinate, NodeId)>,
    ) -> Result<(), BuildError> {
        let Some(coordinate) = graph.node(id).coordinate.clone() else {
            return Ok(());
        };

        let declarations = self
            .collector
            .collect(&coordinate)
            .map_err(|source| BuildError::Collect {
                coordinate: coordinate.clone(),
                source,
            })?;

        path.push((coordinate, id));

        for declaration in &declarations {
            // Transitive test dependencies never reach the graph
            if declaration.scope == Scope::Test {
                debug!(coordinate = %declaration.coordinate, "skipping transitive test dependency");
                continue;
            }

            let ancestor = path
                .iter()
                .find(|(seen, _)| *seen == declaration.coordinate)
                .map(|(_, ancestor)| *ancestor);

            let mut node = DependencyNode::from_declaration(declaration);
            if let Some(ancestor) = ancestor {
                debug!(
                    coordinate = %declaration.coordinate,
                    "cycle detected, not expanding"
                );
                node.cycle_of = Some(ancestor);
                graph.add_child(id, node);
                continue;
            }

            let child = graph.add_child(id, node);
            self.expand(graph, child, path)?;
        }

        path.pop();
        Ok(())
    }
}

/// Drop every test-scoped dependency that is not a direct dependency of the root.
///
/// [`VerboseGraphBuilder`] never adds such nodes; this guards graphs assembled
/// by other means. Returns the number of detached subtrees.
pub fn prune_transitive_test_dependencies(graph: &mut DependencyGraph) -> usize {
    let root = graph.root();
    let mut pruned = 0;

    for id in graph.preorder() {
        if id == root {
            continue;
        }
        let before = graph.children(id).len();
        graph.retain_children(id, |child| child.scope != Some(Scope::Test));
        pruned += before - graph.children(id).len();
    }

    pruned
}
