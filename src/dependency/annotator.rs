//! Conflict annotation
//!
//! Walks the verbose graph breadth-first, the order in which dependency
//! mediation encounters competing declarations: shallower and earlier-declared
//! nodes are seen first and win. Every reached node gets exactly one
//! [`NodeStatus`]; subtrees of omitted nodes are never explored.
//!
//! Rules, first match wins:
//!
//! 1. no coordinate: malformed
//! 2. same coordinate string already included: duplicate
//! 3. same artifact and version already included under another scope: scope conflict
//! 4. same artifact already included at another version: version conflict
//! 5. optional: omitted
//! 6. otherwise included; children that close a cycle are marked and truncated,
//!    the rest are enqueued
//!
//! A cycle marker repeats the coordinate of an included ancestor, so rules 2-4
//! would always report it as a duplicate or conflict of itself. Markers skip
//! them and go through rules 1, 5 and 6 in that order.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use tracing::trace;

use crate::dependency::coordinate::Scope;
use crate::dependency::graph::{DependencyGraph, NodeId, NodeStatus, Omission};

/// State threaded through one annotation pass
#[derive(Debug, Default)]
struct TraversalContext {
    /// Coordinate strings of included nodes
    seen_coordinates: HashSet<String>,
    /// First included version per versionless key
    seen_versions: HashMap<String, String>,
    /// Node identities already enqueued
    visited: HashSet<NodeId>,
}

/// Classifies every reachable node of a verbose graph
pub struct ConflictAnnotator;

impl ConflictAnnotator {
    /// Annotate `graph` in place and summarize the outcome
    pub fn annotate(graph: &mut DependencyGraph) -> AnnotationReport {
        let mut ctx = TraversalContext::default();
        let mut queue = VecDeque::new();

        let ids: Vec<NodeId> = graph.iter().map(|(id, _)| id).collect();
        for id in ids {
            graph.node_mut(id).status = NodeStatus::Unvisited;
        }

        let root = graph.root();
        ctx.visited.insert(root);
        queue.push_back(root);

        while let Some(id) = queue.pop_front() {
            if let Some(omission) = Self::classify(graph, id, &ctx) {
                trace!(node = %id, reason = %omission, "omitted");
                graph.node_mut(id).status = NodeStatus::Omitted(omission);
                continue;
            }

            Self::include(graph, id, &mut ctx, &mut queue);
        }

        AnnotationReport::from_graph(graph)
    }

    /// Rules 1-5; `None` means the node wins
    fn classify(graph: &DependencyGraph, id: NodeId, ctx: &TraversalContext) -> Option<Omission> {
        let node = graph.node(id);
        let Some(coordinate) = node.coordinate.as_ref() else {
            return Some(Omission::Malformed);
        };
        let version = node.effective_version().unwrap_or(&coordinate.version);
        let scope = node.effective_scope();

        if ctx
            .seen_coordinates
            .contains(&coordinate.coordinate_string(version, scope))
        {
            return Some(Omission::Duplicate {
                of: coordinate.clone(),
            });
        }

        if scope.is_some() {
            let other = Scope::ALL.into_iter().find(|candidate| {
                Some(*candidate) != scope
                    && ctx
                        .seen_coordinates
                        .contains(&coordinate.coordinate_string(version, Some(*candidate)))
            });
            if let Some(with) = other {
                return Some(Omission::ScopeConflict { with });
            }
        }

        if let Some(winner) = ctx.seen_versions.get(&coordinate.versionless_key()) {
            if winner != version {
                return Some(Omission::VersionConflict {
                    with: winner.clone(),
                });
            }
        }

        if node.optional {
            return Some(Omission::OptionalDependency);
        }

        None
    }

    /// Rule 6: record the winner, break cycles among its children, enqueue the rest
    fn include(
        graph: &mut DependencyGraph,
        id: NodeId,
        ctx: &mut TraversalContext,
        queue: &mut VecDeque<NodeId>,
    ) {
        let node = graph.node(id);
        if let (Some(key), Some(coordinate_string), Some(version)) = (
            node.versionless_key(),
            node.coordinate_string(),
            node.effective_version().map(str::to_string),
        ) {
            ctx.seen_coordinates.insert(coordinate_string);
            ctx.seen_versions.entry(key).or_insert(version);
        }
        graph.node_mut(id).status = NodeStatus::Included;

        for child in graph.children(id).to_vec() {
            let closes_cycle = graph
                .node(child)
                .cycle_of
                .is_some_and(|target| ctx.visited.contains(&target));

            if closes_cycle {
                let marker = graph.node(child);
                let omission = match marker.coordinate.clone() {
                    None => Omission::Malformed,
                    Some(_) if marker.optional => Omission::OptionalDependency,
                    Some(with) => Omission::Cycle { with },
                };
                trace!(node = %child, reason = %omission, "cycle break");
                graph.truncate_children(child);
                graph.node_mut(child).status = NodeStatus::Omitted(omission);
                continue;
            }

            if ctx.visited.insert(child) {
                queue.push_back(child);
            }
        }
    }
}

/// A version or scope that lost mediation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEntry {
    /// `group:name:type[:classifier]`
    pub artifact: String,
    /// The losing version or scope
    pub requested: String,
    /// The winning version or scope
    pub resolved: String,
    /// Path from the first-level dependency down to the losing node
    pub path: Vec<String>,
}

/// Summary of one annotation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    pub included: usize,
    pub duplicates: usize,
    pub scope_conflicts: usize,
    pub version_conflicts: usize,
    pub cycles: usize,
    pub optional: usize,
    pub malformed: usize,
    /// Scope and version conflicts in breadth-first order
    pub conflicts: Vec<ConflictEntry>,
}

impl AnnotationReport {
    /// Summarize the statuses currently recorded on `graph`
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        let mut report = Self::default();
        let mut conflicts = Vec::new();

        for id in graph.preorder() {
            let node = graph.node(id);
            match &node.status {
                NodeStatus::Unvisited => {}
                NodeStatus::Included => report.included += 1,
                NodeStatus::Omitted(omission) => match omission {
                    Omission::Duplicate { .. } => report.duplicates += 1,
                    Omission::ScopeConflict { with } => {
                        report.scope_conflicts += 1;
                        if let (Some(artifact), Some(requested)) =
                            (node.versionless_key(), node.effective_scope())
                        {
                            conflicts.push((
                                graph.depth(id),
                                id,
                                ConflictEntry {
                                    artifact,
                                    requested: requested.to_string(),
                                    resolved: with.to_string(),
                                    path: path_to(graph, id),
                                },
                            ));
                        }
                    }
                    Omission::VersionConflict { with } => {
                        report.version_conflicts += 1;
                        if let (Some(artifact), Some(requested)) =
                            (node.versionless_key(), node.effective_version())
                        {
                            conflicts.push((
                                graph.depth(id),
                                id,
                                ConflictEntry {
                                    artifact,
                                    requested: requested.to_string(),
                                    resolved: with.clone(),
                                    path: path_to(graph, id),
                                },
                            ));
                        }
                    }
                    Omission::Cycle { .. } => report.cycles += 1,
                    Omission::OptionalDependency => report.optional += 1,
                    Omission::Malformed => report.malformed += 1,
                },
            }
        }

        // Arena ids grow in discovery order, so (depth, id) approximates BFS order
        conflicts.sort_by_key(|(depth, id, _)| (*depth, *id));
        report.conflicts = conflicts.into_iter().map(|(_, _, entry)| entry).collect();
        report
    }

    /// Number of omitted nodes
    pub fn omitted(&self) -> usize {
        self.duplicates
            + self.scope_conflicts
            + self.version_conflicts
            + self.cycles
            + self.optional
            + self.malformed
    }
}

fn path_to(graph: &DependencyGraph, id: NodeId) -> Vec<String> {
    let root = graph.root();
    let mut path: Vec<String> = std::iter::once(id)
        .chain(graph.ancestors(id))
        .filter(|node| *node != root)
        .map(|node| {
            graph
                .node(node)
                .coordinate
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "?".to_string())
        })
        .collect();
    path.reverse();
    path
}

impl fmt::Display for AnnotationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Included:          {}", self.included)?;
        writeln!(f, "Duplicates:        {}", self.duplicates)?;
        writeln!(f, "Version conflicts: {}", self.version_conflicts)?;
        writeln!(f, "Scope conflicts:   {}", self.scope_conflicts)?;
        writeln!(f, "Cycles:            {}", self.cycles)?;
        writeln!(f, "Optional:          {}", self.optional)?;
        if self.malformed > 0 {
            writeln!(f, "Malformed:         {}", self.malformed)?;
        }
        Ok(())
    }
}

impl fmt::Display for ConflictEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requested {} but resolved {} (via {})",
            self.artifact,
            self.requested,
            self.resolved,
            self.path.join(" -> ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::coordinate::{Coordinate, DependencyDeclaration};
    use crate::dependency::graph::DependencyNode;

    fn node(group: &str, name: &str, version: &str, scope: Scope) -> DependencyNode {
        DependencyNode::from_declaration(&DependencyDeclaration::new(
            Coordinate::new(group, name, "jar", version),
            scope,
        ))
    }

    fn root_graph() -> DependencyGraph {
        DependencyGraph::new(Coordinate::new("com.example", "app", "jar", "1.0"))
    }

    #[test]
    fn test_duplicate_under_different_ancestors() {
        let mut graph = root_graph();
        let root = graph.root();
        let a = graph.add_child(root, node("com.comm", "a1", "1", Scope::Compile));
        let b = graph.add_child(root, node("com.comm", "a2", "1", Scope::Compile));
        let first = graph.add_child(a, node("com.comm", "a7", "1", Scope::Compile));
        let second = graph.add_child(b, node("com.comm", "a7", "1", Scope::Compile));
        let hidden = graph.add_child(second, node("com.comm", "deep", "1", Scope::Compile));

        let report = ConflictAnnotator::annotate(&mut graph);

        assert_eq!(graph.node(first).status, NodeStatus::Included);
        assert!(matches!(
            graph.node(second).status,
            NodeStatus::Omitted(Omission::Duplicate { .. })
        ));
        assert_eq!(graph.node(hidden).status, NodeStatus::Unvisited);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.included, 4);
    }

    #[test]
    fn test_breadth_first_shallower_wins() {
        let mut graph = root_graph();
        let root = graph.root();
        let a = graph.add_child(root, node("org", "a", "1", Scope::Compile));
        let deep = graph.add_child(a, node("org", "lib", "1.0", Scope::Compile));
        let shallow = graph.add_child(root, node("org", "lib", "2.0", Scope::Compile));

        let report = ConflictAnnotator::annotate(&mut graph);

        assert_eq!(graph.node(shallow).status, NodeStatus::Included);
        assert_eq!(
            graph.node(deep).status,
            NodeStatus::Omitted(Omission::VersionConflict {
                with: "2.0".to_string()
            })
        );
        assert_eq!(report.version_conflicts, 1);
        assert_eq!(report.conflicts[0].artifact, "org:lib:jar");
        assert_eq!(report.conflicts[0].requested, "1.0");
        assert_eq!(report.conflicts[0].resolved, "2.0");
        assert_eq!(report.conflicts[0].path, vec!["org:a:jar:1", "org:lib:jar:1.0"]);
    }

    #[test]
    fn test_scope_conflict_at_equal_version() {
        let mut graph = root_graph();
        let root = graph.root();
        let a = graph.add_child(root, node("org", "lib", "1", Scope::Provided));
        let b = graph.add_child(root, node("org", "other", "1", Scope::Compile));
        let c = graph.add_child(b, node("org", "lib", "1", Scope::Runtime));

        ConflictAnnotator::annotate(&mut graph);

        assert_eq!(graph.node(a).status, NodeStatus::Included);
        assert_eq!(
            graph.node(c).status,
            NodeStatus::Omitted(Omission::ScopeConflict {
                with: Scope::Provided
            })
        );
    }

    #[test]
    fn test_managed_version_drives_conflicts() {
        let mut graph = root_graph();
        let root = graph.root();
        let a = graph.add_child(root, node("org", "lib", "2.0", Scope::Compile));
        let b = graph.add_child(root, node("org", "b", "1", Scope::Compile));
        let mut managed = node("org", "lib", "1.0", Scope::Compile);
        managed.managed_version = Some("2.0".to_string());
        let c = graph.add_child(b, managed);

        ConflictAnnotator::annotate(&mut graph);

        assert_eq!(graph.node(a).status, NodeStatus::Included);
        assert!(matches!(
            graph.node(c).status,
            NodeStatus::Omitted(Omission::Duplicate { .. })
        ));
    }

    #[test]
    fn test_optional_is_not_expanded() {
        let mut graph = root_graph();
        let root = graph.root();
        let mut optional = node("org", "opt", "1", Scope::Compile);
        optional.optional = true;
        let opt = graph.add_child(root, optional);
        let below = graph.add_child(opt, node("org", "below", "1", Scope::Compile));

        let report = ConflictAnnotator::annotate(&mut graph);

        assert_eq!(
            graph.node(opt).status,
            NodeStatus::Omitted(Omission::OptionalDependency)
        );
        assert_eq!(graph.node(below).status, NodeStatus::Unvisited);
        assert_eq!(report.optional, 1);
    }

    #[test]
    fn test_duplicate_checked_before_optional() {
        let mut graph = root_graph();
        let root = graph.root();
        graph.add_child(root, node("org", "lib", "1", Scope::Compile));
        let mut optional = node("org", "lib", "1", Scope::Compile);
        optional.optional = true;
        let dup = graph.add_child(root, optional);

        ConflictAnnotator::annotate(&mut graph);

        assert!(matches!(
            graph.node(dup).status,
            NodeStatus::Omitted(Omission::Duplicate { .. })
        ));
    }

    #[test]
    fn test_cycle_marker_is_truncated() {
        let mut graph = root_graph();
        let root = graph.root();
        let a = graph.add_child(root, node("org", "a", "1", Scope::Compile));
        let b = graph.add_child(a, node("org", "b", "1", Scope::Compile));
        let mut back = node("org", "a", "1", Scope::Compile);
        back.cycle_of = Some(a);
        let marker = graph.add_child(b, back);
        graph.add_child(marker, node("org", "stray", "1", Scope::Compile));

        let report = ConflictAnnotator::annotate(&mut graph);

        assert_eq!(graph.node(b).status, NodeStatus::Included);
        assert_eq!(
            graph.node(marker).status,
            NodeStatus::Omitted(Omission::Cycle {
                with: Coordinate::new("org", "a", "jar", "1")
            })
        );
        assert!(graph.children(marker).is_empty());
        assert_eq!(report.cycles, 1);
    }

    #[test]
    fn test_optional_cycle_marker_reports_optional() {
        let mut graph = root_graph();
        let root = graph.root();
        let a = graph.add_child(root, node("org", "a", "1", Scope::Compile));
        let b = graph.add_child(a, node("org", "b", "1", Scope::Compile));
        let mut back = node("org", "a", "1", Scope::Compile);
        back.optional = true;
        back.cycle_of = Some(a);
        let marker = graph.add_child(b, back);

        let report = ConflictAnnotator::annotate(&mut graph);

        assert_eq!(
            graph.node(marker).status,
            NodeStatus::Omitted(Omission::OptionalDependency)
        );
        assert!(graph.children(marker).is_empty());
        assert_eq!(report.optional, 1);
        assert_eq!(report.cycles, 0);
    }

    #[test]
    fn test_malformed_node_does_not_stop_siblings() {
        let mut graph = root_graph();
        let root = graph.root();
        let bad = graph.add_child(root, DependencyNode::malformed());
        graph.add_child(bad, node("org", "under-bad", "1", Scope::Compile));
        let good = graph.add_child(root, node("org", "good", "1", Scope::Compile));

        let report = ConflictAnnotator::annotate(&mut graph);

        assert_eq!(graph.node(bad).status, NodeStatus::Omitted(Omission::Malformed));
        assert_eq!(graph.node(good).status, NodeStatus::Included);
        assert_eq!(report.malformed, 1);
    }

    #[test]
    fn test_first_discovery_wins_single_included_per_key() {
        let mut graph = root_graph();
        let root = graph.root();
        let a = graph.add_child(root, node("org", "a", "1", Scope::Compile));
        let b = graph.add_child(root, node("org", "b", "1", Scope::Compile));
        for (parent, version, scope) in [
            (a, "1", Scope::Compile),
            (a, "2", Scope::Compile),
            (b, "1", Scope::Runtime),
            (b, "1", Scope::Compile),
            (b, "3", Scope::Test),
        ] {
            graph.add_child(parent, node("org", "lib", version, scope));
        }

        ConflictAnnotator::annotate(&mut graph);

        let included: Vec<_> = graph
            .preorder()
            .into_iter()
            .filter(|id| {
                graph.node(*id).status == NodeStatus::Included
                    && graph.node(*id).versionless_key().as_deref() == Some("org:lib:jar")
            })
            .collect();
        assert_eq!(included.len(), 1);
        assert_eq!(graph.node(included[0]).effective_version(), Some("1"));
    }

    #[test]
    fn test_annotate_is_repeatable() {
        let mut graph = root_graph();
        let root = graph.root();
        graph.add_child(root, node("org", "lib", "1", Scope::Compile));
        graph.add_child(root, node("org", "lib", "2", Scope::Compile));

        let first = ConflictAnnotator::annotate(&mut graph);
        let second = ConflictAnnotator::annotate(&mut graph);
        assert_eq!(first, second);
    }
}
