//! Dependency graph construction and annotation
//!
//! This module builds the verbose (non-deduplicated) dependency graph of a
//! project, applies dependency management and marks every node with the
//! outcome of conflict mediation.

pub mod annotator;
pub mod builder;
pub mod collector;
pub mod coordinate;
pub mod graph;
pub mod management;
pub mod repository;

pub use annotator::{AnnotationReport, ConflictAnnotator, ConflictEntry};
pub use builder::{prune_transitive_test_dependencies, BuildError, VerboseGraphBuilder};
pub use collector::{CachingCollector, CollectError, Collector, DependencyCollector, InMemoryCollector};
pub use coordinate::{Coordinate, DependencyDeclaration, Exclusion, Scope};
pub use graph::{DependencyGraph, DependencyNode, DependencyStats, NodeId, NodeStatus, Omission};
pub use management::{DependencyManagement, ManagedDependency};
pub use repository::DescriptorRepository;
