//! deptree - verbose dependency tree analysis
//!
//! Builds the complete, non-deduplicated dependency graph of a project,
//! annotates every node with the outcome of Maven-style conflict mediation
//! (duplicates, scope and version conflicts, cycles, optional omissions) and
//! renders the result as a text tree, DOT, TGF, GraphML or JSON.
//!
//! ## Architecture
//!
//! ```text
//! manifest → builder → management overlay → annotator → render
//! ```

pub mod config;
pub mod dependency;
pub mod error;
pub mod render;
pub mod utils;

pub use config::Project;
pub use dependency::{AnnotationReport, BuildError, DependencyCollector, DependencyGraph};
pub use render::{serialize, serialize_as, OutputFormat, RenderError};

use dependency::{ConflictAnnotator, VerboseGraphBuilder};

/// An annotated graph together with the summary of its annotation pass
#[derive(Debug)]
pub struct AnnotatedGraph {
    pub graph: DependencyGraph,
    pub report: AnnotationReport,
}

/// Build, overlay and annotate the verbose dependency graph of `project`.
///
/// A collector failure aborts the whole analysis; no partial graph is returned.
pub fn build_verbose_graph(
    project: &Project,
    collector: &dyn DependencyCollector,
) -> Result<DependencyGraph, BuildError> {
    analyze(project, collector).map(|annotated| annotated.graph)
}

/// Same pipeline as [`build_verbose_graph`], keeping the annotation report
pub fn analyze(
    project: &Project,
    collector: &dyn DependencyCollector,
) -> Result<AnnotatedGraph, BuildError> {
    let mut graph = VerboseGraphBuilder::new(collector).build(project)?;
    project.management.apply(&mut graph);
    let report = ConflictAnnotator::annotate(&mut graph);
    Ok(AnnotatedGraph { graph, report })
}
