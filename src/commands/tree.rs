//! Tree command - Display the annotated verbose dependency tree
//!
//! Usage:
//!   deptree tree                              # Analyze ./deptree.toml
//!   deptree tree --manifest a.toml -m b.toml  # Analyze several projects
//!   deptree tree --format dot                 # Output as Graphviz DOT
//!   deptree tree --format graphml -o deps.graphml
//!   deptree tree --summary --conflicts        # Report mediation outcome

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use rayon::prelude::*;
use tracing::debug;

use deptree::config::{Manifest, MANIFEST_NAME};
use deptree::dependency::{AnnotationReport, Collector, DependencyStats, DescriptorRepository};
use deptree::error::{hints, DeptreeError};
use deptree::utils::terminal::{create_spinner, print_success, print_warning};
use deptree::{serialize, OutputFormat};

/// Display the annotated verbose dependency tree
#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Project manifest to analyze; repeat to analyze several projects
    #[arg(long, short = 'm', value_name = "FILE")]
    pub manifest: Vec<PathBuf>,

    /// Descriptor repository (default: [settings] repository of the manifest)
    #[arg(long, short = 'r', value_name = "DIR", env = "DEPTREE_REPOSITORY")]
    pub repository: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the output to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Treat artifacts without a descriptor as leaves
    #[arg(long)]
    pub allow_missing: bool,

    /// Do not memoize descriptor lookups
    #[arg(long)]
    pub no_cache: bool,

    /// Print per-outcome counts to stderr
    #[arg(long)]
    pub summary: bool,

    /// List version and scope conflicts on stderr
    #[arg(long)]
    pub conflicts: bool,
}

/// Result of analyzing one manifest
#[derive(Debug)]
struct Analysis {
    project: String,
    rendered: String,
    report: AnnotationReport,
    stats: DependencyStats,
    /// Printed once the spinner is cleared
    warnings: Vec<String>,
}

impl TreeCommand {
    /// Execute the tree command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let manifests = if self.manifest.is_empty() {
            vec![PathBuf::from(MANIFEST_NAME)]
        } else {
            self.manifest.clone()
        };

        for path in &manifests {
            if !path.is_file() {
                return Err(DeptreeError::config_error_with_hint(
                    format!("Manifest not found: {}", path.display()),
                    None,
                    hints::manifest_not_found(),
                )
                .into());
            }
        }

        let spinner = (!verbose).then(|| {
            create_spinner(&format!("Resolving {} project(s)...", manifests.len()))
        });

        let results: Vec<Result<Analysis>> = manifests
            .par_iter()
            .map(|path| self.analyze(path))
            .collect();

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        for analysis in results.iter().flatten() {
            for warning in &analysis.warnings {
                print_warning(warning);
            }
        }

        let analyses = results.into_iter().collect::<Result<Vec<_>>>()?;

        let rendered: String = analyses.iter().map(|a| a.rendered.as_str()).collect();
        match &self.output {
            Some(path) => {
                fs::write(path, &rendered)
                    .with_context(|| format!("Failed to write output to {}", path.display()))?;
                print_success(&format!("Dependency tree written to {}", path.display()));
            }
            None => print!("{}", rendered),
        }

        for analysis in &analyses {
            if self.summary {
                Self::print_summary(analysis);
            }
            if self.conflicts {
                Self::print_conflicts(analysis);
            }
        }

        Ok(())
    }

    /// Load, resolve, annotate and render one manifest
    fn analyze(&self, path: &Path) -> Result<Analysis> {
        let manifest = Manifest::load_from_path(path)?;
        let project = manifest.to_project()?;
        let mut warnings = Vec::new();
        if project.dependencies.is_empty() {
            warnings.push(format!("{} declares no dependencies", project.coordinate));
        }
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let repository = match (&self.repository, &manifest.settings.repository) {
            (Some(dir), _) => dir.clone(),
            (None, Some(dir)) => base_dir.join(dir),
            (None, None) => {
                return Err(DeptreeError::config_error_with_hint(
                    format!("No descriptor repository configured for {}", path.display()),
                    None,
                    "Pass --repository <DIR>, set DEPTREE_REPOSITORY, or add\n\
                     [settings]\n\
                     repository = \"path/to/repository\"",
                )
                .into());
            }
        };

        let format = match (self.format, &manifest.settings.format) {
            (Some(format), _) => format,
            (None, Some(name)) => name
                .parse::<OutputFormat>()
                .map_err(|_| DeptreeError::format_error(name.as_str()))?,
            (None, None) => OutputFormat::default(),
        };

        let allow_missing = self.allow_missing || manifest.settings.allow_missing;
        let cache = !self.no_cache && manifest.settings.cache.unwrap_or(true);
        debug!(
            manifest = %path.display(),
            repository = %repository.display(),
            %format,
            allow_missing,
            cache,
            "analyzing project"
        );

        let collector = Collector::for_repository(
            DescriptorRepository::new(repository).allow_missing(allow_missing),
            cache,
        );

        let annotated = deptree::analyze(&project, &collector).map_err(|err| {
            DeptreeError::resolution_error(
                err.coordinate().to_string(),
                format!("while analyzing {}", project.coordinate),
                anyhow::Error::new(err),
            )
        })?;

        Ok(Analysis {
            project: project.coordinate.to_string(),
            rendered: serialize(&annotated.graph, format),
            stats: annotated.graph.stats(),
            report: annotated.report,
            warnings,
        })
    }

    fn print_summary(analysis: &Analysis) {
        eprintln!("\n{}", style(&analysis.project).bold());
        eprintln!("Nodes:             {}", analysis.stats.node_count);
        eprintln!("Direct:            {}", analysis.stats.direct_count);
        eprintln!("Transitive:        {}", analysis.stats.transitive_count);
        eprintln!("Max depth:         {}", analysis.stats.max_depth);
        eprint!("{}", analysis.report);
    }

    fn print_conflicts(analysis: &Analysis) {
        let conflicts = &analysis.report.conflicts;
        if conflicts.is_empty() {
            eprintln!("\n✓ No conflicts detected in {}", analysis.project);
            return;
        }

        eprintln!(
            "\n{} {} conflict(s) in {}",
            style("⚠").yellow(),
            conflicts.len(),
            analysis.project
        );
        for conflict in conflicts {
            eprintln!("  📦 {}", conflict);
        }
    }
}
