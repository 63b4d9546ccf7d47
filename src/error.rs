//! Error types and helpers for user-friendly error messages
//!
//! This module provides error types with actionable hints so that configuration
//! mistakes and resolution failures tell the user what to do next.

use thiserror::Error;

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum DeptreeError {
    /// Manifest or settings errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// A dependency could not be expanded
    #[error("Resolution failed for '{dependency}': {message}")]
    Resolution {
        dependency: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// Unknown output format requested
    #[error("Unsupported output format '{format}'")]
    Format { format: String, hint: String },
}

impl DeptreeError {
    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create a resolution error wrapping its cause
    pub fn resolution_error(
        dependency: impl Into<String>,
        message: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Self::Resolution {
            dependency: dependency.into(),
            message: message.into(),
            source: Some(source),
            hint: Some(hints::dependency_resolution().to_string()),
        }
    }

    /// Create an unsupported format error
    pub fn format_error(format: impl Into<String>) -> Self {
        Self::Format {
            format: format.into(),
            hint: hints::output_formats().to_string(),
        }
    }

    /// The hint attached to this error, if any
    pub fn hint(&self) -> Option<&str> {
        match self {
            DeptreeError::Config { hint, .. } | DeptreeError::Resolution { hint, .. } => {
                hint.as_deref()
            }
            DeptreeError::Format { hint, .. } => Some(hint),
        }
    }
}

/// Print an error chain with formatting, plus the hint of the first
/// [`DeptreeError`] found in the chain
pub fn display_with_hints(err: &anyhow::Error) {
    use console::style;

    eprintln!("\n{} {}", style("ERROR:").red().bold(), err);

    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", style("caused by:").dim(), cause);
    }

    let hint = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<DeptreeError>())
        .and_then(DeptreeError::hint);
    if let Some(hint) = hint {
        eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
    }

    eprintln!();
}

/// Common error hints
pub mod hints {
    /// Get hint for coordinate syntax errors
    pub fn coordinate_syntax() -> &'static str {
        "Coordinates use Maven-style identifiers:\n\
         • group: dot separated, e.g. 'org.apache.commons'\n\
         • name/type/classifier: letters, digits, '.', '_' or '-'\n\
         • Example: group = \"com.google.guava\", name = \"guava\", type = \"jar\""
    }

    /// Get hint for a missing manifest
    pub fn manifest_not_found() -> &'static str {
        "Could not find deptree.toml.\n\
         \n\
         Pass the manifest explicitly:\n\
         • Run: deptree tree --manifest path/to/deptree.toml"
    }

    /// Get hint for dependency resolution failure
    pub fn dependency_resolution() -> &'static str {
        "Dependency resolution failed. Try:\n\
         • Check the coordinates and versions in the manifest\n\
         • Check that the descriptor repository contains\n\
           <group path>/<name>/<version>/<name>-<version>.toml\n\
         • Pass --allow-missing to treat artifacts without a descriptor as leaves"
    }

    /// Get hint for unknown output formats
    pub fn output_formats() -> &'static str {
        "Supported formats: text, dot, tgf, graphml, json"
    }
}
