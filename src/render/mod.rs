//! Serialization of annotated dependency graphs
//!
//! Every format is an emitter driven by the shared depth-first [`walker`], so
//! all formats agree on which nodes appear, in which order, and with which
//! labels.

pub mod dot;
pub mod graphml;
pub mod json;
pub mod label;
pub mod text;
pub mod tgf;
pub mod walker;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use thiserror::Error;

use crate::dependency::graph::DependencyGraph;

use self::dot::DotEmitter;
use self::graphml::GraphmlEmitter;
use self::json::JsonEmitter;
use self::text::TextEmitter;
use self::tgf::TgfEmitter;
use self::walker::walk;

/// Output format for a rendered graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Indented text tree (default)
    #[default]
    Text,
    /// Graphviz DOT
    Dot,
    /// Trivial Graph Format
    Tgf,
    /// GraphML (yEd)
    Graphml,
    /// Nested JSON
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Text,
        OutputFormat::Dot,
        OutputFormat::Tgf,
        OutputFormat::Graphml,
        OutputFormat::Json,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Dot => "dot",
            OutputFormat::Tgf => "tgf",
            OutputFormat::Graphml => "graphml",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialization failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unsupported output format '{0}' (expected one of text, dot, tgf, graphml, json)")]
    UnsupportedFormat(String),
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| RenderError::UnsupportedFormat(s.to_string()))
    }
}

/// Render `graph` in `format`
pub fn serialize(graph: &DependencyGraph, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut emitter = TextEmitter::default();
            walk(graph, &mut emitter);
            emitter.finish()
        }
        OutputFormat::Dot => {
            let mut emitter = DotEmitter::default();
            walk(graph, &mut emitter);
            emitter.finish()
        }
        OutputFormat::Tgf => {
            let mut emitter = TgfEmitter::default();
            walk(graph, &mut emitter);
            emitter.finish()
        }
        OutputFormat::Graphml => {
            let mut emitter = GraphmlEmitter::default();
            walk(graph, &mut emitter);
            emitter.finish()
        }
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::default();
            walk(graph, &mut emitter);
            emitter.finish()
        }
    }
}

/// Render `graph` in the format named `format`, failing on unknown names
pub fn serialize_as(graph: &DependencyGraph, format: &str) -> Result<String, RenderError> {
    Ok(serialize(graph, format.parse()?))
}
