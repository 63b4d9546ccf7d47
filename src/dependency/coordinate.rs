//! Dependency coordinates and scopes
//!
//! A [`Coordinate`] identifies an artifact (group, name, type, classifier, version).
//! Scope and the optional flag belong to the declaration that requested it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Default artifact type when a declaration does not name one
pub const DEFAULT_TYPE: &str = "jar";

/// Usage category of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    System,
}

impl Scope {
    /// All scopes in canonical order
    pub const ALL: [Scope; 5] = [
        Scope::Compile,
        Scope::Provided,
        Scope::Runtime,
        Scope::Test,
        Scope::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Provided => "provided",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
            Scope::System => "system",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown scope name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope '{0}' (expected one of compile, provided, runtime, test, system)")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .iter()
            .copied()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| UnknownScope(s.to_string()))
    }
}

/// Immutable artifact identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Coordinate {
    pub group: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            kind: kind.into(),
            version: version.into(),
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// `group:name:type[:classifier]`, shared by conflict detection and
    /// dependency management lookups
    pub fn versionless_key(&self) -> String {
        let mut key = format!("{}:{}:{}", self.group, self.name, self.kind);
        if let Some(classifier) = &self.classifier {
            key.push(':');
            key.push_str(classifier);
        }
        key
    }

    /// Key used to look up dependency management overrides
    pub fn management_key(&self) -> String {
        self.versionless_key()
    }

    /// `group:name:type[:classifier]:version[:scope]` with the version replaced
    pub fn coordinate_string(&self, version: &str, scope: Option<Scope>) -> String {
        let mut s = self.versionless_key();
        s.push(':');
        s.push_str(version);
        if let Some(scope) = scope {
            s.push(':');
            s.push_str(scope.as_str());
        }
        s
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.versionless_key(), self.version)
    }
}

/// An excluded `group:name` pair recorded on a declaration.
///
/// Exclusions are carried as metadata only; the verbose graph never applies them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Exclusion {
    pub group: String,
    pub name: String,
}

impl FromStr for Exclusion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((group, name)) if !group.is_empty() && !name.is_empty() => Ok(Self {
                group: group.to_string(),
                name: name.to_string(),
            }),
            _ => Err(format!("invalid exclusion '{}', expected 'group:name'", s)),
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

/// A single request for a dependency, as returned by a collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    pub coordinate: Coordinate,
    pub scope: Scope,
    pub optional: bool,
    pub exclusions: Vec<Exclusion>,
}

impl DependencyDeclaration {
    pub fn new(coordinate: Coordinate, scope: Scope) -> Self {
        Self {
            coordinate,
            scope,
            optional: false,
            exclusions: Vec::new(),
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<Exclusion>) -> Self {
        self.exclusions = exclusions;
        self
    }
}
