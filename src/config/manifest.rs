//! Project manifest parsing
//!
//! The same TOML shape describes both the analyzed project (`deptree.toml`)
//! and every artifact descriptor stored in a descriptor repository.
//!
//! ```toml
//! [project]
//! group = "com.google"
//! name = "rootArtifact"
//! version = "1.0.0"
//!
//! [[dependencies]]
//! group = "org.apache"
//! name = "left"
//! type = "xml"
//! version = "0.1-SNAPSHOT"
//! scope = "test"
//!
//! [[management]]
//! group = "org.xyz"
//! name = "right"
//! type = "zip"
//! version = "2"
//!
//! [settings]
//! repository = "repo"
//! format = "dot"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::config::validation;
use crate::dependency::coordinate::{
    Coordinate, DependencyDeclaration, Exclusion, Scope, DEFAULT_TYPE,
};
use crate::dependency::management::{DependencyManagement, ManagedDependency};

/// Default manifest file name
pub const MANIFEST_NAME: &str = "deptree.toml";

/// Root configuration from a manifest file
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// The artifact this manifest describes
    pub project: Option<ProjectConfig>,

    /// Direct dependencies, in declaration order
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,

    /// Dependency management overrides
    #[serde(default)]
    pub management: Vec<ManagementConfig>,

    /// Tool settings (only meaningful for the analyzed project)
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// `[project]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub group: String,
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    pub version: String,
    pub classifier: Option<String>,
}

/// A `[[dependencies]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyConfig {
    pub group: String,
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    pub version: String,
    pub classifier: Option<String>,

    /// Scope name (defaults to compile)
    pub scope: Option<String>,

    #[serde(default)]
    pub optional: bool,

    /// `group:name` pairs; recorded but never applied
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// A `[[management]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct ManagementConfig {
    pub group: String,
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    pub classifier: Option<String>,
    pub version: Option<String>,
    pub scope: Option<String>,
}

/// `[settings]` section; command-line flags take precedence
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SettingsConfig {
    /// Descriptor repository, relative to the manifest directory
    pub repository: Option<PathBuf>,

    /// Output format name
    pub format: Option<String>,

    /// Treat artifacts without a descriptor as leaves
    #[serde(default, alias = "allow_missing")]
    pub allow_missing: bool,

    /// Memoize descriptor lookups (default: true)
    pub cache: Option<bool>,
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

/// Everything the verbose graph builder needs to know about a project
#[derive(Debug, Clone)]
pub struct Project {
    pub coordinate: Coordinate,
    pub dependencies: Vec<DependencyDeclaration>,
    pub management: DependencyManagement,
}

impl Project {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            dependencies: Vec::new(),
            management: DependencyManagement::new(),
        }
    }

    pub fn with_dependency(mut self, declaration: DependencyDeclaration) -> Self {
        self.dependencies.push(declaration);
        self
    }

    pub fn with_management(mut self, management: DependencyManagement) -> Self {
        self.management = management;
        self
    }
}

impl ProjectConfig {
    pub fn to_coordinate(&self) -> Coordinate {
        let coordinate = Coordinate::new(&self.group, &self.name, &self.kind, &self.version);
        match &self.classifier {
            Some(classifier) => coordinate.with_classifier(classifier),
            None => coordinate,
        }
    }
}

impl DependencyConfig {
    pub fn to_coordinate(&self) -> Coordinate {
        let coordinate = Coordinate::new(&self.group, &self.name, &self.kind, &self.version);
        match &self.classifier {
            Some(classifier) => coordinate.with_classifier(classifier),
            None => coordinate,
        }
    }

    /// Parsed scope, defaulting to compile
    pub fn scope(&self) -> Result<Scope> {
        match &self.scope {
            Some(scope) => Ok(scope.parse()?),
            None => Ok(Scope::default()),
        }
    }

    pub fn to_declaration(&self) -> Result<DependencyDeclaration> {
        let exclusions = self
            .exclusions
            .iter()
            .map(|e| e.parse::<Exclusion>().map_err(anyhow::Error::msg))
            .collect::<Result<Vec<_>>>()?;

        Ok(DependencyDeclaration::new(self.to_coordinate(), self.scope()?)
            .optional(self.optional)
            .with_exclusions(exclusions))
    }
}

impl ManagementConfig {
    /// `group:name:type[:classifier]`
    pub fn key(&self) -> String {
        let mut key = format!("{}:{}:{}", self.group, self.name, self.kind);
        if let Some(classifier) = &self.classifier {
            key.push(':');
            key.push_str(classifier);
        }
        key
    }

    pub fn to_managed(&self) -> Result<ManagedDependency> {
        let scope = match &self.scope {
            Some(scope) => Some(scope.parse::<Scope>()?),
            None => None,
        };
        Ok(ManagedDependency {
            version: self.version.clone(),
            scope,
        })
    }
}

impl Manifest {
    /// Load a manifest from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid manifest {}", path.display()))
    }

    /// Parse a manifest from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content).context("Failed to parse manifest TOML")?;

        let Some(project) = &manifest.project else {
            bail!("Manifest must contain a [project] section");
        };
        validation::validate_project(project)?;

        for dep in &manifest.dependencies {
            validation::validate_dependency(dep)
                .with_context(|| format!("Invalid dependency: {}:{}", dep.group, dep.name))?;
        }

        for entry in &manifest.management {
            validation::validate_management(entry)
                .with_context(|| format!("Invalid management entry: {}", entry.key()))?;
        }

        Ok(manifest)
    }

    /// Get the project section, returning an error if not present
    pub fn require_project(&self) -> Result<&ProjectConfig> {
        self.project
            .as_ref()
            .context("This operation requires a [project] section in the manifest")
    }

    /// Direct dependency declarations in declaration order
    pub fn declarations(&self) -> Result<Vec<DependencyDeclaration>> {
        self.dependencies
            .iter()
            .map(|dep| {
                dep.to_declaration()
                    .with_context(|| format!("Invalid dependency: {}:{}", dep.group, dep.name))
            })
            .collect()
    }

    /// Dependency management table
    pub fn dependency_management(&self) -> Result<DependencyManagement> {
        self.management
            .iter()
            .map(|entry| -> Result<(String, ManagedDependency)> {
                Ok((entry.key(), entry.to_managed()?))
            })
            .collect()
    }

    /// Build the core [`Project`] value
    pub fn to_project(&self) -> Result<Project> {
        let project = self.require_project()?;
        Ok(Project {
            coordinate: project.to_coordinate(),
            dependencies: self.declarations()?,
            management: self.dependency_management()?,
        })
    }
}
