//! Manifest validation with helpful error messages

use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

use super::manifest::{DependencyConfig, ManagementConfig, ProjectConfig};
use crate::dependency::coordinate::Scope;
use crate::error::{hints, DeptreeError};

/// Group ids: dot separated segments of letters, digits, `_` and `-`
fn group_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("group pattern is valid")
    })
}

/// Artifact names, types and classifiers
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("token pattern is valid"))
}

/// Validate the `[project]` section
pub fn validate_project(project: &ProjectConfig) -> Result<()> {
    validate_group(&project.group)?;
    validate_token("name", &project.name)?;
    validate_token("type", &project.kind)?;
    validate_version(&project.version)?;
    if let Some(classifier) = &project.classifier {
        validate_token("classifier", classifier)?;
    }
    Ok(())
}

/// Validate a `[[dependencies]]` entry
pub fn validate_dependency(dep: &DependencyConfig) -> Result<()> {
    validate_group(&dep.group)?;
    validate_token("name", &dep.name)?;
    validate_token("type", &dep.kind)?;
    validate_version(&dep.version)?;
    if let Some(classifier) = &dep.classifier {
        validate_token("classifier", classifier)?;
    }
    dep.scope()?;
    for exclusion in &dep.exclusions {
        if !exclusion.contains(':') {
            return Err(DeptreeError::config_error_with_hint(
                format!("Invalid exclusion '{}'", exclusion),
                None,
                "Exclusions are written as 'group:name', e.g. 'commons-logging:commons-logging'",
            )
            .into());
        }
    }
    Ok(())
}

/// Validate a `[[management]]` entry
pub fn validate_management(entry: &ManagementConfig) -> Result<()> {
    validate_group(&entry.group)?;
    validate_token("name", &entry.name)?;
    validate_token("type", &entry.kind)?;
    if let Some(classifier) = &entry.classifier {
        validate_token("classifier", classifier)?;
    }
    if let Some(version) = &entry.version {
        validate_version(version)?;
    }
    if let Some(scope) = &entry.scope {
        scope
            .parse::<Scope>()
            .with_context(|| format!("Invalid managed scope for {}", entry.key()))?;
    }
    if entry.version.is_none() && entry.scope.is_none() {
        return Err(DeptreeError::config_error_with_hint(
            format!("Management entry '{}' overrides nothing", entry.key()),
            None,
            "Set at least one of 'version' or 'scope'",
        )
        .into());
    }
    Ok(())
}

fn validate_group(group: &str) -> Result<()> {
    if !group_pattern().is_match(group) {
        return Err(DeptreeError::config_error_with_hint(
            format!("Invalid group '{}'", group),
            None,
            hints::coordinate_syntax(),
        )
        .into());
    }
    Ok(())
}

fn validate_token(field: &str, value: &str) -> Result<()> {
    if !token_pattern().is_match(value) {
        return Err(DeptreeError::config_error_with_hint(
            format!("Invalid {} '{}'", field, value),
            None,
            hints::coordinate_syntax(),
        )
        .into());
    }
    Ok(())
}

fn validate_version(version: &str) -> Result<()> {
    if version.trim().is_empty() || version.contains(char::is_whitespace) || version.contains(':') {
        return Err(DeptreeError::config_error_with_hint(
            format!("Invalid version '{}'", version),
            None,
            "Versions are opaque strings without spaces or ':', e.g. '1.0.0' or '0.1-SNAPSHOT'",
        )
        .into());
    }
    Ok(())
}
