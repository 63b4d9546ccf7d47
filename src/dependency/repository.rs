//! Filesystem descriptor repository
//!
//! Each artifact's own manifest is stored at
//! `<root>/<group as path>/<name>/<version>/<name>-<version>.toml`, mirroring
//! the usual Maven repository layout. The descriptor is looked up by group,
//! name and version only; type and classifier share one descriptor.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Manifest;
use crate::dependency::collector::{CollectError, DependencyCollector};
use crate::dependency::coordinate::{Coordinate, DependencyDeclaration};

/// Directory of artifact descriptors
#[derive(Debug, Clone)]
pub struct DescriptorRepository {
    root: PathBuf,
    allow_missing: bool,
}

impl DescriptorRepository {
    /// Create a strict repository: a missing descriptor is a resolution failure
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            allow_missing: false,
        }
    }

    /// Treat artifacts without a descriptor as leaves
    pub fn allow_missing(mut self, allow: bool) -> Self {
        self.allow_missing = allow;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the descriptor for `coordinate`
    pub fn descriptor_path(&self, coordinate: &Coordinate) -> PathBuf {
        let mut path = self.root.clone();
        for segment in coordinate.group.split('.') {
            path.push(segment);
        }
        path.push(&coordinate.name);
        path.push(&coordinate.version);
        path.push(format!("{}-{}.toml", coordinate.name, coordinate.version));
        path
    }
}

impl DependencyCollector for DescriptorRepository {
    fn collect(&self, coordinate: &Coordinate) -> Result<Vec<DependencyDeclaration>, CollectError> {
        let path = self.descriptor_path(coordinate);

        if !path.exists() {
            if self.allow_missing {
                warn!(coordinate = %coordinate, path = %path.display(), "descriptor not found, treating as leaf");
                return Ok(Vec::new());
            }
            return Err(CollectError::NotFound {
                coordinate: coordinate.clone(),
                searched: Some(path),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| CollectError::Io {
            path: path.clone(),
            source,
        })?;

        let declarations = Manifest::parse(&content)
            .and_then(|manifest| manifest.declarations())
            .map_err(|source| CollectError::InvalidDescriptor {
                path: path.clone(),
                source,
            })?;

        debug!(
            coordinate = %coordinate,
            count = declarations.len(),
            "collected dependencies from descriptor"
        );
        Ok(declarations)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::dependency::coordinate::Scope;

    fn write_descriptor(repo: &DescriptorRepository, coordinate: &Coordinate, body: &str) {
        let path = repo.descriptor_path(coordinate);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_descriptor_path_layout() {
        let repo = DescriptorRepository::new("/repo");
        let coordinate = Coordinate::new("org.apache.commons", "lang", "jar", "3.1");
        assert_eq!(
            repo.descriptor_path(&coordinate),
            PathBuf::from("/repo/org/apache/commons/lang/3.1/lang-3.1.toml")
        );
    }

    #[test]
    fn test_collect_reads_declarations() {
        let temp_dir = TempDir::new().unwrap();
        let repo = DescriptorRepository::new(temp_dir.path());
        let coordinate = Coordinate::new("org.lib", "core", "jar", "1.0");

        write_descriptor(
            &repo,
            &coordinate,
            r#"
[project]
group = "org.lib"
name = "core"
version = "1.0"

[[dependencies]]
group = "org.lib"
name = "util"
version = "2.0"
scope = "runtime"

[[dependencies]]
group = "org.lib"
name = "extra"
version = "1.1"
optional = true
"#,
        );

        let declarations = repo.collect(&coordinate).unwrap();
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].coordinate.name, "util");
        assert_eq!(declarations[0].scope, Scope::Runtime);
        assert!(declarations[1].optional);
    }

    #[test]
    fn test_missing_descriptor_strict_and_lenient() {
        let temp_dir = TempDir::new().unwrap();
        let coordinate = Coordinate::new("org.lib", "absent", "jar", "1.0");

        let strict = DescriptorRepository::new(temp_dir.path());
        match strict.collect(&coordinate) {
            Err(CollectError::NotFound { searched, .. }) => {
                assert!(searched.unwrap().ends_with("absent-1.0.toml"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let lenient = DescriptorRepository::new(temp_dir.path()).allow_missing(true);
        assert!(lenient.collect(&coordinate).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_descriptor_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let repo = DescriptorRepository::new(temp_dir.path()).allow_missing(true);
        let coordinate = Coordinate::new("org.lib", "broken", "jar", "1.0");
        write_descriptor(&repo, &coordinate, "this is not toml = [");

        assert!(matches!(
            repo.collect(&coordinate),
            Err(CollectError::InvalidDescriptor { .. })
        ));
    }
}
