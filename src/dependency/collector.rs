//! Children-expansion capability
//!
//! A collector answers one question: which dependencies does a given artifact
//! declare? The verbose graph builder calls it once per expanded node and never
//! caches results itself; [`CachingCollector`] adds memoization on top of any
//! other collector.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing::trace;

use crate::dependency::coordinate::{Coordinate, DependencyDeclaration};
use crate::dependency::repository::DescriptorRepository;

/// Failure to expand an artifact into its declared dependencies
#[derive(Error, Debug)]
pub enum CollectError {
    /// No descriptor exists for the artifact
    #[error("no descriptor found for '{coordinate}'")]
    NotFound {
        coordinate: Coordinate,
        searched: Option<PathBuf>,
    },

    /// The descriptor exists but could not be read
    #[error("failed to read descriptor {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The descriptor could not be parsed
    #[error("invalid descriptor {path}")]
    InvalidDescriptor {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Expands a single artifact into its own direct dependency declarations
pub trait DependencyCollector: Send + Sync {
    fn collect(&self, coordinate: &Coordinate) -> Result<Vec<DependencyDeclaration>, CollectError>;
}

impl<C: DependencyCollector + ?Sized> DependencyCollector for &C {
    fn collect(&self, coordinate: &Coordinate) -> Result<Vec<DependencyDeclaration>, CollectError> {
        (**self).collect(coordinate)
    }
}

/// Collector backed by an in-memory map, for embedding and tests.
///
/// Unknown coordinates are leaves unless the collector is strict.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollector {
    declarations: HashMap<Coordinate, Vec<DependencyDeclaration>>,
    strict: bool,
}

impl InMemoryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`CollectError::NotFound`] for coordinates that were never registered
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Register the dependencies declared by `coordinate`
    pub fn insert(&mut self, coordinate: Coordinate, declarations: Vec<DependencyDeclaration>) {
        self.declarations.insert(coordinate, declarations);
    }

    pub fn with(mut self, coordinate: Coordinate, declarations: Vec<DependencyDeclaration>) -> Self {
        self.insert(coordinate, declarations);
        self
    }
}

impl DependencyCollector for InMemoryCollector {
    fn collect(&self, coordinate: &Coordinate) -> Result<Vec<DependencyDeclaration>, CollectError> {
        match self.declarations.get(coordinate) {
            Some(declarations) => Ok(declarations.clone()),
            None if self.strict => Err(CollectError::NotFound {
                coordinate: coordinate.clone(),
                searched: None,
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Memoizes successful expansions of an inner collector
#[derive(Debug)]
pub struct CachingCollector<C> {
    inner: C,
    cache: Mutex<HashMap<Coordinate, Vec<DependencyDeclaration>>>,
}

impl<C: DependencyCollector> CachingCollector<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached coordinates
    pub fn cached(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: DependencyCollector> DependencyCollector for CachingCollector<C> {
    fn collect(&self, coordinate: &Coordinate) -> Result<Vec<DependencyDeclaration>, CollectError> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(coordinate) {
                trace!(coordinate = %coordinate, "collector cache hit");
                return Ok(hit.clone());
            }
        }

        let declarations = self.inner.collect(coordinate)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(coordinate.clone(), declarations.clone());
        }
        Ok(declarations)
    }
}

/// The collector variant chosen once at startup
#[derive(Debug)]
pub enum Collector {
    Repository(DescriptorRepository),
    Cached(CachingCollector<DescriptorRepository>),
}

impl Collector {
    /// Select the collector for a descriptor repository
    pub fn for_repository(repository: DescriptorRepository, cache: bool) -> Self {
        if cache {
            Collector::Cached(CachingCollector::new(repository))
        } else {
            Collector::Repository(repository)
        }
    }

    pub fn repository(&self) -> &DescriptorRepository {
        match self {
            Collector::Repository(repository) => repository,
            Collector::Cached(cached) => cached.inner(),
        }
    }
}

impl DependencyCollector for Collector {
    fn collect(&self, coordinate: &Coordinate) -> Result<Vec<DependencyDeclaration>, CollectError> {
        match self {
            Collector::Repository(repository) => repository.collect(coordinate),
            Collector::Cached(cached) => cached.collect(coordinate),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::dependency::coordinate::Scope;

    struct CountingCollector {
        calls: AtomicUsize,
    }

    impl DependencyCollector for CountingCollector {
        fn collect(&self, coordinate: &Coordinate) -> Result<Vec<DependencyDeclaration>, CollectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if coordinate.name == "missing" {
                return Err(CollectError::NotFound {
                    coordinate: coordinate.clone(),
                    searched: None,
                });
            }
            Ok(vec![DependencyDeclaration::new(
                Coordinate::new("org.child", "leaf", "jar", "1"),
                Scope::Compile,
            )])
        }
    }

    #[test]
    fn test_in_memory_lenient_and_strict() {
        let known = Coordinate::new("g", "known", "jar", "1");
        let unknown = Coordinate::new("g", "unknown", "jar", "1");
        let child = DependencyDeclaration::new(Coordinate::new("g", "child", "jar", "1"), Scope::Compile);

        let collector = InMemoryCollector::new().with(known.clone(), vec![child.clone()]);
        assert_eq!(collector.collect(&known).unwrap(), vec![child]);
        assert!(collector.collect(&unknown).unwrap().is_empty());

        let strict = collector.strict();
        assert!(matches!(
            strict.collect(&unknown),
            Err(CollectError::NotFound { .. })
        ));
    }

    #[test]
    fn test_caching_collector_memoizes_success_only() {
        let caching = CachingCollector::new(CountingCollector {
            calls: AtomicUsize::new(0),
        });
        let coordinate = Coordinate::new("g", "a", "jar", "1");
        let missing = Coordinate::new("g", "missing", "jar", "1");

        assert_eq!(caching.collect(&coordinate).unwrap().len(), 1);
        assert_eq!(caching.collect(&coordinate).unwrap().len(), 1);
        assert_eq!(caching.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(caching.cached(), 1);

        assert!(caching.collect(&missing).is_err());
        assert!(caching.collect(&missing).is_err());
        assert_eq!(caching.inner().calls.load(Ordering::SeqCst), 3);
        assert_eq!(caching.cached(), 1);
    }
}
