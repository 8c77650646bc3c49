//! Builder for constructing FileTracker instances.

use crate::core::{CompiledSuffix, FileTracker, PathResolver};
use crate::units::UnitRegistry;
use std::path::PathBuf;

/// Builder for constructing a [`FileTracker`].
///
/// # Examples
///
/// ```rust,no_run
/// use modtrack::prelude::*;
///
/// # fn example() -> Result<()> {
/// let tracker = FileTracker::builder(ManifestRegistry::load("units.yaml")?)
///     .with_compiled_suffix("tmplc", "tmpl")
///     .with_file("config/app.toml")
///     .scan_on_build(true)
///     .build();
/// # Ok(())
/// # }
/// ```
pub struct FileTrackerBuilder<R> {
    registry: R,
    suffixes: Vec<CompiledSuffix>,
    default_suffixes: bool,
    files: Vec<PathBuf>,
    scan_on_build: bool,
}

impl<R: UnitRegistry> FileTrackerBuilder<R> {
    /// Create a new builder over `registry` with default settings.
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            suffixes: Vec::new(),
            default_suffixes: true,
            files: Vec::new(),
            scan_on_build: false,
        }
    }

    /// Resolve files ending in `.{compiled}` to the sibling `.{source}` file.
    pub fn with_compiled_suffix(
        mut self,
        compiled: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        self.suffixes.push(CompiledSuffix::new(compiled, source));
        self
    }

    /// Drop the built-in bytecode suffix conventions.
    pub fn without_default_suffixes(mut self) -> Self {
        self.default_suffixes = false;
        self
    }

    /// Track an additional file once the tracker is built.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Track several additional files once the tracker is built.
    pub fn with_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Run the unit scan during `build` instead of on first use.
    pub fn scan_on_build(mut self, scan: bool) -> Self {
        self.scan_on_build = scan;
        self
    }

    /// Build the tracker.
    pub fn build(self) -> FileTracker<R> {
        let mut resolver = if self.default_suffixes {
            PathResolver::new()
        } else {
            PathResolver::with_suffixes(Vec::new())
        };
        for suffix in self.suffixes {
            resolver.add_suffix(suffix);
        }

        let tracker = FileTracker::from_parts(self.registry, resolver);
        if self.scan_on_build {
            tracker.ensure_scanned();
        }
        if !self.files.is_empty() {
            tracker.track_all(&self.files);
        }
        tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::ManifestRegistry;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builder_accumulates_files() {
        let builder = FileTrackerBuilder::new(ManifestRegistry::empty())
            .with_file("a.toml")
            .with_files(["b.toml", "c.toml"]);

        assert_eq!(builder.files.len(), 3);
    }

    #[test]
    fn test_builder_tracks_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.toml");
        fs::write(&path, "port = 1").unwrap();

        let tracker = FileTrackerBuilder::new(ManifestRegistry::empty())
            .with_file(&path)
            .with_file(temp_dir.path().join("missing.toml"))
            .build();

        assert_eq!(tracker.len(), 1);
        assert!(tracker.contains(path.canonicalize().unwrap()));
    }

    #[test]
    fn test_builder_suffixes() {
        let tracker = FileTrackerBuilder::new(ManifestRegistry::empty())
            .without_default_suffixes()
            .with_compiled_suffix("tmplc", "tmpl")
            .build();

        let suffixes = tracker.resolver().suffixes();
        assert_eq!(suffixes.len(), 1);
        assert_eq!(suffixes[0].compiled(), "tmplc");
        assert_eq!(suffixes[0].source(), "tmpl");
    }

    #[test]
    fn test_scan_on_build() {
        let tracker = FileTrackerBuilder::new(ManifestRegistry::empty())
            .scan_on_build(true)
            .build();
        assert!(tracker.is_scanned());
    }
}
