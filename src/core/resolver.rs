//! Resolution of candidate paths to their authoritative source files.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Last-modified time of a tracked file.
///
/// `ModifiedTime::ABSENT` (the Unix epoch) stands in for "no such file", so a
/// deleted file always compares unequal to any real baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModifiedTime(SystemTime);

impl ModifiedTime {
    /// The timestamp reported for paths that cannot be stat'ed.
    pub const ABSENT: ModifiedTime = ModifiedTime(UNIX_EPOCH);

    /// Wrap a raw system time.
    pub fn new(time: SystemTime) -> Self {
        Self(time)
    }

    /// Whether this is the "not found" timestamp.
    pub fn is_absent(&self) -> bool {
        *self == Self::ABSENT
    }

    /// Seconds since the Unix epoch with fractional precision.
    pub fn as_secs_f64(&self) -> f64 {
        self.0
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// The underlying system time.
    pub fn as_system_time(&self) -> SystemTime {
        self.0
    }
}

impl Default for ModifiedTime {
    fn default() -> Self {
        Self::ABSENT
    }
}

impl From<SystemTime> for ModifiedTime {
    fn from(time: SystemTime) -> Self {
        Self(time)
    }
}

impl From<Duration> for ModifiedTime {
    /// Build a timestamp from an offset since the Unix epoch.
    fn from(since_epoch: Duration) -> Self {
        Self(UNIX_EPOCH + since_epoch)
    }
}

impl fmt::Display for ModifiedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.as_secs_f64())
    }
}

/// Stat `path` and return its modified time, or `ABSENT` on any failure.
pub fn modified_time(path: impl AsRef<Path>) -> ModifiedTime {
    std::fs::metadata(path.as_ref())
        .and_then(|meta| meta.modified())
        .map(ModifiedTime)
        .unwrap_or(ModifiedTime::ABSENT)
}

/// Maps a compiled-artifact extension to the extension of its source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSuffix {
    compiled: String,
    source: String,
}

impl CompiledSuffix {
    /// Create a mapping, e.g. `CompiledSuffix::new("pyc", "py")`.
    ///
    /// Leading dots are ignored.
    pub fn new(compiled: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            compiled: compiled.into().trim_start_matches('.').to_string(),
            source: source.into().trim_start_matches('.').to_string(),
        }
    }

    /// The compiled-artifact extension.
    pub fn compiled(&self) -> &str {
        &self.compiled
    }

    /// The source extension.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn source_for(&self, path: &Path) -> Option<PathBuf> {
        let ext = path.extension()?;
        if ext != self.compiled.as_str() {
            return None;
        }
        let mut source = path.to_path_buf();
        source.set_extension(&self.source);
        Some(source)
    }
}

/// Bytecode caches that sit beside their sources.
fn default_suffixes() -> Vec<CompiledSuffix> {
    vec![CompiledSuffix::new("pyc", "py"), CompiledSuffix::new("pyo", "py")]
}

/// Resolves candidate paths to canonical source files and their modified time.
///
/// Resolution never fails: every filesystem error is treated as "not found".
///
/// # Examples
///
/// ```rust,no_run
/// use modtrack::core::PathResolver;
///
/// let resolver = PathResolver::new();
/// let (path, modified) = resolver.resolve("app/__init__.pyc");
/// if let Some(path) = path {
///     println!("{} last changed at {}", path.display(), modified);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PathResolver {
    suffixes: Vec<CompiledSuffix>,
}

impl PathResolver {
    /// Create a resolver with the default compiled-suffix conventions.
    pub fn new() -> Self {
        Self {
            suffixes: default_suffixes(),
        }
    }

    /// Create a resolver with an explicit list of suffix mappings.
    pub fn with_suffixes(suffixes: Vec<CompiledSuffix>) -> Self {
        Self { suffixes }
    }

    /// Add a compiled-suffix mapping.
    pub fn add_suffix(&mut self, suffix: CompiledSuffix) {
        if !self.suffixes.contains(&suffix) {
            self.suffixes.push(suffix);
        }
    }

    /// The configured suffix mappings.
    pub fn suffixes(&self) -> &[CompiledSuffix] {
        &self.suffixes
    }

    /// Resolve `path` to its authoritative file and current modified time.
    ///
    /// A compiled artifact resolves to its source when the source exists.
    /// A missing path walks up its ancestors: an ancestor that exists as a
    /// file (an archive the unit was loaded from) is returned, while reaching
    /// an existing directory or running out of components yields
    /// `(None, ModifiedTime::ABSENT)`.
    pub fn resolve(&self, path: impl AsRef<Path>) -> (Option<PathBuf>, ModifiedTime) {
        let mut candidate = path.as_ref().to_path_buf();

        while !candidate.as_os_str().is_empty() {
            if let Some(source) = self.source_for(&candidate) {
                if let Some(modified) = stat(&source) {
                    return (Some(canonical(&source)), modified);
                }
            }

            if let Some(modified) = stat(&candidate) {
                return (Some(canonical(&candidate)), modified);
            }

            candidate = match candidate.parent() {
                Some(parent) => parent.to_path_buf(),
                None => break,
            };
            if candidate.is_dir() {
                break;
            }
        }

        tracing::trace!(path = %path.as_ref().display(), "path did not resolve");
        (None, ModifiedTime::ABSENT)
    }

    fn source_for(&self, path: &Path) -> Option<PathBuf> {
        self.suffixes.iter().find_map(|suffix| suffix.source_for(path))
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn stat(path: &Path) -> Option<ModifiedTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(ModifiedTime)
        .ok()
}

/// Canonical form of an existing path; absolute and normalized if
/// canonicalization fails.
fn canonical(path: &Path) -> PathBuf {
    match path.canonicalize() {
        Ok(path) => path,
        Err(_) => {
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|dir| dir.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            };
            normalize(&absolute)
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            other => components.push(other),
        }
    }
    components.iter().collect()
}
