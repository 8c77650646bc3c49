//! The tracker context owning the inventory.

use crate::core::{FileTrackerBuilder, Inventory, IntoTrackedPaths, ModifiedTime, PathResolver};
use crate::units::{InventoryScan, ManifestRegistry, UnitRegistry};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Tracks the files of a running process and reports which have changed.
///
/// The tracker owns the inventory. The unit scan runs lazily, once, on the
/// first call to [`files`](Self::files); manual tracking can happen at any
/// time. All methods take `&self`, so a tracker is usually shared in an
/// `Arc` between the code that tracks files and a detection hook.
///
/// # Examples
///
/// ```rust,no_run
/// use modtrack::prelude::*;
///
/// # fn example() -> Result<()> {
/// let tracker = FileTracker::new(ManifestRegistry::load("units.yaml")?);
/// tracker.track("config.ini");
///
/// // First call scans the unit graph
/// let files = tracker.files();
/// println!("tracking {} files", files.len());
///
/// for path in tracker.modified() {
///     println!("{} changed", path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileTracker<R = ManifestRegistry> {
    /// Loaded units to scan
    registry: R,
    /// Resolver shared by scans and manual tracking
    resolver: PathResolver,
    /// Path → baseline table
    inventory: RwLock<Inventory>,
    /// Number of files the one-shot scan added, once it has run
    scanned: OnceLock<usize>,
}

impl FileTracker<ManifestRegistry> {
    /// Create a tracker with no unit registry; files come only from
    /// manual tracking.
    pub fn without_units() -> Self {
        Self::new(ManifestRegistry::empty())
    }
}

impl<R: UnitRegistry> FileTracker<R> {
    /// Create a tracker over `registry` with default resolution rules.
    pub fn new(registry: R) -> Self {
        FileTrackerBuilder::new(registry).build()
    }

    /// Create a builder for a tracker over `registry`.
    pub fn builder(registry: R) -> FileTrackerBuilder<R> {
        FileTrackerBuilder::new(registry)
    }

    pub(crate) fn from_parts(registry: R, resolver: PathResolver) -> Self {
        Self {
            registry,
            resolver,
            inventory: RwLock::new(Inventory::new()),
            scanned: OnceLock::new(),
        }
    }

    /// Scan the unit graph if it has not been scanned yet.
    ///
    /// Only the first call scans; concurrent first callers wait for it.
    /// Returns the number of files the scan added.
    pub fn ensure_scanned(&self) -> usize {
        *self.scanned.get_or_init(|| {
            let mut inventory = self.inventory.write();
            let added =
                InventoryScan::new(&self.registry, &self.resolver).scan_entry_point(&mut inventory);
            tracing::info!(added, total = inventory.len(), "initial unit scan complete");
            added
        })
    }

    /// Whether the one-shot scan has run.
    pub fn is_scanned(&self) -> bool {
        self.scanned.get().is_some()
    }

    /// Snapshot of every tracked file and its baseline.
    ///
    /// Triggers the unit scan on first use; later calls return the current
    /// inventory without rescanning.
    pub fn files(&self) -> Inventory {
        self.ensure_scanned();
        self.inventory.read().clone()
    }

    /// The registry this tracker scans.
    pub fn registry(&self) -> &R {
        &self.registry
    }
}

impl<R> FileTracker<R> {
    /// Track additional files, such as configs or templates.
    ///
    /// Each path is resolved first; paths that do not resolve and paths
    /// already tracked are skipped, so tracking is idempotent.
    ///
    /// Returns the number of new records.
    pub fn track(&self, paths: impl IntoTrackedPaths) -> usize {
        self.track_all(paths.into_tracked_paths())
    }

    /// Track every path yielded by an iterator.
    pub fn track_all<I>(&self, paths: I) -> usize
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let resolved: Vec<(PathBuf, ModifiedTime)> = paths
            .into_iter()
            .filter_map(|path| match self.resolver.resolve(path.as_ref()) {
                (Some(resolved), modified) => Some((resolved, modified)),
                (None, _) => {
                    tracing::debug!(path = %path.as_ref().display(), "skipping unresolvable path");
                    None
                }
            })
            .collect();

        let mut inventory = self.inventory.write();
        let mut added = 0;
        for (path, modified) in resolved {
            if inventory.insert(path, modified) {
                added += 1;
            }
        }
        added
    }

    /// Tracked files whose modified time differs from their baseline.
    ///
    /// Deleted files are included. Does not trigger the unit scan.
    pub fn modified(&self) -> Vec<PathBuf> {
        self.inventory.read().modified()
    }

    /// Whether `path` (already resolved) is tracked.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.inventory.read().contains(path)
    }

    /// Baseline modified time for a tracked path.
    pub fn baseline(&self, path: impl AsRef<Path>) -> Option<ModifiedTime> {
        self.inventory.read().baseline(path)
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.inventory.read().len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.inventory.read().is_empty()
    }

    /// The resolver used for scans and manual tracking.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{UnitManifest, UnitSpec};
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_track_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.ini");
        fs::write(&path, "[app]").unwrap();

        let tracker = FileTracker::without_units();
        assert_eq!(tracker.track(&path), 1);
        let canonical = path.canonicalize().unwrap();
        let first = tracker.baseline(&canonical).unwrap();

        let later = SystemTime::now() + Duration::from_secs(120);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        assert_eq!(tracker.track(&path), 0);
        assert_eq!(tracker.baseline(&canonical), Some(first));
        assert_eq!(tracker.modified(), vec![canonical]);
    }

    #[test]
    fn test_track_skips_missing() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = FileTracker::without_units();
        assert_eq!(tracker.track(temp_dir.path().join("missing.cfg")), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_scan_runs_once() {
        let temp_dir = TempDir::new().unwrap();
        let app = temp_dir.path().join("app.py");
        let late = temp_dir.path().join("late.py");
        fs::write(&app, "").unwrap();

        let registry = ManifestRegistry::from_manifest(
            UnitManifest::new()
                .with_entry_point("app")
                .with_unit(UnitSpec::new("app").with_file(&app).with_unit_attribute("late", "late"))
                .with_unit(UnitSpec::new("late").with_file(&late)),
        )
        .unwrap();
        let tracker = FileTracker::new(registry);
        assert!(!tracker.is_scanned());

        assert_eq!(tracker.files().len(), 1);
        assert!(tracker.is_scanned());

        // A file appearing after the scan is not picked up by later calls.
        fs::write(&late, "").unwrap();
        assert_eq!(tracker.files().len(), 1);
        assert_eq!(tracker.ensure_scanned(), 1);
    }

    #[test]
    fn test_modified_does_not_scan() {
        let tracker = FileTracker::without_units();
        assert!(tracker.modified().is_empty());
        assert!(!tracker.is_scanned());
    }
}
