//! Argument conversion for manual tracking.

use std::path::{Path, PathBuf};

/// Values accepted by [`FileTracker::track`](crate::core::FileTracker::track):
/// a single path, or a collection of paths.
pub trait IntoTrackedPaths {
    /// Flatten into a list of candidate paths.
    fn into_tracked_paths(self) -> Vec<PathBuf>;
}

impl IntoTrackedPaths for &str {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl IntoTrackedPaths for String {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl IntoTrackedPaths for &String {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl IntoTrackedPaths for &Path {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        vec![self.to_path_buf()]
    }
}

impl IntoTrackedPaths for PathBuf {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        vec![self]
    }
}

impl IntoTrackedPaths for &PathBuf {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        vec![self.clone()]
    }
}

impl<T: AsRef<Path>> IntoTrackedPaths for Vec<T> {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<T: AsRef<Path>> IntoTrackedPaths for &Vec<T> {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<T: AsRef<Path>> IntoTrackedPaths for &[T] {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<T: AsRef<Path>, const N: usize> IntoTrackedPaths for [T; N] {
    fn into_tracked_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

/// Track any number of paths or path collections in one call.
///
/// Expands to one [`FileTracker::track`](crate::core::FileTracker::track)
/// call per argument and evaluates to the total number of new records.
///
/// # Examples
///
/// ```rust,no_run
/// use modtrack::prelude::*;
///
/// let tracker = FileTracker::without_units();
/// let templates = vec!["templates/base.html", "templates/index.html"];
/// let added = modtrack::track!(tracker, "config.ini", templates, ["db/app.db"]);
/// println!("tracking {added} new files");
/// ```
#[macro_export]
macro_rules! track {
    ($tracker:expr $(, $paths:expr)* $(,)?) => {{
        let tracker = &$tracker;
        0usize $(+ tracker.track($paths))*
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_paths() {
        assert_eq!("a.cfg".into_tracked_paths(), vec![PathBuf::from("a.cfg")]);
        assert_eq!(
            String::from("b.cfg").into_tracked_paths(),
            vec![PathBuf::from("b.cfg")]
        );
        assert_eq!(
            Path::new("/etc/c.cfg").into_tracked_paths(),
            vec![PathBuf::from("/etc/c.cfg")]
        );
    }

    #[test]
    fn test_collections() {
        let list = vec!["x.py", "y.py"];
        assert_eq!((&list).into_tracked_paths().len(), 2);
        assert_eq!(list.as_slice().into_tracked_paths().len(), 2);
        assert_eq!(list.into_tracked_paths().len(), 2);
        assert_eq!(
            [PathBuf::from("z.py")].into_tracked_paths(),
            vec![PathBuf::from("z.py")]
        );
    }
}
