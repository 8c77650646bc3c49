//! The path → baseline-timestamp table and its change detector.

use super::resolver::{ModifiedTime, modified_time};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

/// Tracked files and the modified time each had when first inventoried.
///
/// Inserts are idempotent: once a path is present its baseline is never
/// overwritten. Iteration is in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    records: BTreeMap<PathBuf, ModifiedTime>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` with `baseline` unless the path is already tracked.
    ///
    /// Returns `true` if a new record was added.
    pub fn insert(&mut self, path: PathBuf, baseline: ModifiedTime) -> bool {
        match self.records.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(baseline);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Merge another inventory into this one, keeping existing baselines.
    ///
    /// Returns the number of records added.
    pub fn merge(&mut self, other: Inventory) -> usize {
        other
            .records
            .into_iter()
            .filter(|(path, baseline)| self.insert(path.clone(), *baseline))
            .count()
    }

    /// Whether `path` is tracked.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.records.contains_key(path.as_ref())
    }

    /// Baseline modified time for `path`, if tracked.
    pub fn baseline(&self, path: impl AsRef<Path>) -> Option<ModifiedTime> {
        self.records.get(path.as_ref()).copied()
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over `(path, baseline)` records.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &ModifiedTime)> {
        self.records.iter()
    }

    /// Tracked paths.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.records.keys()
    }

    /// Re-stat every tracked file and return those whose modified time no
    /// longer matches the baseline.
    ///
    /// A deleted file stats as `ModifiedTime::ABSENT` and is reported.
    pub fn modified(&self) -> Vec<PathBuf> {
        let changed: Vec<PathBuf> = self
            .records
            .iter()
            .filter(|(path, baseline)| modified_time(path) != **baseline)
            .map(|(path, _)| path.clone())
            .collect();

        tracing::debug!(
            tracked = self.records.len(),
            changed = changed.len(),
            "detection cycle complete"
        );
        changed
    }
}

impl IntoIterator for Inventory {
    type Item = (PathBuf, ModifiedTime);
    type IntoIter = std::collections::btree_map::IntoIter<PathBuf, ModifiedTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
