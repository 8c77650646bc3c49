//! Inventory scan over the loaded-unit graph.

use super::registry::{Attribute, HasBackingFile, LoadedUnit, UnitRegistry};
use crate::core::{Inventory, PathResolver};
use std::collections::HashSet;

/// Depth-first scan of a unit and everything it references.
///
/// The visited set lives for one scan. Recursion stops at any unit already
/// visited and at any unit whose resolved file is already inventoried, so
/// circular references terminate and each path is recorded once.
pub struct InventoryScan<'a, R: UnitRegistry> {
    registry: &'a R,
    resolver: &'a PathResolver,
    visited: HashSet<String>,
}

impl<'a, R: UnitRegistry> InventoryScan<'a, R> {
    /// Create a scan over `registry` resolving files with `resolver`.
    pub fn new(registry: &'a R, resolver: &'a PathResolver) -> Self {
        Self {
            registry,
            resolver,
            visited: HashSet::new(),
        }
    }

    /// Inventory the registry's entry point and its dependency tree.
    ///
    /// If that adds nothing, every loaded unit's own backing file is
    /// inventoried instead, without following attributes.
    ///
    /// The fallback depends only on what this traversal added, so files
    /// tracked by hand beforehand do not suppress it.
    ///
    /// Returns the number of files added.
    pub fn scan_entry_point(&mut self, inventory: &mut Inventory) -> usize {
        let registry = self.registry;
        let added = match registry.entry_point() {
            Some(root) => self.scan_unit(root, inventory),
            None => 0,
        };

        if added > 0 {
            tracing::debug!(added, "scanned entry point dependency tree");
            return added;
        }

        let added = self.scan_loaded_units(inventory);
        tracing::debug!(added, "entry point yielded nothing, scanned loaded units");
        added
    }

    /// Inventory `unit` and, recursively, the units its attributes reference.
    ///
    /// Returns the number of files added.
    pub fn scan_unit(&mut self, unit: &R::Unit, inventory: &mut Inventory) -> usize {
        if !self.visited.insert(unit.name().to_string()) {
            return 0;
        }

        let Some(file) = unit.backing_file() else {
            return 0;
        };
        if inventory.contains(file) {
            return 0;
        }

        let (resolved, modified) = self.resolver.resolve(file);
        let Some(resolved) = resolved else {
            return 0;
        };
        if !inventory.insert(resolved, modified) {
            return 0;
        }
        tracing::trace!(unit = unit.name(), "inventoried unit");

        let registry = self.registry;
        let mut added = 1;
        for attribute in registry.attributes(unit) {
            match attribute {
                Attribute::Unit(sub) if sub.backing_file().is_some() => {
                    added += self.scan_unit(sub, inventory);
                }
                Attribute::Item { owner } => {
                    if let Some(owning) = registry.lookup(owner) {
                        if owning.backing_file().is_some() {
                            added += self.scan_unit(owning, inventory);
                        }
                    }
                }
                _ => {}
            }
        }
        added
    }

    /// Inventory the backing file of every loaded unit, without recursion.
    pub fn scan_loaded_units(&self, inventory: &mut Inventory) -> usize {
        let mut added = 0;
        for unit in self.registry.loaded_units() {
            let Some(file) = unit.backing_file() else {
                continue;
            };
            if inventory.contains(file) {
                continue;
            }
            if let (Some(resolved), modified) = self.resolver.resolve(file) {
                if inventory.insert(resolved, modified) {
                    added += 1;
                }
            }
        }
        added
    }
}

/// Collect the files of `root` and its dependency tree.
///
/// Pass an existing inventory to add only files it does not already hold, or
/// `None` to start from an empty one.
pub fn collect_unit_files<R: UnitRegistry>(
    registry: &R,
    resolver: &PathResolver,
    root: &R::Unit,
    inventory: Option<Inventory>,
) -> Inventory {
    let mut inventory = inventory.unwrap_or_default();
    InventoryScan::new(registry, resolver).scan_unit(root, &mut inventory);
    inventory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{ManifestRegistry, UnitManifest, UnitSpec};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        path.canonicalize().unwrap()
    }

    #[test]
    fn test_follows_unit_and_item_attributes() {
        let temp_dir = TempDir::new().unwrap();
        let app = touch(temp_dir.path(), "app.py");
        let db = touch(temp_dir.path(), "db.py");
        let handlers = touch(temp_dir.path(), "handlers.py");
        let unrelated = touch(temp_dir.path(), "unrelated.py");

        let registry = ManifestRegistry::from_manifest(
            UnitManifest::new()
                .with_entry_point("app")
                .with_unit(
                    UnitSpec::new("app")
                        .with_file(&app)
                        .with_unit_attribute("db", "db")
                        .with_item_attribute("Handler", "handlers")
                        .with_item_attribute("Missing", "not.loaded"),
                )
                .with_unit(UnitSpec::new("db").with_file(&db))
                .with_unit(UnitSpec::new("handlers").with_file(&handlers))
                .with_unit(UnitSpec::new("unrelated").with_file(&unrelated)),
        )
        .unwrap();
        let resolver = PathResolver::new();

        let mut inventory = Inventory::new();
        let added = InventoryScan::new(&registry, &resolver).scan_entry_point(&mut inventory);

        assert_eq!(added, 3);
        assert!(inventory.contains(&app));
        assert!(inventory.contains(&db));
        assert!(inventory.contains(&handlers));
        assert!(!inventory.contains(&unrelated));
    }

    #[test]
    fn test_cycle_terminates() {
        let temp_dir = TempDir::new().unwrap();
        let a = touch(temp_dir.path(), "a.py");
        let b = touch(temp_dir.path(), "b.py");

        let registry = ManifestRegistry::from_manifest(
            UnitManifest::new()
                .with_entry_point("a")
                .with_unit(UnitSpec::new("a").with_file(&a).with_unit_attribute("b", "b"))
                .with_unit(UnitSpec::new("b").with_file(&b).with_item_attribute("A", "a")),
        )
        .unwrap();
        let resolver = PathResolver::new();

        let root = registry.lookup("a").unwrap();
        let inventory = collect_unit_files(&registry, &resolver, root, None);

        let paths: Vec<_> = inventory.paths().cloned().collect();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&a));
        assert!(paths.contains(&b));
    }

    #[test]
    fn test_compiled_unit_records_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = touch(temp_dir.path(), "models.py");
        let compiled = touch(temp_dir.path(), "models.pyc");

        let registry = ManifestRegistry::from_manifest(
            UnitManifest::new()
                .with_entry_point("models")
                .with_unit(UnitSpec::new("models").with_file(&compiled)),
        )
        .unwrap();
        let resolver = PathResolver::new();

        let mut inventory = Inventory::new();
        InventoryScan::new(&registry, &resolver).scan_entry_point(&mut inventory);

        assert!(inventory.contains(&source));
        assert!(!inventory.contains(&compiled));
    }

    #[test]
    fn test_fallback_scans_every_loaded_unit() {
        let temp_dir = TempDir::new().unwrap();
        let one = touch(temp_dir.path(), "one.py");
        let two = touch(temp_dir.path(), "two.py");
        let three = touch(temp_dir.path(), "three.py");

        // No entry point: only each unit's own file is recorded.
        let registry = ManifestRegistry::from_manifest(
            UnitManifest::new()
                .with_unit(UnitSpec::new("builtins"))
                .with_unit(UnitSpec::new("one").with_file(&one).with_unit_attribute("t", "three"))
                .with_unit(UnitSpec::new("two").with_file(&two))
                .with_unit(UnitSpec::new("three").with_file(&three))
                .with_unit(UnitSpec::new("gone").with_file(temp_dir.path().join("gone.py"))),
        )
        .unwrap();
        let resolver = PathResolver::new();

        let mut inventory = Inventory::new();
        let added = InventoryScan::new(&registry, &resolver).scan_entry_point(&mut inventory);

        assert_eq!(added, 3);
        assert_eq!(inventory.len(), 3);
    }

    #[test]
    fn test_fallback_when_entry_point_has_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let lib = touch(temp_dir.path(), "lib.py");

        let registry = ManifestRegistry::from_manifest(
            UnitManifest::new()
                .with_entry_point("main")
                .with_unit(UnitSpec::new("main"))
                .with_unit(UnitSpec::new("lib").with_file(&lib)),
        )
        .unwrap();
        let resolver = PathResolver::new();

        let mut inventory = Inventory::new();
        InventoryScan::new(&registry, &resolver).scan_entry_point(&mut inventory);

        assert!(inventory.contains(&lib));
    }

    #[test]
    fn test_fallback_ignores_manually_tracked_files() {
        let temp_dir = TempDir::new().unwrap();
        let lib = touch(temp_dir.path(), "lib.py");
        let extra = touch(temp_dir.path(), "extra.ini");

        let registry = ManifestRegistry::from_manifest(
            UnitManifest::new()
                .with_entry_point("main")
                .with_unit(UnitSpec::new("main"))
                .with_unit(UnitSpec::new("lib").with_file(&lib)),
        )
        .unwrap();
        let resolver = PathResolver::new();

        let mut inventory = Inventory::new();
        inventory.insert(extra.clone(), crate::core::modified_time(&extra));
        let added = InventoryScan::new(&registry, &resolver).scan_entry_point(&mut inventory);

        assert_eq!(added, 1);
        assert!(inventory.contains(&lib));
        assert!(inventory.contains(&extra));
    }

    #[test]
    fn test_existing_inventory_is_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let app = touch(temp_dir.path(), "app.py");

        let registry = ManifestRegistry::from_manifest(
            UnitManifest::new()
                .with_entry_point("app")
                .with_unit(UnitSpec::new("app").with_file(&app)),
        )
        .unwrap();
        let resolver = PathResolver::new();

        let baseline = crate::core::ModifiedTime::from(std::time::Duration::from_secs(7));
        let mut existing = Inventory::new();
        existing.insert(app.clone(), baseline);

        let root = registry.entry_point().unwrap();
        let inventory = collect_unit_files(&registry, &resolver, root, Some(existing));
        assert_eq!(inventory.baseline(&app), Some(baseline));
        assert_eq!(inventory.len(), 1);
    }
}
