//! Capability traits for loaded code units.

use std::path::Path;

/// Something that may be backed by a file on disk.
pub trait HasBackingFile {
    /// Path of the backing file, if the unit has one.
    ///
    /// Built-in or synthesized units return `None`.
    fn backing_file(&self) -> Option<&Path>;
}

/// A loaded code unit (a module, plugin, or script) that can be inventoried.
pub trait LoadedUnit: HasBackingFile {
    /// The name the unit is registered under.
    fn name(&self) -> &str;
}

/// One named attribute of a unit, as seen by the inventory scan.
#[derive(Debug)]
pub enum Attribute<'r, U> {
    /// The attribute is itself a loaded unit (a submodule or imported module).
    Unit(&'r U),
    /// The attribute is an item defined in another unit, named by `owner`.
    Item {
        /// Name of the owning unit in the registry.
        owner: &'r str,
    },
    /// Anything else; not traceable to a file.
    Value,
}

/// Read-only view of the units currently loaded by the process.
///
/// Implement this trait to plug a module system into the inventory scan.
/// The scan never mutates the registry.
///
/// # Examples
///
/// ```rust
/// use modtrack::units::{Attribute, HasBackingFile, LoadedUnit, UnitRegistry};
/// use std::path::{Path, PathBuf};
///
/// struct Plugin {
///     name: String,
///     file: PathBuf,
/// }
///
/// impl HasBackingFile for Plugin {
///     fn backing_file(&self) -> Option<&Path> {
///         Some(&self.file)
///     }
/// }
///
/// impl LoadedUnit for Plugin {
///     fn name(&self) -> &str {
///         &self.name
///     }
/// }
///
/// struct Plugins(Vec<Plugin>);
///
/// impl UnitRegistry for Plugins {
///     type Unit = Plugin;
///
///     fn entry_point(&self) -> Option<&Plugin> {
///         None
///     }
///
///     fn lookup(&self, name: &str) -> Option<&Plugin> {
///         self.0.iter().find(|p| p.name == name)
///     }
///
///     fn loaded_units(&self) -> Vec<&Plugin> {
///         self.0.iter().collect()
///     }
///
///     fn attributes<'r>(&'r self, _unit: &'r Plugin) -> Vec<Attribute<'r, Plugin>> {
///         Vec::new()
///     }
/// }
/// ```
pub trait UnitRegistry {
    /// The unit type this registry hands out.
    type Unit: LoadedUnit;

    /// The unit the process was started from, where the scan begins.
    fn entry_point(&self) -> Option<&Self::Unit>;

    /// Look a unit up by its registered name.
    fn lookup(&self, name: &str) -> Option<&Self::Unit>;

    /// Every currently loaded unit.
    fn loaded_units(&self) -> Vec<&Self::Unit>;

    /// Enumerate the named attributes of `unit`.
    fn attributes<'r>(&'r self, unit: &'r Self::Unit) -> Vec<Attribute<'r, Self::Unit>>;
}
