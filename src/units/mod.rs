//! Loaded code units and the inventory scan over them.
//!
//! A process exposes the units it has loaded through [`UnitRegistry`]. The
//! [`InventoryScan`] walks that graph from the entry point and records every
//! backing file it can reach. [`ManifestRegistry`] is a registry described
//! by a YAML, TOML or JSON manifest.

mod manifest;
mod registry;
mod scan;

pub use manifest::{AttributeSpec, ManifestRegistry, ManifestUnit, UnitManifest, UnitSpec};
pub use registry::{Attribute, HasBackingFile, LoadedUnit, UnitRegistry};
pub use scan::{InventoryScan, collect_unit_files};
