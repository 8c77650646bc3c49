//! Manifest-backed unit registry.

use super::registry::{Attribute, HasBackingFile, LoadedUnit, UnitRegistry};
use crate::error::{Result, TrackError};
use config::File;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Declarative description of the units a process loads.
///
/// Deserializable from YAML, TOML or JSON:
///
/// ```yaml
/// entry_point: app
/// units:
///   - name: app
///     file: src/app.py
///     attributes:
///       - name: db
///         unit: app.db
///       - name: Handler
///         owner: app.handlers
///   - name: app.db
///     file: src/app/db.py
///   - name: app.handlers
///     file: src/app/handlers.py
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UnitManifest {
    /// Name of the unit the scan starts from.
    #[serde(default)]
    pub entry_point: Option<String>,
    /// Every loaded unit.
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

impl UnitManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry-point unit name.
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = Some(name.into());
        self
    }

    /// Add a unit.
    pub fn with_unit(mut self, unit: UnitSpec) -> Self {
        self.units.push(unit);
        self
    }

    /// Load a manifest file; the format is detected from the extension.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::ManifestError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let manifest = config::Config::builder()
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()
            .map_err(|e| {
                TrackError::ManifestError(format!("Failed to read {}: {}", path.display(), e))
            })?
            .try_deserialize::<UnitManifest>()
            .map_err(|e| {
                TrackError::ManifestError(format!("Failed to parse {}: {}", path.display(), e))
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(manifest.relative_to(base))
    }

    /// Rebase relative unit files onto `base`.
    fn relative_to(mut self, base: &Path) -> Self {
        for unit in &mut self.units {
            if let Some(file) = unit.file.as_mut() {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
        self
    }
}

/// One unit in a manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitSpec {
    /// Registered name.
    pub name: String,
    /// Backing file, absent for built-in units.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Named attributes referencing other units.
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
}

impl UnitSpec {
    /// Create a unit without a backing file.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            attributes: Vec::new(),
        }
    }

    /// Set the backing file.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Add an attribute that is itself the unit named `unit`.
    pub fn with_unit_attribute(mut self, name: impl Into<String>, unit: impl Into<String>) -> Self {
        self.attributes.push(AttributeSpec {
            name: name.into(),
            unit: Some(unit.into()),
            owner: None,
        });
        self
    }

    /// Add an attribute defined by the unit named `owner`.
    pub fn with_item_attribute(mut self, name: impl Into<String>, owner: impl Into<String>) -> Self {
        self.attributes.push(AttributeSpec {
            name: name.into(),
            unit: None,
            owner: Some(owner.into()),
        });
        self
    }
}

/// One named attribute of a manifest unit.
///
/// `unit` marks the attribute as a unit itself; otherwise `owner` names the
/// unit that defines it. With neither set the attribute is untraceable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttributeSpec {
    /// Attribute name.
    pub name: String,
    /// The unit this attribute is.
    #[serde(default)]
    pub unit: Option<String>,
    /// The unit that defines this attribute.
    #[serde(default)]
    pub owner: Option<String>,
}

/// A unit held by a [`ManifestRegistry`].
#[derive(Debug, Clone)]
pub struct ManifestUnit {
    name: String,
    file: Option<PathBuf>,
    attributes: Vec<AttributeSpec>,
}

impl HasBackingFile for ManifestUnit {
    fn backing_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

impl LoadedUnit for ManifestUnit {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Unit registry built from a [`UnitManifest`].
///
/// # Examples
///
/// ```rust
/// use modtrack::units::{ManifestRegistry, UnitManifest, UnitRegistry, UnitSpec};
///
/// let registry = ManifestRegistry::from_manifest(
///     UnitManifest::new()
///         .with_entry_point("app")
///         .with_unit(UnitSpec::new("app").with_file("src/app.py")),
/// )
/// .unwrap();
///
/// assert!(registry.entry_point().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManifestRegistry {
    units: Vec<ManifestUnit>,
    index: HashMap<String, usize>,
    entry_point: Option<usize>,
}

impl ManifestRegistry {
    /// A registry with no units, for trackers fed only by manual tracking.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a registry from a manifest.
    ///
    /// When two units share a name the first one wins.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::UnknownEntryPoint` if the entry point is not one of
    /// the declared units.
    pub fn from_manifest(manifest: UnitManifest) -> Result<Self> {
        let mut registry = Self::default();

        for spec in manifest.units {
            if registry.index.contains_key(&spec.name) {
                tracing::warn!(unit = %spec.name, "duplicate unit in manifest ignored");
                continue;
            }
            registry
                .index
                .insert(spec.name.clone(), registry.units.len());
            registry.units.push(ManifestUnit {
                name: spec.name,
                file: spec.file,
                attributes: spec.attributes,
            });
        }

        if let Some(entry) = manifest.entry_point {
            let position = registry
                .index
                .get(&entry)
                .copied()
                .ok_or(TrackError::UnknownEntryPoint(entry))?;
            registry.entry_point = Some(position);
        }

        Ok(registry)
    }

    /// Load a manifest file and build a registry from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded or names an unknown
    /// entry point.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest(UnitManifest::load(path)?)
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether no units are registered.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl UnitRegistry for ManifestRegistry {
    type Unit = ManifestUnit;

    fn entry_point(&self) -> Option<&ManifestUnit> {
        self.entry_point.map(|i| &self.units[i])
    }

    fn lookup(&self, name: &str) -> Option<&ManifestUnit> {
        self.index.get(name).map(|&i| &self.units[i])
    }

    fn loaded_units(&self) -> Vec<&ManifestUnit> {
        self.units.iter().collect()
    }

    fn attributes<'r>(&'r self, unit: &'r ManifestUnit) -> Vec<Attribute<'r, ManifestUnit>> {
        unit.attributes
            .iter()
            .map(|attr| match (&attr.unit, &attr.owner) {
                (Some(target), _) => self
                    .lookup(target)
                    .map(Attribute::Unit)
                    .unwrap_or(Attribute::Value),
                (None, Some(owner)) => Attribute::Item {
                    owner: owner.as_str(),
                },
                (None, None) => Attribute::Value,
            })
            .collect()
    }
}
