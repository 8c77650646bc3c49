//! Hook settings loaded from files and environment variables.

use crate::core::{FileTracker, FileTrackerBuilder};
use crate::error::{Result, TrackError};
use crate::units::ManifestRegistry;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

#[cfg(unix)]
use crate::notify::{Action, HookOptions, TerminationSignal, Verbosity};

/// Default prefix for environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "MODTRACK";

/// Default separator for nested environment keys.
pub const DEFAULT_ENV_SEPARATOR: &str = "__";

fn default_action() -> String {
    "TERM".to_string()
}

/// Settings describing what to track and how to react to changes.
///
/// ```yaml
/// action: USR1
/// verbose: true
/// manifest: units.yaml
/// track:
///   - config/app.ini
/// compiled_suffixes:
///   tmplc: tmpl
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HookSettings {
    /// Signal name or number sent when files change.
    pub action: String,
    /// Print a summary line for each dispatch.
    pub verbose: bool,
    /// Poll on this interval instead of waiting for `SIGHUP`.
    pub poll_interval_ms: Option<u64>,
    /// Extra files to track.
    pub track: Vec<PathBuf>,
    /// Unit manifest to scan.
    pub manifest: Option<PathBuf>,
    /// Compiled extension to source extension.
    pub compiled_suffixes: BTreeMap<String, String>,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            action: default_action(),
            verbose: false,
            poll_interval_ms: None,
            track: Vec::new(),
            manifest: None,
            compiled_suffixes: BTreeMap::new(),
        }
    }
}

impl HookSettings {
    /// Start a settings loader.
    pub fn loader() -> SettingsLoader {
        SettingsLoader::new()
    }

    /// Polling period, if polling is configured.
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// The configured signal.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidSignal` if `action` names no supported
    /// signal.
    #[cfg(unix)]
    pub fn signal(&self) -> Result<TerminationSignal> {
        self.action.parse()
    }

    /// Dispatcher options for these settings.
    ///
    /// The action is validated here, so a bad signal name fails at
    /// registration rather than at the first change.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidSignal` if `action` names no supported
    /// signal.
    #[cfg(unix)]
    pub fn hook_options(&self) -> Result<HookOptions> {
        Ok(HookOptions::new()
            .with_action(Action::Signal(self.signal()?))
            .with_verbose(Verbosity::from(self.verbose)))
    }

    /// Build a tracker from the manifest, suffixes and extra files.
    ///
    /// Without a manifest the tracker has no units and only tracks the
    /// extra files.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded.
    pub fn build_tracker(&self) -> Result<FileTracker<ManifestRegistry>> {
        let registry = match &self.manifest {
            Some(path) => ManifestRegistry::load(path)?,
            None => ManifestRegistry::empty(),
        };

        let mut builder = FileTrackerBuilder::new(registry);
        for (compiled, source) in &self.compiled_suffixes {
            builder = builder.with_compiled_suffix(compiled, source);
        }
        let tracker = builder.with_files(self.track.iter().cloned()).build();

        tracing::debug!(
            tracked = tracker.len(),
            manifest = self.manifest.is_some(),
            "tracker built from settings"
        );
        Ok(tracker)
    }

    /// Install the hook these settings describe: polling when
    /// `poll_interval_ms` is set, `SIGHUP` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidSignal` for a bad action (including
    /// `SIGHUP` without a polling interval) and `TrackError::SignalError`
    /// if the listener cannot be installed.
    #[cfg(all(unix, feature = "hup-hook"))]
    pub fn install_hook<R>(
        &self,
        tracker: std::sync::Arc<FileTracker<R>>,
    ) -> Result<crate::notify::ChangeHook>
    where
        R: crate::units::UnitRegistry + Send + Sync + 'static,
    {
        use crate::notify::ChangeHook;

        let options = self.hook_options()?;
        match self.poll_interval() {
            Some(period) => ChangeHook::every(tracker, options, period),
            None => ChangeHook::on_hangup(tracker, options),
        }
    }
}

/// Loads [`HookSettings`] from files, then environment overrides.
///
/// Later files override earlier ones; environment variables override all
/// files.
///
/// # Examples
///
/// ```rust,no_run
/// use modtrack::prelude::*;
///
/// # fn example() -> Result<()> {
/// // MODTRACK_ACTION=USR1 overrides `action` from the file
/// let settings = HookSettings::loader()
///     .with_file("modtrack.yaml")
///     .with_env_overrides("MODTRACK", "__")
///     .load()?;
/// let tracker = settings.build_tracker()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsLoader {
    file_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
    env_separator: Option<String>,
    env_vars: Option<HashMap<String, String>>,
}

impl SettingsLoader {
    /// Create a loader with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a YAML, TOML or JSON file; the format follows the extension.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Read overrides from environment variables such as
    /// `{prefix}_VERBOSE` or `{prefix}_POLL_INTERVAL_MS`.
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.env_separator = Some(separator.to_string());
        self
    }

    /// Read overrides from `vars` instead of the process environment.
    ///
    /// Uses the default prefix and separator unless
    /// [`with_env_overrides`](Self::with_env_overrides) sets others.
    pub fn with_env_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Load and merge all sources.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::SettingsError` if a file is missing or
    /// malformed, or a value has the wrong type.
    pub fn load(self) -> Result<HookSettings> {
        let mut builder = Config::builder();

        for path in &self.file_paths {
            builder = builder.add_source(File::from(path.as_path()));
        }

        if self.env_prefix.is_some() || self.env_vars.is_some() {
            let prefix = self.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
            let separator = self.env_separator.as_deref().unwrap_or(DEFAULT_ENV_SEPARATOR);
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator(separator)
                    .try_parsing(true)
                    .source(self.env_vars),
            );
        }

        let config = builder
            .build()
            .map_err(|e| TrackError::SettingsError(format!("Failed to build settings: {}", e)))?;

        config.try_deserialize::<HookSettings>().map_err(|e| {
            TrackError::SettingsError(format!("Failed to deserialize settings: {}", e))
        })
    }
}
