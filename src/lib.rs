//! # modtrack
//!
//! Detect when the source files of a running process have changed, and
//! react by signalling the process or calling a function.
//!
//! ## Overview
//!
//! A long-running process loads code units (modules, plugins, templates)
//! at startup. `modtrack` records the file behind each unit together with
//! its modified time, and later reports which of those files have been
//! modified or deleted:
//! - Units are exposed through the [`UnitRegistry`](units::UnitRegistry)
//!   trait; [`ManifestRegistry`](units::ManifestRegistry) reads them from
//!   a YAML, TOML or JSON manifest
//! - Compiled artifacts (`.pyc` and configurable suffixes) resolve to their
//!   source files, and archive members resolve to the archive
//! - Arbitrary extra files can be tracked at any time
//! - On unix, a `SIGHUP` or polling hook restarts the process, or runs a
//!   callback, when something changed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use modtrack::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> modtrack::error::Result<()> {
//! let tracker = Arc::new(FileTracker::new(ManifestRegistry::load("units.yaml")?));
//! tracker.track(["config/app.ini", "templates/index.html"]);
//!
//! // `kill -HUP <pid>` sends SIGTERM to this process if a file changed
//! let _hook = hup_hook(Arc::clone(&tracker), HookOptions::new().with_verbose(true))?;
//!
//! // Or check by hand
//! for path in tracker.modified() {
//!     println!("{} changed", path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `hup-hook` (default): Tokio-based `SIGHUP` and polling hooks.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod settings;
pub mod units;

#[cfg(unix)]
pub mod notify;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{FileTracker, FileTrackerBuilder, Inventory, ModifiedTime};
    pub use crate::error::{Result, TrackError};
    pub use crate::settings::{HookSettings, SettingsLoader};
    pub use crate::track;
    pub use crate::units::{ManifestRegistry, UnitManifest, UnitRegistry, UnitSpec};

    #[cfg(unix)]
    pub use crate::notify::{Action, Dispatcher, HookOptions, TerminationSignal, Verbosity};

    #[cfg(all(unix, feature = "hup-hook"))]
    pub use crate::notify::{ChangeHook, hup_hook};
}
