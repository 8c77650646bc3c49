//! Error types for modtrack.

/// Result type alias for modtrack operations.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors that can occur when configuring or running change detection.
///
/// Scanning and detection never produce errors: unreadable files resolve to
/// "not found" and missing units are skipped. These variants cover the
/// configuration surface and the process/signal boundary.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// The configured signal name or number is not a supported termination signal.
    #[error("Unknown signal: {0}")]
    InvalidSignal(String),

    /// Installing a signal listener or delivering a signal failed.
    #[error("Signal error: {0}")]
    SignalError(String),

    /// Failed to load or parse a unit manifest.
    #[error("Failed to load unit manifest: {0}")]
    ManifestError(String),

    /// A manifest names an entry point that none of its units declare.
    #[error("Entry point '{0}' is not a declared unit")]
    UnknownEntryPoint(String),

    /// A polling hook was given a period it cannot run with.
    #[error("Invalid polling interval: {0}")]
    InvalidInterval(String),

    /// Failed to load or parse hook settings.
    #[error("Failed to load settings: {0}")]
    SettingsError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
