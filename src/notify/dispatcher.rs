//! Dispatching a configured action when tracked files change.

use super::signal::TerminationSignal;
use crate::error::Result;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Callback invoked with the changed files.
type ChangeCallback = Arc<dyn Fn(&[PathBuf]) + Send + Sync>;

/// Callback receiving the verbose summary line.
type LogCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// What to do when a detection cycle finds changed files.
#[derive(Clone)]
pub enum Action {
    /// Send a signal to the current process.
    Signal(TerminationSignal),
    /// Call a function with the changed files. Panics are not caught.
    Callback {
        /// Name used in the verbose summary.
        name: String,
        /// The function to call.
        func: ChangeCallback,
    },
}

impl Action {
    /// Create a callback action.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modtrack::notify::Action;
    ///
    /// let action = Action::callback("reload_templates", |changed| {
    ///     println!("{} files changed", changed.len());
    /// });
    /// ```
    pub fn callback<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[PathBuf]) + Send + Sync + 'static,
    {
        Self::Callback {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Verb used in the verbose summary.
    fn verb(&self) -> &'static str {
        match self {
            Self::Signal(_) => "Sending",
            Self::Callback { .. } => "Calling",
        }
    }

    /// Name used in the verbose summary.
    fn label(&self) -> &str {
        match self {
            Self::Signal(signal) => signal.name(),
            Self::Callback { name, .. } => name.as_str(),
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::Signal(TerminationSignal::Term)
    }
}

impl From<TerminationSignal> for Action {
    fn from(signal: TerminationSignal) -> Self {
        Self::Signal(signal)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(signal) => f.debug_tuple("Signal").field(signal).finish(),
            Self::Callback { name, .. } => f.debug_struct("Callback").field("name", name).finish(),
        }
    }
}

/// Where the human-readable summary of a dispatch goes.
#[derive(Clone, Default)]
pub enum Verbosity {
    /// No summary.
    #[default]
    Off,
    /// Print the summary to standard output.
    Stdout,
    /// Hand the summary to a logging function.
    Log(LogCallback),
}

impl Verbosity {
    /// Forward summaries to `log`.
    pub fn log<F>(log: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self::Log(Arc::new(log))
    }
}

impl From<bool> for Verbosity {
    fn from(verbose: bool) -> Self {
        if verbose { Self::Stdout } else { Self::Off }
    }
}

impl fmt::Debug for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("Off"),
            Self::Stdout => f.write_str("Stdout"),
            Self::Log(_) => f.write_str("Log(..)"),
        }
    }
}

/// Options for a [`Dispatcher`].
#[derive(Debug, Clone, Default)]
pub struct HookOptions {
    /// Action to perform when files change.
    pub action: Action,
    /// Where the summary goes.
    pub verbose: Verbosity,
}

impl HookOptions {
    /// Options sending `SIGTERM` silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the action.
    pub fn with_action(mut self, action: impl Into<Action>) -> Self {
        self.action = action.into();
        self
    }

    /// Set the verbosity.
    pub fn with_verbose(mut self, verbose: impl Into<Verbosity>) -> Self {
        self.verbose = verbose.into();
        self
    }
}

/// Performs the configured action once per detection cycle with changes.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    options: HookOptions,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(options: HookOptions) -> Self {
        Self { options }
    }

    /// The dispatcher's options.
    pub fn options(&self) -> &HookOptions {
        &self.options
    }

    /// Summary line for `changed`, e.g.
    /// `Sending SIGTERM because app.py and 1 other file changed`.
    pub fn message(&self, changed: &[PathBuf]) -> String {
        format_message(self.options.action.verb(), self.options.action.label(), changed)
    }

    /// Act on `changed` if it is non-empty.
    ///
    /// Returns whether the action ran.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::SignalError` if the signal cannot be delivered.
    pub fn dispatch(&self, changed: &[PathBuf]) -> Result<bool> {
        if changed.is_empty() {
            return Ok(false);
        }

        let message = self.message(changed);
        tracing::info!(changed = changed.len(), "{message}");
        match &self.options.verbose {
            Verbosity::Off => {}
            Verbosity::Stdout => println!("{message}"),
            Verbosity::Log(log) => log(&message),
        }

        match &self.options.action {
            Action::Signal(signal) => signal.raise()?,
            Action::Callback { func, .. } => func(changed),
        }
        Ok(true)
    }
}

/// Format the verbose summary.
///
/// Names the first changed file and counts the rest.
pub fn format_message(verb: &str, name: &str, changed: &[PathBuf]) -> String {
    let first = changed
        .first()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let more = match changed.len().saturating_sub(1) {
        0 => String::new(),
        1 => " and 1 other file".to_string(),
        n => format!(" and {n} other files"),
    };
    format!("{verb} {name} because {first}{more} changed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_message_singular_other() {
        let dispatcher = Dispatcher::new(HookOptions::new().with_verbose(true));
        let message = dispatcher.message(&paths(&["x.py", "y.py"]));
        assert_eq!(message, "Sending SIGTERM because x.py and 1 other file changed");
    }

    #[test]
    fn test_message_plural_and_single() {
        assert_eq!(
            format_message("Calling", "reload", &paths(&["a", "b", "c"])),
            "Calling reload because a and 2 other files changed"
        );
        assert_eq!(
            format_message("Sending", "SIGUSR1", &paths(&["a"])),
            "Sending SIGUSR1 because a changed"
        );
    }

    #[test]
    fn test_callback_invoked_once_with_changes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let calls_clone = Arc::clone(&calls);
        let seen_clone = Arc::clone(&seen);
        let dispatcher = Dispatcher::new(HookOptions::new().with_action(Action::callback(
            "record",
            move |changed| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                seen_clone.lock().extend_from_slice(changed);
            },
        )));

        assert!(dispatcher.dispatch(&paths(&["x.py", "y.py"])).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock(), paths(&["x.py", "y.py"]));
    }

    #[test]
    fn test_nothing_changed_does_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let logged = Arc::new(AtomicUsize::new(0));

        let calls_clone = Arc::clone(&calls);
        let logged_clone = Arc::clone(&logged);
        let dispatcher = Dispatcher::new(
            HookOptions::new()
                .with_action(Action::callback("count", move |_| {
                    calls_clone.fetch_add(1, Ordering::SeqCst);
                }))
                .with_verbose(Verbosity::log(move |_| {
                    logged_clone.fetch_add(1, Ordering::SeqCst);
                })),
        );

        assert!(!dispatcher.dispatch(&[]).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(logged.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_log_callback_receives_message() {
        let messages = Arc::new(Mutex::new(Vec::<String>::new()));
        let messages_clone = Arc::clone(&messages);

        let dispatcher = Dispatcher::new(
            HookOptions::new()
                .with_action(Action::callback("reload", |_| {}))
                .with_verbose(Verbosity::log(move |msg| {
                    messages_clone.lock().push(msg.to_string());
                })),
        );

        dispatcher.dispatch(&paths(&["x.py", "y.py"])).unwrap();
        let messages = messages.lock();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("x.py"));
        assert!(messages[0].contains("1 other file"));
        assert!(messages[0].starts_with("Calling reload"));
    }

    #[test]
    fn test_defaults() {
        let options = HookOptions::default();
        assert!(matches!(options.action, Action::Signal(TerminationSignal::Term)));
        assert!(matches!(options.verbose, Verbosity::Off));
        assert!(matches!(Verbosity::from(true), Verbosity::Stdout));
    }
}
