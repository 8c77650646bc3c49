//! Supported process signals and their name/number tables.

use crate::error::{Result, TrackError};
use std::fmt;
use std::str::FromStr;

/// A signal the dispatcher can send to its own process.
///
/// Parsed from a symbolic name (the `SIG` prefix is optional and case is
/// ignored) or a decimal number:
///
/// ```rust
/// use modtrack::notify::TerminationSignal;
///
/// let term: TerminationSignal = "TERM".parse().unwrap();
/// assert_eq!(term, "sigterm".parse().unwrap());
/// assert_eq!(term, TerminationSignal::from_number(15).unwrap());
/// assert!("SIGBOGUS".parse::<TerminationSignal>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TerminationSignal {
    /// Hang-up.
    Hup,
    /// Interrupt from keyboard.
    Int,
    /// Quit from keyboard.
    Quit,
    /// Abort.
    Abrt,
    /// Kill; cannot be caught.
    Kill,
    /// User-defined signal 1.
    Usr1,
    /// User-defined signal 2.
    Usr2,
    /// Timer alarm.
    Alrm,
    /// Termination request.
    #[default]
    Term,
}

const SIGNALS: &[(TerminationSignal, &str, libc::c_int)] = &[
    (TerminationSignal::Hup, "SIGHUP", libc::SIGHUP),
    (TerminationSignal::Int, "SIGINT", libc::SIGINT),
    (TerminationSignal::Quit, "SIGQUIT", libc::SIGQUIT),
    (TerminationSignal::Abrt, "SIGABRT", libc::SIGABRT),
    (TerminationSignal::Kill, "SIGKILL", libc::SIGKILL),
    (TerminationSignal::Usr1, "SIGUSR1", libc::SIGUSR1),
    (TerminationSignal::Usr2, "SIGUSR2", libc::SIGUSR2),
    (TerminationSignal::Alrm, "SIGALRM", libc::SIGALRM),
    (TerminationSignal::Term, "SIGTERM", libc::SIGTERM),
];

impl TerminationSignal {
    /// Every supported signal.
    pub fn all() -> impl Iterator<Item = TerminationSignal> {
        SIGNALS.iter().map(|(signal, _, _)| *signal)
    }

    /// Symbolic name including the `SIG` prefix.
    pub fn name(self) -> &'static str {
        SIGNALS
            .iter()
            .find(|(signal, _, _)| *signal == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("SIGTERM")
    }

    /// Platform signal number.
    pub fn number(self) -> i32 {
        SIGNALS
            .iter()
            .find(|(signal, _, _)| *signal == self)
            .map(|(_, _, number)| *number)
            .unwrap_or(libc::SIGTERM)
    }

    /// Look a signal up by its platform number.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidSignal` for numbers outside the table.
    pub fn from_number(number: i32) -> Result<Self> {
        SIGNALS
            .iter()
            .find(|(_, _, n)| *n == number)
            .map(|(signal, _, _)| *signal)
            .ok_or_else(|| TrackError::InvalidSignal(number.to_string()))
    }

    /// Look a signal up by name, with or without the `SIG` prefix.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidSignal` for unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let full = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{upper}")
        };
        SIGNALS
            .iter()
            .find(|(_, n, _)| *n == full)
            .map(|(signal, _, _)| *signal)
            .ok_or_else(|| TrackError::InvalidSignal(name.to_string()))
    }

    /// Send this signal to the current process.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::SignalError` if the kernel rejects the signal.
    #[allow(unsafe_code)]
    pub fn raise(self) -> Result<()> {
        let pid = std::process::id() as libc::pid_t;
        // SAFETY: kill(2) has no memory-safety preconditions.
        let rc = unsafe { libc::kill(pid, self.number()) };
        if rc == 0 {
            Ok(())
        } else {
            Err(TrackError::SignalError(format!(
                "Failed to send {}: {}",
                self,
                std::io::Error::last_os_error()
            )))
        }
    }
}

impl FromStr for TerminationSignal {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().parse::<i32>() {
            Ok(number) => Self::from_number(number),
            Err(_) => Self::from_name(s),
        }
    }
}

impl TryFrom<i32> for TerminationSignal {
    type Error = TrackError;

    fn try_from(number: i32) -> Result<Self> {
        Self::from_number(number)
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
