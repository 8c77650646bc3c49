//! Acting on detected changes.
//!
//! A [`Dispatcher`] turns a list of changed files into one action: a signal
//! sent to the current process or a callback. With the `hup-hook` feature,
//! a [`ChangeHook`] runs detection cycles on `SIGHUP` or on a timer.

mod dispatcher;
#[cfg(feature = "hup-hook")]
mod hook;
mod signal;

pub use dispatcher::{Action, Dispatcher, HookOptions, Verbosity, format_message};
#[cfg(feature = "hup-hook")]
pub use hook::{ChangeHook, hup_hook};
pub use signal::TerminationSignal;
