//! SIGHUP and interval driven detection hooks.

use super::dispatcher::{Action, Dispatcher, HookOptions};
use super::signal::TerminationSignal;
use crate::core::FileTracker;
use crate::error::{Result, TrackError};
use crate::units::UnitRegistry;
use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;

/// A running detection hook.
///
/// Each trigger (a `SIGHUP`, or a timer tick) runs one detection cycle
/// against the tracker and hands any changed files to the dispatcher.
/// Dropping the hook stops it.
///
/// Tokio's signal driver installs the OS handler with `SA_RESTART`, so
/// blocking system calls interrupted by `SIGHUP` are restarted, and the
/// dispatcher runs on a task rather than in signal context.
///
/// # Examples
///
/// ```rust,no_run
/// use modtrack::prelude::*;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<()> {
/// let tracker = Arc::new(FileTracker::new(ManifestRegistry::load("units.yaml")?));
/// tracker.track("config.ini");
///
/// // `kill -HUP <pid>` now restarts the process if anything changed
/// let _hook = ChangeHook::on_hangup(
///     Arc::clone(&tracker),
///     HookOptions::new().with_verbose(true),
/// )?;
/// # Ok(())
/// # }
/// ```
pub struct ChangeHook {
    dispatcher: Arc<ArcSwap<Dispatcher>>,
    task: JoinHandle<()>,
}

impl ChangeHook {
    /// Run a detection cycle whenever the process receives `SIGHUP`.
    ///
    /// The tracker's unit scan runs before the listener is armed. Must be
    /// called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidSignal` if the action is `SIGHUP`, which
    /// would retrigger the hook on every dispatch, and
    /// `TrackError::SignalError` if the signal listener cannot be installed.
    pub fn on_hangup<R>(tracker: Arc<FileTracker<R>>, options: HookOptions) -> Result<Self>
    where
        R: UnitRegistry + Send + Sync + 'static,
    {
        if let Action::Signal(TerminationSignal::Hup) = options.action {
            return Err(TrackError::InvalidSignal(format!(
                "{} cannot be the action of a {} hook",
                TerminationSignal::Hup,
                TerminationSignal::Hup
            )));
        }
        tracker.ensure_scanned();

        let mut hangups = signal(SignalKind::hangup()).map_err(|e| {
            TrackError::SignalError(format!("Failed to listen for SIGHUP: {}", e))
        })?;

        let dispatcher = Arc::new(ArcSwap::from_pointee(Dispatcher::new(options)));
        let task_dispatcher = Arc::clone(&dispatcher);
        let task = tokio::spawn(async move {
            while hangups.recv().await.is_some() {
                tracing::debug!("SIGHUP received, checking tracked files");
                run_cycle(&tracker, &task_dispatcher);
            }
        });

        tracing::info!("SIGHUP change hook installed");
        Ok(Self { dispatcher, task })
    }

    /// Run a detection cycle every `period`.
    ///
    /// The first cycle runs one `period` after the hook starts. Must be
    /// called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidInterval` if `period` is zero.
    pub fn every<R>(
        tracker: Arc<FileTracker<R>>,
        options: HookOptions,
        period: Duration,
    ) -> Result<Self>
    where
        R: UnitRegistry + Send + Sync + 'static,
    {
        if period.is_zero() {
            return Err(TrackError::InvalidInterval(
                "period must be greater than zero".to_string(),
            ));
        }
        tracker.ensure_scanned();

        let dispatcher = Arc::new(ArcSwap::from_pointee(Dispatcher::new(options)));
        let task_dispatcher = Arc::clone(&dispatcher);
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                run_cycle(&tracker, &task_dispatcher);
            }
        });

        tracing::info!(?period, "polling change hook installed");
        Ok(Self { dispatcher, task })
    }

    /// Replace the action and verbosity used by subsequent cycles.
    pub fn reconfigure(&self, options: HookOptions) {
        self.dispatcher.store(Arc::new(Dispatcher::new(options)));
    }

    /// The dispatcher currently in use.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.load_full()
    }

    /// Whether the hook's task is still running.
    ///
    /// A panicking callback action ends the task.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ChangeHook {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Install a `SIGHUP` hook; shorthand for [`ChangeHook::on_hangup`].
///
/// # Errors
///
/// Returns `TrackError::InvalidSignal` for a `SIGHUP` action and
/// `TrackError::SignalError` if the signal listener cannot be installed.
pub fn hup_hook<R>(tracker: Arc<FileTracker<R>>, options: HookOptions) -> Result<ChangeHook>
where
    R: UnitRegistry + Send + Sync + 'static,
{
    ChangeHook::on_hangup(tracker, options)
}

fn run_cycle<R>(tracker: &FileTracker<R>, dispatcher: &ArcSwap<Dispatcher>) -> Vec<PathBuf> {
    let changed = tracker.modified();
    if let Err(e) = dispatcher.load().dispatch(&changed) {
        tracing::warn!(error = %e, "change dispatch failed");
    }
    changed
}
