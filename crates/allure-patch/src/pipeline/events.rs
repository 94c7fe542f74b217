//! Progress events emitted by the patch pipeline

use crate::ErrorKind;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

/// Phase of a patch run
///
/// Phases run in declaration order; a run ends in either
/// [`PatchPhase::Succeeded`] or [`PatchPhase::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchPhase {
    /// Locating plugin files and checking the manifest
    ResolvingPlugin,
    /// Reading the source archive
    Loading,
    /// Checking that the archive is an Allure distribution
    Classifying,
    /// Copying plugin files into the archive
    Injecting,
    /// Registering the plugin in the configuration
    PatchingConfig,
    /// Writing the patched archive
    Saving,
    /// Comparing the patched archive with the source
    Verifying,
    /// Run completed
    Succeeded,
    /// Run aborted
    Failed,
}

impl PatchPhase {
    /// Progress percentage at which the phase starts
    ///
    /// `Failed` has no starting point of its own and returns 0; a failed run
    /// reports the percentage it had reached instead.
    pub fn percent(self) -> u8 {
        match self {
            PatchPhase::ResolvingPlugin => 0,
            PatchPhase::Loading => 5,
            PatchPhase::Classifying => 10,
            PatchPhase::Injecting => 15,
            PatchPhase::PatchingConfig => 70,
            PatchPhase::Saving => 80,
            PatchPhase::Verifying => 90,
            PatchPhase::Succeeded => 100,
            PatchPhase::Failed => 0,
        }
    }

    /// Label shown while the phase runs
    pub fn label(self) -> &'static str {
        match self {
            PatchPhase::ResolvingPlugin => "Resolving plugin files...",
            PatchPhase::Loading => "Opening archive...",
            PatchPhase::Classifying => "Checking Allure distribution...",
            PatchPhase::Injecting => "Injecting plugin files...",
            PatchPhase::PatchingConfig => "Registering plugin in config...",
            PatchPhase::Saving => "Writing patched archive...",
            PatchPhase::Verifying => "Verifying patched archive...",
            PatchPhase::Succeeded => "Patch complete",
            PatchPhase::Failed => "Patch failed",
        }
    }

    /// Whether the run is over
    pub fn is_terminal(self) -> bool {
        matches!(self, PatchPhase::Succeeded | PatchPhase::Failed)
    }
}

impl fmt::Display for PatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchPhase::ResolvingPlugin => write!(f, "resolving plugin"),
            PatchPhase::Loading => write!(f, "loading"),
            PatchPhase::Classifying => write!(f, "classifying"),
            PatchPhase::Injecting => write!(f, "injecting"),
            PatchPhase::PatchingConfig => write!(f, "patching config"),
            PatchPhase::Saving => write!(f, "saving"),
            PatchPhase::Verifying => write!(f, "verifying"),
            PatchPhase::Succeeded => write!(f, "succeeded"),
            PatchPhase::Failed => write!(f, "failed"),
        }
    }
}

/// A progress update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchProgress {
    /// Current phase
    pub phase: PatchPhase,
    /// Overall progress (0-100)
    pub percent: u8,
    /// Human-readable status
    pub label: String,
}

impl PatchProgress {
    /// Create a progress update, clamping `percent` to 100
    pub fn new(phase: PatchPhase, percent: u8, label: impl Into<String>) -> Self {
        Self {
            phase,
            percent: percent.min(100),
            label: label.into(),
        }
    }
}

/// Severity of a pipeline log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Detail
    Debug,
    /// Normal progress
    Info,
    /// Something unusual that did not stop the run
    Warn,
    /// The failure that ended the run
    Error,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Final result of a patch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatchOutcome {
    /// The patched archive was written and verified
    Succeeded {
        /// Patched archive
        output: PathBuf,
        /// Detected Allure version
        version: String,
    },
    /// The run stopped
    Failed {
        /// Phase that failed
        phase: PatchPhase,
        /// Error discriminant
        kind: ErrorKind,
        /// Error message
        message: String,
    },
}

/// Event emitted during a patch run
///
/// Every run emits any number of `Progress` and `Log` events followed by
/// exactly one `Finished` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PatchEvent {
    /// Progress update
    Progress(PatchProgress),
    /// Log line
    Log {
        /// Severity
        level: LogLevel,
        /// Message text
        message: String,
    },
    /// Terminal event
    Finished(PatchOutcome),
}

/// Receiver of pipeline events
pub trait EventSink {
    /// Handle one event
    fn emit(&self, event: PatchEvent);
}

/// Sink that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: PatchEvent) {}
}

/// Sink wrapping a closure
pub struct FnSink<F>
where
    F: Fn(PatchEvent),
{
    callback: F,
}

impl<F> FnSink<F>
where
    F: Fn(PatchEvent),
{
    /// Wrap a closure
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: Fn(PatchEvent),
{
    fn emit(&self, event: PatchEvent) {
        (self.callback)(event);
    }
}

impl<F> fmt::Debug for FnSink<F>
where
    F: Fn(PatchEvent),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

/// Sink forwarding events to a channel
///
/// Events are dropped once the receiving side has gone away; a caller stops
/// observing a run by dropping its receiver.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<PatchEvent>,
}

impl ChannelSink {
    /// Forward events to `sender`
    pub fn new(sender: Sender<PatchEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: PatchEvent) {
        if self.sender.send(event).is_err() {
            log::trace!("Event receiver dropped");
        }
    }
}
