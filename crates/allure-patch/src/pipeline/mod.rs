//! Patch orchestration
//!
//! A run moves through a fixed sequence of phases:
//!
//! ```text
//! ResolvingPlugin -> Loading -> Classifying -> Injecting -> PatchingConfig
//!     -> Saving -> Verifying -> Succeeded
//! ```
//!
//! An error in any phase ends the run in `Failed` without attempting the
//! remaining phases. The source archive is never modified, so a failed run
//! leaves nothing to roll back.

mod events;

pub use events::{
    ChannelSink, EventSink, FnSink, LogLevel, NoopSink, PatchEvent, PatchOutcome, PatchPhase,
    PatchProgress,
};

use crate::archive::Archive;
use crate::compare::verify_patch;
use crate::constants::{
    CONFIG_PATH, MANIFEST_FILE, OUTPUT_MARKER, PLUGIN_MARKER, REGISTRATION_LINE, TARGET_MARKER,
};
use crate::plugin::{EmbeddedBundle, PluginFile, ResourceBundle, from_bundle, from_directory};
use crate::version::{is_target_archive, parse_version};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Insert the plugin registration line into configuration text
///
/// The line goes right after the first line. Text that already carries the
/// line is returned unchanged.
///
/// # Examples
///
/// ```
/// use allure_patch::register_plugin;
///
/// let patched = register_plugin("plugins:\n  - junit-xml-plugin\n");
/// assert_eq!(patched, "plugins:\n  - resultiks-plugin\n  - junit-xml-plugin\n");
/// assert_eq!(register_plugin(&patched), patched);
/// ```
pub fn register_plugin(content: &str) -> String {
    if content.contains(REGISTRATION_LINE) {
        return content.to_string();
    }

    match content.split_once('\n') {
        Some((first, rest)) => {
            let eol = if first.ends_with('\r') { "\r\n" } else { "\n" };
            format!("{first}\n{REGISTRATION_LINE}{eol}{rest}")
        }
        None if content.is_empty() => format!("{REGISTRATION_LINE}\n"),
        None => format!("{content}\n{REGISTRATION_LINE}\n"),
    }
}

/// What to patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRequest {
    /// Allure distribution archive
    pub source: PathBuf,
    /// External plugin directory; the pipeline's bundle is used when unset
    pub plugin_dir: Option<PathBuf>,
}

impl PatchRequest {
    /// Patch `source` with the bundled plugin
    pub fn new<P: Into<PathBuf>>(source: P) -> Self {
        Self {
            source: source.into(),
            plugin_dir: None,
        }
    }

    /// Take plugin files from a directory instead
    pub fn with_plugin_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.plugin_dir = Some(dir.into());
        self
    }
}

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// Marker inserted before the extension of the output file name
    pub output_marker: String,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            output_marker: OUTPUT_MARKER.to_string(),
        }
    }
}

impl PatchOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output file name marker
    pub fn output_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.output_marker = marker.into();
        self
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    /// Source archive
    pub source: PathBuf,
    /// Patched archive
    pub output: PathBuf,
    /// Detected Allure version
    pub version: String,
    /// Top-level directory of the distribution, empty if none
    pub root_dir: String,
    /// Injected entry names, in injection order
    pub injected: Vec<String>,
    /// Whether the configuration file was changed
    pub config_updated: bool,
}

/// A failed run
#[derive(Debug)]
pub struct PatchFailure {
    /// Phase the error occurred in
    pub phase: PatchPhase,
    /// The error
    pub error: Error,
}

impl fmt::Display for PatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patch failed while {}: {}", self.phase, self.error)
    }
}

impl std::error::Error for PatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Tracks the current phase and forwards events to the sink
struct Reporter<'a> {
    sink: &'a dyn EventSink,
    phase: PatchPhase,
    percent: u8,
}

impl<'a> Reporter<'a> {
    fn new(sink: &'a dyn EventSink) -> Self {
        Self {
            sink,
            phase: PatchPhase::ResolvingPlugin,
            percent: 0,
        }
    }

    fn enter(&mut self, phase: PatchPhase) {
        self.phase = phase;
        log::info!("{}", phase.label());
        self.progress(phase.percent(), phase.label());
    }

    fn advance(&mut self, percent: u8, label: impl Into<String>) {
        let label = label.into();
        log::debug!("{label}");
        self.progress(percent, label);
    }

    fn progress(&mut self, percent: u8, label: impl Into<String>) {
        // Progress never moves backwards
        self.percent = self.percent.max(percent.min(100));
        self.sink
            .emit(PatchEvent::Progress(PatchProgress::new(self.phase, self.percent, label)));
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        log::log!(log::Level::from(level), "{message}");
        self.sink.emit(PatchEvent::Log { level, message });
    }

    fn finish(&self, outcome: PatchOutcome) {
        self.sink.emit(PatchEvent::Finished(outcome));
    }
}

/// Runs patch requests
#[derive(Debug, Clone)]
pub struct PatchPipeline {
    options: PatchOptions,
    bundle: Arc<dyn ResourceBundle>,
}

impl Default for PatchPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchPipeline {
    /// Pipeline with default options and the built-in plugin
    pub fn new() -> Self {
        Self::with_options(PatchOptions::default())
    }

    /// Pipeline with custom options and the built-in plugin
    pub fn with_options(options: PatchOptions) -> Self {
        Self {
            options,
            bundle: Arc::new(EmbeddedBundle::builtin()),
        }
    }

    /// Resolve bundled plugin files from `bundle` instead of the built-in one
    pub fn with_bundle(mut self, bundle: Arc<dyn ResourceBundle>) -> Self {
        self.bundle = bundle;
        self
    }

    /// Current options
    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    /// Resolve the plugin files a request would install
    pub fn plugin_files(&self, request: &PatchRequest) -> Result<Vec<PluginFile>> {
        match &request.plugin_dir {
            Some(dir) => from_directory(dir),
            None => from_bundle(Arc::clone(&self.bundle)),
        }
    }

    /// Run a request on the current thread
    ///
    /// Events go to `sink` as they happen; the last one is always
    /// [`PatchEvent::Finished`].
    pub fn run(
        &self,
        request: &PatchRequest,
        sink: &dyn EventSink,
    ) -> std::result::Result<PatchReport, PatchFailure> {
        let mut reporter = Reporter::new(sink);

        match self.execute(request, &mut reporter) {
            Ok(report) => {
                reporter.log(
                    LogLevel::Info,
                    format!("Patched archive written to {}", report.output.display()),
                );
                reporter.enter(PatchPhase::Succeeded);
                reporter.finish(PatchOutcome::Succeeded {
                    output: report.output.clone(),
                    version: report.version.clone(),
                });
                Ok(report)
            }
            Err(error) => {
                let phase = reporter.phase;
                reporter.log(LogLevel::Error, format!("Failed while {phase}: {error}"));

                reporter.phase = PatchPhase::Failed;
                let percent = reporter.percent;
                reporter.progress(percent, PatchPhase::Failed.label());
                reporter.finish(PatchOutcome::Failed {
                    phase,
                    kind: error.kind(),
                    message: error.to_string(),
                });
                Err(PatchFailure { phase, error })
            }
        }
    }

    /// Run a request on a worker thread
    ///
    /// Events arrive through [`PatchHandle::events`]. Dropping the handle
    /// stops observation only; the run itself continues to completion.
    pub fn spawn(self, request: PatchRequest) -> Result<PatchHandle> {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("patch-worker".to_string())
            .spawn(move || self.run(&request, &ChannelSink::new(sender)))?;

        Ok(PatchHandle {
            events: receiver,
            worker,
        })
    }

    fn execute(&self, request: &PatchRequest, reporter: &mut Reporter<'_>) -> Result<PatchReport> {
        reporter.enter(PatchPhase::ResolvingPlugin);
        if let Some(dir) = &request.plugin_dir {
            reporter.log(
                LogLevel::Info,
                format!("Using plugin directory {}", dir.display()),
            );
        }
        let plugin_files = self.plugin_files(request)?;
        let manifest = plugin_files
            .iter()
            .find(|file| file.is_manifest())
            .ok_or_else(|| Error::ManifestNotFound(MANIFEST_FILE.to_string()))?;
        if !manifest.has_plugin_marker() {
            return Err(Error::MissingPluginMarker(PLUGIN_MARKER.to_string()));
        }
        reporter.log(
            LogLevel::Info,
            format!("Resolved {} plugin files", plugin_files.len()),
        );

        reporter.enter(PatchPhase::Loading);
        let mut archive = Archive::open(&request.source)?;
        reporter.log(
            LogLevel::Info,
            format!(
                "Loaded {} entries from {}",
                archive.len(),
                request.source.display()
            ),
        );

        reporter.enter(PatchPhase::Classifying);
        if !is_target_archive(&archive) {
            return Err(Error::NotTargetArchive(TARGET_MARKER.to_string()));
        }
        let version = parse_version(&archive);
        reporter.log(LogLevel::Info, format!("Allure version: {version}"));

        reporter.enter(PatchPhase::Injecting);
        let start = PatchPhase::Injecting.percent() as usize;
        let span = PatchPhase::PatchingConfig.percent() as usize - start;
        let total = plugin_files.len();
        let mut injected = Vec::with_capacity(total);

        for (i, file) in plugin_files.iter().enumerate() {
            let destination = file.destination();
            if archive.add(destination, file.read_bytes()?)?.is_some() {
                reporter.log(
                    LogLevel::Warn,
                    format!("Replaced existing entry {destination}"),
                );
            }
            injected.push(destination.to_string());

            let percent = start + span * (i + 1) / total;
            reporter.advance(percent as u8, format!("Injected {destination}"));
        }

        reporter.enter(PatchPhase::PatchingConfig);
        let config_updated = archive.update_text(CONFIG_PATH, register_plugin)?;
        if config_updated {
            reporter.log(LogLevel::Info, format!("Registered plugin in {CONFIG_PATH}"));
        } else {
            reporter.log(
                LogLevel::Info,
                format!("Plugin already registered in {CONFIG_PATH}"),
            );
        }

        reporter.enter(PatchPhase::Saving);
        let output = archive.save_with_marker(&self.options.output_marker)?;

        reporter.enter(PatchPhase::Verifying);
        let verification = verify_patch(&request.source, &output, &injected)?;
        if !verification.is_clean() {
            reporter.log(
                LogLevel::Warn,
                format!("Removing unverified output {}", output.display()),
            );
            discard_output(&output);
            return Err(Error::VerificationMismatch(verification));
        }

        Ok(PatchReport {
            source: request.source.clone(),
            output,
            version,
            root_dir: archive.root_dir().to_string(),
            injected,
            config_updated,
        })
    }
}

/// Delete an output that failed verification
fn discard_output(output: &Path) {
    if let Err(e) = fs::remove_file(output) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("Failed to remove {}: {e}", output.display());
        }
    }
}

/// A run on a worker thread
#[derive(Debug)]
pub struct PatchHandle {
    events: Receiver<PatchEvent>,
    worker: JoinHandle<std::result::Result<PatchReport, PatchFailure>>,
}

impl PatchHandle {
    /// Block on events until the run has finished
    ///
    /// The iterator ends after the [`PatchEvent::Finished`] event.
    pub fn events(&self) -> mpsc::Iter<'_, PatchEvent> {
        self.events.iter()
    }

    /// Next event, if one is ready
    pub fn try_event(&self) -> Option<PatchEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the run to end and return its result
    pub fn wait(self) -> std::result::Result<PatchReport, PatchFailure> {
        match self.worker.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
