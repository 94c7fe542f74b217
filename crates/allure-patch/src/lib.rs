//! # allure_patch - Allure distribution patch engine
//!
//! Installs a report plugin into an Allure commandline distribution archive
//! (`allure-<version>.zip`) and registers it in the bundled configuration.
//! The patched distribution is written next to the source as
//! `allure-<version>-with-plugin.zip`; the source archive is never touched.
//!
//! ## Features
//!
//! - In-memory zip editing with transparent handling of the release folder
//!   that wraps every distribution (`allure-2.13.9/...`)
//! - Plugin discovery from a directory, an unpacked resource root, a packaged
//!   `.zip`/`.jar` resource root, or resources compiled into the binary
//! - Manifest (`allure-plugin.yml`) parsing with referenced-file validation
//! - Allure version detection from the bundled jar names
//! - Post-save verification that exactly the plugin files were added
//! - A progress event stream suitable for driving a UI from another thread
//!
//! ## Examples
//!
//! ### Patching an archive
//!
//! ```no_run
//! use allure_patch::{NoopSink, PatchPipeline, PatchRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = PatchPipeline::new();
//! let report = pipeline.run(&PatchRequest::new("allure-2.13.9.zip"), &NoopSink)?;
//! println!("written to {}", report.output.display());
//! # Ok(())
//! # }
//! ```
//!
//! ### Watching progress from another thread
//!
//! ```no_run
//! use allure_patch::{PatchEvent, PatchPipeline, PatchRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = PatchPipeline::new().spawn(PatchRequest::new("allure-2.13.9.zip"))?;
//! for event in handle.events() {
//!     if let PatchEvent::Progress(progress) = event {
//!         println!("{:>3}% {}", progress.percent, progress.label);
//!     }
//! }
//! let report = handle.wait()?;
//! println!("written to {}", report.output.display());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod archive;
pub mod compare;
pub mod error;
pub mod path;
pub mod pipeline;
pub mod plugin;
pub mod version;

// Re-export commonly used types
pub use archive::Archive;
pub use compare::{FileSetDiff, VerificationReport, diff, verify_patch};
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{
    ChannelSink, EventSink, FnSink, LogLevel, NoopSink, PatchEvent, PatchFailure, PatchHandle,
    PatchOptions, PatchOutcome, PatchPhase, PatchPipeline, PatchProgress, PatchReport,
    PatchRequest, register_plugin,
};
pub use plugin::{
    ArchiveBundle, ContentSource, DirectoryBundle, EmbeddedBundle, PluginFile, PluginManifest,
    ResourceBundle, bundle_at, from_bundle, from_directory,
};
pub use version::{Version, compare_versions, extract_version, is_target_archive, parse_version};

/// Fixed names of the Allure distribution and the bundled plugin
pub mod constants {
    /// Manifest file every Allure plugin carries
    pub const MANIFEST_FILE: &str = "allure-plugin.yml";

    /// Manifest line identifying the plugin this tool installs
    pub const PLUGIN_MARKER: &str = "id: resultiks";

    /// Install location of the plugin inside the distribution
    pub const PLUGIN_DIR: &str = "plugins/resultiks-plugin";

    /// Subdirectory of [`PLUGIN_DIR`] holding static web assets
    pub const STATIC_DIR: &str = "static";

    /// Suffix of the plugin's library file
    pub const LIBRARY_SUFFIX: &str = ".jar";

    /// Distribution configuration listing enabled plugins
    pub const CONFIG_PATH: &str = "config/allure.yml";

    /// Line that enables the plugin in [`CONFIG_PATH`]
    pub const REGISTRATION_LINE: &str = "  - resultiks-plugin";

    /// Launcher script present in every Allure distribution
    pub const TARGET_MARKER: &str = "bin/allure";

    /// Prefix of the distribution's own jars
    pub const LIBRARY_PREFIX: &str = "lib/allure-";

    /// Version reported when no jar name yields one
    pub const UNRECOGNIZED_VERSION: &str = "Unrecognized version";

    /// Marker inserted before the extension of the patched archive's name
    pub const OUTPUT_MARKER: &str = "-with-plugin";

    /// Logical root of plugin files inside a resource bundle
    pub const RESOURCE_ROOT: &str = "plugins";
}
