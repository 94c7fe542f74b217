//! Root CLI structure for allure-upgrade

use allure_patch::{
    EmbeddedBundle, PatchOptions, PatchPipeline, PatchRequest, PluginFile, ResourceBundle,
    bundle_at, from_bundle, from_directory,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "allure-upgrade")]
#[command(about = "Install the resultiks plugin into Allure commandline distributions", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Where plugin files are taken from
#[derive(Args, Debug, Clone, Default)]
pub struct PluginSourceArgs {
    /// Directory holding allure-plugin.yml and the files it references
    #[arg(long, env = "ALLURE_UPGRADE_PLUGIN_DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// Resource root (directory or .zip/.jar) with a plugins/ folder, used instead of the built-in plugin
    #[arg(long, env = "ALLURE_UPGRADE_RESOURCES", conflicts_with = "plugin_dir")]
    pub resources: Option<PathBuf>,
}

impl PluginSourceArgs {
    /// Resource bundle holding the plugins/ tree
    pub fn bundle(&self) -> allure_patch::Result<Arc<dyn ResourceBundle>> {
        match &self.resources {
            Some(path) => bundle_at(path),
            None => Ok(Arc::new(EmbeddedBundle::builtin())),
        }
    }

    /// Plugin files selected by these arguments
    pub fn resolve(&self) -> allure_patch::Result<Vec<PluginFile>> {
        match &self.plugin_dir {
            Some(dir) => from_directory(dir),
            None => from_bundle(self.bundle()?),
        }
    }

    /// Pipeline using the selected resource bundle
    pub fn pipeline(&self, options: PatchOptions) -> allure_patch::Result<PatchPipeline> {
        Ok(PatchPipeline::with_options(options).with_bundle(self.bundle()?))
    }

    /// Request for patching `archive`
    pub fn request(&self, archive: &Path) -> PatchRequest {
        let request = PatchRequest::new(archive);
        match &self.plugin_dir {
            Some(dir) => request.with_plugin_dir(dir),
            None => request,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Patch an Allure distribution archive
    Patch {
        /// Path to the Allure distribution (allure-<version>.zip)
        archive: PathBuf,

        #[command(flatten)]
        source: PluginSourceArgs,

        /// Marker inserted before the extension of the output file name
        #[arg(long, default_value = allure_patch::constants::OUTPUT_MARKER)]
        suffix: String,

        /// Print progress events as JSON lines instead of a progress bar
        #[arg(long)]
        json: bool,
    },

    /// Show information about an Allure distribution archive
    Info {
        /// Path to the archive
        archive: PathBuf,
    },

    /// List the plugin files that would be installed
    Plugin {
        #[command(flatten)]
        source: PluginSourceArgs,
    },

    /// Compare the file sets of two archives
    Diff {
        /// First archive
        first: PathBuf,

        /// Second archive
        second: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
