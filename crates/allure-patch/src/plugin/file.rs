//! Plugin files and their content sources

use super::bundle::ResourceBundle;
use crate::constants::{MANIFEST_FILE, PLUGIN_MARKER};
use crate::path::entry_file_name;
use crate::{Error, Result};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the content of a plugin file is read from
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// A file on disk
    Path(PathBuf),
    /// A named entry of a resource bundle
    Resource {
        /// Bundle holding the entry
        bundle: Arc<dyn ResourceBundle>,
        /// Entry name inside the bundle
        name: String,
    },
}

impl ContentSource {
    /// Read the whole content
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            ContentSource::Path(path) => Ok(fs::read(path)?),
            ContentSource::Resource { bundle, name } => bundle.read(name),
        }
    }

    /// Read the content as UTF-8 text split into lines
    ///
    /// Trailing whitespace, including `\r`, is removed from every line.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        let bytes = self.read_bytes()?;
        let text = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8(self.to_string()))?;
        Ok(text.lines().map(|line| line.trim_end().to_string()).collect())
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSource::Path(path) => write!(f, "{}", path.display()),
            ContentSource::Resource { name, .. } => write!(f, "resource:{name}"),
        }
    }
}

/// A plugin file paired with its destination inside the distribution
#[derive(Debug, Clone)]
pub struct PluginFile {
    destination: String,
    source: ContentSource,
}

impl PluginFile {
    /// Create a plugin file
    pub fn new<S: Into<String>>(destination: S, source: ContentSource) -> Self {
        Self {
            destination: destination.into(),
            source,
        }
    }

    /// Root-relative entry name the file is installed as
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Where the content comes from
    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    /// Read the whole content
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        self.source.read_bytes()
    }

    /// Read the content as lines of text
    pub fn read_lines(&self) -> Result<Vec<String>> {
        self.source.read_lines()
    }

    /// Whether this file is the plugin manifest
    pub fn is_manifest(&self) -> bool {
        entry_file_name(&self.destination) == MANIFEST_FILE
    }

    /// Whether the file contains the plugin identity line
    ///
    /// A file that cannot be read does not carry the marker.
    pub fn has_plugin_marker(&self) -> bool {
        match self.read_lines() {
            Ok(lines) => lines.iter().any(|line| line.trim() == PLUGIN_MARKER),
            Err(e) => {
                log::debug!("Cannot read {} for marker check: {e}", self.source);
                false
            }
        }
    }
}
