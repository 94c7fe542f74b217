//! Resource bundles
//!
//! A [`ResourceBundle`] is a read-only namespace of named files. Plugin files
//! shipped with the tool live under the logical root
//! [`RESOURCE_ROOT`](crate::constants::RESOURCE_ROOT), whether that root is an
//! unpacked directory, a packaged `.zip`/`.jar`, or compiled into the binary.

use crate::archive::read_entries;
use crate::path::normalize_entry_path;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// A namespace of named, read-only files
pub trait ResourceBundle: fmt::Debug + Send + Sync {
    /// Names of all files below `root`, bundle-relative with `/` separators
    ///
    /// Fails with [`Error::ResourceNotFound`] if the bundle has no such root.
    fn list(&self, root: &str) -> Result<Vec<String>>;

    /// Read a file by the name returned from [`ResourceBundle::list`]
    fn read(&self, name: &str) -> Result<Vec<u8>>;
}

/// Open a resource root from disk
///
/// Directories are served as they are; any other file is treated as a
/// packaged archive.
pub fn bundle_at<P: AsRef<Path>>(path: P) -> Result<Arc<dyn ResourceBundle>> {
    let path = path.as_ref();
    if path.is_dir() {
        Ok(Arc::new(DirectoryBundle::new(path)))
    } else {
        Ok(Arc::new(ArchiveBundle::open(path)?))
    }
}

fn root_prefix(root: &str) -> String {
    format!("{}/", root.trim_matches('/'))
}

/// Resources in an unpacked directory tree
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    base: PathBuf,
}

impl DirectoryBundle {
    /// Serve files below `base`
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base: base.into() }
    }

    /// Directory the bundle is served from
    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl ResourceBundle for DirectoryBundle {
    fn list(&self, root: &str) -> Result<Vec<String>> {
        let dir = self.base.join(root);
        if !dir.is_dir() {
            return Err(Error::resource_not_found(root));
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.base) {
                names.push(normalize_entry_path(&relative.to_string_lossy()));
            }
        }

        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        match fs::read(self.base.join(name)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::resource_not_found(name)),
            result => Ok(result?),
        }
    }
}

/// Resources packaged in a zip or jar file
#[derive(Debug, Clone)]
pub struct ArchiveBundle {
    entries: IndexMap<String, Vec<u8>>,
}

impl ArchiveBundle {
    /// Load every entry of a packaged resource file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let read_error = |source: zip::result::ZipError| Error::ArchiveRead {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(|e| read_error(e.into()))?;
        let entries = read_entries(BufReader::new(file)).map_err(read_error)?;
        log::debug!("Loaded {} resources from {}", entries.len(), path.display());

        Ok(Self::from_entries(entries))
    }

    /// Load a packaged resource file already held in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let entries =
            read_entries(Cursor::new(bytes)).map_err(|source| Error::ArchiveRead {
                path: PathBuf::from("<memory>"),
                source,
            })?;
        Ok(Self::from_entries(entries))
    }

    fn from_entries(entries: Vec<crate::archive::RawEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.name, e.data)).collect(),
        }
    }
}

impl ResourceBundle for ArchiveBundle {
    fn list(&self, root: &str) -> Result<Vec<String>> {
        let prefix = root_prefix(root);
        let names: Vec<String> = self
            .entries
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect();

        if names.is_empty() {
            return Err(Error::resource_not_found(root));
        }
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::resource_not_found(name))
    }
}

static BUILTIN: &[(&str, &[u8])] = &[
    (
        "plugins/resultiks-plugin/allure-plugin.yml",
        include_bytes!("../../resources/plugins/resultiks-plugin/allure-plugin.yml"),
    ),
    (
        "plugins/resultiks-plugin/static/index.js",
        include_bytes!("../../resources/plugins/resultiks-plugin/static/index.js"),
    ),
];

/// Resources compiled into the binary
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedBundle {
    files: &'static [(&'static str, &'static [u8])],
}

impl EmbeddedBundle {
    /// The plugin shipped with this crate
    pub fn builtin() -> Self {
        Self::new(BUILTIN)
    }

    /// Serve a static table of `(name, content)` pairs
    pub fn new(files: &'static [(&'static str, &'static [u8])]) -> Self {
        Self { files }
    }
}

impl Default for EmbeddedBundle {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ResourceBundle for EmbeddedBundle {
    fn list(&self, root: &str) -> Result<Vec<String>> {
        let prefix = root_prefix(root);
        let names: Vec<String> = self
            .files
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(name, _)| (*name).to_string())
            .collect();

        if names.is_empty() {
            return Err(Error::resource_not_found(root));
        }
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.files
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, data)| data.to_vec())
            .ok_or_else(|| Error::resource_not_found(name))
    }
}
