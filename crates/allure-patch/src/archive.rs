//! In-memory zip archive store
//!
//! [`Archive`] reads a whole zip archive into memory, keyed by entry name with
//! the archive's root directory stripped (see [`crate::path`]). Entries can be
//! added or rewritten in memory, and the result is written to a *new* file
//! next to the source; the source archive is never modified.
//!
//! ```no_run
//! use allure_patch::Archive;
//!
//! # fn main() -> Result<(), allure_patch::Error> {
//! let mut archive = Archive::open("allure-2.13.9.zip")?;
//! archive.add("plugins/readme.txt", b"hello".to_vec())?;
//! let output = archive.save()?; // allure-2.13.9-with-plugin.zip
//! # Ok(())
//! # }
//! ```

use crate::constants::OUTPUT_MARKER;
use crate::path::{derived_output_path, normalize_entry_path, split_root, with_root};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::result::{ZipError, ZipResult};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Upper bound on the buffer reserved from an entry's declared size
const MAX_PREALLOC: u64 = 1 << 20;

/// A file entry as stored in the zip container
#[derive(Debug)]
pub(crate) struct RawEntry {
    /// Normalized entry name, root directory still attached
    pub(crate) name: String,
    /// Uncompressed content
    pub(crate) data: Vec<u8>,
    /// Unix mode bits, when the archive records them
    pub(crate) unix_mode: Option<u32>,
}

/// Read every non-directory entry of a zip stream in archive order
pub(crate) fn read_entries<R: Read + Seek>(reader: R) -> ZipResult<Vec<RawEntry>> {
    let mut zip = ZipArchive::new(reader)?;
    let mut entries = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        if file.is_dir() {
            continue;
        }

        let name = normalize_entry_path(file.name());
        if name.is_empty() || name.ends_with('/') {
            continue;
        }

        // Declared sizes come from the archive itself and are not trusted
        let declared = file.size();
        let mut data = Vec::with_capacity(declared.min(MAX_PREALLOC) as usize);
        file.read_to_end(&mut data)?;
        if data.len() as u64 != declared {
            return Err(ZipError::InvalidArchive(
                "entry size does not match its header",
            ));
        }

        log::trace!("Read entry {} ({} bytes)", name, data.len());
        entries.push(RawEntry {
            name,
            data,
            unix_mode: file.unix_mode(),
        });
    }

    Ok(entries)
}

/// Detect the root directory shared by all multi-segment entry names
///
/// The first multi-segment entry proposes the candidate. If any other
/// multi-segment entry starts with a different segment there is no common
/// root and the empty string is returned. Single-segment entries do not vote.
fn detect_root_dir<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut candidate: Option<&str> = None;

    for name in names {
        let Some((first, _)) = split_root(name) else {
            continue;
        };

        match candidate {
            None => candidate = Some(first),
            Some(root) if root == first => {}
            Some(root) => {
                log::debug!(
                    "Entry {name} is outside candidate root directory {root}, keeping original paths"
                );
                return String::new();
            }
        }
    }

    candidate.unwrap_or_default().to_string()
}

/// An archive loaded fully into memory
#[derive(Debug, Clone)]
pub struct Archive {
    /// Path the archive was loaded from
    path: PathBuf,
    /// Common top-level directory, empty if none
    root_dir: String,
    /// Entry content keyed by root-stripped name, in archive order
    files: IndexMap<String, Vec<u8>>,
    /// Unix mode bits of entries that recorded them
    modes: HashMap<String, u32>,
}

impl Archive {
    /// Open and fully read an archive from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening archive {}", path.display());

        let file = File::open(path).map_err(|e| Error::ArchiveRead {
            path: path.to_path_buf(),
            source: ZipError::Io(e),
        })?;

        Self::from_reader(path, BufReader::new(file))
    }

    /// Read an archive from any seekable stream
    ///
    /// `path` is only used to derive the output file name on [`Archive::save`].
    pub fn from_reader<P: Into<PathBuf>, R: Read + Seek>(path: P, reader: R) -> Result<Self> {
        let path = path.into();
        let entries = read_entries(reader).map_err(|source| Error::ArchiveRead {
            path: path.clone(),
            source,
        })?;

        let root_dir = detect_root_dir(entries.iter().map(|e| e.name.as_str()));
        let mut files = IndexMap::with_capacity(entries.len());
        let mut modes = HashMap::new();

        for entry in entries {
            let key = match split_root(&entry.name) {
                Some((first, rest)) if !root_dir.is_empty() && first == root_dir => {
                    rest.to_string()
                }
                _ => entry.name.clone(),
            };

            if let Some(mode) = entry.unix_mode {
                modes.insert(key.clone(), mode);
            }
            if files.insert(key.clone(), entry.data).is_some() {
                log::warn!("Duplicate entry {key} in archive, keeping the last one");
            }
        }

        log::info!(
            "Loaded {} entries from {} (root directory: {})",
            files.len(),
            path.display(),
            if root_dir.is_empty() { "<none>" } else { root_dir.as_str() }
        );

        Ok(Self {
            path,
            root_dir,
            files,
            modes,
        })
    }

    /// Path the archive was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Common top-level directory of the source archive, empty if none
    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }

    /// All entries keyed by root-stripped name
    pub fn files(&self) -> &IndexMap<String, Vec<u8>> {
        &self.files
    }

    /// Entry names in archive order
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of file entries
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the archive has no file entries
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check whether an entry exists
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Raw content of an entry
    pub fn read_file(&self, name: &str) -> Result<&[u8]> {
        self.files
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::entry_not_found(name))
    }

    /// Content of an entry decoded as UTF-8 text
    pub fn read_text(&self, name: &str) -> Result<&str> {
        let bytes = self.read_file(name)?;
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8(name.to_string()))
    }

    /// Insert or overwrite an entry
    ///
    /// Returns the previous content when an existing entry was replaced.
    pub fn add(&mut self, name: &str, data: Vec<u8>) -> Result<Option<Vec<u8>>> {
        let name = normalize_entry_path(name);
        if name.is_empty() || name.ends_with('/') {
            return Err(Error::InvalidPath(name));
        }

        log::debug!("Adding entry {} ({} bytes)", name, data.len());
        Ok(self.files.insert(name, data))
    }

    /// Rewrite a text entry through `transform`
    ///
    /// Returns `true` when the transform changed the content.
    pub fn update_text<F>(&mut self, name: &str, transform: F) -> Result<bool>
    where
        F: FnOnce(&str) -> String,
    {
        let content = self.read_text(name)?;
        let updated = transform(content);
        if updated == content {
            return Ok(false);
        }

        if let Some(slot) = self.files.get_mut(name) {
            *slot = updated.into_bytes();
        }
        Ok(true)
    }

    /// Path the patched archive is written to for a given marker
    pub fn output_path(&self, marker: &str) -> PathBuf {
        derived_output_path(&self.path, marker)
    }

    /// Write the archive next to the source with the default marker
    ///
    /// `name.zip` is written as `name-with-plugin.zip`.
    pub fn save(&self) -> Result<PathBuf> {
        self.save_with_marker(OUTPUT_MARKER)
    }

    /// Write the archive next to the source with a custom marker
    pub fn save_with_marker(&self, marker: &str) -> Result<PathBuf> {
        let output = self.output_path(marker);
        self.save_as(&output)?;
        Ok(output)
    }

    /// Write the archive to `dest`, restoring the root directory prefix
    ///
    /// The archive is serialized in memory and then persisted through a
    /// temporary file in the destination directory, so a failure never leaves
    /// a partial archive behind. Writing over the source archive is refused.
    pub fn save_as<P: AsRef<Path>>(&self, dest: P) -> Result<()> {
        let dest = dest.as_ref();
        let write_error = |source: ZipError| Error::ArchiveWrite {
            path: dest.to_path_buf(),
            source,
        };

        if dest == self.path {
            return Err(write_error(ZipError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "refusing to overwrite the source archive",
            ))));
        }

        let bytes = self.to_zip_bytes().map_err(write_error)?;

        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| write_error(e.into()))?;
        temp_file
            .write_all(&bytes)
            .and_then(|()| temp_file.flush())
            .map_err(|e| write_error(e.into()))?;

        // Atomically rename temp file to final destination
        temp_file
            .persist(dest)
            .map_err(|e| write_error(e.error.into()))?;

        log::info!(
            "Wrote {} entries ({} bytes) to {}",
            self.files.len(),
            bytes.len(),
            dest.display()
        );
        Ok(())
    }

    /// Serialize the archive as zip bytes
    pub fn to_zip_bytes(&self) -> ZipResult<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, data) in &self.files {
            let mut options =
                FileOptions::default().compression_method(CompressionMethod::Deflated);
            if let Some(mode) = self.modes.get(name) {
                options = options.unix_permissions(*mode);
            }
            if data.len() as u64 >= u64::from(u32::MAX) {
                options = options.large_file(true);
            }

            writer.start_file(with_root(&self.root_dir, name), options)?;
            writer.write_all(data)?;
        }

        Ok(writer.finish()?.into_inner())
    }
}
