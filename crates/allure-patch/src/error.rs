//! Error types for the patch engine

use crate::compare::VerificationReport;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for patch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for patch operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source could not be opened or is not a valid zip archive
    #[error("Failed to read archive {}: {source}", .path.display())]
    ArchiveRead {
        /// Archive that failed to load
        path: PathBuf,
        /// Underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// The patched archive could not be serialized or persisted
    #[error("Failed to write archive {}: {source}", .path.display())]
    ArchiveWrite {
        /// Destination that failed to write
        path: PathBuf,
        /// Underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// Entry not found in archive
    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),

    /// Entry path is empty or otherwise unusable
    #[error("Invalid entry path: {0:?}")]
    InvalidPath(String),

    /// Entry content is not valid UTF-8 text
    #[error("Entry is not valid UTF-8 text: {0}")]
    InvalidUtf8(String),

    /// Plugin directory is missing or not a directory
    #[error("Plugin directory does not exist or is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Plugin directory or resource root has no files
    #[error("Plugin directory contains no files: {}", .0.display())]
    EmptyDirectory(PathBuf),

    /// No manifest file among the plugin files
    #[error("Plugin manifest {0} not found")]
    ManifestNotFound(String),

    /// Manifest lacks the identity marker line
    #[error("Plugin manifest does not contain the identity line `{0}`")]
    MissingPluginMarker(String),

    /// Manifest references a file that is not part of the plugin
    #[error("File referenced in plugin manifest not found: {0}")]
    MissingReferencedFile(String),

    /// Resource bundle lookup failed
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Archive does not carry the reporting tool's executable entry
    #[error("Archive does not contain {0}, not an Allure distribution")]
    NotTargetArchive(String),

    /// Version string has a component that is not a non-negative integer
    #[error("Invalid version component {component:?} in {version:?}")]
    InvalidVersionComponent {
        /// Full version string
        version: String,
        /// Offending component
        component: String,
    },

    /// Post-save verification found a mismatch
    #[error("Patch verification failed: {0}")]
    VerificationMismatch(VerificationReport),
}

/// Cloneable discriminant of [`Error`], used in terminal progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`Error::Io`]
    Io,
    /// See [`Error::ArchiveRead`]
    ArchiveRead,
    /// See [`Error::ArchiveWrite`]
    ArchiveWrite,
    /// See [`Error::EntryNotFound`]
    EntryNotFound,
    /// See [`Error::InvalidPath`]
    InvalidPath,
    /// See [`Error::InvalidUtf8`]
    InvalidUtf8,
    /// See [`Error::NotADirectory`]
    NotADirectory,
    /// See [`Error::EmptyDirectory`]
    EmptyDirectory,
    /// See [`Error::ManifestNotFound`]
    ManifestNotFound,
    /// See [`Error::MissingPluginMarker`]
    MissingPluginMarker,
    /// See [`Error::MissingReferencedFile`]
    MissingReferencedFile,
    /// See [`Error::ResourceNotFound`]
    ResourceNotFound,
    /// See [`Error::NotTargetArchive`]
    NotTargetArchive,
    /// See [`Error::InvalidVersionComponent`]
    InvalidVersionComponent,
    /// See [`Error::VerificationMismatch`]
    VerificationMismatch,
}

impl Error {
    /// Create a new EntryNotFound error
    pub fn entry_not_found<S: Into<String>>(path: S) -> Self {
        Error::EntryNotFound(path.into())
    }

    /// Create a new MissingReferencedFile error
    pub fn missing_referenced_file<S: Into<String>>(name: S) -> Self {
        Error::MissingReferencedFile(name.into())
    }

    /// Create a new ResourceNotFound error
    pub fn resource_not_found<S: Into<String>>(name: S) -> Self {
        Error::ResourceNotFound(name.into())
    }

    /// Discriminant of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::ArchiveRead { .. } => ErrorKind::ArchiveRead,
            Error::ArchiveWrite { .. } => ErrorKind::ArchiveWrite,
            Error::EntryNotFound(_) => ErrorKind::EntryNotFound,
            Error::InvalidPath(_) => ErrorKind::InvalidPath,
            Error::InvalidUtf8(_) => ErrorKind::InvalidUtf8,
            Error::NotADirectory(_) => ErrorKind::NotADirectory,
            Error::EmptyDirectory(_) => ErrorKind::EmptyDirectory,
            Error::ManifestNotFound(_) => ErrorKind::ManifestNotFound,
            Error::MissingPluginMarker(_) => ErrorKind::MissingPluginMarker,
            Error::MissingReferencedFile(_) => ErrorKind::MissingReferencedFile,
            Error::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            Error::NotTargetArchive(_) => ErrorKind::NotTargetArchive,
            Error::InvalidVersionComponent { .. } => ErrorKind::InvalidVersionComponent,
            Error::VerificationMismatch(_) => ErrorKind::VerificationMismatch,
        }
    }

    /// Check if this error comes from the plugin side rather than the target archive
    pub fn is_plugin_error(&self) -> bool {
        matches!(
            self,
            Error::NotADirectory(_)
                | Error::EmptyDirectory(_)
                | Error::ManifestNotFound(_)
                | Error::MissingPluginMarker(_)
                | Error::MissingReferencedFile(_)
                | Error::ResourceNotFound(_)
        )
    }
}
