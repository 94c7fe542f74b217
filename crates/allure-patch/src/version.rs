//! Allure distribution detection and version parsing
//!
//! The Allure commandline distribution ships its own jars as
//! `lib/allure-<module>-<version>.jar` or `lib/allure-<version>.jar`. The
//! version shown to the user is the highest one found among those names.

use crate::archive::Archive;
use crate::constants::{LIBRARY_PREFIX, TARGET_MARKER, UNRECOGNIZED_VERSION};
use crate::{Error, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Non-digit run, dotted digits, a literal dot, then a non-digit run
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D+([\d.]+)\.\D+").expect("invalid version pattern"));

/// A dotted numeric version such as `2.13.9`
///
/// Ordering compares components as integers; missing trailing components
/// count as zero, so `1.0` and `1.0.0` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    components: Vec<u64>,
}

impl Version {
    /// Parse a dotted numeric version
    ///
    /// Every component must be a non-negative integer; anything else (for
    /// example the `rc1` in `2.0.rc1`) is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let components = raw
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| Error::InvalidVersionComponent {
                        version: raw.to_string(),
                        component: part.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }

    /// The version as written in the file name
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed numeric components
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let a = self.components.get(i).copied().unwrap_or(0);
                let b = other.components.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two dotted version strings
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

/// Extract the version embedded in a file name
///
/// # Examples
///
/// ```
/// use allure_patch::version::extract_version;
///
/// assert_eq!(extract_version("lib/allure-2.13.9.jar"), Some("2.13.9"));
/// assert_eq!(extract_version("lib/other.jar"), None);
/// ```
pub fn extract_version(name: &str) -> Option<&str> {
    VERSION_PATTERN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Check whether the archive is an Allure commandline distribution
pub fn is_target_archive(archive: &Archive) -> bool {
    archive.contains(TARGET_MARKER)
}

/// Highest version among the distribution's own jars
///
/// Returns [`UNRECOGNIZED_VERSION`] when no jar name yields a version.
/// Candidates with non-numeric components are skipped.
pub fn parse_version(archive: &Archive) -> String {
    archive
        .file_names()
        .filter(|name| name.starts_with(LIBRARY_PREFIX))
        .filter_map(extract_version)
        .filter_map(|raw| match Version::parse(raw) {
            Ok(version) => Some(version),
            Err(e) => {
                log::warn!("Ignoring version candidate: {e}");
                None
            }
        })
        .max()
        .map_or_else(|| UNRECOGNIZED_VERSION.to_string(), |v| v.raw)
}
