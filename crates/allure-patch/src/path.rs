//! Path utilities for archive entries
//!
//! Zip entry names always use forward slashes (`/`) as separators. Archives
//! produced by some Windows tools still contain backslashes, so every name read
//! from an archive goes through [`normalize_entry_path`] before it is stored.
//!
//! # Root directory handling
//!
//! Distribution archives usually wrap everything in a single top-level folder
//! whose name changes between releases (`allure-2.13.9/bin/allure`). The
//! archive store keys its entries without that folder, so lookups such as
//! `bin/allure` work for every release. [`split_root`] and [`with_root`] are
//! the two halves of that conversion.

use std::path::{Path, PathBuf};

/// Normalize an entry name to forward slashes
///
/// # Examples
///
/// ```
/// use allure_patch::path::normalize_entry_path;
///
/// assert_eq!(normalize_entry_path("lib\\allure-2.1.0.jar"), "lib/allure-2.1.0.jar");
/// assert_eq!(normalize_entry_path("bin/allure"), "bin/allure");
/// ```
pub fn normalize_entry_path(name: &str) -> String {
    name.replace('\\', "/")
}

/// Split a multi-segment entry name into its first segment and the remainder
///
/// Returns `None` for single-segment names, which can never carry a root
/// directory.
///
/// # Examples
///
/// ```
/// use allure_patch::path::split_root;
///
/// assert_eq!(split_root("allure-2.13.9/bin/allure"), Some(("allure-2.13.9", "bin/allure")));
/// assert_eq!(split_root("README.txt"), None);
/// ```
pub fn split_root(name: &str) -> Option<(&str, &str)> {
    match name.split_once('/') {
        Some((first, rest)) if !first.is_empty() && !rest.is_empty() => Some((first, rest)),
        _ => None,
    }
}

/// Prefix an entry name with a root directory, if one is set
pub fn with_root(root_dir: &str, name: &str) -> String {
    if root_dir.is_empty() {
        name.to_string()
    } else {
        format!("{root_dir}/{name}")
    }
}

/// Join archive path segments with `/`
pub fn join_entry(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.trim_matches('/'))
        .collect::<Vec<_>>()
        .join("/")
}

/// Final segment of an entry name
pub fn entry_file_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Derive the output file name for a patched archive
///
/// The marker is inserted between the file stem and the extension, so the
/// source archive is never overwritten.
///
/// # Examples
///
/// ```
/// use allure_patch::path::derived_output_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     derived_output_path(Path::new("dist/allure-2.13.9.zip"), "-with-plugin"),
///     PathBuf::from("dist/allure-2.13.9-with-plugin.zip")
/// );
/// ```
pub fn derived_output_path(path: &Path, marker: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match path.extension() {
        Some(ext) => format!("{stem}{marker}.{}", ext.to_string_lossy()),
        None => format!("{stem}{marker}"),
    };

    path.with_file_name(file_name)
}
