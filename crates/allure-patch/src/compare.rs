//! File-set comparison and post-patch verification
//!
//! [`diff`] reports the names unique to each side of a comparison. The patch
//! pipeline uses it through [`verify_patch`] to confirm that the saved archive
//! differs from the source by exactly the injected plugin files.

use crate::Archive;
use crate::Result;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Names unique to each side of a comparison, keyed by side alias
///
/// A side with no unique names is omitted, so two equal sets produce an
/// empty diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSetDiff {
    sides: IndexMap<String, BTreeSet<String>>,
}

impl FileSetDiff {
    /// Whether both sides were equal
    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    /// Names unique to the side with the given alias
    pub fn unique_to(&self, alias: &str) -> Option<&BTreeSet<String>> {
        self.sides.get(alias)
    }

    /// Iterate over `(alias, unique names)` pairs in comparison order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.sides.iter().map(|(alias, names)| (alias.as_str(), names))
    }
}

impl fmt::Display for FileSetDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (alias, names)) in self.sides.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            write!(f, "{alias}: [{}]", names.join(", "))?;
        }
        f.write_str("}")
    }
}

/// Compute the symmetric difference of two name sets
///
/// # Examples
///
/// ```
/// use allure_patch::diff;
///
/// let d = diff(["a", "b", "c"], "x", ["a", "b", "d"], "y");
/// assert_eq!(d.to_string(), "{x: [c], y: [d]}");
///
/// assert!(diff(["a"], "x", ["a"], "y").is_empty());
/// ```
pub fn diff<A, B, S, T>(a: A, alias_a: &str, b: B, alias_b: &str) -> FileSetDiff
where
    A: IntoIterator<Item = S>,
    B: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    let a: BTreeSet<String> = a.into_iter().map(|s| s.as_ref().to_string()).collect();
    let b: BTreeSet<String> = b.into_iter().map(|s| s.as_ref().to_string()).collect();

    let only_a: BTreeSet<String> = a.difference(&b).cloned().collect();
    let only_b: BTreeSet<String> = b.difference(&a).cloned().collect();

    let mut sides = IndexMap::new();
    if !only_a.is_empty() {
        sides.insert(alias_a.to_string(), only_a);
    }
    if !only_b.is_empty() {
        sides.insert(alias_b.to_string(), only_b);
    }

    FileSetDiff { sides }
}

/// Outcome of comparing a patched archive against its source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Injected paths absent from the patched archive
    pub missing: Vec<String>,
    /// Differences outside the injected set
    pub unexpected: FileSetDiff,
}

impl VerificationReport {
    /// Whether every injected file is present and nothing else changed
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return f.write_str("patched archive matches the source plus the plugin files");
        }

        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing files: [{}]", self.missing.join(", ")));
        }
        if !self.unexpected.is_empty() {
            parts.push(format!("unexpected changes: {}", self.unexpected));
        }
        f.write_str(&parts.join("; "))
    }
}

/// Compare the file sets of a source archive and its patched copy
///
/// Both archives are re-read from disk. Paths in `injected` are expected in
/// the patched archive and excluded from the comparison on both sides, so an
/// injected file that replaced an existing entry is not reported.
pub fn verify_patch<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    patched: Q,
    injected: &[String],
) -> Result<VerificationReport> {
    let source = Archive::open(source.as_ref())?;
    let patched = Archive::open(patched.as_ref())?;

    log::debug!(
        "Verifying {} ({} entries) against {} ({} entries)",
        patched.path().display(),
        patched.len(),
        source.path().display(),
        source.len()
    );

    let missing: Vec<String> = injected
        .iter()
        .filter(|name| !patched.contains(name))
        .cloned()
        .collect();

    let injected: BTreeSet<&str> = injected.iter().map(String::as_str).collect();
    let unexpected = diff(
        source.file_names().filter(|n| !injected.contains(n)),
        &archive_alias(source.path()),
        patched.file_names().filter(|n| !injected.contains(n)),
        &archive_alias(patched.path()),
    );

    Ok(VerificationReport {
        missing,
        unexpected,
    })
}

fn archive_alias(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
