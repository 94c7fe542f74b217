//! Plugin file resolution
//!
//! Both entry points build a catalog of candidate files keyed by base name,
//! then let the manifest decide which of them are installed and where:
//!
//! | File              | Destination                                   |
//! |-------------------|-----------------------------------------------|
//! | manifest          | `plugins/resultiks-plugin/allure-plugin.yml`  |
//! | library jar       | `plugins/resultiks-plugin/<jar>`              |
//! | static asset      | `plugins/resultiks-plugin/static/<asset>`     |
//!
//! The returned list is always ordered manifest, jar, static assets.

use super::bundle::ResourceBundle;
use super::file::{ContentSource, PluginFile};
use super::manifest::PluginManifest;
use crate::constants::{LIBRARY_SUFFIX, MANIFEST_FILE, PLUGIN_DIR, RESOURCE_ROOT, STATIC_DIR};
use crate::path::{entry_file_name, join_entry};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Candidate plugin files keyed by base name, in discovery order
type Catalog = IndexMap<String, ContentSource>;

fn catalog_insert(catalog: &mut Catalog, name: String, source: ContentSource) {
    if let Some(previous) = catalog.insert(name, source) {
        // Same base name in two subdirectories; the later one wins
        log::warn!("Plugin file {previous} is shadowed by a file with the same name");
    }
}

/// Resolve plugin files from a directory tree
///
/// Every regular file below `dir` is a candidate, whatever its depth. Files
/// sharing a base name collapse to the last one found.
pub fn from_directory<P: AsRef<Path>>(dir: P) -> Result<Vec<PluginFile>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let mut catalog = Catalog::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        catalog_insert(
            &mut catalog,
            name,
            ContentSource::Path(entry.path().to_path_buf()),
        );
    }

    if catalog.is_empty() {
        return Err(Error::EmptyDirectory(dir.to_path_buf()));
    }

    log::debug!("Found {} files in plugin directory {}", catalog.len(), dir.display());
    resolve(catalog)
}

/// Resolve plugin files from the `plugins` root of a resource bundle
pub fn from_bundle(bundle: Arc<dyn ResourceBundle>) -> Result<Vec<PluginFile>> {
    let names = bundle.list(RESOURCE_ROOT)?;
    if names.is_empty() {
        return Err(Error::EmptyDirectory(PathBuf::from(RESOURCE_ROOT)));
    }

    let mut catalog = Catalog::new();
    for name in names {
        let base = entry_file_name(&name).to_string();
        let source = ContentSource::Resource {
            bundle: Arc::clone(&bundle),
            name,
        };
        catalog_insert(&mut catalog, base, source);
    }

    log::debug!("Found {} plugin resources in {bundle:?}", catalog.len());
    resolve(catalog)
}

fn resolve(catalog: Catalog) -> Result<Vec<PluginFile>> {
    let manifest_source = catalog
        .get(MANIFEST_FILE)
        .ok_or_else(|| Error::ManifestNotFound(MANIFEST_FILE.to_string()))?;
    let manifest = PluginManifest::parse(&manifest_source.read_lines()?);

    let mut files = vec![PluginFile::new(
        join_entry(&[PLUGIN_DIR, MANIFEST_FILE]),
        manifest_source.clone(),
    )];

    if let Some(extension) = &manifest.extension {
        // The extension names a class, not a file; the plugin ships one jar
        let (jar, source) = catalog
            .iter()
            .find(|(name, _)| name.ends_with(LIBRARY_SUFFIX))
            .ok_or_else(|| Error::missing_referenced_file(format!("{extension} (no .jar file)")))?;
        files.push(PluginFile::new(join_entry(&[PLUGIN_DIR, jar.as_str()]), source.clone()));
    }

    for asset in &manifest.static_files {
        let source = catalog
            .get(asset.as_str())
            .ok_or_else(|| Error::missing_referenced_file(asset.as_str()))?;
        files.push(PluginFile::new(
            join_entry(&[PLUGIN_DIR, STATIC_DIR, asset.as_str()]),
            source.clone(),
        ));
    }

    for file in &files {
        log::debug!("Plugin file {} <- {}", file.destination(), file.source());
    }
    Ok(files)
}
