//! Common test utilities and fixtures

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Manifest of the test plugin: one extension jar and one script
pub const PLUGIN_MANIFEST: &str = "id: resultiks
name: Resultiks
extensions:
  - io.example.ResultiksPlugin
jsFiles:
  - a.js
";

/// Config shipped with the fixture distribution
pub const ALLURE_CONFIG: &str = "plugins:\n  - junit-xml-plugin\n  - xunit-xml-plugin\n";

/// Route library logs to the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create a temporary directory for tests
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Build zip bytes from `(name, content)` pairs, in order
pub fn build_zip<N: AsRef<str>>(entries: &[(N, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(name.as_ref(), FileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(data).expect("Failed to write zip entry");
    }
    writer
        .finish()
        .expect("Failed to finish zip")
        .into_inner()
}

/// Write a zip file from text entries
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let entries: Vec<(&str, Vec<u8>)> = entries
        .iter()
        .map(|(name, data)| (*name, data.as_bytes().to_vec()))
        .collect();
    fs::write(path, build_zip(&entries)).expect("Failed to write zip");
}

/// Read every file entry of a zip, keyed by its stored name
pub fn read_zip(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut zip = ZipArchive::new(File::open(path).expect("Failed to open zip"))
        .expect("Failed to read zip");
    let mut entries = BTreeMap::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i).expect("Failed to read zip entry");
        if file.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        file.read_to_end(&mut data).expect("Failed to read zip entry");
        entries.insert(file.name().to_string(), data);
    }
    entries
}

/// Stored entry names of a zip, in archive order
pub fn zip_names(path: &Path) -> Vec<String> {
    let mut zip = ZipArchive::new(File::open(path).expect("Failed to open zip"))
        .expect("Failed to read zip");
    (0..zip.len())
        .map(|i| zip.by_index(i).expect("Failed to read zip entry").name().to_string())
        .collect()
}

/// Write a minimal Allure distribution
///
/// With an empty `root` the entries are stored without a top-level folder.
pub fn write_distribution(dir: &Path, root: &str, version: &str) -> PathBuf {
    let name = if root.is_empty() {
        "allure.zip".to_string()
    } else {
        format!("{root}.zip")
    };
    let path = dir.join(name);
    let prefix = |entry: &str| {
        if root.is_empty() {
            entry.to_string()
        } else {
            format!("{root}/{entry}")
        }
    };

    let jar = format!("lib/allure-{version}.jar");
    let entries = [
        (prefix("bin/allure"), "#!/bin/sh\nexec java -jar allure.jar \"$@\"\n"),
        (prefix(jar.as_str()), "jar"),
        (prefix("config/allure.yml"), ALLURE_CONFIG),
    ];
    let entries: Vec<(String, Vec<u8>)> = entries
        .into_iter()
        .map(|(name, data)| (name, data.as_bytes().to_vec()))
        .collect();
    fs::write(&path, build_zip(&entries)).expect("Failed to write distribution");
    path
}

/// Write files into `dir`, creating parent directories
pub fn write_files(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, content).expect("Failed to write file");
    }
}

/// Write the test plugin (manifest, jar, script) into `dir/plugin`
pub fn write_plugin_dir(dir: &Path) -> PathBuf {
    let plugin = dir.join("plugin");
    write_files(
        &plugin,
        &[
            ("allure-plugin.yml", PLUGIN_MANIFEST),
            ("lib/lib.jar", "plugin jar"),
            ("static/a.js", "console.log('a');"),
        ],
    );
    plugin
}
