//! Plugin resolution from directories and resource bundles

use crate::common::{PLUGIN_MANIFEST, build_zip, temp_dir, write_files, write_plugin_dir};
use allure_patch::{
    ArchiveBundle, ContentSource, DirectoryBundle, Error, PluginFile, bundle_at, from_bundle,
    from_directory,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;

const EXPECTED: [&str; 3] = [
    "plugins/resultiks-plugin/allure-plugin.yml",
    "plugins/resultiks-plugin/lib.jar",
    "plugins/resultiks-plugin/static/a.js",
];

fn destinations(files: &[PluginFile]) -> Vec<String> {
    files.iter().map(|f| f.destination().to_string()).collect()
}

fn contents(files: &[PluginFile]) -> Vec<Vec<u8>> {
    files.iter().map(|f| f.read_bytes().unwrap()).collect()
}

#[test]
fn test_directory_resolution() {
    let dir = temp_dir();
    let plugin = write_plugin_dir(dir.path());

    let files = from_directory(&plugin).unwrap();
    assert_eq!(destinations(&files), EXPECTED);
    assert!(files[0].is_manifest());
    assert!(files[0].has_plugin_marker());
    assert!(matches!(files[1].source(), ContentSource::Path(p) if p.ends_with("lib/lib.jar")));
}

#[test]
fn test_exploded_and_packaged_roots_resolve_alike() {
    let dir = temp_dir();
    let root = dir.path().join("resources");
    write_files(
        &root,
        &[
            ("plugins/resultiks-plugin/allure-plugin.yml", PLUGIN_MANIFEST),
            ("plugins/resultiks-plugin/lib.jar", "plugin jar"),
            ("plugins/resultiks-plugin/static/a.js", "console.log('a');"),
        ],
    );

    let packaged = build_zip(&[
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
        (
            "plugins/resultiks-plugin/allure-plugin.yml",
            PLUGIN_MANIFEST.as_bytes().to_vec(),
        ),
        ("plugins/resultiks-plugin/lib.jar", b"plugin jar".to_vec()),
        (
            "plugins/resultiks-plugin/static/a.js",
            b"console.log('a');".to_vec(),
        ),
    ]);
    let jar = dir.path().join("tool.jar");
    fs::write(&jar, &packaged).unwrap();

    let exploded = from_bundle(Arc::new(DirectoryBundle::new(&root))).unwrap();
    let from_jar = from_bundle(bundle_at(&jar).unwrap()).unwrap();
    let from_memory = from_bundle(Arc::new(ArchiveBundle::from_bytes(packaged).unwrap())).unwrap();

    for files in [&exploded, &from_jar, &from_memory] {
        assert_eq!(destinations(files), EXPECTED);
        assert_eq!(contents(files), contents(&exploded));
        assert!(
            files
                .iter()
                .all(|f| matches!(f.source(), ContentSource::Resource { .. }))
        );
    }
}

#[test]
fn test_bundle_without_plugins_root() {
    let dir = temp_dir();
    write_files(dir.path(), &[("other/file.txt", "x")]);

    let err = from_bundle(Arc::new(DirectoryBundle::new(dir.path()))).unwrap_err();
    assert!(matches!(err, Error::ResourceNotFound(_)));
    assert!(err.is_plugin_error());
}

#[test]
fn test_bundle_without_manifest() {
    let bundle = ArchiveBundle::from_bytes(build_zip(&[(
        "plugins/resultiks-plugin/static/a.js",
        b"a".to_vec(),
    )]))
    .unwrap();

    assert!(matches!(
        from_bundle(Arc::new(bundle)),
        Err(Error::ManifestNotFound(_))
    ));
}

#[test]
fn test_static_file_in_nested_directory() {
    let dir = temp_dir();
    write_files(
        dir.path(),
        &[
            ("allure-plugin.yml", "id: resultiks\ncssFiles:\n  - theme.css\n"),
            ("assets/css/theme.css", "body {}"),
        ],
    );

    let files = from_directory(dir.path()).unwrap();
    assert_eq!(
        destinations(&files),
        vec![
            "plugins/resultiks-plugin/allure-plugin.yml",
            "plugins/resultiks-plugin/static/theme.css",
        ]
    );
    assert_eq!(files[1].read_bytes().unwrap(), b"body {}");
}
