//! Patch runs with plugin files from different resource roots

use crate::common::{build_zip, read_zip, temp_dir, write_distribution, write_files};
use allure_patch::{
    DirectoryBundle, EmbeddedBundle, ErrorKind, NoopSink, PatchPipeline, PatchRequest, bundle_at,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;

const MANIFEST: &str = "id: resultiks\ncssFiles:\n  - theme.css\n";

#[test]
fn test_builtin_resources() {
    let dir = temp_dir();
    let source = write_distribution(dir.path(), "allure-2.24.0", "2.24.0");

    let report = PatchPipeline::new()
        .with_bundle(Arc::new(EmbeddedBundle::builtin()))
        .run(&PatchRequest::new(&source), &NoopSink)
        .unwrap();

    let entries = read_zip(&report.output);
    assert!(entries.contains_key("allure-2.24.0/plugins/resultiks-plugin/allure-plugin.yml"));
    assert!(entries.contains_key("allure-2.24.0/plugins/resultiks-plugin/static/index.js"));
    assert_eq!(report.version, "2.24.0");
}

#[test]
fn test_exploded_resource_root() {
    let dir = temp_dir();
    let source = write_distribution(dir.path(), "allure-2.1.0", "2.1.0");
    let resources = dir.path().join("resources");
    write_files(
        &resources,
        &[
            ("plugins/resultiks-plugin/allure-plugin.yml", MANIFEST),
            ("plugins/resultiks-plugin/static/theme.css", "body {}"),
        ],
    );

    let report = PatchPipeline::new()
        .with_bundle(Arc::new(DirectoryBundle::new(&resources)))
        .run(&PatchRequest::new(&source), &NoopSink)
        .unwrap();

    assert_eq!(
        report.injected,
        vec![
            "plugins/resultiks-plugin/allure-plugin.yml",
            "plugins/resultiks-plugin/static/theme.css",
        ]
    );
}

#[test]
fn test_packaged_resource_root() {
    let dir = temp_dir();
    let source = write_distribution(dir.path(), "allure-2.1.0", "2.1.0");
    let jar = dir.path().join("allure-upgrade.jar");
    fs::write(
        &jar,
        build_zip(&[
            (
                "plugins/resultiks-plugin/allure-plugin.yml",
                MANIFEST.as_bytes().to_vec(),
            ),
            ("plugins/resultiks-plugin/theme.css", b"body {}".to_vec()),
        ]),
    )
    .unwrap();

    let report = PatchPipeline::new()
        .with_bundle(bundle_at(&jar).unwrap())
        .run(&PatchRequest::new(&source), &NoopSink)
        .unwrap();

    let entries = read_zip(&report.output);
    assert_eq!(
        entries["allure-2.1.0/plugins/resultiks-plugin/static/theme.css"],
        b"body {}"
    );
}

#[test]
fn test_plugin_dir_takes_precedence_over_bundle() {
    let dir = temp_dir();
    let source = write_distribution(dir.path(), "allure-2.1.0", "2.1.0");
    let empty_resources = dir.path().join("resources");
    fs::create_dir(&empty_resources).unwrap();
    let plugin = dir.path().join("plugin");
    write_files(
        &plugin,
        &[("allure-plugin.yml", MANIFEST), ("theme.css", "body {}")],
    );

    let pipeline = PatchPipeline::new().with_bundle(Arc::new(DirectoryBundle::new(&empty_resources)));

    let failure = pipeline
        .run(&PatchRequest::new(&source), &NoopSink)
        .unwrap_err();
    assert_eq!(failure.error.kind(), ErrorKind::ResourceNotFound);

    let report = pipeline
        .run(&PatchRequest::new(&source).with_plugin_dir(&plugin), &NoopSink)
        .unwrap();
    assert_eq!(report.injected.len(), 2);
}
