//! Complete patch runs against fixture distributions

use crate::common::{
    ALLURE_CONFIG, PLUGIN_MANIFEST, init_logging, read_zip, temp_dir, write_distribution,
    write_files, write_plugin_dir, write_zip,
};
use allure_patch::{
    Archive, ErrorKind, FnSink, NoopSink, PatchEvent, PatchOutcome, PatchPhase, PatchPipeline,
    PatchRequest,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::fs;

#[test]
fn test_plugin_directory_patch() {
    init_logging();
    let dir = temp_dir();
    let source = write_distribution(dir.path(), "", "2.1.0");
    let plugin = write_plugin_dir(dir.path());

    let request = PatchRequest::new(&source).with_plugin_dir(&plugin);
    let report = PatchPipeline::new().run(&request, &NoopSink).unwrap();

    assert_eq!(report.output, dir.path().join("allure-with-plugin.zip"));
    assert_eq!(report.version, "2.1.0");
    assert_eq!(report.root_dir, "");
    assert!(report.config_updated);

    let entries = read_zip(&report.output);
    assert_eq!(
        entries.keys().map(String::as_str).collect::<Vec<_>>(),
        vec![
            "bin/allure",
            "config/allure.yml",
            "lib/allure-2.1.0.jar",
            "plugins/resultiks-plugin/allure-plugin.yml",
            "plugins/resultiks-plugin/lib.jar",
            "plugins/resultiks-plugin/static/a.js",
        ]
    );
    assert_eq!(
        entries["plugins/resultiks-plugin/allure-plugin.yml"],
        PLUGIN_MANIFEST.as_bytes()
    );
    assert_eq!(entries["plugins/resultiks-plugin/lib.jar"], b"plugin jar");

    let config = String::from_utf8(entries["config/allure.yml"].clone()).unwrap();
    let lines: Vec<&str> = config.lines().collect();
    assert_eq!(lines[0], "plugins:");
    assert_eq!(lines[1], "  - resultiks-plugin");
    assert_eq!(&lines[2..], ["  - junit-xml-plugin", "  - xunit-xml-plugin"]);

    // Source is untouched
    let original = read_zip(&source);
    assert_eq!(original.len(), 3);
    assert_eq!(original["config/allure.yml"], ALLURE_CONFIG.as_bytes());
}

#[test]
fn test_patching_the_output_again_is_idempotent() {
    let dir = temp_dir();
    let source = write_distribution(dir.path(), "allure-2.13.9", "2.13.9");
    let plugin = write_plugin_dir(dir.path());
    let pipeline = PatchPipeline::new();

    let first = pipeline
        .run(&PatchRequest::new(&source).with_plugin_dir(&plugin), &NoopSink)
        .unwrap();
    let second = pipeline
        .run(
            &PatchRequest::new(&first.output).with_plugin_dir(&plugin),
            &NoopSink,
        )
        .unwrap();

    assert!(first.config_updated);
    assert!(!second.config_updated);
    assert_eq!(
        second.output,
        dir.path().join("allure-2.13.9-with-plugin-with-plugin.zip")
    );

    let once = Archive::open(&first.output).unwrap();
    let twice = Archive::open(&second.output).unwrap();
    assert_eq!(twice.root_dir(), "allure-2.13.9");
    assert_eq!(
        twice.read_text("config/allure.yml").unwrap(),
        once.read_text("config/allure.yml").unwrap()
    );
    assert_eq!(
        twice
            .read_text("config/allure.yml")
            .unwrap()
            .matches("resultiks-plugin")
            .count(),
        1
    );
    assert_eq!(
        twice.file_names().collect::<Vec<_>>(),
        once.file_names().collect::<Vec<_>>()
    );
}

#[test]
fn test_colliding_entry_is_overwritten() {
    let dir = temp_dir();
    let source = dir.path().join("allure-2.1.0.zip");
    write_zip(
        &source,
        &[
            ("allure-2.1.0/bin/allure", "run"),
            ("allure-2.1.0/config/allure.yml", "plugins:\n"),
            ("allure-2.1.0/plugins/resultiks-plugin/static/a.js", "stale"),
        ],
    );
    let plugin = write_plugin_dir(dir.path());

    let report = PatchPipeline::new()
        .run(&PatchRequest::new(&source).with_plugin_dir(&plugin), &NoopSink)
        .unwrap();

    let patched = Archive::open(&report.output).unwrap();
    assert_eq!(
        patched
            .read_file("plugins/resultiks-plugin/static/a.js")
            .unwrap(),
        b"console.log('a');"
    );
    assert_eq!(patched.len(), 5);
    assert_eq!(report.version, "Unrecognized version");
}

#[test]
fn test_missing_marker_leaves_no_output() {
    let dir = temp_dir();
    let source = write_distribution(dir.path(), "allure-2.1.0", "2.1.0");
    let plugin = dir.path().join("foreign");
    write_files(
        &plugin,
        &[
            ("allure-plugin.yml", "id: foreign\njsFiles:\n  - a.js\n"),
            ("a.js", "a"),
        ],
    );

    let failure = PatchPipeline::new()
        .run(&PatchRequest::new(&source).with_plugin_dir(&plugin), &NoopSink)
        .unwrap_err();

    assert_eq!(failure.phase, PatchPhase::ResolvingPlugin);
    assert_eq!(failure.error.kind(), ErrorKind::MissingPluginMarker);
    assert!(!dir.path().join("allure-2.1.0-with-plugin.zip").exists());
    assert_eq!(
        fs::read_dir(dir.path()).unwrap().count(),
        2,
        "only the source archive and the plugin directory remain"
    );
}

#[test]
fn test_invalid_archive_fails_loading() {
    let dir = temp_dir();
    let source = dir.path().join("allure.zip");
    fs::write(&source, "definitely not a zip").unwrap();

    let events = RefCell::new(Vec::new());
    let sink = FnSink::new(|event| events.borrow_mut().push(event));
    let failure = PatchPipeline::new()
        .run(&PatchRequest::new(&source), &sink)
        .unwrap_err();
    assert_eq!(failure.phase, PatchPhase::Loading);

    let events = events.into_inner();
    match events.last() {
        Some(PatchEvent::Finished(PatchOutcome::Failed { phase, kind, message })) => {
            assert_eq!(*phase, PatchPhase::Loading);
            assert_eq!(*kind, ErrorKind::ArchiveRead);
            assert!(message.contains("allure.zip"));
        }
        other => panic!("unexpected last event: {other:?}"),
    }
}

#[test]
fn test_events_serialize_as_json_lines() {
    let dir = temp_dir();
    let source = write_distribution(dir.path(), "allure-2.1.0", "2.1.0");

    let handle = PatchPipeline::new()
        .spawn(PatchRequest::new(&source))
        .unwrap();
    let lines: Vec<serde_json::Value> = handle
        .events()
        .map(|event| serde_json::to_value(&event).unwrap())
        .collect();
    handle.wait().unwrap();

    assert_eq!(lines[0]["event"], "progress");
    assert_eq!(lines[0]["data"]["phase"], "resolving_plugin");
    assert_eq!(lines[0]["data"]["percent"], serde_json::json!(0));

    let last = lines.last().unwrap();
    assert_eq!(last["event"], "finished");
    assert_eq!(last["data"]["status"], "succeeded");
    assert_eq!(last["data"]["version"], "2.1.0");
}
