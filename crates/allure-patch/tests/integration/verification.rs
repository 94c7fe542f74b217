//! Post-save verification against real archives

use crate::common::{temp_dir, write_zip};
use allure_patch::{Archive, Error, verify_patch};
use pretty_assertions::assert_eq;

#[test]
fn test_clean_patch_verifies() {
    let dir = temp_dir();
    let source = dir.path().join("allure.zip");
    write_zip(&source, &[("d/bin/allure", "x"), ("d/lib/a.jar", "y")]);

    let mut archive = Archive::open(&source).unwrap();
    archive.add("plugins/p/a.js", b"a".to_vec()).unwrap();
    let output = archive.save().unwrap();

    let report = verify_patch(&source, &output, &["plugins/p/a.js".to_string()]).unwrap();
    assert!(report.is_clean(), "{report}");
}

#[test]
fn test_overwritten_entry_is_not_a_change() {
    let dir = temp_dir();
    let source = dir.path().join("allure.zip");
    write_zip(&source, &[("d/bin/allure", "x"), ("d/plugins/p/a.js", "old")]);

    let mut archive = Archive::open(&source).unwrap();
    archive.add("plugins/p/a.js", b"new".to_vec()).unwrap();
    let output = archive.save().unwrap();

    let report = verify_patch(&source, &output, &["plugins/p/a.js".to_string()]).unwrap();
    assert!(report.is_clean());
}

#[test]
fn test_missing_and_unexpected_entries_are_reported() {
    let dir = temp_dir();
    let source = dir.path().join("allure.zip");
    let output = dir.path().join("allure-with-plugin.zip");
    write_zip(&source, &[("d/bin/allure", "x"), ("d/lib/a.jar", "y")]);
    write_zip(&output, &[("d/bin/allure", "x"), ("d/lib/b.jar", "y")]);

    let report = verify_patch(&source, &output, &["plugins/p/a.js".to_string()]).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.missing, vec!["plugins/p/a.js"]);
    assert_eq!(
        report.unexpected.to_string(),
        "{allure.zip: [lib/a.jar], allure-with-plugin.zip: [lib/b.jar]}"
    );

    let err = Error::VerificationMismatch(report);
    assert!(err.to_string().contains("missing files: [plugins/p/a.js]"));
}

#[test]
fn test_unreadable_output_is_read_error() {
    let dir = temp_dir();
    let source = dir.path().join("allure.zip");
    write_zip(&source, &[("d/bin/allure", "x")]);

    let result = verify_patch(&source, dir.path().join("missing.zip"), &[]);
    assert!(matches!(result, Err(Error::ArchiveRead { .. })));
}
