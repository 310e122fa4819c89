//! File-based parser tests: discovery, input errors, end-to-end parse.

use std::fs;
use std::path::Path;

use eio_cfg::{ParseIssue, find_and_parse, find_cfg_file, parse_file};
use tempfile::TempDir;

const SAMPLE: &str = "\
EIO:CFG_1.0:6:1::
#
PROFINET_DEVICE:

      -Name \"d652_1\" -VendorName \"ABB\" -ProductName \"DSQC 652\"\\
       -SlotIndex 2
      -Name \"mod_1\" -HostDevice \"d652_1\" -SlotIndex 1
#
EIO_SIGNAL:

      -Name \"diStart\" -SignalType \"DI\" -Device \"d652_1\" -DeviceMap \"0\"
      -Name \"goSpeed\" -SignalType \"GO\" -Device \"d652_1\" -DeviceMap \"8-23\"
#
";

#[test]
fn parse_file_carries_absolute_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("EIO.cfg");
    fs::write(&path, SAMPLE).unwrap();

    let (tree, report) = parse_file(&path);
    assert!(report.is_clean());
    let root = tree.root.unwrap();
    assert_eq!(root.name, "EIO");
    assert_eq!(root.version, "6.1");
    assert!(Path::new(&root.file_name).is_absolute());
    assert_eq!(tree.sections.len(), 2);
}

#[test]
fn parse_file_missing_is_reported_not_panicked() {
    let (tree, report) = parse_file(Path::new("/nonexistent/EIO.cfg"));
    assert!(tree.is_empty());
    assert!(report.has_errors());
    assert!(matches!(report.issues[0], ParseIssue::Io { .. }));
}

#[test]
fn find_cfg_file_searches_subdirectories() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("SYSTEM").join("HOME");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("EIO.cfg"), SAMPLE).unwrap();

    let found = find_cfg_file(dir.path()).unwrap();
    assert!(found.ends_with("EIO.cfg"));

    let (tree, report) = find_and_parse(dir.path());
    assert!(report.is_clean());
    assert!(!tree.is_empty());
}

#[test]
fn find_and_parse_missing_directory() {
    let (tree, report) = find_and_parse(Path::new("/nonexistent/solution"));
    assert!(tree.is_empty());
    assert!(matches!(
        report.issues[0],
        ParseIssue::DirectoryNotFound(_)
    ));
}

#[test]
fn find_and_parse_directory_without_cfg() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("other.txt"), "not a cfg").unwrap();
    let (tree, report) = find_and_parse(dir.path());
    assert!(tree.is_empty());
    assert!(matches!(
        report.issues[0],
        ParseIssue::CfgFileNotFound { .. }
    ));
}

#[test]
fn continuation_and_device_records_survive_the_pipeline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("EIO.cfg");
    fs::write(&path, SAMPLE).unwrap();

    let (tree, _) = parse_file(&path);
    let devices: Vec<_> = tree.items_of("PROFINET_DEVICE").collect();
    assert_eq!(devices.len(), 2);
    // The continuation-joined record has both attributes.
    assert_eq!(devices[0].get("Name"), Some("d652_1"));
    assert_eq!(devices[0].get("SlotIndex"), Some("2"));
    assert_eq!(devices[1].get("HostDevice"), Some("d652_1"));

    let signals: Vec<_> = tree.items_of("EIO_SIGNAL").collect();
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[1].get("DeviceMap"), Some("8-23"));
}
