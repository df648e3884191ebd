use std::fs;

use seo_engine::{ensure_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("report.json", b"{}").unwrap();
    assert_eq!(first.file_name().unwrap(), "report.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "{}");

    let second = writer.write("report.json", b"[1]").unwrap();
    assert_eq!(first, second);
    assert_eq!(
        writer.read_to_string("report.json").unwrap().as_deref(),
        Some("[1]")
    );
}

#[test]
fn read_and_remove_tolerate_missing_files() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    assert_eq!(writer.read_to_string("session.ron").unwrap(), None);
    assert!(!writer.remove("session.ron").unwrap());

    writer.write("session.ron", b"()").unwrap();
    assert!(writer.remove("session.ron").unwrap());
    assert!(!temp.path().join("session.ron").exists());
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("report.json", b"data").is_err());
    assert!(!file_path.with_file_name("report.json").exists());
}
