//! Unit tests for archive inflation

use super::*;

use std::io::Write;

use camino::Utf8PathBuf;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

enum Entry<'a> {
    Dir(&'a str),
    File(&'a str, &'a str),
}

fn build_zip(entries: &[Entry<'_>]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for entry in entries {
        match entry {
            Entry::Dir(name) => writer.add_directory(*name, options).unwrap(),
            Entry::File(name, content) => {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            },
        }
    }
    writer.finish().unwrap().into_inner()
}

fn temp_dest() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let dest = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, dest)
}

#[test]
fn test_wrapper_directory_is_stripped() {
    let bytes = build_zip(&[
        Entry::Dir("foo-branch/"),
        Entry::Dir("foo-branch/lib/"),
        Entry::File("foo-branch/lib/a.js", "module.exports = 1;"),
        Entry::File("foo-branch/bower.json", r#"{"name":"foo"}"#),
    ]);
    let (_guard, dest) = temp_dest();

    let stats = inflate_archive(&bytes, &dest).unwrap();

    assert_eq!(stats, InflateStats { directories: 1, files: 2 });
    assert_eq!(
        fs::read_to_string(dest.join("lib/a.js")).unwrap(),
        "module.exports = 1;"
    );
    assert!(dest.join("bower.json").is_file());
    assert!(!dest.join("foo-branch").exists());
}

#[test]
fn test_file_without_parent_directory_fails() {
    let bytes = build_zip(&[
        Entry::Dir("foo-branch/"),
        Entry::File("foo-branch/lib/a.js", "x"),
        Entry::Dir("foo-branch/lib/"),
    ]);
    let (_guard, dest) = temp_dest();

    let result = inflate_archive(&bytes, &dest);
    match result {
        Err(SproutError::ArchiveWriteFailure { entry, .. }) => {
            assert_eq!(entry, "foo-branch/lib/a.js");
        },
        other => panic!("expected ArchiveWriteFailure, got {:?}", other),
    }
}

#[test]
fn test_escaping_entries_are_rejected() {
    let bytes = build_zip(&[
        Entry::Dir("foo-branch/"),
        Entry::File("foo-branch/../../evil.txt", "x"),
    ]);
    let (_guard, dest) = temp_dest();

    let result = inflate_archive(&bytes, &dest);
    assert!(matches!(result, Err(SproutError::ArchiveWriteFailure { .. })));
    assert!(!dest.parent().unwrap().join("evil.txt").exists());
}

#[test]
fn test_invalid_archive() {
    let (_guard, dest) = temp_dest();
    let result = inflate_archive(b"definitely not a zip", &dest);
    assert!(matches!(result, Err(SproutError::ArchiveWriteFailure { .. })));
}

#[test]
fn test_empty_wrapper_only_archive() {
    let bytes = build_zip(&[Entry::Dir("foo-master/")]);
    let (_guard, dest) = temp_dest();

    let stats = inflate_archive(&bytes, &dest).unwrap();
    assert_eq!(stats, InflateStats::default());
    assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn test_unix_mode_is_applied() {
    use std::os::unix::fs::PermissionsExt;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory("tool-master/", SimpleFileOptions::default()).unwrap();
    writer
        .start_file("tool-master/run.sh", SimpleFileOptions::default().unix_permissions(0o755))
        .unwrap();
    writer.write_all(b"#!/bin/sh\n").unwrap();
    let bytes = writer.finish().unwrap().into_inner();
    let (_guard, dest) = temp_dest();

    inflate_archive(&bytes, &dest).unwrap();

    let mode = fs::metadata(dest.join("run.sh")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
}
