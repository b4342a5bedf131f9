mod helpers;

use helpers::{insert, test_store};
use mnemo::content::ContentRead;
use mnemo::error::MemoryError;

#[test]
fn same_day_same_summary_yields_suffixed_paths() {
    let (mut store, _tmp) = test_store();

    let first = store.insert("first body", "Weekly sync notes", &[]).unwrap();
    let second = store.insert("second body", "Weekly sync notes", &[]).unwrap();

    assert_ne!(first.content_path, second.content_path);
    assert!(first.content_path.ends_with("weekly-sync-notes.md"));
    assert!(second.content_path.ends_with("weekly-sync-notes-1.md"));

    // Both files hold their own content
    match store.read_content(&first.content_path, 1 << 20).unwrap() {
        ContentRead::Full { text, .. } => assert_eq!(text, "first body"),
        other => panic!("expected Full, got {other:?}"),
    }
    match store.read_content(&second.content_path, 1 << 20).unwrap() {
        ContentRead::Full { text, .. } => assert_eq!(text, "second body"),
        other => panic!("expected Full, got {other:?}"),
    }
}

#[test]
fn oversized_file_reports_size_without_content() {
    let (mut store, _tmp) = test_store();
    let id = insert(&mut store, &"x".repeat(4096), "big note", &[]);
    let path = store.get(id).unwrap().unwrap().content_path;

    match store.read_content(&path, 100).unwrap() {
        ContentRead::Oversized { size } => assert_eq!(size, 4096),
        other => panic!("expected Oversized, got {other:?}"),
    }
}

#[test]
fn missing_file_is_reported_not_raised() {
    let (store, _tmp) = test_store();
    let ghost = store.content().root().join("2024/01/01/gone.md");

    let read = store
        .read_content(&ghost.to_string_lossy(), 1 << 20)
        .unwrap();
    assert!(matches!(read, ContentRead::Missing));
}

#[test]
fn raw_read_refuses_paths_outside_the_root() {
    let (store, tmp) = test_store();

    // Relative path
    let err = store.read_raw("etc/passwd", 1 << 20).unwrap_err();
    assert!(matches!(err, MemoryError::PathOutsideRoot(_)));

    // Absolute path outside the root
    let outside = tmp.path().join("memory.db");
    let err = store
        .read_raw(&outside.to_string_lossy(), 1 << 20)
        .unwrap_err();
    assert!(matches!(err, MemoryError::PathOutsideRoot(_)));

    // Traversal out of the root
    let sneaky = store.content().root().join("../memory.db");
    let err = store
        .read_raw(&sneaky.to_string_lossy(), 1 << 20)
        .unwrap_err();
    assert!(matches!(err, MemoryError::PathOutsideRoot(_)));
}

#[test]
fn raw_read_serves_files_under_the_root() {
    let (mut store, _tmp) = test_store();
    let stored = store.insert("readable body", "raw read target", &[]).unwrap();

    match store.read_raw(&stored.content_path, 1 << 20).unwrap() {
        ContentRead::Full { text, .. } => assert_eq!(text, "readable body"),
        other => panic!("expected Full, got {other:?}"),
    }
}
