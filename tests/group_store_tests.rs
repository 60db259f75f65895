use daily_poll_bot::storage::{GroupStore, StoreError};
use std::fs;
use teloxide::types::ChatId;
use tempfile::tempdir;

fn store_in(dir: &tempfile::TempDir) -> GroupStore {
    GroupStore::new(dir.path().join("groups.json"))
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir);

    assert_eq!(store.load().unwrap(), Vec::<ChatId>::new());
    // No file is created by a pure read.
    assert!(!store.path().exists());
}

#[test]
fn add_persists_and_preserves_order() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir);

    assert!(store.add(ChatId(100)).unwrap());
    assert!(store.add(ChatId(-200)).unwrap());
    assert!(store.add(ChatId(300)).unwrap());

    assert_eq!(
        store.load().unwrap(),
        vec![ChatId(100), ChatId(-200), ChatId(300)]
    );
}

#[test]
fn add_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir);

    assert!(store.add(ChatId(100)).unwrap());
    assert!(!store.add(ChatId(100)).unwrap());

    assert_eq!(store.load().unwrap(), vec![ChatId(100)]);
}

#[test]
fn remove_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir);

    store.add(ChatId(100)).unwrap();
    assert!(store.remove(ChatId(100)).unwrap());
    assert!(!store.remove(ChatId(100)).unwrap());

    assert_eq!(store.load().unwrap(), Vec::<ChatId>::new());
}

#[test]
fn remove_absent_id_performs_no_write() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir);

    assert!(!store.remove(ChatId(42)).unwrap());
    // A no-op remove on an empty store never touches the filesystem.
    assert!(!store.path().exists());

    store.add(ChatId(100)).unwrap();
    let contents_before = fs::read_to_string(store.path()).unwrap();
    assert!(!store.remove(ChatId(42)).unwrap());
    assert_eq!(fs::read_to_string(store.path()).unwrap(), contents_before);
}

#[test]
fn corrupt_file_is_an_error_not_an_empty_store() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir);

    fs::write(store.path(), "{ not a json array").unwrap();

    match store.load() {
        Err(StoreError::Corrupt { path, .. }) => assert_eq!(path, store.path()),
        other => panic!("expected StoreError::Corrupt, got {:?}", other),
    }
}

#[test]
fn save_overwrites_fully() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir);

    store.save(&[ChatId(1), ChatId(2), ChatId(3)]).unwrap();
    store.save(&[ChatId(9)]).unwrap();

    assert_eq!(store.load().unwrap(), vec![ChatId(9)]);
    // The temp file used for atomic replacement is gone after a save.
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("groups.json")]);
}

#[test]
fn file_format_is_a_plain_id_array() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir);

    store.add(ChatId(100)).unwrap();
    store.add(ChatId(200)).unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    let parsed: Vec<i64> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, vec![100, 200]);
}

#[test]
fn concurrent_mutations_neither_fail_nor_lose_updates() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir);

    // Clones share one lock, so parallel add cycles must serialize instead
    // of clobbering each other's read-modify-write or temp file.
    let writer_a = store.clone();
    let writer_b = store.clone();
    let a = std::thread::spawn(move || {
        for i in 0..100 {
            writer_a.add(ChatId(i)).unwrap();
        }
    });
    let b = std::thread::spawn(move || {
        for i in 100..200 {
            writer_b.add(ChatId(i)).unwrap();
        }
    });
    a.join().unwrap();
    b.join().unwrap();

    let groups = store.load().unwrap();
    assert_eq!(groups.len(), 200);
    for i in 0..200 {
        assert!(groups.contains(&ChatId(i)), "missing id {}", i);
    }
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let store = GroupStore::new(dir.path().join("data").join("groups.json"));

    store.add(ChatId(7)).unwrap();
    assert_eq!(store.load().unwrap(), vec![ChatId(7)]);
}
