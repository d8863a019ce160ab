use apodcache::cache::{CacheError, CacheLayout, MetadataStore, NO_ENTRY};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const DIGEST_A: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
const DIGEST_B: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

fn init_store(parent: &Path) -> MetadataStore {
    CacheLayout::init(parent).unwrap().store()
}

#[test]
fn test_layout_creates_directory_and_database() {
    let dir = tempdir().unwrap();
    let layout = CacheLayout::init(dir.path()).unwrap();

    assert!(layout.root().is_dir());
    assert!(layout.root().ends_with("imgcache"));
    assert!(layout.db_path().is_file());
    assert_eq!(layout.db_path(), layout.root().join("image_cache.db"));
}

#[test]
fn test_layout_init_is_idempotent_and_keeps_rows() {
    let dir = tempdir().unwrap();
    let store = init_store(dir.path());
    let id = store
        .insert("Comet", "A comet.", Path::new("/c/Comet.jpg"), DIGEST_A)
        .unwrap();

    let again = init_store(dir.path());
    assert_eq!(again.find_id_by_digest(DIGEST_A).unwrap(), id);
    assert_eq!(again.len().unwrap(), 1);
}

#[test]
fn test_fresh_store_is_empty() {
    let dir = tempdir().unwrap();
    let store = init_store(dir.path());

    assert!(store.is_empty().unwrap());
    assert!(store.list_all_titles().unwrap().is_empty());
    assert_eq!(store.find_id_by_digest(DIGEST_A).unwrap(), NO_ENTRY);
}

#[test]
fn test_insert_then_get_roundtrips_fields() {
    let dir = tempdir().unwrap();
    let store = init_store(dir.path());
    let path = dir.path().join("imgcache").join("Comet.jpg");

    let id = store.insert("Comet", "A bright comet.", &path, DIGEST_A).unwrap();
    let meta = store.get(id).unwrap();

    assert_eq!(meta.title, "Comet");
    assert_eq!(meta.explanation, "A bright comet.");
    assert_eq!(meta.file_path, path);
}

#[test]
fn test_insert_same_digest_returns_existing_id() {
    let dir = tempdir().unwrap();
    let store = init_store(dir.path());

    let first = store
        .insert("Comet", "x", Path::new("/c/Comet.jpg"), DIGEST_A)
        .unwrap();
    let second = store
        .insert("Renamed", "y", Path::new("/c/Renamed.jpg"), DIGEST_A)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.list_all_titles().unwrap(), vec!["Comet"]);
}

#[test]
fn test_entries_follow_insertion_order() {
    let dir = tempdir().unwrap();
    let store = init_store(dir.path());

    let b = store.insert("B", "x", Path::new("/c/B.jpg"), DIGEST_B).unwrap();
    let a = store.insert("A", "x", Path::new("/c/A.jpg"), DIGEST_A).unwrap();

    let entries = store.entries().unwrap();
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![b, a]);
    assert_eq!(entries[1].content_digest, DIGEST_A);
}

#[test]
fn test_get_unknown_id() {
    let dir = tempdir().unwrap();
    let store = init_store(dir.path());

    assert!(matches!(store.get(42), Err(CacheError::NotFound(42))));
}

#[test]
fn test_store_shared_between_handles() {
    let dir = tempdir().unwrap();
    let layout = CacheLayout::init(dir.path()).unwrap();
    let writer = layout.store();
    let reader = MetadataStore::new(layout.db_path());

    let id = writer
        .insert("Comet", "x", Path::new("/c/Comet.jpg"), DIGEST_A)
        .unwrap();
    assert_eq!(reader.find_id_by_digest(DIGEST_A).unwrap(), id);
}

#[test]
fn test_corrupt_database_is_reported() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("imgcache");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("image_cache.db"), b"this is not a database at all").unwrap();

    assert!(matches!(
        CacheLayout::init(dir.path()),
        Err(CacheError::Database(_))
    ));
}
