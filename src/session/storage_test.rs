use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

fn scratch_path(label: &str) -> PathBuf {
    let n = NEXT_FILE.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir()
        .join(format!("cv-client-storage-{}-{n}", std::process::id()))
        .join(format!("{label}.json"))
}

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get_item("token"), None);

    store.set_item("token", "abc").unwrap();
    assert_eq!(store.get_item("token").as_deref(), Some("abc"));

    store.set_item("token", "def").unwrap();
    assert_eq!(store.get_item("token").as_deref(), Some("def"));

    store.remove_item("token").unwrap();
    assert_eq!(store.get_item("token"), None);
}

#[test]
fn memory_store_remove_missing_is_ok() {
    let store = MemoryStore::new();
    assert!(store.remove_item("nope").is_ok());
}

// =============================================================================
// FileStore
// =============================================================================

#[test]
fn file_store_missing_file_reads_empty() {
    let store = FileStore::open(scratch_path("missing")).unwrap();
    assert_eq!(store.get_item("token"), None);
    assert!(!store.path().exists());
}

#[test]
fn file_store_persists_across_reopen() {
    let path = scratch_path("reopen");
    {
        let store = FileStore::open(&path).unwrap();
        store.set_item("token", "T").unwrap();
        store.set_item("user", r#"{"email":"a@b.com"}"#).unwrap();
    }

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get_item("token").as_deref(), Some("T"));
    assert_eq!(reopened.get_item("user").as_deref(), Some(r#"{"email":"a@b.com"}"#));

    reopened.remove_item("token").unwrap();
    let again = FileStore::open(&path).unwrap();
    assert_eq!(again.get_item("token"), None);
    assert!(again.get_item("user").is_some());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_store_rejects_non_object_file() {
    let path = scratch_path("corrupt");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_store_blank_file_reads_empty() {
    let path = scratch_path("blank");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "\n").unwrap();

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get_item("token"), None);

    let _ = std::fs::remove_file(&path);
}
