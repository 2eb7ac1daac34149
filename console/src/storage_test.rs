use super::*;

#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct Sample {
    name: String,
    count: u32,
}

// =============================================================
// MemoryStore
// =============================================================

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get("k").unwrap(), None);

    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn memory_store_remove_missing_is_ok() {
    let store = MemoryStore::new();
    assert!(store.remove("never-written").is_ok());
}

// =============================================================
// JSON helpers
// =============================================================

#[test]
fn save_then_load_json() {
    let store = MemoryStore::new();
    let value = Sample { name: "a".to_owned(), count: 2 };
    save_json(&store, "sample", &value).unwrap();

    let loaded: Option<Sample> = load_json(&store, "sample").unwrap();
    assert_eq!(loaded, Some(value));
}

#[test]
fn load_json_reports_corrupt_values() {
    let store = MemoryStore::new();
    store.set("sample", "{not json").unwrap();

    let err = load_json::<Sample>(&store, "sample").unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { ref key, .. } if key == "sample"));
}

// =============================================================
// FileStore
// =============================================================

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let first = FileStore::new(dir.path().join("state"));
    first.set(AUTH_STORAGE_KEY, "{\"token\":\"t\"}").unwrap();

    let second = FileStore::new(dir.path().join("state"));
    assert_eq!(second.get(AUTH_STORAGE_KEY).unwrap().as_deref(), Some("{\"token\":\"t\"}"));
    assert!(dir.path().join("state").join("auth-storage.json").exists());
}

#[test]
fn file_store_missing_key_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().to_path_buf());
    assert_eq!(store.get(THEME_STORAGE_KEY).unwrap(), None);
    assert!(store.remove(THEME_STORAGE_KEY).is_ok());
}

#[test]
fn file_store_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().to_path_buf());
    assert!(matches!(store.set("../escape", "x"), Err(StorageError::InvalidKey(_))));
    assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
}

#[cfg(unix)]
#[test]
fn file_store_writes_owner_only_files() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().to_path_buf());
    store.set(AUTH_STORAGE_KEY, "{\"token\":\"t\"}").unwrap();
    store.set(AUTH_STORAGE_KEY, "{\"token\":\"u\"}").unwrap();

    let mode = std::fs::metadata(dir.path().join("auth-storage.json")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(store.get(AUTH_STORAGE_KEY).unwrap().as_deref(), Some("{\"token\":\"u\"}"));
}
