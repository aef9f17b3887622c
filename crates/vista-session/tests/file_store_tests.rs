//! Integration tests for the file-backed token store.

use std::sync::Arc;

use vista_session::{FileTokenStore, SessionManager, StoreError, TOKEN_KEY, TokenStore};

#[test]
fn file_store_tests_token_survives_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("state.json");

    let first_run = SessionManager::new(Arc::new(FileTokenStore::new(&path)));
    first_run.login("T1").expect("login should persist");
    drop(first_run);

    let second_run = SessionManager::new(Arc::new(FileTokenStore::new(&path)));
    assert_eq!(second_run.token().as_deref(), Some("T1"));

    second_run.clear();
    let third_run = SessionManager::new(Arc::new(FileTokenStore::new(&path)));
    assert!(!third_run.is_authenticated());
}

#[test]
fn file_store_tests_missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = FileTokenStore::new(dir.path().join("absent.json"));
    assert_eq!(store.get(TOKEN_KEY).expect("get"), None);
    store.remove(TOKEN_KEY).expect("removing from missing file");
}

#[test]
fn file_store_tests_preserves_unrelated_keys() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = FileTokenStore::new(dir.path().join("state.json"));
    store.set("theme", "dark").expect("set theme");
    store.set(TOKEN_KEY, "T1").expect("set token");
    store.remove(TOKEN_KEY).expect("remove token");

    assert_eq!(store.get("theme").expect("get").as_deref(), Some("dark"));
}

#[test]
fn file_store_tests_corrupt_file_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("state.json");
    std::fs::write(&path, b"{not json").expect("write corrupt file");

    let store = FileTokenStore::new(&path);
    assert!(matches!(store.get(TOKEN_KEY), Err(StoreError::Codec(_))));

    let session = SessionManager::new(Arc::new(FileTokenStore::new(&path)));
    assert!(!session.is_authenticated());

    session.login("T1").expect("login should replace a corrupt file");
    assert_eq!(session.token().as_deref(), Some("T1"));
    let raw = std::fs::read(&path).expect("state file readable");
    let decoded: serde_json::Value =
        serde_json::from_slice(&raw).expect("state file should be valid json");
    assert_eq!(decoded[TOKEN_KEY], "T1");
}

#[test]
fn file_store_tests_logout_repairs_corrupt_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("state.json");
    std::fs::write(&path, b"{truncated").expect("write corrupt file");

    let session = SessionManager::new(Arc::new(FileTokenStore::new(&path)));
    assert_eq!(session.clear(), None);

    let store = FileTokenStore::new(&path);
    assert_eq!(store.get(TOKEN_KEY).expect("repaired file decodes"), None);
    session.login("T2").expect("login after repair");
    assert_eq!(store.get(TOKEN_KEY).expect("get").as_deref(), Some("T2"));
}
