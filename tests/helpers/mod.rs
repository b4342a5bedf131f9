#![allow(dead_code)]

use mnemo::memory::store::MemoryStore;

/// Open a fresh on-disk store under a temp directory. Keep the returned
/// TempDir alive for the duration of the test.
pub fn test_store() -> (MemoryStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let store = MemoryStore::open(
        tmp.path().join("memory.db"),
        tmp.path().join("content"),
    )
    .unwrap();
    (store, tmp)
}

pub fn strs(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Insert a memory and return its id.
pub fn insert(store: &mut MemoryStore, content: &str, summary: &str, keywords: &[&str]) -> i64 {
    store.insert(content, summary, &strs(keywords)).unwrap().id
}
