use super::*;
use crate::storage::MemoryStorage;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn movie(id: MovieId, title: &str) -> MovieSummary {
    MovieSummary::new(id, title)
}

/// Storage wrapper that counts writes and can be told to fail
#[derive(Default)]
struct CountingStorage {
    inner: MemoryStorage,
    writes: AtomicUsize,
    fail_reads: bool,
    fail_writes: bool,
}

impl KeyValueStorage for CountingStorage {
    fn name(&self) -> &str {
        "counting"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Read {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                size: value.len() as u64,
                quota: 0,
            });
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }
}

fn counting_store(storage: CountingStorage) -> (WatchlistStore, Arc<CountingStorage>) {
    let shared = Arc::new(storage);
    let store = WatchlistStore::from_shared(Some(shared.clone() as Arc<dyn KeyValueStorage>));
    (store, shared)
}

fn recording_hook() -> (FailureHook, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let hook: FailureHook = Arc::new(move |failure: &StoreFailure| {
        sink.lock().unwrap().push(failure.to_string());
    });
    (hook, seen)
}

#[test]
fn test_add_then_is_member() {
    let store = WatchlistStore::new(MemoryStorage::new());
    assert!(!store.is_member(1));
    let entries = store.add(movie(1, "A"));
    assert_eq!(entries.len(), 1);
    assert!(store.is_member(1));
    assert!(!store.is_watched(1));
}

#[test]
fn test_duplicate_add_is_idempotent_and_does_not_write() {
    let (store, storage) = counting_store(CountingStorage::default());
    store.add(movie(1, "A"));
    assert_eq!(storage.writes.load(Ordering::SeqCst), 1);

    let entries = store.add(movie(1, "A (renamed)"));
    assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title(), "A");
}

#[test]
fn test_add_keeps_watched_flag_of_existing_entry() {
    let store = WatchlistStore::new(MemoryStorage::new());
    store.add(movie(1, "A"));
    store.toggle_watched(1);
    store.add(movie(1, "A"));
    assert!(store.is_watched(1));
}

#[test]
fn test_add_then_remove() {
    let store = WatchlistStore::new(MemoryStorage::new());
    store.add(movie(1, "A"));
    let after_add = store.add(movie(2, "B"));
    let after_remove = store.remove(2);
    assert_eq!(after_remove.len(), after_add.len() - 1);
    assert!(!store.is_member(2));
    assert!(store.is_member(1));
}

#[test]
fn test_remove_non_member_leaves_content_but_still_writes() {
    let (store, storage) = counting_store(CountingStorage::default());
    store.add(movie(1, "A"));
    store.add(movie(2, "B"));
    let before = store.list();
    let writes = storage.writes.load(Ordering::SeqCst);

    let after = store.remove(99);
    assert_eq!(after, before);
    assert_eq!(store.list(), before);
    assert_eq!(storage.writes.load(Ordering::SeqCst), writes + 1);
}

#[test]
fn test_toggle_is_an_involution() {
    let store = WatchlistStore::new(MemoryStorage::new());
    store.add(movie(5, "E"));
    assert!(!store.is_watched(5));
    store.toggle_watched(5);
    assert!(store.is_watched(5));
    store.toggle_watched(5);
    assert!(!store.is_watched(5));
}

#[test]
fn test_toggle_absent_id_is_noop() {
    let store = WatchlistStore::new(MemoryStorage::new());
    store.add(movie(1, "A"));
    let entries = store.toggle_watched(2);
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].watched);
    assert!(!store.is_watched(2));
}

#[test]
fn test_scenario_two_movies() {
    let store = WatchlistStore::new(MemoryStorage::new());
    store.add(movie(1, "A"));
    store.add(movie(2, "B"));
    store.toggle_watched(1);

    let entries = store.list();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id(), 1);
    assert!(entries[0].watched);
    assert_eq!(entries[1].id(), 2);
    assert!(!entries[1].watched);

    store.remove(2);
    let entries = store.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id(), 1);
}

#[test]
fn test_insertion_order_is_preserved() {
    let store = WatchlistStore::new(MemoryStorage::new());
    for (id, title) in [(30, "C"), (10, "A"), (20, "B")] {
        store.add(movie(id, title));
    }
    let ids: Vec<MovieId> = store.list().iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![30, 10, 20]);
}

#[test]
fn test_malformed_blob_reads_as_empty_and_is_reported() {
    let (hook, seen) = recording_hook();
    let store = WatchlistStore::new(MemoryStorage::new().with_value(DEFAULT_WATCHLIST_KEY, "{not json"))
        .with_failure_hook(hook);

    assert!(store.list().is_empty());
    assert!(!store.is_member(1));
    assert!(store.load().is_failed());
    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen[0].contains("malformed"));
}

#[test]
fn test_wrong_shape_blob_is_malformed() {
    let store = WatchlistStore::new(MemoryStorage::new().with_value(DEFAULT_WATCHLIST_KEY, r#"{"id":1}"#))
        .with_failure_hook(Arc::new(|_: &StoreFailure| {}));
    assert!(matches!(store.load(), LoadOutcome::Failed(StoreFailure::Malformed(_))));
}

#[test]
fn test_add_over_malformed_blob_replaces_it() {
    let storage = Arc::new(MemoryStorage::new().with_value(DEFAULT_WATCHLIST_KEY, "garbage"));
    let store = WatchlistStore::from_shared(Some(storage.clone() as Arc<dyn KeyValueStorage>))
        .with_failure_hook(Arc::new(|_: &StoreFailure| {}));

    let entries = store.add(movie(1, "A"));
    assert_eq!(entries.len(), 1);
    assert!(matches!(store.load(), LoadOutcome::Loaded(ref e) if e.len() == 1));
}

#[test]
fn test_null_blob_is_empty() {
    let store = WatchlistStore::new(MemoryStorage::new().with_value(DEFAULT_WATCHLIST_KEY, "null"));
    assert!(matches!(store.load(), LoadOutcome::Empty));
}

#[test]
fn test_read_failure_is_masked() {
    let (hook, seen) = recording_hook();
    let (store, _) = counting_store(CountingStorage {
        fail_reads: true,
        ..CountingStorage::default()
    });
    let store = store.with_failure_hook(hook);

    assert!(store.list().is_empty());
    assert!(!store.is_watched(1));
    assert!(matches!(store.load(), LoadOutcome::Failed(StoreFailure::Read(_))));
    assert!(seen.lock().unwrap().len() >= 2);
}

#[test]
fn test_write_failure_keeps_previous_blob() {
    let storage = Arc::new(CountingStorage::default());
    let store = WatchlistStore::from_shared(Some(storage.clone() as Arc<dyn KeyValueStorage>));
    store.add(movie(1, "A"));
    let persisted = storage.inner.get(DEFAULT_WATCHLIST_KEY).unwrap();

    let (hook, seen) = recording_hook();
    let failing = Arc::new(CountingStorage {
        inner: MemoryStorage::new().with_value(DEFAULT_WATCHLIST_KEY, persisted.as_deref().unwrap()),
        fail_writes: true,
        ..CountingStorage::default()
    });
    let store = WatchlistStore::from_shared(Some(failing.clone() as Arc<dyn KeyValueStorage>))
        .with_failure_hook(hook);

    // The caller still gets the in-memory result...
    let entries = store.add(movie(2, "B"));
    assert_eq!(entries.len(), 2);
    // ...but the stored blob is untouched
    assert_eq!(failing.inner.get(DEFAULT_WATCHLIST_KEY).unwrap(), persisted);
    assert!(!store.is_member(2));
    assert!(!store.clear());
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_detached_store() {
    let store = WatchlistStore::detached();
    assert!(!store.is_attached());
    assert!(matches!(store.load(), LoadOutcome::Empty));

    let entries = store.add(movie(1, "A"));
    assert_eq!(entries.len(), 1);
    assert!(store.list().is_empty());
    assert!(!store.is_member(1));
    assert!(store.remove(1).is_empty());
    assert!(store.toggle_watched(1).is_empty());
    assert!(!store.clear());
}

#[test]
fn test_custom_key_is_isolated() {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    let a = WatchlistStore::from_shared(Some(storage.clone()));
    let b = WatchlistStore::from_shared(Some(storage.clone())).with_key("otherList");
    a.add(movie(1, "A"));
    assert!(a.is_member(1));
    assert!(!b.is_member(1));
    assert_eq!(b.key(), "otherList");
    assert_eq!(b.storage_name(), Some("memory"));
}

#[test]
fn test_legacy_camel_case_blob_is_read_and_rewritten_snake_case() {
    let legacy = r#"[{"id":11,"title":"Star Wars","posterPath":"/sw.jpg","voteAverage":8.2,"releaseDate":"1977-05-25","watched":true,"original_language":"en"}]"#;
    let storage = Arc::new(MemoryStorage::new().with_value(DEFAULT_WATCHLIST_KEY, legacy));
    let store = WatchlistStore::from_shared(Some(storage.clone() as Arc<dyn KeyValueStorage>));

    assert!(store.is_watched(11));
    let entries = store.add(movie(12, "Empire"));
    assert_eq!(entries[0].movie.poster_path.as_deref(), Some("/sw.jpg"));

    let raw = storage.get(DEFAULT_WATCHLIST_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["poster_path"], "/sw.jpg");
    assert_eq!(value[0]["original_language"], "en");
    assert_eq!(value[0]["watched"], true);
    assert_eq!(value[1]["watched"], false);
    assert!(value[0].get("posterPath").is_none());
}

#[test]
fn test_clear() {
    let store = WatchlistStore::new(MemoryStorage::new());
    store.add(movie(1, "A"));
    assert!(store.clear());
    assert!(store.list().is_empty());
    assert!(matches!(store.load(), LoadOutcome::Loaded(ref e) if e.is_empty()));
}

#[test]
fn test_entry_with_lenient_fields_survives_next_add() {
    let stored = r#"[{"id":1,"title":"A","watched":true},{"id":2}]"#;
    let storage = Arc::new(MemoryStorage::new().with_value(DEFAULT_WATCHLIST_KEY, stored));
    let store = WatchlistStore::from_shared(Some(storage.clone() as Arc<dyn KeyValueStorage>));

    assert_eq!(store.list().len(), 2);
    let entries = store.add(movie(3, "C"));
    let ids: Vec<MovieId> = entries.iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(store.is_watched(1));
    assert!(!store.is_watched(2));

    let raw = storage.get(DEFAULT_WATCHLIST_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["watched"], true);
    assert_eq!(value[1]["title"], "");
}

#[test]
fn test_null_watched_flag_reads_as_unwatched() {
    let stored = r#"[{"id":1,"title":"A","watched":null}]"#;
    let store = WatchlistStore::new(MemoryStorage::new().with_value(DEFAULT_WATCHLIST_KEY, stored));
    assert!(store.is_member(1));
    assert!(!store.is_watched(1));
}

#[test]
fn test_undecodable_entry_is_skipped_and_reported() {
    let (hook, seen) = recording_hook();
    let stored = r#"[{"id":1,"title":"A","watched":true},{"title":"no id"},null,{"id":4,"title":"D"}]"#;
    let storage = Arc::new(MemoryStorage::new().with_value(DEFAULT_WATCHLIST_KEY, stored));
    let store = WatchlistStore::from_shared(Some(storage.clone() as Arc<dyn KeyValueStorage>))
        .with_failure_hook(hook);

    let outcome = store.load();
    assert!(!outcome.is_failed());
    let ids: Vec<MovieId> = outcome.into_entries().iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![1, 4]);
    {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("position 1"));
        assert!(seen[1].contains("position 2"));
    }

    store.add(movie(5, "E"));
    let reread = WatchlistStore::from_shared(Some(storage as Arc<dyn KeyValueStorage>));
    let ids: Vec<MovieId> = reread.list().iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![1, 4, 5]);
    assert!(reread.is_watched(1));
}
