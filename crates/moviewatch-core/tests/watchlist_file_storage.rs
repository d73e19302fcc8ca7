use moviewatch_config::{Config, PathManager, StorageBackend};
use moviewatch_core::{open_storage, FileStorage, KeyValueStorage, LoadOutcome, WatchlistStore};
use moviewatch_models::MovieSummary;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn watchlist_survives_a_new_store_instance() {
    let dir = TempDir::new().unwrap();

    {
        let store = WatchlistStore::new(FileStorage::new(dir.path()));
        store.add(MovieSummary::new(1, "A").with_poster_path("/a.jpg"));
        store.add(MovieSummary::new(2, "B"));
        store.toggle_watched(1);
    }

    let store = WatchlistStore::new(FileStorage::new(dir.path()));
    let entries = store.list();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title(), "A");
    assert_eq!(entries[0].movie.poster_path.as_deref(), Some("/a.jpg"));
    assert!(store.is_watched(1));
    assert!(!store.is_watched(2));

    store.remove(2);
    let reopened = WatchlistStore::new(FileStorage::new(dir.path()));
    assert!(!reopened.is_member(2));
    assert!(reopened.is_member(1));
}

#[test]
fn stored_blob_is_a_plain_json_array() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    let store = WatchlistStore::from_shared(Some(storage.clone() as Arc<dyn KeyValueStorage>));
    store.add(MovieSummary::new(27205, "Inception").with_vote_average(8.4));

    let raw = std::fs::read_to_string(dir.path().join("movieWatchlist.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["id"], 27205);
    assert_eq!(array[0]["title"], "Inception");
    assert_eq!(array[0]["watched"], false);
    assert_eq!(storage.get("movieWatchlist").unwrap(), Some(raw));
}

#[test]
fn hand_edited_corrupt_file_is_replaced_on_next_change() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("movieWatchlist.json"), "[{\"id\": 1,").unwrap();

    let store = WatchlistStore::new(FileStorage::new(dir.path()));
    assert!(matches!(store.load(), LoadOutcome::Failed(_)));
    assert!(store.list().is_empty());

    store.add(MovieSummary::new(3, "C"));
    assert!(matches!(store.load(), LoadOutcome::Loaded(ref e) if e.len() == 1));
}

#[test]
fn configured_backends() {
    let dir = TempDir::new().unwrap();
    let paths = PathManager::from_base(dir.path());
    let mut config = Config::default();

    let store = WatchlistStore::from_shared(open_storage(&config, &paths));
    store.add(MovieSummary::new(1, "A"));
    assert!(paths.storage_dir().join("movieWatchlist.json").exists());

    config.watchlist.quota_bytes = 16;
    let store = WatchlistStore::from_shared(open_storage(&config, &paths));
    let entries = store.add(MovieSummary::new(2, "A title long enough to blow the quota"));
    assert_eq!(entries.len(), 2);
    assert!(!store.is_member(2));
    assert!(store.is_member(1));

    config.watchlist.backend = StorageBackend::Disabled;
    let store = WatchlistStore::from_shared(open_storage(&config, &paths));
    store.add(MovieSummary::new(4, "D"));
    assert!(store.list().is_empty());
}
