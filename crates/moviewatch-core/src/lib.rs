pub mod cache;
pub mod discover;
pub mod storage;
pub mod watchlist;

pub use cache::CatalogCache;
pub use discover::{Discovery, HomeFeed, MovieView};
pub use storage::{open_storage, FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use watchlist::{FailureHook, LoadOutcome, StoreFailure, WatchlistStore};
