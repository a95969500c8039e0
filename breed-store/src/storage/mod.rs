//! Storage layer for the breed catalog.
//!
//! Provides the three persisted collections behind traits so the client can
//! be tested against any backend.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StorageResult;
use async_trait::async_trait;
use breed_types::{Breed, BreedId, FavoriteRecord};
use tokio::sync::watch;

/// Persisted breeds.
#[async_trait]
pub trait BreedStore: Send + Sync {
    /// Insert or replace a breed, keyed by id. Last write wins.
    async fn upsert_breed(&self, breed: &Breed) -> StorageResult<()>;

    /// Insert or replace several breeds in one transaction.
    async fn upsert_breeds(&self, breeds: &[Breed]) -> StorageResult<()>;

    /// Breeds whose name contains `name`, ignoring ASCII case.
    ///
    /// Returns an empty list when nothing matches.
    async fn search_by_name(&self, name: &str) -> StorageResult<Vec<Breed>>;

    /// Subscribe to all persisted breeds, in first-insertion order.
    ///
    /// The current snapshot is available immediately; a new one is published
    /// after every write.
    fn subscribe_breeds(&self) -> watch::Receiver<Vec<Breed>>;
}

/// Persisted favorites.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Insert a favorite, replacing any existing record for the same id.
    async fn upsert_favorite(&self, record: &FavoriteRecord) -> StorageResult<()>;

    /// Remove a favorite. Removing an absent id is not an error.
    async fn delete_favorite(&self, id: &BreedId) -> StorageResult<()>;

    /// Subscribe to all favorites, most recently created first.
    fn subscribe_favorites(&self) -> watch::Receiver<Vec<FavoriteRecord>>;
}

/// Named persisted integers.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Read the value stored under `key`, or `default` when absent.
    async fn get_cursor(&self, key: &str, default: i64) -> StorageResult<i64>;

    /// Store `value` under `key`.
    async fn set_cursor(&self, key: &str, value: i64) -> StorageResult<()>;
}
