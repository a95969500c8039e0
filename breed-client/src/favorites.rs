//! Reactive view over the favorites collection.

use breed_store::{FavoriteStore, StorageError};
use breed_types::{BreedId, FavoriteRecord};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Marks and unmarks favorites and exposes them as live feeds.
#[derive(Clone)]
pub struct FavoritesTracker {
    store: Arc<dyn FavoriteStore>,
}

impl FavoritesTracker {
    /// Create a tracker over a favorites store.
    pub fn new(store: Arc<dyn FavoriteStore>) -> Self {
        Self { store }
    }

    /// Mark `id` as favorite, timestamped now. Re-marking refreshes the
    /// timestamp.
    pub async fn set_as_favorite(&self, id: &BreedId) -> Result<(), StorageError> {
        debug!(%id, "set favorite");
        self.store.upsert_favorite(&FavoriteRecord::new(id.clone())).await
    }

    /// Unmark `id`. Unmarking a non-favorite is a no-op.
    pub async fn unset_as_favorite(&self, id: &BreedId) -> Result<(), StorageError> {
        debug!(%id, "unset favorite");
        self.store.delete_favorite(id).await
    }

    /// Live list of favorite ids, most recently favorited first.
    pub fn breeds(&self) -> FavoriteIds {
        FavoriteIds {
            rx: self.store.subscribe_favorites(),
        }
    }

    /// Live flag telling whether `id` is a favorite.
    pub fn is_favorite(&self, id: &BreedId) -> FavoriteFlag {
        FavoriteFlag {
            rx: self.store.subscribe_favorites(),
            id: id.clone(),
        }
    }

    /// Whether `id` is a favorite right now.
    pub fn contains(&self, id: &str) -> bool {
        self.store
            .subscribe_favorites()
            .borrow()
            .iter()
            .any(|r| r.id.as_str() == id)
    }
}

/// Live list of favorite ids.
pub struct FavoriteIds {
    rx: watch::Receiver<Vec<FavoriteRecord>>,
}

impl FavoriteIds {
    /// The latest ids, marking them as seen.
    pub fn snapshot(&mut self) -> Vec<BreedId> {
        self.rx
            .borrow_and_update()
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }

    /// Wait for the next change. Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Live favorite flag for one breed.
pub struct FavoriteFlag {
    rx: watch::Receiver<Vec<FavoriteRecord>>,
    id: BreedId,
}

impl FavoriteFlag {
    /// The current value, marking it as seen.
    pub fn get(&mut self) -> bool {
        self.rx.borrow_and_update().iter().any(|r| r.id == self.id)
    }

    /// Wait for the favorites collection to change. Returns `false` once the
    /// store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breed_store::SqliteStore;

    async fn tracker() -> (FavoritesTracker, SqliteStore) {
        let store = SqliteStore::in_memory().await.unwrap();
        (FavoritesTracker::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn set_and_unset() {
        let (tracker, _store) = tracker().await;
        let abys = BreedId::new("abys");
        let mut flag = tracker.is_favorite(&abys);
        assert!(!flag.get());

        tracker.set_as_favorite(&abys).await.unwrap();
        assert!(flag.changed().await);
        assert!(flag.get());
        assert!(tracker.contains("abys"));

        tracker.unset_as_favorite(&abys).await.unwrap();
        assert!(flag.changed().await);
        assert!(!flag.get());
        assert!(!tracker.contains("abys"));
    }

    #[tokio::test]
    async fn set_is_idempotent() {
        let (tracker, _store) = tracker().await;
        let abys = BreedId::new("abys");

        tracker.set_as_favorite(&abys).await.unwrap();
        tracker.set_as_favorite(&abys).await.unwrap();

        assert_eq!(tracker.breeds().snapshot(), vec![abys]);
    }

    #[tokio::test]
    async fn unset_unknown_is_noop() {
        let (tracker, _store) = tracker().await;
        tracker
            .unset_as_favorite(&BreedId::new("nope"))
            .await
            .unwrap();
        assert!(tracker.breeds().snapshot().is_empty());
    }

    #[tokio::test]
    async fn ids_are_newest_first() {
        let (tracker, store) = tracker().await;
        let t = 1_000;
        for (id, offset) in [("t0", 0), ("t1", 1), ("t2", 2), ("t3", 3)] {
            store
                .upsert_favorite(&FavoriteRecord::at(id, t + offset))
                .await
                .unwrap();
        }

        let ids = tracker.breeds().snapshot();
        let ids: Vec<&str> = ids.iter().map(BreedId::as_str).collect();
        assert_eq!(ids, vec!["t3", "t2", "t1", "t0"]);
    }

    #[tokio::test]
    async fn concurrent_sets_all_land() {
        let (tracker, _store) = tracker().await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tracker = tracker.clone();
                tokio::spawn(async move {
                    tracker
                        .set_as_favorite(&BreedId::new(format!("b{i}")))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(tracker.breeds().snapshot().len(), 8);
    }
}
