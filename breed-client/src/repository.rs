//! BreedRepository - reconciles the remote listing with the durable store.
//!
//! # Architecture
//!
//! ```text
//! fetch_more_breeds → CursorStore (read) → RemoteSource → BreedStore (upsert)
//!                                                       → CursorStore (advance)
//! BreedStore snapshots → BreedFeed → LookupCache (insert-if-absent)
//! ```
//!
//! The cursor read-increment-persist sequence is protected by a single-flight
//! slot: a second `fetch_more_breeds` while one is running returns
//! [`FetchOutcome::Skipped`] without touching the remote.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use breed_core::{PageRequest, LAST_PAGE_KEY};
use breed_store::{BreedStore, CursorStore, StorageError};
use breed_types::{Breed, PageCursor};

use crate::cache::LookupCache;
use crate::flight::OperationSlot;
use crate::remote::{RemoteError, RemoteSource};

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Remote error.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl RepositoryError {
    /// Whether this failure means the remote host is unreachable.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_offline())
    }
}

/// Result of [`BreedRepository::fetch_more_breeds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and persisted, and the cursor moved to it.
    Fetched {
        /// Index of the fetched page.
        page: i64,
        /// Number of breeds it contained.
        count: usize,
    },
    /// Another fetch was already in flight; nothing was done.
    Skipped,
}

/// The breed synchronizer.
#[derive(Clone)]
pub struct BreedRepository {
    remote: Arc<dyn RemoteSource>,
    breeds: Arc<dyn BreedStore>,
    cursors: Arc<dyn CursorStore>,
    cache: LookupCache,
    fetch: OperationSlot,
}

impl BreedRepository {
    /// Create a repository.
    ///
    /// `breeds` and `cursors` are usually the same store.
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        breeds: Arc<dyn BreedStore>,
        cursors: Arc<dyn CursorStore>,
    ) -> Self {
        Self {
            remote,
            breeds,
            cursors,
            cache: LookupCache::new(),
            fetch: OperationSlot::new(),
        }
    }

    /// Fetch the page after the persisted cursor and merge it into the store.
    ///
    /// On success the cursor is advanced to the fetched page. On failure the
    /// cursor is left untouched so the same page is requested next time.
    pub async fn fetch_more_breeds(&self) -> Result<FetchOutcome, RepositoryError> {
        let Some(guard) = self.fetch.try_start() else {
            warn!("fetch_more_breeds already in flight, skipping");
            return Ok(FetchOutcome::Skipped);
        };

        let result = self.fetch_next_page().await;
        guard.finish(&result);
        result
    }

    async fn fetch_next_page(&self) -> Result<FetchOutcome, RepositoryError> {
        let cursor = self
            .cursors
            .get_cursor(LAST_PAGE_KEY, PageCursor::NONE.value())
            .await?;
        let request = PageRequest::after(PageCursor::new(cursor));

        let breeds = self.remote.get_page(request.limit, request.page).await?;
        self.breeds.upsert_breeds(&breeds).await?;

        let done = request.completed_cursor();
        self.cursors.set_cursor(LAST_PAGE_KEY, done.value()).await?;

        info!(page = request.page, count = breeds.len(), "fetched breeds page");
        Ok(FetchOutcome::Fetched {
            page: request.page,
            count: breeds.len(),
        })
    }

    /// Query the remote by name. Results are cached but not persisted.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Breed>, RepositoryError> {
        let breeds = self.remote.search(name).await?;
        self.cache.extend_if_absent(&breeds);
        Ok(breeds)
    }

    /// Case-insensitive substring search over persisted breeds.
    pub async fn search_by_name_locally(&self, name: &str) -> Result<Vec<Breed>, RepositoryError> {
        Ok(self.breeds.search_by_name(name).await?)
    }

    /// Persist one breed.
    pub async fn save_breed(&self, breed: &Breed) -> Result<(), RepositoryError> {
        Ok(self.breeds.upsert_breed(breed).await?)
    }

    /// Look up a breed in the in-memory cache only.
    pub fn get_breed(&self, id: &str) -> Option<Breed> {
        self.cache.get(id)
    }

    /// Live view of all persisted breeds. Every snapshot read through the
    /// feed is added to the lookup cache.
    pub fn breeds(&self) -> BreedFeed {
        BreedFeed {
            rx: self.breeds.subscribe_breeds(),
            cache: self.cache.clone(),
        }
    }

    /// Current persisted cursor.
    pub async fn last_page(&self) -> Result<PageCursor, RepositoryError> {
        let value = self
            .cursors
            .get_cursor(LAST_PAGE_KEY, PageCursor::NONE.value())
            .await?;
        Ok(PageCursor::new(value))
    }

    /// Whether a fetch is running right now.
    pub fn is_fetching(&self) -> bool {
        self.fetch.is_in_flight()
    }
}

/// Live view of persisted breeds, in first-insertion order.
pub struct BreedFeed {
    rx: watch::Receiver<Vec<Breed>>,
    cache: LookupCache,
}

impl BreedFeed {
    /// The latest snapshot, marking it as seen.
    pub fn snapshot(&mut self) -> Vec<Breed> {
        let breeds = self.rx.borrow_and_update().clone();
        self.cache.extend_if_absent(&breeds);
        breeds
    }

    /// Wait for the next snapshot. Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MockRemote;
    use breed_store::SqliteStore;
    use std::time::Duration;

    fn catalog(n: usize) -> Vec<Breed> {
        (0..n)
            .map(|i| Breed::named(format!("id{i:02}"), format!("Breed {i}")))
            .collect()
    }

    async fn setup(remote: &MockRemote) -> (BreedRepository, SqliteStore) {
        let store = SqliteStore::in_memory().await.unwrap();
        let shared = Arc::new(store.clone());
        let repo = BreedRepository::new(Arc::new(remote.clone()), shared.clone(), shared);
        (repo, store)
    }

    #[tokio::test]
    async fn first_fetch_requests_page_zero() {
        let remote = MockRemote::with_catalog(catalog(25));
        let (repo, _store) = setup(&remote).await;

        let outcome = repo.fetch_more_breeds().await.unwrap();

        assert_eq!(outcome, FetchOutcome::Fetched { page: 0, count: 10 });
        assert_eq!(
            remote.calls(),
            vec![crate::remote::RemoteCall::Page { limit: 10, page: 0 }]
        );
        assert_eq!(repo.last_page().await.unwrap(), PageCursor::new(0));
    }

    #[tokio::test]
    async fn cursor_advances_after_success() {
        let remote = MockRemote::with_catalog(catalog(25));
        let (repo, _store) = setup(&remote).await;

        repo.fetch_more_breeds().await.unwrap();
        repo.fetch_more_breeds().await.unwrap();
        let third = repo.fetch_more_breeds().await.unwrap();

        assert_eq!(third, FetchOutcome::Fetched { page: 2, count: 5 });
        assert_eq!(repo.last_page().await.unwrap(), PageCursor::new(2));
        assert_eq!(repo.breeds().snapshot().len(), 25);
    }

    #[tokio::test]
    async fn cursor_unchanged_after_failure() {
        let remote = MockRemote::with_catalog(catalog(25));
        let (repo, _store) = setup(&remote).await;
        repo.fetch_more_breeds().await.unwrap();

        remote.fail_next(RemoteError::Status { status: 503 });
        let err = repo.fetch_more_breeds().await.unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::Remote(RemoteError::Status { status: 503 })
        ));
        assert_eq!(repo.last_page().await.unwrap(), PageCursor::new(0));

        // Retry asks for the same page
        repo.fetch_more_breeds().await.unwrap();
        let pages: Vec<_> = remote
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                crate::remote::RemoteCall::Page { page, .. } => Some(page),
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec![0, 1, 1]);
    }

    #[tokio::test]
    async fn id_less_breed_does_not_break_fetching() {
        let mut page = Breed::list_from_json(br#"[{"name":"Mystery"}]"#).unwrap();
        page.push(Breed::named("abys", "Abyssinian"));
        let remote = MockRemote::with_catalog(page);
        let (repo, store) = setup(&remote).await;

        let outcome = repo.fetch_more_breeds().await.unwrap();
        assert_eq!(outcome, FetchOutcome::Fetched { page: 0, count: 2 });
        assert_eq!(repo.last_page().await.unwrap(), PageCursor::new(0));

        let ids: Vec<_> = repo
            .breeds()
            .snapshot()
            .iter()
            .map(|b| b.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["abys"]);

        // The store keeps accepting writes afterwards
        store.upsert_breed(&Breed::named("beng", "Bengal")).await.unwrap();
        assert_eq!(repo.breeds().snapshot().len(), 2);
        assert_eq!(
            repo.fetch_more_breeds().await.unwrap(),
            FetchOutcome::Fetched { page: 1, count: 0 }
        );
    }

    #[tokio::test]
    async fn offline_fetch_is_distinguished() {
        let remote = MockRemote::with_catalog(catalog(5));
        remote.set_offline(true);
        let (repo, _store) = setup(&remote).await;

        let err = repo.fetch_more_breeds().await.unwrap_err();
        assert!(err.is_offline());
        assert!(!repo.is_fetching());
    }

    #[tokio::test]
    async fn concurrent_fetch_is_single_flight() {
        let remote = MockRemote::with_catalog(catalog(25));
        let (repo, _store) = setup(&remote).await;
        remote.hold();

        let first = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.fetch_more_breeds().await })
        };
        while remote.page_calls() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // While the first is blocked in the remote
        for _ in 0..3 {
            assert_eq!(repo.fetch_more_breeds().await.unwrap(), FetchOutcome::Skipped);
        }
        assert_eq!(remote.page_calls(), 1);
        assert!(repo.is_fetching());

        remote.release();
        assert_eq!(
            first.await.unwrap().unwrap(),
            FetchOutcome::Fetched { page: 0, count: 10 }
        );

        // Free again once resolved
        assert_eq!(
            repo.fetch_more_breeds().await.unwrap(),
            FetchOutcome::Fetched { page: 1, count: 10 }
        );
        assert_eq!(remote.page_calls(), 2);
    }

    #[tokio::test]
    async fn aborted_fetch_frees_the_slot() {
        let remote = MockRemote::with_catalog(catalog(5));
        let (repo, _store) = setup(&remote).await;
        remote.hold();

        let task = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.fetch_more_breeds().await })
        };
        while remote.page_calls() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        task.abort();
        let _ = task.await;

        assert!(!repo.is_fetching());
        assert_eq!(repo.last_page().await.unwrap(), PageCursor::NONE);
    }

    #[tokio::test]
    async fn get_breed_unknown_is_none() {
        let remote = MockRemote::new();
        let (repo, _store) = setup(&remote).await;
        assert!(repo.get_breed("abys").is_none());
    }

    #[tokio::test]
    async fn get_breed_after_feed_snapshot() {
        let remote = MockRemote::with_catalog(catalog(3));
        let (repo, _store) = setup(&remote).await;
        repo.fetch_more_breeds().await.unwrap();

        // Not cached until the feed has been observed
        assert!(repo.get_breed("id01").is_none());

        let mut feed = repo.breeds();
        feed.snapshot();
        assert_eq!(repo.get_breed("id01"), Some(Breed::named("id01", "Breed 1")));
    }

    #[tokio::test]
    async fn get_breed_never_reads_store() {
        let remote = MockRemote::new();
        let (repo, store) = setup(&remote).await;
        store.upsert_breed(&Breed::named("abys", "Abyssinian")).await.unwrap();

        assert!(repo.get_breed("abys").is_none());
    }

    #[tokio::test]
    async fn search_caches_but_does_not_persist() {
        let remote = MockRemote::with_catalog(vec![
            Breed::named("abys", "Abyssinian"),
            Breed::named("beng", "Bengal"),
        ]);
        let (repo, _store) = setup(&remote).await;

        let found = repo.search_by_name("Abyssinian").await.unwrap();

        assert_eq!(found, vec![Breed::named("abys", "Abyssinian")]);
        assert_eq!(repo.get_breed("abys"), found.first().cloned());
        assert!(repo.breeds().snapshot().is_empty());
        assert_eq!(repo.last_page().await.unwrap(), PageCursor::NONE);
    }

    #[tokio::test]
    async fn search_without_match_is_empty() {
        let remote = MockRemote::with_catalog(vec![Breed::named("abys", "Abyssinian")]);
        let (repo, _store) = setup(&remote).await;

        let found = repo.search_by_name("AbyssinianQuaQuaQua").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn cached_entry_is_not_overwritten_by_search() {
        let remote = MockRemote::with_catalog(vec![Breed::named("abys", "Abyssinian v2")]);
        let (repo, store) = setup(&remote).await;
        store.upsert_breed(&Breed::named("abys", "Abyssinian")).await.unwrap();
        repo.breeds().snapshot();

        repo.search_by_name("abys").await.unwrap();
        assert_eq!(repo.get_breed("abys").unwrap().name, "Abyssinian");
    }

    #[tokio::test]
    async fn search_offline_error() {
        let remote = MockRemote::new();
        remote.set_offline(true);
        let (repo, _store) = setup(&remote).await;

        assert!(repo.search_by_name("abys").await.unwrap_err().is_offline());
    }

    #[tokio::test]
    async fn local_search_and_save() {
        let remote = MockRemote::new();
        let (repo, _store) = setup(&remote).await;
        repo.save_breed(&Breed::named("abys", "Abyssinian")).await.unwrap();

        let local = repo.search_by_name_locally("ABYSS").await.unwrap();
        assert_eq!(local.len(), 1);
        assert!(repo
            .search_by_name_locally("AbyssinianQuaQuaQua")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn feed_sees_new_writes() {
        let remote = MockRemote::with_catalog(catalog(3));
        let (repo, _store) = setup(&remote).await;
        let mut feed = repo.breeds();
        assert!(feed.snapshot().is_empty());

        repo.fetch_more_breeds().await.unwrap();
        assert!(feed.changed().await);
        assert_eq!(feed.snapshot().len(), 3);
    }
}
