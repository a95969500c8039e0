//! Breed list screen.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use breed_core::{join_breeds, AutoFetchGate};
use breed_types::{BreedId, BreedListModel};

use super::{apply_actions, ErrorState, TaskSet};
use crate::favorites::FavoritesTracker;
use crate::flight::OperationSlot;
use crate::repository::BreedRepository;

/// State of the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedListState {
    /// A fetch is running, or the first snapshot has not been combined yet.
    pub loading: bool,
    /// Rows to display.
    pub breeds: Vec<BreedListModel>,
    /// Whether only favorites are shown.
    pub filter_favorites: bool,
    /// The last operation failed.
    pub error: bool,
    /// Message of the last failure.
    pub error_message: String,
}

impl Default for BreedListState {
    fn default() -> Self {
        Self {
            loading: true,
            breeds: Vec::new(),
            filter_favorites: false,
            error: false,
            error_message: String::new(),
        }
    }
}

impl ErrorState for BreedListState {
    fn clear_error(&mut self) {
        self.error = false;
        self.error_message.clear();
    }

    fn report_error(&mut self, message: String) {
        self.error = true;
        self.error_message = message;
    }
}

/// Owner of the list screen.
///
/// Joins the persisted breeds with the favorites and the filter flag, and
/// loads the first page on its own when the store is empty.
pub struct BreedListViewModel {
    inner: Arc<ListInner>,
}

struct ListInner {
    repository: BreedRepository,
    favorites: FavoritesTracker,
    state: watch::Sender<BreedListState>,
    filter: watch::Sender<bool>,
    fetch: OperationSlot,
    set_favorite: OperationSlot,
    unset_favorite: OperationSlot,
    tasks: TaskSet,
}

impl BreedListViewModel {
    /// Create the view model and start combining. Must be called inside a
    /// tokio runtime.
    pub fn new(repository: BreedRepository, favorites: FavoritesTracker) -> Self {
        let (state, _) = watch::channel(BreedListState::default());
        let (filter, _) = watch::channel(false);

        let inner = Arc::new(ListInner {
            repository,
            favorites,
            state,
            filter,
            fetch: OperationSlot::new(),
            set_favorite: OperationSlot::new(),
            unset_favorite: OperationSlot::new(),
            tasks: TaskSet::default(),
        });

        let combine = Arc::clone(&inner);
        inner.tasks.spawn(combine.run_combine());

        Self { inner }
    }

    /// Subscribe to state changes.
    pub fn state(&self) -> watch::Receiver<BreedListState> {
        self.inner.state.subscribe()
    }

    /// The current state.
    pub fn current(&self) -> BreedListState {
        self.inner.state.borrow().clone()
    }

    /// Show only favorites, or everything.
    pub fn set_filter_favorites(&self, favorites_only: bool) {
        self.inner.filter.send_if_modified(|current| {
            let changed = *current != favorites_only;
            *current = favorites_only;
            changed
        });
    }

    /// Whether only favorites are shown.
    pub fn filter_favorites(&self) -> bool {
        *self.inner.filter.borrow()
    }

    /// Load the next page. Ignored while a load is running.
    pub fn fetch_breeds(&self) {
        self.inner.fetch_breeds();
    }

    /// Mark a breed as favorite.
    pub fn set_as_favorite(&self, id: impl Into<BreedId>) {
        self.inner.set_as_favorite(id.into());
    }

    /// Unmark a favorite.
    pub fn unset_as_favorite(&self, id: impl Into<BreedId>) {
        self.inner.unset_as_favorite(id.into());
    }

    /// Mark `id` if it is not a favorite, unmark it otherwise.
    pub fn toggle_favorite(&self, id: impl Into<BreedId>) {
        let id = id.into();
        if self.inner.favorites.contains(id.as_str()) {
            self.inner.unset_as_favorite(id);
        } else {
            self.inner.set_as_favorite(id);
        }
    }
}

impl Drop for BreedListViewModel {
    fn drop(&mut self) {
        self.inner.tasks.abort_all();
    }
}

impl ListInner {
    async fn run_combine(self: Arc<Self>) {
        let mut feed = self.repository.breeds();
        let mut favorites = self.favorites.breeds();
        let mut filter = self.filter.subscribe();
        let mut gate = AutoFetchGate::new();

        loop {
            let breeds = feed.snapshot();
            let favorite_ids = favorites.snapshot();
            let favorites_only = *filter.borrow_and_update();

            if gate.observe(breeds.is_empty()) {
                debug!("breed store is empty, fetching first page");
                self.fetch_breeds();
            }

            let rows = join_breeds(&breeds, &favorite_ids, favorites_only);
            let loading = self.fetch.is_in_flight();
            self.state.send_modify(|state| {
                state.loading = loading;
                state.breeds = rows;
                state.filter_favorites = favorites_only;
            });

            tokio::select! {
                alive = feed.changed() => if !alive { break },
                alive = favorites.changed() => if !alive { break },
                changed = filter.changed() => if changed.is_err() { break },
            }
        }
    }

    fn fetch_breeds(self: &Arc<Self>) {
        let Some(mut guard) = self.fetch.try_start() else {
            warn!("fetch_breeds already in flight");
            return;
        };

        self.state.send_modify(|state| state.loading = true);
        apply_actions(&self.state, guard.take_start_actions());

        let inner = Arc::clone(self);
        self.tasks.spawn(async move {
            let result = inner.repository.fetch_more_breeds().await;
            if let Err(e) = &result {
                error!(error = %e, "fetch_breeds failed");
            }
            apply_actions(&inner.state, guard.finish(&result));
            inner.state.send_modify(|state| state.loading = false);
        });
    }

    fn set_as_favorite(self: &Arc<Self>, id: BreedId) {
        let Some(mut guard) = self.set_favorite.try_start() else {
            warn!(%id, "set_as_favorite already in flight");
            return;
        };
        apply_actions(&self.state, guard.take_start_actions());

        let inner = Arc::clone(self);
        self.tasks.spawn(async move {
            let result = inner.favorites.set_as_favorite(&id).await;
            if let Err(e) = &result {
                error!(%id, error = %e, "set_as_favorite failed");
            }
            apply_actions(&inner.state, guard.finish(&result));
        });
    }

    fn unset_as_favorite(self: &Arc<Self>, id: BreedId) {
        let Some(mut guard) = self.unset_favorite.try_start() else {
            warn!(%id, "unset_as_favorite already in flight");
            return;
        };
        apply_actions(&self.state, guard.take_start_actions());

        let inner = Arc::clone(self);
        self.tasks.spawn(async move {
            let result = inner.favorites.unset_as_favorite(&id).await;
            if let Err(e) = &result {
                error!(%id, error = %e, "unset_as_favorite failed");
            }
            apply_actions(&inner.state, guard.finish(&result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MockRemote, RemoteError};
    use breed_store::{BreedStore, SqliteStore};
    use breed_types::{Breed, FavoriteRecord};
    use breed_store::FavoriteStore;
    use std::time::Duration;

    fn catalog(n: usize) -> Vec<Breed> {
        (0..n)
            .map(|i| Breed::named(format!("id{i:02}"), format!("Breed {i}")))
            .collect()
    }

    async fn setup(remote: &MockRemote) -> (SqliteStore, BreedRepository, FavoritesTracker) {
        let store = SqliteStore::in_memory().await.unwrap();
        let shared = Arc::new(store.clone());
        let repository =
            BreedRepository::new(Arc::new(remote.clone()), shared.clone(), shared.clone());
        let favorites = FavoritesTracker::new(shared);
        (store, repository, favorites)
    }

    async fn wait_for(
        rx: &mut watch::Receiver<BreedListState>,
        pred: impl FnMut(&BreedListState) -> bool,
    ) -> BreedListState {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
            .await
            .expect("timed out waiting for list state")
            .expect("state channel closed")
            .clone()
    }

    fn ids(state: &BreedListState) -> Vec<&str> {
        state.breeds.iter().map(|b| b.id.as_str()).collect()
    }

    #[tokio::test]
    async fn empty_store_fetches_exactly_once() {
        let remote = MockRemote::with_catalog(catalog(25));
        let (_store, repository, favorites) = setup(&remote).await;
        let vm = BreedListViewModel::new(repository, favorites);
        let mut rx = vm.state();

        let state = wait_for(&mut rx, |s| s.breeds.len() == 10 && !s.loading).await;
        assert!(!state.error);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(remote.page_calls(), 1);
    }

    #[tokio::test]
    async fn failing_fetch_is_not_retried() {
        let remote = MockRemote::with_catalog(catalog(25));
        remote.set_offline(true);
        let (_store, repository, favorites) = setup(&remote).await;
        let vm = BreedListViewModel::new(repository, favorites);
        let mut rx = vm.state();

        let state = wait_for(&mut rx, |s| s.error).await;
        assert_eq!(
            state.error_message,
            RemoteError::Offline("Unable to resolve host".into()).to_string()
        );
        let state = wait_for(&mut rx, |s| !s.loading).await;
        assert!(state.breeds.is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(remote.page_calls(), 1);
    }

    #[tokio::test]
    async fn manual_fetch_after_failure_clears_error() {
        let remote = MockRemote::with_catalog(catalog(5));
        remote.fail_next(RemoteError::Status { status: 500 });
        let (_store, repository, favorites) = setup(&remote).await;
        let vm = BreedListViewModel::new(repository, favorites);
        let mut rx = vm.state();
        wait_for(&mut rx, |s| s.error && !s.loading).await;

        vm.fetch_breeds();
        let state = wait_for(&mut rx, |s| s.breeds.len() == 5).await;
        assert!(!state.error);
        assert!(state.error_message.is_empty());
    }

    #[tokio::test]
    async fn populated_store_does_not_fetch() {
        let remote = MockRemote::with_catalog(catalog(25));
        let (store, repository, favorites) = setup(&remote).await;
        store.upsert_breeds(&catalog(3)).await.unwrap();

        let vm = BreedListViewModel::new(repository, favorites);
        let mut rx = vm.state();
        let state = wait_for(&mut rx, |s| s.breeds.len() == 3).await;
        assert!(!state.loading);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(remote.page_calls(), 0);
    }

    #[tokio::test]
    async fn fetch_while_in_flight_is_ignored() {
        let remote = MockRemote::with_catalog(catalog(25));
        remote.hold();
        let (_store, repository, favorites) = setup(&remote).await;
        let vm = BreedListViewModel::new(repository, favorites);

        while remote.page_calls() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        vm.fetch_breeds();
        vm.fetch_breeds();
        assert!(vm.current().loading);
        assert_eq!(remote.page_calls(), 1);

        remote.release();
        let mut rx = vm.state();
        wait_for(&mut rx, |s| s.breeds.len() == 10 && !s.loading).await;

        vm.fetch_breeds();
        wait_for(&mut rx, |s| s.breeds.len() == 20).await;
        assert_eq!(remote.page_calls(), 2);
    }

    #[tokio::test]
    async fn filter_excludes_non_favorites_and_restores() {
        let remote = MockRemote::new();
        let (store, repository, favorites) = setup(&remote).await;
        store.upsert_breeds(&catalog(4)).await.unwrap();
        store
            .upsert_favorite(&FavoriteRecord::at("id02", 1))
            .await
            .unwrap();

        let vm = BreedListViewModel::new(repository, favorites);
        let mut rx = vm.state();
        let state = wait_for(&mut rx, |s| s.breeds.len() == 4).await;
        assert_eq!(
            state.breeds.iter().map(|b| b.favorite).collect::<Vec<_>>(),
            vec![false, false, true, false]
        );

        vm.set_filter_favorites(true);
        let state = wait_for(&mut rx, |s| s.filter_favorites).await;
        assert_eq!(ids(&state), vec!["id02"]);
        assert!(state.breeds[0].favorite);

        vm.set_filter_favorites(false);
        let state = wait_for(&mut rx, |s| !s.filter_favorites).await;
        assert_eq!(ids(&state), vec!["id00", "id01", "id02", "id03"]);
    }

    #[tokio::test]
    async fn favorite_and_unfavorite_update_rows() {
        let remote = MockRemote::new();
        let (store, repository, favorites) = setup(&remote).await;
        store.upsert_breeds(&catalog(2)).await.unwrap();
        let vm = BreedListViewModel::new(repository, favorites);
        let mut rx = vm.state();
        wait_for(&mut rx, |s| s.breeds.len() == 2).await;

        vm.set_as_favorite("id01");
        wait_for(&mut rx, |s| s.breeds[1].favorite).await;

        vm.unset_as_favorite("id01");
        let state = wait_for(&mut rx, |s| !s.breeds[1].favorite).await;
        assert!(state.breeds.iter().all(|b| !b.favorite));
        assert!(store.subscribe_favorites().borrow().is_empty());
    }

    #[tokio::test]
    async fn toggle_favorite_flips() {
        let remote = MockRemote::new();
        let (store, repository, favorites) = setup(&remote).await;
        store.upsert_breeds(&catalog(1)).await.unwrap();
        let vm = BreedListViewModel::new(repository, favorites);
        let mut rx = vm.state();
        wait_for(&mut rx, |s| s.breeds.len() == 1).await;

        vm.toggle_favorite("id00");
        wait_for(&mut rx, |s| s.breeds[0].favorite).await;

        vm.toggle_favorite("id00");
        wait_for(&mut rx, |s| !s.breeds[0].favorite).await;
    }

    #[tokio::test]
    async fn list_populates_lookup_cache() {
        let remote = MockRemote::with_catalog(catalog(3));
        let (_store, repository, favorites) = setup(&remote).await;
        let vm = BreedListViewModel::new(repository.clone(), favorites);
        let mut rx = vm.state();
        wait_for(&mut rx, |s| s.breeds.len() == 3).await;

        assert_eq!(repository.get_breed("id02"), Some(Breed::named("id02", "Breed 2")));
    }

    #[tokio::test]
    async fn drop_aborts_running_fetch() {
        let remote = MockRemote::with_catalog(catalog(5));
        remote.hold();
        let (_store, repository, favorites) = setup(&remote).await;
        let vm = BreedListViewModel::new(repository.clone(), favorites);

        while remote.page_calls() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(repository.is_fetching());

        drop(vm);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!repository.is_fetching());
    }
}
