//! Breed search screen.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use breed_core::{join_breeds, normalize_keyword, resolve_offline, SearchResolution};
use breed_types::{Breed, BreedId, BreedListModel};

use super::{apply_actions, ErrorState, TaskSet, TaskSlot};
use crate::favorites::FavoritesTracker;
use crate::flight::OperationSlot;
use crate::repository::{BreedRepository, RepositoryError};

/// State of the search screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreedSearchState {
    /// The keyword as last typed.
    pub keyword: String,
    /// A non-blank keyword is waiting for its search to resolve.
    pub loading: bool,
    /// Rows to display.
    pub breeds: Vec<BreedListModel>,
    /// The last search or favorite operation failed.
    pub error: bool,
    /// Message of the last failure.
    pub error_message: String,
}

impl ErrorState for BreedSearchState {
    fn clear_error(&mut self) {
        self.error = false;
        self.error_message.clear();
    }

    fn report_error(&mut self, message: String) {
        self.error = true;
        self.error_message = message;
    }
}

/// Owner of the search screen.
///
/// Keyword input is debounced: each keystroke cancels the pending search and
/// schedules a new one. Remote failures caused by an unreachable host fall
/// back to the persisted breeds.
///
/// Every keystroke starts a new generation. A search only writes state while
/// its generation is current, so a search that was already past its last
/// await when it got superseded cannot overwrite the newer keyword's state.
pub struct BreedSearchViewModel {
    inner: Arc<SearchInner>,
}

/// Remote results, tagged with the generation that produced them.
#[derive(Debug, Default)]
struct Results {
    generation: u64,
    breeds: Vec<Breed>,
}

struct SearchInner {
    repository: BreedRepository,
    favorites: FavoritesTracker,
    debounce: Duration,
    state: watch::Sender<BreedSearchState>,
    results: watch::Sender<Results>,
    // Only advanced while the state lock is held
    generation: AtomicU64,
    search: TaskSlot,
    set_favorite: OperationSlot,
    unset_favorite: OperationSlot,
    tasks: TaskSet,
}

impl BreedSearchViewModel {
    /// Create the view model. Must be called inside a tokio runtime.
    pub fn new(
        repository: BreedRepository,
        favorites: FavoritesTracker,
        debounce: Duration,
    ) -> Self {
        let (state, _) = watch::channel(BreedSearchState::default());
        let (results, _) = watch::channel(Results::default());

        let inner = Arc::new(SearchInner {
            repository,
            favorites,
            debounce,
            state,
            results,
            generation: AtomicU64::new(0),
            search: TaskSlot::default(),
            set_favorite: OperationSlot::new(),
            unset_favorite: OperationSlot::new(),
            tasks: TaskSet::default(),
        });

        let combine = Arc::clone(&inner);
        inner.tasks.spawn(combine.run_combine());

        Self { inner }
    }

    /// Subscribe to state changes.
    pub fn state(&self) -> watch::Receiver<BreedSearchState> {
        self.inner.state.subscribe()
    }

    /// The current state.
    pub fn current(&self) -> BreedSearchState {
        self.inner.state.borrow().clone()
    }

    /// Record a keystroke.
    ///
    /// Results are cleared immediately. The search runs once the keyword has
    /// been stable for the debounce window; a blank keyword never searches.
    pub fn update_keyword(&self, keyword: impl Into<String>) {
        let keyword = keyword.into();
        let blank = normalize_keyword(&keyword).is_none();
        let generation = self.inner.begin_generation(&keyword, blank);

        if blank {
            self.inner.search.abort();
            return;
        }

        let inner = Arc::clone(&self.inner);
        self.inner.search.replace(async move {
            tokio::time::sleep(inner.debounce).await;
            if let Some(term) = normalize_keyword(&keyword) {
                inner.run_search(term, generation).await;
            }
        });
    }

    /// Mark a breed as favorite and persist it from the current results.
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

impl Drop for BreedSearchViewModel {
    fn drop(&mut self) {
        self.inner.search.abort();
        self.inner.tasks.abort_all();
    }
}

impl SearchInner {
    /// Reset state for a new keyword and return its generation.
    fn begin_generation(&self, keyword: &str, blank: bool) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.results.send_replace(Results {
                generation,
                breeds: Vec::new(),
            });
            state.keyword = keyword.to_string();
            state.loading = !blank;
            state.breeds.clear();
            state.clear_error();
        });
        generation
    }

    /// Apply `update` only if `generation` is still current.
    fn publish_if_current(
        &self,
        generation: u64,
        update: impl FnOnce(&mut BreedSearchState),
    ) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            update(state);
            true
        })
    }

    async fn run_combine(self: Arc<Self>) {
        let mut results = self.results.subscribe();
        let mut favorites = self.favorites.breeds();

        loop {
            let (generation, breeds) = {
                let current = results.borrow_and_update();
                (current.generation, current.breeds.clone())
            };
            let rows = join_breeds(&breeds, &favorites.snapshot(), false);
            self.publish_if_current(generation, |state| state.breeds = rows);

            tokio::select! {
                changed = results.changed() => if changed.is_err() { break },
                alive = favorites.changed() => if !alive { break },
            }
        }
    }

    async fn run_search(&self, term: &str, generation: u64) {
        let resolution = match self.repository.search_by_name(term).await {
            Ok(breeds) => SearchResolution::Results(breeds),
            Err(e) if e.is_offline() => {
                warn!(term, error = %e, "remote unreachable, searching locally");
                match self.repository.search_by_name_locally(term).await {
                    Ok(local) => resolve_offline(local, &e.to_string()),
                    Err(local) => SearchResolution::Error {
                        message: local.to_string(),
                    },
                }
            }
            Err(e) => {
                error!(term, error = %e, "search failed");
                SearchResolution::Error {
                    message: e.to_string(),
                }
            }
        };

        let published = match resolution {
            SearchResolution::Results(breeds) => {
                let rows = join_breeds(&breeds, &self.favorites.breeds().snapshot(), false);
                self.publish_if_current(generation, |state| {
                    self.results.send_replace(Results { generation, breeds });
                    state.breeds = rows;
                    state.loading = false;
                })
            }
            SearchResolution::Error { message } => {
                self.publish_if_current(generation, |state| {
                    state.report_error(message);
                    state.loading = false;
                })
            }
        };
        if !published {
            debug!(term, "keyword changed, dropping search result");
        }
    }

    fn set_as_favorite(self: &Arc<Self>, id: BreedId) {
        let Some(mut guard) = self.set_favorite.try_start() else {
            warn!(%id, "set_as_favorite already in flight");
            return;
        };
        apply_actions(&self.state, guard.take_start_actions());

        let breed = self
            .results
            .borrow()
            .breeds
            .iter()
            .find(|b| b.id == id)
            .cloned();

        let inner = Arc::clone(self);
        self.tasks.spawn(async move {
            let backfill = async {
                match &breed {
                    Some(breed) => inner.repository.save_breed(breed).await,
                    None => Ok(()),
                }
            };
            let (favorite, saved) =
                tokio::join!(inner.favorites.set_as_favorite(&id), backfill);

            let result = favorite.map_err(RepositoryError::from).and(saved);
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
