//! Breed details screen.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{error, warn};

use breed_types::{BreedDetailsModel, BreedId};

use super::{apply_actions, ErrorState, TaskSet, TaskSlot};
use crate::favorites::FavoritesTracker;
use crate::flight::OperationSlot;
use crate::repository::BreedRepository;

/// State of the details screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedDetailsState {
    /// No id has been set yet.
    pub loading: bool,
    /// The breed, or [`BreedDetailsModel::EMPTY`] when it is not cached.
    pub breed: BreedDetailsModel,
    /// Whether the breed is a favorite.
    pub favorite: bool,
    /// The last favorite operation failed.
    pub error: bool,
    /// Message of the last failure.
    pub error_message: String,
}

impl Default for BreedDetailsState {
    fn default() -> Self {
        Self {
            loading: true,
            breed: BreedDetailsModel::EMPTY,
            favorite: false,
            error: false,
            error_message: String::new(),
        }
    }
}

impl ErrorState for BreedDetailsState {
    fn clear_error(&mut self) {
        self.error = false;
        self.error_message.clear();
    }

    fn report_error(&mut self, message: String) {
        self.error = true;
        self.error_message = message;
    }
}

/// Owner of the details screen.
pub struct BreedDetailsViewModel {
    inner: Arc<DetailsInner>,
}

struct DetailsInner {
    repository: BreedRepository,
    favorites: FavoritesTracker,
    state: watch::Sender<BreedDetailsState>,
    id: Mutex<Option<BreedId>>,
    watcher: TaskSlot,
    set_favorite: OperationSlot,
    unset_favorite: OperationSlot,
    tasks: TaskSet,
}

impl BreedDetailsViewModel {
    /// Create the view model. Must be called inside a tokio runtime.
    pub fn new(repository: BreedRepository, favorites: FavoritesTracker) -> Self {
        let (state, _) = watch::channel(BreedDetailsState::default());
        Self {
            inner: Arc::new(DetailsInner {
                repository,
                favorites,
                state,
                id: Mutex::new(None),
                watcher: TaskSlot::default(),
                set_favorite: OperationSlot::new(),
                unset_favorite: OperationSlot::new(),
                tasks: TaskSet::default(),
            }),
        }
    }

    /// Subscribe to state changes.
    pub fn state(&self) -> watch::Receiver<BreedDetailsState> {
        self.inner.state.subscribe()
    }

    /// The current state.
    pub fn current(&self) -> BreedDetailsState {
        self.inner.state.borrow().clone()
    }

    /// Show the breed with this id.
    ///
    /// The breed is resolved from the lookup cache only; an uncached id shows
    /// the placeholder. The favorite flag follows the favorites collection
    /// until another id is set.
    pub fn set_id(&self, id: impl Into<BreedId>) {
        let id = id.into();
        let breed = self
            .inner
            .repository
            .get_breed(id.as_str())
            .map(|b| BreedDetailsModel::from(&b))
            .unwrap_or_default();
        if breed.is_empty() {
            warn!(%id, "breed not in lookup cache");
        }

        let mut flag = self.inner.favorites.is_favorite(&id);
        let favorite = flag.get();
        self.inner.set_current(Some(id));
        self.inner.state.send_modify(|state| {
            state.loading = false;
            state.breed = breed;
            state.favorite = favorite;
            state.clear_error();
        });

        let inner = Arc::clone(&self.inner);
        self.inner.watcher.replace(async move {
            while flag.changed().await {
                let favorite = flag.get();
                inner.state.send_if_modified(|state| {
                    let changed = state.favorite != favorite;
                    state.favorite = favorite;
                    changed
                });
            }
        });
    }

    /// Mark the current breed as favorite.
    pub fn set_as_favorite(&self) {
        if let Some(id) = self.inner.current_id() {
            self.inner.set_as_favorite(id);
        } else {
            warn!("set_as_favorite before set_id");
        }
    }

    /// Unmark the current breed.
    pub fn unset_as_favorite(&self) {
        if let Some(id) = self.inner.current_id() {
            self.inner.unset_as_favorite(id);
        } else {
            warn!("unset_as_favorite before set_id");
        }
    }

    /// Flip the favorite flag of the current breed.
    pub fn toggle_favorite(&self) {
        let Some(id) = self.inner.current_id() else {
            warn!("toggle_favorite before set_id");
            return;
        };
        if self.inner.favorites.contains(id.as_str()) {
            self.inner.unset_as_favorite(id);
        } else {
            self.inner.set_as_favorite(id);
        }
    }
}

impl Drop for BreedDetailsViewModel {
    fn drop(&mut self) {
        self.inner.watcher.abort();
        self.inner.tasks.abort_all();
    }
}

impl DetailsInner {
    fn current_id(&self) -> Option<BreedId> {
        self.id.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_current(&self, id: Option<BreedId>) {
        *self.id.lock().unwrap_or_else(|e| e.into_inner()) = id;
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
