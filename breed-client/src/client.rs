//! BreedsClient - wires the remote, the durable store and the view models.
//!
//! ```text
//! Config → HttpRemote ─┐
//!        → SqliteStore ┴→ BreedRepository → BreedListViewModel
//!                      └→ FavoritesTracker → BreedSearchViewModel
//!                                          → BreedDetailsViewModel
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use breed_store::{Config, SqliteStore, StorageError};

use crate::favorites::FavoritesTracker;
use crate::remote::{HttpRemote, RemoteError, RemoteSource};
use crate::repository::BreedRepository;
use crate::view::{BreedDetailsViewModel, BreedListViewModel, BreedSearchViewModel};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Remote error.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Entry point for applications.
#[derive(Clone)]
pub struct BreedsClient {
    store: SqliteStore,
    repository: BreedRepository,
    favorites: FavoritesTracker,
    debounce: Duration,
}

impl BreedsClient {
    /// Open the database at `database` and talk to the configured remote.
    pub async fn open(config: &Config, database: &Path) -> Result<Self, ClientError> {
        let remote = HttpRemote::new(&config.remote)?;
        let store = SqliteStore::new(database).await?;
        info!(database = %database.display(), base_url = %config.remote.base_url, "client opened");
        Ok(Self::with_parts(
            Arc::new(remote),
            store,
            Duration::from_millis(config.search.debounce_ms),
        ))
    }

    /// Assemble a client from an existing remote and store.
    pub fn with_parts(remote: Arc<dyn RemoteSource>, store: SqliteStore, debounce: Duration) -> Self {
        let shared = Arc::new(store.clone());
        let repository = BreedRepository::new(remote, shared.clone(), shared.clone());
        let favorites = FavoritesTracker::new(shared);
        Self {
            store,
            repository,
            favorites,
            debounce,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// The breed repository.
    pub fn repository(&self) -> &BreedRepository {
        &self.repository
    }

    /// The favorites tracker.
    pub fn favorites(&self) -> &FavoritesTracker {
        &self.favorites
    }

    /// A new list screen owner. Starts loading immediately when the store is
    /// empty.
    pub fn list_view(&self) -> BreedListViewModel {
        BreedListViewModel::new(self.repository.clone(), self.favorites.clone())
    }

    /// A new search screen owner using the configured debounce.
    pub fn search_view(&self) -> BreedSearchViewModel {
        BreedSearchViewModel::new(self.repository.clone(), self.favorites.clone(), self.debounce)
    }

    /// A new details screen owner.
    pub fn details_view(&self) -> BreedDetailsViewModel {
        BreedDetailsViewModel::new(self.repository.clone(), self.favorites.clone())
    }
}
