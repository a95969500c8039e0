//! # breed-client
//!
//! Local-first client for the cat breed catalog.
//!
//! Breeds are fetched page by page from the remote API and merged into a
//! durable SQLite store; every screen reads from the store and keeps working
//! when the remote is unreachable.
//!
//! ## Features
//!
//! - **Paginated synchronization**: a persisted cursor, advanced only after a
//!   page is stored
//! - **Single-flight operations**: duplicate requests are ignored while one
//!   is running
//! - **Offline search fallback**: unreachable-host failures query the local
//!   store instead
//! - **Reactive view models**: state published on `tokio::sync::watch`
//!
//! ## Example
//!
//! ```ignore
//! use breed_client::BreedsClient;
//! use breed_store::Config;
//!
//! let config = Config::load_or_default("breeds.toml".as_ref())?;
//! let client = BreedsClient::open(&config, "breeds.db".as_ref()).await?;
//!
//! let list = client.list_view();
//! let mut state = list.state();
//! state.wait_for(|s| !s.loading).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod client;
pub mod favorites;
pub mod flight;
pub mod remote;
pub mod repository;
pub mod view;

pub use cache::LookupCache;
pub use client::{BreedsClient, ClientError};
pub use favorites::{FavoriteFlag, FavoriteIds, FavoritesTracker};
pub use flight::{FlightGuard, OperationSlot};
pub use remote::{HttpRemote, MockRemote, RemoteCall, RemoteError, RemoteSource};
pub use repository::{BreedFeed, BreedRepository, FetchOutcome, RepositoryError};
pub use view::{
    BreedDetailsState, BreedDetailsViewModel, BreedListState, BreedListViewModel,
    BreedSearchState, BreedSearchViewModel,
};
