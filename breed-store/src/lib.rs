//! # breed-store
//!
//! Durable local storage for the breed catalog.
//!
//! Three collections live in one SQLite database:
//! - `breeds`: every breed ever fetched, upserted by id
//! - `favorites`: favorited breed ids with their creation time
//! - `settings`: named integers, used for the pagination cursor
//!
//! Reads are exposed as `tokio::sync::watch` snapshots that are refreshed
//! after every write, so a subscriber always sees its own writes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod storage;

pub use config::{Config, ConfigError};
pub use error::{StorageError, StorageResult};
pub use storage::{BreedStore, CursorStore, FavoriteStore, SqliteStore};
