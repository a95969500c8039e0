//! # breed-types
//!
//! Domain and wire types for the breed catalog sync layer.
//!
//! This crate provides the foundational types used across all breed crates:
//! - [`Breed`] - The canonical remote record, as served by the breeds API
//! - [`BreedId`], [`PageCursor`] - Identity and pagination types
//! - [`FavoriteRecord`] - A user-marked favorite with its timestamp
//! - [`BreedListModel`], [`BreedDetailsModel`] - Presentation projections
//! - [`BreedError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod breed;
mod error;
mod favorite;
mod ids;
mod models;

pub use breed::{Breed, Image, Weight};
pub use error::BreedError;
pub use favorite::FavoriteRecord;
pub use ids::{BreedId, PageCursor};
pub use models::{BreedDetailsModel, BreedListModel};
