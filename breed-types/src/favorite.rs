//! Favorite records.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::BreedId;

/// A breed the user marked as favorite.
///
/// `created_at` is a Unix timestamp in milliseconds. Favorites are always
/// presented most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FavoriteRecord {
    /// The favorited breed
    pub id: BreedId,
    /// When the breed was favorited (Unix millis)
    pub created_at: i64,
}

impl FavoriteRecord {
    /// Create a record timestamped now.
    pub fn new(id: impl Into<BreedId>) -> Self {
        Self {
            id: id.into(),
            created_at: now_millis(),
        }
    }

    /// Create a record with an explicit timestamp.
    pub fn at(id: impl Into<BreedId>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            created_at,
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
