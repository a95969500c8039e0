//! In-memory lookup cache.

use breed_types::{Breed, BreedId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Process-lifetime id → breed map.
///
/// Entries are only ever inserted if absent, never overwritten and never
/// evicted. Clones share the same map.
#[derive(Debug, Default, Clone)]
pub struct LookupCache {
    entries: Arc<DashMap<BreedId, Breed>>,
}

impl LookupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `breed` unless its id is already cached. Returns whether it was
    /// inserted.
    pub fn insert_if_absent(&self, breed: &Breed) -> bool {
        match self.entries.entry(breed.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(breed.clone());
                true
            }
        }
    }

    /// Insert every breed that is not cached yet.
    pub fn extend_if_absent<'a>(&self, breeds: impl IntoIterator<Item = &'a Breed>) {
        for breed in breeds {
            self.insert_if_absent(breed);
        }
    }

    /// Look up a breed by id.
    pub fn get(&self, id: &str) -> Option<Breed> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Number of cached breeds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
