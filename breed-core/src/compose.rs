//! Combination rules for the list and search screens.

use std::collections::HashSet;

use breed_types::{Breed, BreedId, BreedListModel};

/// Join breeds with the favorite id set.
///
/// Order of `breeds` is preserved. With `favorites_only`, breeds that are not
/// favorites are dropped; every surviving row carries its favorite flag.
pub fn join_breeds(
    breeds: &[Breed],
    favorites: &[BreedId],
    favorites_only: bool,
) -> Vec<BreedListModel> {
    let favorites: HashSet<&str> = favorites.iter().map(BreedId::as_str).collect();

    breeds
        .iter()
        .filter_map(|breed| {
            let favorite = favorites.contains(breed.id.as_str());
            if favorites_only && !favorite {
                return None;
            }
            Some(BreedListModel::from_breed(breed, favorite))
        })
        .collect()
}

/// Decides when an empty breed store should trigger a fetch.
///
/// Fires once on each transition into "empty". Repeated empty snapshots do
/// not fire again until a non-empty snapshot has been seen, so a failing
/// remote never turns into a retry loop.
#[derive(Debug, Clone, Default)]
pub struct AutoFetchGate {
    empty: bool,
}

impl AutoFetchGate {
    /// Create a gate that treats the first empty snapshot as a transition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot of the persisted breed set. Returns `true` when a
    /// fetch should be triggered.
    pub fn observe(&mut self, is_empty: bool) -> bool {
        let fire = is_empty && !self.empty;
        self.empty = is_empty;
        fire
    }
}
