//! Identity and pagination types.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier of a breed (e.g. `"abys"`).
///
/// Assigned by the remote API; the primary key of every persisted breed.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreedId(String);

impl BreedId {
    /// Create a BreedId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The empty id, used by placeholder records.
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether the id is empty (placeholder records only).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for BreedId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BreedId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for BreedId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BreedId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BreedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for BreedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BreedId({})", self.0)
    }
}

/// Index of the last page fetched from the paginated breed listing.
///
/// Starts at [`PageCursor::NONE`] (-1) so that the first fetch requests page 0.
/// Only advanced after a page has been fetched and persisted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageCursor(i64);

impl PageCursor {
    /// Sentinel meaning "no page fetched yet".
    pub const NONE: PageCursor = PageCursor(-1);

    /// Create a cursor for the given page index.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this cursor.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Whether no page has been fetched yet.
    pub fn is_none(&self) -> bool {
        self.0 < 0
    }

    /// The page that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageCursor({})", self.0)
    }
}
