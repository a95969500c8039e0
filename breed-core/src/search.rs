//! Search keyword handling and offline fallback policy.

use breed_types::Breed;

/// Outcome of a search after fallback has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResolution {
    /// Show these breeds.
    Results(Vec<Breed>),
    /// Show an error with this message.
    Error {
        /// Message to surface.
        message: String,
    },
}

/// Trim a keyword. `None` means the keyword is blank and the results should
/// be cleared without querying anything.
pub fn normalize_keyword(keyword: &str) -> Option<&str> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Resolve a search whose remote query failed because the host was
/// unreachable, given the results of the local query.
pub fn resolve_offline(local: Vec<Breed>, offline_message: &str) -> SearchResolution {
    if local.is_empty() {
        SearchResolution::Error {
            message: offline_message.to_string(),
        }
    } else {
        SearchResolution::Results(local)
    }
}
