//! Error types for breed-store.

use std::path::PathBuf;

/// Storage layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database path error.
    #[error("invalid database path: {path}")]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
    },

    /// A record was rejected before being written.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] breed_types::BreedError),

    /// A persisted row could not be turned back into a domain value.
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow {
        /// Table the row came from.
        table: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_path_display() {
        let err = StorageError::InvalidPath {
            path: PathBuf::from("/nope"),
        };
        assert_eq!(err.to_string(), "invalid database path: /nope");
    }

    #[test]
    fn corrupt_row_display() {
        let err = StorageError::CorruptRow {
            table: "favorites",
            reason: "empty id".into(),
        };
        assert_eq!(err.to_string(), "corrupt row in favorites: empty id");
    }
}
