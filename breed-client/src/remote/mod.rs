//! Remote source abstraction for the breeds API.
//!
//! This module provides a pluggable remote layer that abstracts the
//! underlying HTTP client (reqwest, mock for testing).
//!
//! # Design
//!
//! The remote is stateless and failure-prone:
//! - `get_page()` fetches one page of the paginated listing
//! - `search()` fetches breeds whose name matches a query
//!
//! Failures caused by an unreachable host are reported as
//! [`RemoteError::Offline`] so callers can fall back to local data.

mod http;
mod mock;

pub use http::HttpRemote;
pub use mock::{MockRemote, RemoteCall};

use async_trait::async_trait;
use breed_types::Breed;
use thiserror::Error;

/// Remote errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The host could not be reached (DNS failure, connection refused).
    #[error("host unreachable: {0}")]
    Offline(String),

    /// The server answered with a non-success status.
    #[error("unexpected status: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Any other request failure, including timeouts.
    #[error("request failed: {0}")]
    Request(String),
}

impl RemoteError {
    /// Whether this failure means the host is unreachable.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            RemoteError::Offline(e.to_string())
        } else if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            RemoteError::Status {
                status: status.as_u16(),
            }
        } else {
            RemoteError::Request(e.to_string())
        }
    }
}

/// Source of breed data.
///
/// Implementations handle the underlying request mechanism
/// (reqwest, mock, etc).
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch one page of the breed listing.
    async fn get_page(&self, limit: u32, page: i64) -> Result<Vec<Breed>, RemoteError>;

    /// Fetch breeds whose name matches `name`.
    async fn search(&self, name: &str) -> Result<Vec<Breed>, RemoteError>;
}
