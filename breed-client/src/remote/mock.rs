//! Mock remote for testing.
//!
//! Serves pages and searches from an in-memory catalog, records every call,
//! and can be told to fail or to hold requests open.

use super::{RemoteError, RemoteSource};
use async_trait::async_trait;
use breed_types::Breed;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;

/// A request received by [`MockRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `get_page(limit, page)`
    Page {
        /// Requested page size.
        limit: u32,
        /// Requested page index.
        page: i64,
    },
    /// `search(name)`
    Search {
        /// Requested query.
        name: String,
    },
}

/// Mock remote for testing.
///
/// Clones share state, so a test can keep a handle after giving one away.
#[derive(Debug, Default, Clone)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    catalog: Vec<Breed>,
    calls: Vec<RemoteCall>,
    fail_queue: VecDeque<RemoteError>,
    offline: bool,
    hold: Option<Arc<Semaphore>>,
}

impl MockRemote {
    /// Create a mock with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock serving the given catalog.
    pub fn with_catalog(catalog: Vec<Breed>) -> Self {
        let remote = Self::new();
        remote.set_catalog(catalog);
        remote
    }

    fn lock(&self) -> MutexGuard<'_, MockRemoteInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the catalog.
    pub fn set_catalog(&self, catalog: Vec<Breed>) {
        self.lock().catalog = catalog;
    }

    /// Cause the next call (page or search) to fail with the given error.
    ///
    /// Several failures can be queued; each call consumes one.
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().fail_queue.push_back(error);
    }

    /// Make every call fail with [`RemoteError::Offline`] until turned off.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Hold every subsequent call open until [`MockRemote::release`].
    ///
    /// Calls are recorded before they block.
    pub fn hold(&self) {
        self.lock().hold = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let held calls (and all future ones) proceed.
    pub fn release(&self) {
        if let Some(gate) = self.lock().hold.take() {
            gate.close();
        }
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    /// Number of `get_page` calls received so far.
    pub fn page_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RemoteCall::Page { .. }))
            .count()
    }

    /// Number of `search` calls received so far.
    pub fn search_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RemoteCall::Search { .. }))
            .count()
    }

    /// Record the call and return the gate to wait on, if any.
    fn begin(&self, call: RemoteCall) -> Option<Arc<Semaphore>> {
        let mut inner = self.lock();
        inner.calls.push(call);
        inner.hold.clone()
    }

    fn check_failure(&self) -> Result<(), RemoteError> {
        let mut inner = self.lock();
        if let Some(error) = inner.fail_queue.pop_front() {
            return Err(error);
        }
        if inner.offline {
            return Err(RemoteError::Offline("Unable to resolve host".into()));
        }
        Ok(())
    }
}

async fn wait(gate: Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        // Closing the semaphore is the release signal
        let _ = gate.acquire().await;
    }
}

#[async_trait]
impl RemoteSource for MockRemote {
    async fn get_page(&self, limit: u32, page: i64) -> Result<Vec<Breed>, RemoteError> {
        wait(self.begin(RemoteCall::Page { limit, page })).await;
        self.check_failure()?;

        if page < 0 {
            return Ok(Vec::new());
        }
        let inner = self.lock();
        Ok(inner
            .catalog
            .iter()
            .skip(page as usize * limit as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn search(&self, name: &str) -> Result<Vec<Breed>, RemoteError> {
        wait(self.begin(RemoteCall::Search {
            name: name.to_string(),
        }))
        .await;
        self.check_failure()?;

        let needle = name.to_lowercase();
        let inner = self.lock();
        Ok(inner
            .catalog
            .iter()
            .filter(|b| b.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
