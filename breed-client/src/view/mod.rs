//! View models: owners of presentation state.
//!
//! Each view model publishes its state on a `tokio::sync::watch` channel and
//! runs its work on tokio tasks it owns. Dropping the view model aborts every
//! task it started.

mod details;
mod list;
mod search;

pub use details::{BreedDetailsState, BreedDetailsViewModel};
pub use list::{BreedListState, BreedListViewModel};
pub use search::{BreedSearchState, BreedSearchViewModel};

use breed_core::Action;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Presentation state with an error flag and message.
pub(crate) trait ErrorState {
    fn clear_error(&mut self);
    fn report_error(&mut self, message: String);
}

/// Apply the error actions of an operation slot to published state.
pub(crate) fn apply_actions<S: ErrorState>(state: &watch::Sender<S>, actions: Vec<Action>) {
    for action in actions {
        match action {
            Action::ClearError => state.send_modify(S::clear_error),
            Action::ReportError { error } => state.send_modify(|s| s.report_error(error)),
            Action::Launch | Action::Skip => {}
        }
    }
}

/// Tasks owned by a view model.
#[derive(Debug, Default)]
pub(crate) struct TaskSet {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskSet {
    fn lock(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Spawn a task owned by this set.
    pub(crate) fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut handles = self.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Abort every task in the set.
    pub(crate) fn abort_all(&self) {
        for handle in self.lock().drain(..) {
            handle.abort();
        }
    }
}

/// A single replaceable task (debounced search, per-id watcher).
#[derive(Debug, Default)]
pub(crate) struct TaskSlot {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Abort the current task, if any, and spawn `future` in its place.
    pub(crate) fn replace<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.lock();
        if let Some(old) = slot.take() {
            old.abort();
        }
        *slot = Some(tokio::spawn(future));
    }

    /// Abort the current task, if any.
    pub(crate) fn abort(&self) {
        if let Some(old) = self.lock().take() {
            old.abort();
        }
    }
}
