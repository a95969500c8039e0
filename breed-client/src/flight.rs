//! Single-flight slots driven by the [`OperationState`] machine.
//!
//! A slot is checked-and-set under a lock before any async work starts. The
//! returned guard must be resolved with [`FlightGuard::succeed`] or
//! [`FlightGuard::fail`]; dropping it unresolved (task aborted, panic) feeds
//! `Cancelled` so the slot never stays stuck in flight.
//!
//! Starting and resolving hand back the machine's remaining actions
//! (`ClearError`, `ReportError`) for the owner to apply to its state.

use breed_core::{Action, Event, OperationState};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared state of one operation kind.
#[derive(Debug, Default, Clone)]
pub struct OperationSlot {
    state: Arc<Mutex<OperationState>>,
}

impl OperationSlot {
    /// Create an idle slot.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, OperationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn apply(&self, event: Event) -> Vec<Action> {
        let mut state = self.lock();
        let (next, actions) = state.clone().on_event(event);
        *state = next;
        actions
    }

    /// Start the operation unless one is already in flight.
    pub fn try_start(&self) -> Option<FlightGuard> {
        let mut actions = self.apply(Event::Start);
        if !actions.contains(&Action::Launch) {
            return None;
        }
        actions.retain(|a| *a != Action::Launch);
        Some(FlightGuard {
            slot: self.clone(),
            started: actions,
            resolved: false,
        })
    }

    /// Current state.
    pub fn state(&self) -> OperationState {
        self.lock().clone()
    }

    /// Whether an operation is in flight.
    pub fn is_in_flight(&self) -> bool {
        self.lock().is_in_flight()
    }
}

/// Proof that the holder owns the in-flight slot.
#[derive(Debug)]
pub struct FlightGuard {
    slot: OperationSlot,
    started: Vec<Action>,
    resolved: bool,
}

impl FlightGuard {
    /// Actions produced by the start transition, `Launch` excluded.
    /// `[ClearError]` when the previous run of this operation failed.
    pub fn take_start_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.started)
    }

    /// Mark the operation as completed.
    pub fn succeed(mut self) -> Vec<Action> {
        self.resolved = true;
        self.slot.apply(Event::Succeeded)
    }

    /// Mark the operation as failed. Returns `[ReportError]`.
    pub fn fail(mut self, error: impl Into<String>) -> Vec<Action> {
        self.resolved = true;
        self.slot.apply(Event::Failed {
            error: error.into(),
        })
    }

    /// Resolve from a result.
    pub fn finish<T, E: std::fmt::Display>(self, result: &Result<T, E>) -> Vec<Action> {
        match result {
            Ok(_) => self.succeed(),
            Err(e) => self.fail(e.to_string()),
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if !self.resolved {
            self.slot.apply(Event::Cancelled);
        }
    }
}
