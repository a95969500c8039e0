//! Per-operation state machine.
//!
//! Every mutating operation a view model exposes (fetch more, set favorite,
//! unset favorite) owns one [`OperationState`]. The machine takes events as
//! input and produces a new state plus a list of actions to execute. At most
//! one unit of work is in flight per machine: a `Start` while `InFlight`
//! yields [`Action::Skip`] and nothing is launched.
//!
//! The caller checks-and-sets the state under a lock, then performs the
//! returned actions outside of it.

/// Operation state machine - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationState {
    /// Nothing running, no pending error.
    #[default]
    Idle,
    /// A unit of work has been launched and not yet resolved.
    InFlight,
    /// The last unit of work failed. A new `Start` is accepted.
    Failed {
        /// Message of the failure.
        error: String,
    },
}

impl OperationState {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Process an event and return the new state plus actions to execute.
    pub fn on_event(self, event: Event) -> (Self, Vec<Action>) {
        match (self, event) {
            (Self::Idle, Event::Start) => (Self::InFlight, vec![Action::Launch]),
            (Self::Failed { .. }, Event::Start) => {
                (Self::InFlight, vec![Action::ClearError, Action::Launch])
            }
            (Self::InFlight, Event::Start) => (Self::InFlight, vec![Action::Skip]),

            (Self::InFlight, Event::Succeeded) => (Self::Idle, vec![]),
            (Self::InFlight, Event::Failed { error }) => (
                Self::Failed {
                    error: error.clone(),
                },
                vec![Action::ReportError { error }],
            ),
            (Self::InFlight, Event::Cancelled) => (Self::Idle, vec![]),

            // Resolutions without a matching launch are ignored
            (state, _) => (state, vec![]),
        }
    }

    /// Check if a unit of work is currently running.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    /// The message of the last failure, if the machine is in `Failed`.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Events that drive an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Caller wants to run the operation.
    Start,
    /// The launched unit of work completed.
    Succeeded,
    /// The launched unit of work failed.
    Failed {
        /// Error message describing the failure.
        error: String,
    },
    /// The launched unit of work was dropped before resolving.
    Cancelled,
}

/// Actions to be executed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run the unit of work.
    Launch,
    /// Another unit of work is running; return without doing anything.
    Skip,
    /// Clear a previously reported error.
    ClearError,
    /// Surface the failure to the presentation layer.
    ReportError {
        /// Error message describing the failure.
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let state = OperationState::new();
        assert!(matches!(state, OperationState::Idle));
        assert!(!state.is_in_flight());
    }

    #[test]
    fn start_launches() {
        let (state, actions) = OperationState::Idle.on_event(Event::Start);
        assert!(state.is_in_flight());
        assert_eq!(actions, vec![Action::Launch]);
    }

    #[test]
    fn start_while_in_flight_skips() {
        let (state, actions) = OperationState::InFlight.on_event(Event::Start);
        assert!(state.is_in_flight());
        assert_eq!(actions, vec![Action::Skip]);
    }

    #[test]
    fn success_returns_to_idle() {
        let (state, actions) = OperationState::InFlight.on_event(Event::Succeeded);
        assert_eq!(state, OperationState::Idle);
        assert!(actions.is_empty());
    }

    #[test]
    fn failure_is_reported() {
        let (state, actions) = OperationState::InFlight.on_event(Event::Failed {
            error: "timeout".into(),
        });
        assert_eq!(state.error(), Some("timeout"));
        assert!(!state.is_in_flight());
        assert!(actions
            .iter()
            .any(|a| matches!(a, Action::ReportError { error } if error == "timeout")));
    }

    #[test]
    fn retry_after_failure_clears_error() {
        let failed = OperationState::Failed {
            error: "timeout".into(),
        };
        let (state, actions) = failed.on_event(Event::Start);
        assert!(state.is_in_flight());
        assert_eq!(actions, vec![Action::ClearError, Action::Launch]);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let (state, _) = OperationState::InFlight.on_event(Event::Cancelled);
        assert_eq!(state, OperationState::Idle);
    }

    #[test]
    fn stray_resolution_is_ignored() {
        let (state, actions) = OperationState::Idle.on_event(Event::Succeeded);
        assert_eq!(state, OperationState::Idle);
        assert!(actions.is_empty());

        let failed = OperationState::Failed { error: "x".into() };
        let (state, actions) = failed.clone().on_event(Event::Cancelled);
        assert_eq!(state, failed);
        assert!(actions.is_empty());
    }

    #[test]
    fn full_lifecycle() {
        let state = OperationState::new();
        let (state, _) = state.on_event(Event::Start);
        let (state, skipped) = state.on_event(Event::Start);
        assert_eq!(skipped, vec![Action::Skip]);
        let (state, _) = state.on_event(Event::Failed { error: "offline".into() });
        let (state, _) = state.on_event(Event::Start);
        let (state, _) = state.on_event(Event::Succeeded);
        assert_eq!(state, OperationState::Idle);
    }
}
