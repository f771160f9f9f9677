//! Capture state machine with thread-safe transitions.
//!
//! Enforces valid state transitions for the capture lifecycle:
//! - Idle -> Listening (start capture)
//! - Listening -> Idle (explicit stop, or recovery after a failed restart)

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::engine::CaptureError;

/// Operational state of the capture engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureState {
    /// No capture in progress. Ready to start.
    Idle,
    /// Actively consuming recognizer events.
    Listening,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Listening => write!(f, "Listening"),
        }
    }
}

impl CaptureState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &CaptureState) -> bool {
        matches!(
            (self, target),
            (CaptureState::Idle, CaptureState::Listening)
                | (CaptureState::Listening, CaptureState::Idle)
        )
    }
}

/// Thread-safe state machine for capture state transitions.
///
/// All transitions are validated before being applied, returning an error
/// if the requested transition is not permitted.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: Arc<Mutex<CaptureState>>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CaptureState::Idle)),
        }
    }

    /// Returns the current state.
    pub fn current(&self) -> CaptureState {
        *self.state.lock().expect("state mutex poisoned")
    }

    /// Attempt to transition to the target state.
    pub fn transition(&self, target: CaptureState) -> Result<(), CaptureError> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        if state.can_transition_to(&target) {
            tracing::debug!("Capture state: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(CaptureError::InvalidTransition {
                from: *state,
                to: target,
            })
        }
    }

    /// Force the state machine back to Idle (used for error recovery).
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("state mutex poisoned");
        *state = CaptureState::Idle;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(CaptureState::Idle.to_string(), "Idle");
        assert_eq!(CaptureState::Listening.to_string(), "Listening");
    }

    #[test]
    fn test_valid_transitions() {
        assert!(CaptureState::Idle.can_transition_to(&CaptureState::Listening));
        assert!(CaptureState::Listening.can_transition_to(&CaptureState::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        // Cannot transition to self.
        assert!(!CaptureState::Idle.can_transition_to(&CaptureState::Idle));
        assert!(!CaptureState::Listening.can_transition_to(&CaptureState::Listening));
    }

    #[test]
    fn test_state_machine_round_trip() {
        let sm = StateMachine::new();
        assert_eq!(sm.current(), CaptureState::Idle);

        sm.transition(CaptureState::Listening).unwrap();
        assert_eq!(sm.current(), CaptureState::Listening);

        sm.transition(CaptureState::Idle).unwrap();
        assert_eq!(sm.current(), CaptureState::Idle);
    }

    #[test]
    fn test_state_machine_double_start_rejected() {
        let sm = StateMachine::new();
        sm.transition(CaptureState::Listening).unwrap();
        let result = sm.transition(CaptureState::Listening);
        assert!(result.is_err());
        assert_eq!(sm.current(), CaptureState::Listening);
    }

    #[test]
    fn test_state_machine_reset() {
        let sm = StateMachine::new();
        sm.transition(CaptureState::Listening).unwrap();
        sm.reset();
        assert_eq!(sm.current(), CaptureState::Idle);
    }

    #[test]
    fn test_state_machine_clone_is_shared() {
        let sm1 = StateMachine::new();
        let sm2 = sm1.clone();

        sm1.transition(CaptureState::Listening).unwrap();
        assert_eq!(sm2.current(), CaptureState::Listening);
    }
}
