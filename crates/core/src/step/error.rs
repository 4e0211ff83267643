//! Error types for strict step transitions.

use crate::step::state::StepEvent;
use bt_protocol::step_models::StepStatus;
use thiserror::Error;

/// Errors returned by [`Step::try_handle_event`](super::Step::try_handle_event).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The step's current state does not accept the event.
    #[error("Step {step} cannot accept '{event}' while {state}")]
    InvalidTransition {
        step: String,
        state: StepStatus,
        event: StepEvent,
    },
}

/// Type alias for Result with StepError.
pub type StepResult<T> = Result<T, StepError>;
