//! Error types for routing validation and sequence advancement.

use bt_protocol::step_models::StepStatus;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised while building a sequence from a routing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    /// Two steps share the same name.
    #[error("Duplicate step '{step}' in routing")]
    DuplicateStep { step: String },

    /// A standard duration is zero, negative or not a number.
    #[error("Step '{step}' has invalid standard duration {duration}; expected a positive number of seconds")]
    InvalidDuration { step: String, duration: f64 },

    /// A step has an empty name.
    #[error("Routing contains a step with an empty name")]
    EmptyStepName,
}

/// Reasons a step-start event was not applied.
///
/// None of these change the sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvanceError {
    /// The step is not part of the routing.
    #[error("Step {step} not found in sequence")]
    UnknownStep { step: String },

    /// The step is behind the cursor, or is the cursor step and already
    /// complete.
    #[error("Step {step} (index {index}) is already completed; sequence is at index {current_step_index}")]
    StaleEvent {
        step: String,
        index: usize,
        current_step_index: usize,
    },

    /// The step was already started.
    #[error("Step {step} received a start while {state}")]
    ProtocolViolation { step: String, state: StepStatus },

    /// The event predates the start of the step it would close.
    #[error("Step {step} start at {event_time} is before step {active_step} started at {active_start}")]
    OutOfOrder {
        step: String,
        event_time: NaiveDateTime,
        active_step: String,
        active_start: NaiveDateTime,
    },
}

impl AdvanceError {
    pub fn step(&self) -> &str {
        match self {
            AdvanceError::UnknownStep { step }
            | AdvanceError::StaleEvent { step, .. }
            | AdvanceError::ProtocolViolation { step, .. }
            | AdvanceError::OutOfOrder { step, .. } => step,
        }
    }
}

/// Type alias for Result with AdvanceError.
pub type AdvanceResult<T> = Result<T, AdvanceError>;
