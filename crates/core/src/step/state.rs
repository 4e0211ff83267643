//! Step lifecycle states and the transition table.
//!
//! ```text
//! Pending --start--> Running --complete--> Complete
//!                     |   ^
//!          (overrun)  v   | resume
//!                     Idle --complete--> Complete
//! ```
//!
//! The Running -> Idle edge is not an event: it is taken by
//! [`Step::update`](super::Step::update) when a fixed-duration step runs past
//! its standard duration.

use bt_protocol::step_models::StepStatus;
use chrono::NaiveDateTime;
use std::fmt;

/// Current state of a step, together with the timestamps that only make
/// sense in that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Not started.
    Pending,

    /// Accruing active time since `last_update_time`.
    Running { last_update_time: NaiveDateTime },

    /// Accruing idle time since `last_idle_time_update`.
    Idle { last_idle_time_update: NaiveDateTime },

    /// Terminal.
    Complete { end_time: NaiveDateTime },
}

impl StepState {
    /// Protocol-level status for this state.
    pub fn status(&self) -> StepStatus {
        match self {
            StepState::Pending => StepStatus::Pending,
            StepState::Running { .. } => StepStatus::Running,
            StepState::Idle { .. } => StepStatus::Idle,
            StepState::Complete { .. } => StepStatus::Complete,
        }
    }

    /// Whether this state accepts `event`.
    pub fn accepts(&self, event: StepEvent) -> bool {
        matches!(
            (self, event),
            (StepState::Pending, StepEvent::Start)
                | (StepState::Running { .. }, StepEvent::Complete)
                | (StepState::Idle { .. }, StepEvent::Resume)
                | (StepState::Idle { .. }, StepEvent::Complete)
        )
    }
}

/// Named events a step can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepEvent {
    Start,
    Complete,
    Resume,
}

impl StepEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepEvent::Start => "start",
            StepEvent::Complete => "complete",
            StepEvent::Resume => "resume",
        }
    }
}

impl fmt::Display for StepEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change that happened at `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StepStatus,
    pub to: StepStatus,
    pub at: NaiveDateTime,
}

impl Transition {
    /// Completion of a step that was never started.
    pub fn is_skip(&self) -> bool {
        self.from == StepStatus::Pending && self.to == StepStatus::Complete
    }
}

/// Result of offering an event to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The state accepted the event.
    Applied(Transition),

    /// The state does not accept the event; nothing changed.
    Ignored { state: StepStatus, event: StepEvent },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}
