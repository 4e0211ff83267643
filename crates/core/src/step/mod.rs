//! Step state machine.
//!
//! This module provides:
//! - The `Step` entity with its timers
//! - `StepState` and the transition table
//! - Strict-mode transition errors

pub mod error;
pub mod machine;
pub mod state;

pub use error::{StepError, StepResult};
pub use machine::Step;
pub use state::{StepEvent, StepState, Transition, TransitionOutcome};
