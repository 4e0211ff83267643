//! Sequence coordinator.
//!
//! A `Sequence` owns the ordered steps of one batch and a cursor pointing at
//! the furthest step that has been started. Every step behind the cursor is
//! Complete, and only the cursor step can be Running or Idle.

pub mod error;

pub use error::{AdvanceError, AdvanceResult, RoutingError};

use crate::step::{Step, StepEvent, Transition};
use bt_protocol::routing_models::{Routing, RoutingStep};
use bt_protocol::step_models::StepSnapshot;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Check that a routing can be turned into a sequence.
///
/// Step names must be non-empty and unique; standard durations must be
/// finite and positive. The order itself is trusted.
pub fn validate_routing(steps: &[RoutingStep]) -> Result<(), RoutingError> {
    let mut seen = HashSet::new();
    for step in steps {
        if step.name.is_empty() {
            return Err(RoutingError::EmptyStepName);
        }
        if !step.standard_duration.is_finite() || step.standard_duration <= 0.0 {
            return Err(RoutingError::InvalidDuration {
                step: step.name.clone(),
                duration: step.standard_duration,
            });
        }
        if !seen.insert(step.name.as_str()) {
            return Err(RoutingError::DuplicateStep {
                step: step.name.clone(),
            });
        }
    }
    Ok(())
}

/// A step closed by [`Sequence::advance`] or [`Sequence::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedStep {
    pub index: usize,
    pub transition: Transition,
}

impl CompletedStep {
    /// The step was never started.
    pub fn skipped(&self) -> bool {
        self.transition.is_skip()
    }
}

/// What a successful [`Sequence::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Index of the step that was started; the new cursor.
    pub started: usize,

    /// Steps force-completed on the way, in routing order.
    pub completed: Vec<CompletedStep>,

    /// Index of the step whose timers were retroactively corrected.
    pub corrected: Option<usize>,
}

/// Ordered steps of one batch plus the cursor.
#[derive(Debug, Clone)]
pub struct Sequence {
    batch_id: Uuid,
    steps: Vec<Step>,
    current_step_index: usize,
}

impl Sequence {
    /// Build a sequence of Pending steps in routing order.
    pub fn new(routing: &[RoutingStep]) -> Result<Self, RoutingError> {
        validate_routing(routing)?;
        Ok(Self {
            batch_id: Uuid::new_v4(),
            steps: routing.iter().map(Step::from_routing).collect(),
            current_step_index: 0,
        })
    }

    pub fn from_routing(routing: &Routing) -> Result<Self, RoutingError> {
        Self::new(&routing.steps)
    }

    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.name() == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.name() == name)
    }

    /// The cursor step, if it is Running or Idle.
    pub fn active_step(&self) -> Option<&Step> {
        self.steps
            .get(self.current_step_index)
            .filter(|step| step.is_active())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply "step `step_name` started at `event_time`".
    ///
    /// Steps between the cursor and the target are force-completed at
    /// `event_time`; the cursor step is first corrected to `event_time` if it
    /// was running. An `event_time` before the running cursor step's start is
    /// rejected. Rejected events leave the sequence untouched.
    pub fn advance(&mut self, step_name: &str, event_time: NaiveDateTime) -> AdvanceResult<AdvanceOutcome> {
        let index = self
            .position(step_name)
            .ok_or_else(|| AdvanceError::UnknownStep {
                step: step_name.to_string(),
            })?;

        let target = &self.steps[index];
        if index < self.current_step_index || target.is_complete() {
            return Err(AdvanceError::StaleEvent {
                step: step_name.to_string(),
                index,
                current_step_index: self.current_step_index,
            });
        }
        if target.is_active() {
            return Err(AdvanceError::ProtocolViolation {
                step: step_name.to_string(),
                state: target.status(),
            });
        }

        let cursor = self.current_step_index;
        if let Some(active) = self.steps.get(cursor).filter(|step| step.is_active()) {
            if let Some(active_start) = active.start_time().filter(|start| event_time < *start) {
                return Err(AdvanceError::OutOfOrder {
                    step: step_name.to_string(),
                    event_time,
                    active_step: active.name().to_string(),
                    active_start,
                });
            }
        }

        let corrected = self
            .steps
            .get_mut(cursor)
            .filter(|step| step.is_active())
            .and_then(|step| step.correct_to(event_time).then_some(cursor));

        let mut completed = Vec::new();
        for (offset, step) in self.steps[cursor..index].iter_mut().enumerate() {
            if let Some(transition) = step.force_complete(event_time) {
                completed.push(CompletedStep {
                    index: cursor + offset,
                    transition,
                });
            }
        }

        self.steps[index].handle_event(StepEvent::Start, event_time);
        self.current_step_index = index;

        debug!(
            batch_id = %self.batch_id,
            step = step_name,
            index,
            force_completed = completed.len(),
            "Advanced sequence"
        );

        Ok(AdvanceOutcome {
            started: index,
            completed,
            corrected,
        })
    }

    /// Update the cursor step at `now`; every other step is frozen.
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<Transition> {
        self.steps
            .get_mut(self.current_step_index)
            .and_then(|step| step.update(now))
    }

    /// Complete the active step at `at`, closing the batch.
    ///
    /// Returns `None` when no step is Running or Idle.
    pub fn finish(&mut self, at: NaiveDateTime) -> Option<CompletedStep> {
        let index = self.current_step_index;
        let step = self.steps.get_mut(index).filter(|step| step.is_active())?;
        let transition = step.force_complete(at)?;
        info!(batch_id = %self.batch_id, step = step.name(), "Batch finished");
        Some(CompletedStep { index, transition })
    }

    /// Whether every step is Complete.
    pub fn is_finished(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(Step::is_complete)
    }

    /// Snapshots of all steps in routing order.
    pub fn render(&self) -> Vec<StepSnapshot> {
        self.steps.iter().map(Step::render).collect()
    }
}
