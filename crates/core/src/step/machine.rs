//! The step entity: configuration, timers and the state machine driving them.

use crate::step::error::{StepError, StepResult};
use crate::step::state::{StepEvent, StepState, Transition, TransitionOutcome};
use bt_protocol::routing_models::RoutingStep;
use bt_protocol::step_models::{StepSnapshot, StepStatus};
use chrono::NaiveDateTime;
use tracing::{debug, info};

/// A single process step of a batch.
///
/// Timers are in seconds. A step is owned by exactly one
/// [`Sequence`](crate::sequence::Sequence) and only mutated through
/// [`handle_event`](Self::handle_event), [`update`](Self::update),
/// [`force_complete`](Self::force_complete) and
/// [`correct_to`](Self::correct_to).
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    name: String,
    standard_duration: f64,
    is_processing_step: bool,
    state: StepState,
    start_time: Option<NaiveDateTime>,
    elapsed_time: f64,
    active_time: f64,
    idle_time: f64,
    remaining_time: f64,
    processing_performance: f64,
}

impl Step {
    /// Create a Pending step with all timers at zero.
    pub fn new(name: impl Into<String>, standard_duration: f64, is_processing_step: bool) -> Self {
        Self {
            name: name.into(),
            standard_duration,
            is_processing_step,
            state: StepState::Pending,
            start_time: None,
            elapsed_time: 0.0,
            active_time: 0.0,
            idle_time: 0.0,
            remaining_time: 0.0,
            processing_performance: 1.0,
        }
    }

    pub fn from_routing(step: &RoutingStep) -> Self {
        Self::new(step.name.clone(), step.standard_duration, step.is_processing_step)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn standard_duration(&self) -> f64 {
        self.standard_duration
    }

    pub fn is_processing_step(&self) -> bool {
        self.is_processing_step
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn status(&self) -> StepStatus {
        self.state.status()
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.start_time
    }

    /// Set if and only if the step is Complete.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        match self.state {
            StepState::Complete { end_time } => Some(end_time),
            _ => None,
        }
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn active_time(&self) -> f64 {
        self.active_time
    }

    pub fn idle_time(&self) -> f64 {
        self.idle_time
    }

    pub fn remaining_time(&self) -> f64 {
        self.remaining_time
    }

    pub fn processing_performance(&self) -> f64 {
        self.processing_performance
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, StepState::Complete { .. })
    }

    /// Running or Idle.
    pub fn is_active(&self) -> bool {
        self.status().is_active()
    }

    /// Offer `event` to the current state.
    ///
    /// Events the current state does not accept are ignored: nothing changes
    /// and [`TransitionOutcome::Ignored`] is returned. `at` is the
    /// authoritative time of the transition, either an external event
    /// timestamp or the current clock reading.
    pub fn handle_event(&mut self, event: StepEvent, at: NaiveDateTime) -> TransitionOutcome {
        let from = self.status();

        match (self.state, event) {
            (StepState::Pending, StepEvent::Start) => {
                self.start_time = Some(at);
                self.state = StepState::Running { last_update_time: at };
                info!(step = %self.name, start_time = %at, "Step started");
            }
            (StepState::Running { .. } | StepState::Idle { .. }, StepEvent::Complete) => {
                self.finish(at);
            }
            (StepState::Idle { .. }, StepEvent::Resume) => {
                self.state = StepState::Running { last_update_time: at };
                info!(step = %self.name, "Step resumed");
            }
            _ => {
                debug!(step = %self.name, state = %from, event = %event, "Ignoring event");
                return TransitionOutcome::Ignored { state: from, event };
            }
        }

        TransitionOutcome::Applied(Transition {
            from,
            to: self.status(),
            at,
        })
    }

    /// Strict variant of [`handle_event`](Self::handle_event): an event the
    /// current state does not accept is an error.
    pub fn try_handle_event(&mut self, event: StepEvent, at: NaiveDateTime) -> StepResult<Transition> {
        match self.handle_event(event, at) {
            TransitionOutcome::Applied(transition) => Ok(transition),
            TransitionOutcome::Ignored { state, event } => Err(StepError::InvalidTransition {
                step: self.name.clone(),
                state,
                event,
            }),
        }
    }

    /// Re-derive timers at `now` under the current state.
    ///
    /// A `now` behind the last update leaves every timer unchanged.
    ///
    /// Returns the Running -> Idle transition when a fixed-duration step
    /// overruns its standard duration. Processing steps never go idle; their
    /// overrun shows up as a drop in processing performance instead.
    pub fn update(&mut self, now: NaiveDateTime) -> Option<Transition> {
        match self.state {
            StepState::Running { last_update_time } => {
                let (delta, reference) = advance(last_update_time, now);
                self.active_time += delta;
                self.refresh_elapsed(reference);

                if self.is_processing_step {
                    self.refresh_performance();
                    self.state = StepState::Running { last_update_time: reference };
                    return None;
                }

                self.refresh_remaining();
                if self.active_time > self.standard_duration {
                    self.state = StepState::Idle { last_idle_time_update: reference };
                    info!(
                        step = %self.name,
                        active_time = self.active_time,
                        standard_duration = self.standard_duration,
                        "Step is now IDLE"
                    );
                    return Some(Transition {
                        from: StepStatus::Running,
                        to: StepStatus::Idle,
                        at: now,
                    });
                }

                self.state = StepState::Running { last_update_time: reference };
                None
            }
            StepState::Idle { last_idle_time_update } => {
                let (delta, reference) = advance(last_idle_time_update, now);
                self.idle_time += delta;
                self.refresh_elapsed(reference);
                self.state = StepState::Idle { last_idle_time_update: reference };
                None
            }
            StepState::Pending | StepState::Complete { .. } => None,
        }
    }

    /// Complete the step regardless of its state.
    ///
    /// A Pending step becomes a skipped step: Complete with `end_time = at`,
    /// no `start_time` and zero timers. Running and Idle steps complete as
    /// with [`StepEvent::Complete`]. A Complete step is left untouched and
    /// `None` is returned.
    pub fn force_complete(&mut self, at: NaiveDateTime) -> Option<Transition> {
        match self.state {
            StepState::Pending => {
                self.state = StepState::Complete { end_time: at };
                info!(step = %self.name, "Step skipped, marking as complete");
                Some(Transition {
                    from: StepStatus::Pending,
                    to: StepStatus::Complete,
                    at,
                })
            }
            StepState::Running { .. } | StepState::Idle { .. } => {
                let from = self.status();
                self.finish(at);
                Some(Transition {
                    from,
                    to: StepStatus::Complete,
                    at,
                })
            }
            StepState::Complete { .. } => None,
        }
    }

    /// Recompute timers from an authoritative timestamp instead of the
    /// accumulated tick deltas.
    ///
    /// Idle time is kept as accumulated; elapsed, active and remaining time
    /// (and processing performance) are derived from it. Only applies to a
    /// started, not yet complete step; returns whether anything changed.
    pub fn correct_to(&mut self, at: NaiveDateTime) -> bool {
        let Some(start_time) = self.start_time else {
            return false;
        };
        if self.is_complete() {
            return false;
        }

        self.elapsed_time = seconds_between(start_time, at);
        self.active_time = (self.elapsed_time - self.idle_time).max(0.0);
        if self.is_processing_step {
            self.refresh_performance();
        } else {
            self.refresh_remaining();
        }

        debug!(
            step = %self.name,
            elapsed_time = self.elapsed_time,
            active_time = self.active_time,
            idle_time = self.idle_time,
            "Corrected step timers"
        );
        true
    }

    /// Read-only snapshot of the current state and timers.
    pub fn render(&self) -> StepSnapshot {
        StepSnapshot {
            name: self.name.clone(),
            state: self.status(),
            standard_duration: self.standard_duration,
            is_processing_step: self.is_processing_step,
            start_time: self.start_time,
            end_time: self.end_time(),
            elapsed_time: self.elapsed_time,
            active_time: self.active_time,
            idle_time: self.idle_time,
            remaining_time: self.remaining_time,
            processing_performance: self.processing_performance,
        }
    }

    fn finish(&mut self, at: NaiveDateTime) {
        if let Some(start_time) = self.start_time {
            self.elapsed_time = seconds_between(start_time, at);
        }
        self.state = StepState::Complete { end_time: at };
        info!(step = %self.name, "Step completed with final stats: {}", self.render());
    }

    fn refresh_elapsed(&mut self, now: NaiveDateTime) {
        if let Some(start_time) = self.start_time {
            self.elapsed_time = seconds_between(start_time, now);
        }
    }

    fn refresh_remaining(&mut self) {
        self.remaining_time = (self.standard_duration - self.active_time).max(0.0);
    }

    fn refresh_performance(&mut self) {
        self.processing_performance = if self.active_time > 0.0 {
            (self.standard_duration / self.active_time).min(1.0)
        } else {
            1.0
        };
    }
}

/// Seconds from `from` to `to`, never negative.
pub(crate) fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let millis = (to - from).num_milliseconds();
    (millis as f64 / 1000.0).max(0.0)
}

/// Time accrued since `reference` and the new reference timestamp.
///
/// A clock reading behind the reference accrues nothing and leaves the
/// reference where it was.
fn advance(reference: NaiveDateTime, now: NaiveDateTime) -> (f64, NaiveDateTime) {
    if now > reference {
        (seconds_between(reference, now), now)
    } else {
        (0.0, reference)
    }
}
