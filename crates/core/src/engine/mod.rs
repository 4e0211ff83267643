//! Batch tracking engine.
//!
//! The `Engine` drives one [`Sequence`] from a step-start message queue.
//! Each cycle it:
//! 1. Polls the queue, popping at most the number of messages available at
//!    poll time
//! 2. Decodes every payload, dropping malformed ones
//! 3. Applies the decoded events to the sequence in arrival order
//! 4. Ticks the active step once with the current clock reading
//! 5. Publishes a status snapshot
//!
//! Errors never abort the loop; they are logged, reported in the
//! [`CycleReport`] and published as events.

mod report;

pub use report::CycleReport;

use crate::clock::Clock;
use crate::decode::{decode_message, StepStart};
use crate::sequence::{AdvanceOutcome, Sequence};
use crate::transport::EventQueue;
use bt_protocol::ipc::Event;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// The main driver loop.
///
/// The engine exclusively owns its sequence; the queue and clock are
/// injected so tests can script both.
pub struct Engine<Q, C> {
    sequence: Sequence,
    queue: Q,
    clock: C,
    events_tx: Sender<Event>,
    messages: VecDeque<StepStart>,
    frame: u64,
}

impl<Q, C> Engine<Q, C>
where
    Q: EventQueue,
    C: Clock,
{
    /// Create a new Engine.
    ///
    /// # Arguments
    ///
    /// * `sequence` - The sequence of the batch to track
    /// * `queue` - Transport handle carrying step-start messages
    /// * `clock` - Time source for ticks
    /// * `events_tx` - Channel for publishing events and snapshots
    pub fn new(sequence: Sequence, queue: Q, clock: C, events_tx: Sender<Event>) -> Self {
        Self {
            sequence,
            queue,
            clock,
            events_tx,
            messages: VecDeque::new(),
            frame: 0,
        }
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Mutable access for callers closing the batch (see [`Sequence::finish`]).
    pub fn sequence_mut(&mut self) -> &mut Sequence {
        &mut self.sequence
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Number of cycles run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run exactly one poll -> apply -> tick -> render cycle.
    pub async fn run_once(&mut self) -> CycleReport {
        self.frame += 1;
        let mut report = CycleReport::new(self.frame);

        self.poll(&mut report).await;
        self.apply(&mut report);

        let now = self.clock.now();
        if let Some(transition) = self.sequence.tick(now) {
            let index = self.sequence.current_step_index();
            let step = self.sequence.steps()[index].name().to_string();
            self.emit(Event::StepIdle {
                batch_id: self.sequence.batch_id(),
                step,
                step_index: index,
                at: transition.at,
            });
        }

        report.snapshot = self.sequence.render();
        self.emit(Event::StatusSnapshot {
            batch_id: self.sequence.batch_id(),
            frame: self.frame,
            current_step_index: self.sequence.current_step_index(),
            steps: report.snapshot.clone(),
        });

        debug!(
            frame = self.frame,
            polled = report.polled,
            applied = report.applied,
            "Cycle complete"
        );
        report
    }

    /// Run cycles every `interval` until `shutdown` fires or all its senders
    /// are dropped.
    ///
    /// Shutdown is only observed between cycles, so an in-flight cycle
    /// always finishes. Returns the number of cycles run by this call.
    pub async fn run_forever(&mut self, interval: Duration, mut shutdown: Receiver<()>) -> u64 {
        info!(
            batch_id = %self.sequence.batch_id(),
            steps = self.sequence.len(),
            "Engine started, poll interval: {:?}",
            interval
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycles = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await;
                    cycles += 1;
                }
                _ = shutdown.recv() => {
                    info!(batch_id = %self.sequence.batch_id(), "Engine shutting down");
                    break;
                }
            }
        }

        cycles
    }

    /// Drain the messages available at poll time into the buffer.
    async fn poll(&mut self, report: &mut CycleReport) {
        let available = match self.queue.available().await {
            Ok(available) => available,
            Err(e) => {
                self.transport_failed(report, e.to_string());
                return;
            }
        };

        for _ in 0..available {
            let payload = match self.queue.pop_message().await {
                Ok(Some(payload)) => payload,
                Ok(None) => break,
                Err(e) => {
                    self.transport_failed(report, e.to_string());
                    break;
                }
            };
            report.polled += 1;

            match decode_message(&payload) {
                Ok(message) => self.messages.push_back(message),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed message");
                    self.emit(Event::DecodeFailed {
                        batch_id: self.sequence.batch_id(),
                        payload,
                        error: e.to_string(),
                    });
                    report.decode_failures.push(e);
                }
            }
        }
    }

    /// Apply buffered messages in arrival order.
    fn apply(&mut self, report: &mut CycleReport) {
        while let Some(message) = self.messages.pop_front() {
            match self.sequence.advance(&message.step, message.start_time) {
                Ok(outcome) => {
                    report.applied += 1;
                    self.publish_outcome(&outcome);
                }
                Err(e) => {
                    warn!(batch_id = %self.sequence.batch_id(), error = %e, "Rejected step event");
                    self.emit(Event::EventRejected {
                        batch_id: self.sequence.batch_id(),
                        step: message.step,
                        reason: e.to_string(),
                    });
                    report.rejected.push(e);
                }
            }
        }
    }

    fn publish_outcome(&self, outcome: &AdvanceOutcome) {
        let batch_id = self.sequence.batch_id();
        let steps = self.sequence.steps();

        for completed in &outcome.completed {
            self.emit(Event::StepCompleted {
                batch_id,
                step: steps[completed.index].name().to_string(),
                step_index: completed.index,
                at: completed.transition.at,
                skipped: completed.skipped(),
            });
        }

        let started = &steps[outcome.started];
        if let Some(at) = started.start_time() {
            self.emit(Event::StepStarted {
                batch_id,
                step: started.name().to_string(),
                step_index: outcome.started,
                at,
            });
        }
    }

    fn transport_failed(&self, report: &mut CycleReport, error: String) {
        error!(batch_id = %self.sequence.batch_id(), error = %error, "Error polling queue");
        self.emit(Event::TransportUnavailable {
            batch_id: self.sequence.batch_id(),
            error: error.clone(),
        });
        report.transport_error = Some(error);
    }

    /// Hand an event to the sink without waiting on it.
    fn emit(&self, event: Event) {
        match self.events_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event sink is full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Event sink closed, dropping event");
            }
        }
    }
}
