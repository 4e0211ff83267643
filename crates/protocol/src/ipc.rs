//! Engine-to-sink communication protocol.
//!
//! The engine publishes `Event`s on a channel once per cycle. Consumers
//! (a console printer, an HTTP bridge, a metrics exporter) subscribe to that
//! channel; the engine never waits for them.
//!
//! Every event carries the `batch_id` of the sequence it came from, so a
//! single sink can serve several sharded engines.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::step_models::StepSnapshot;

/// Events sent from the engine to its sink.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "stepStarted",
///   "payload": {
///     "batch_id": "uuid-here",
///     "step": "fill-tank",
///     "step_index": 1,
///     "at": "2024-05-01T06:30:00"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A step entered Running.
    StepStarted {
        #[ts(type = "string")]
        batch_id: Uuid,
        step: String,
        step_index: usize,
        at: NaiveDateTime,
    },

    /// A step entered Complete.
    ///
    /// `skipped` is true when the step was never started and was closed
    /// because the line moved past it.
    StepCompleted {
        #[ts(type = "string")]
        batch_id: Uuid,
        step: String,
        step_index: usize,
        at: NaiveDateTime,
        skipped: bool,
    },

    /// A fixed-duration step ran past its standard duration.
    StepIdle {
        #[ts(type = "string")]
        batch_id: Uuid,
        step: String,
        step_index: usize,
        at: NaiveDateTime,
    },

    /// A step-start message was decoded but could not be applied.
    EventRejected {
        #[ts(type = "string")]
        batch_id: Uuid,
        step: String,
        reason: String,
    },

    /// A message could not be decoded and was dropped.
    DecodeFailed {
        #[ts(type = "string")]
        batch_id: Uuid,
        payload: String,
        error: String,
    },

    /// Polling the transport failed; the cycle continued without new messages.
    TransportUnavailable {
        #[ts(type = "string")]
        batch_id: Uuid,
        error: String,
    },

    /// Status of every step at the end of a cycle.
    StatusSnapshot {
        #[ts(type = "string")]
        batch_id: Uuid,
        frame: u64,
        current_step_index: usize,
        steps: Vec<StepSnapshot>,
    },
}

impl Event {
    /// Batch the event belongs to.
    pub fn batch_id(&self) -> Uuid {
        match self {
            Event::StepStarted { batch_id, .. }
            | Event::StepCompleted { batch_id, .. }
            | Event::StepIdle { batch_id, .. }
            | Event::EventRejected { batch_id, .. }
            | Event::DecodeFailed { batch_id, .. }
            | Event::TransportUnavailable { batch_id, .. }
            | Event::StatusSnapshot { batch_id, .. } => *batch_id,
        }
    }
}
