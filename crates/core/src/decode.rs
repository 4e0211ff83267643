//! Decoding of step-start messages.

use bt_protocol::message_models::{StepStartMessage, START_TIME_FORMAT};
use chrono::NaiveDateTime;
use serde_json::Value;
use thiserror::Error;

/// Why a message payload was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Message is not a valid JSON record: {reason}")]
    InvalidJson { reason: String },

    #[error("Message is missing field '{field}'")]
    MissingField { field: &'static str },

    #[error("Message has unparsable start_time '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// A decoded step-start event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStart {
    pub step: String,
    pub start_time: NaiveDateTime,
}

impl StepStart {
    pub fn new(step: impl Into<String>, start_time: NaiveDateTime) -> Self {
        Self {
            step: step.into(),
            start_time,
        }
    }

    /// Wire representation of this event.
    pub fn to_message(&self) -> StepStartMessage {
        StepStartMessage::new(
            self.step.clone(),
            self.start_time.format(START_TIME_FORMAT).to_string(),
        )
    }
}

/// Decode one transport payload.
///
/// Both fields are required and the step name must not be blank.
pub fn decode_message(payload: &str) -> Result<StepStart, DecodeError> {
    let record = match serde_json::from_str(payload) {
        Ok(Value::Object(record)) => record,
        Ok(other) => {
            return Err(DecodeError::InvalidJson {
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            })
        }
        Err(e) => {
            return Err(DecodeError::InvalidJson {
                reason: e.to_string(),
            })
        }
    };
    let message: StepStartMessage =
        serde_json::from_value(Value::Object(record)).map_err(|e| DecodeError::InvalidJson {
            reason: e.to_string(),
        })?;

    let step = message
        .step
        .filter(|step| !step.trim().is_empty())
        .ok_or(DecodeError::MissingField { field: "step" })?;
    let raw_time = message
        .start_time
        .ok_or(DecodeError::MissingField { field: "start_time" })?;

    let start_time = NaiveDateTime::parse_from_str(raw_time.trim(), START_TIME_FORMAT).map_err(|e| {
        DecodeError::InvalidTimestamp {
            value: raw_time.clone(),
            reason: e.to_string(),
        }
    })?;

    Ok(StepStart { step, start_time })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
