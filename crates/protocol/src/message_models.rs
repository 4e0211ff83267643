//! Inbound step-start message wire format.
//!
//! The upstream producer pushes one JSON record per observed step start:
//!
//! ```json
//! {"step": "fill-tank", "start_time": "2024-05-01 06:30:00"}
//! ```
//!
//! `start_time` is a local, timezone-naive timestamp.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// `strftime` format of [`StepStartMessage::start_time`].
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A raw step-start message as carried by the transport.
///
/// Both fields are optional at the serde level so that a record missing a
/// field can be told apart from one that is not JSON at all.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StepStartMessage {
    /// Name of the step that started.
    #[serde(default)]
    pub step: Option<String>,

    /// When the step started, formatted with [`START_TIME_FORMAT`].
    #[serde(default)]
    pub start_time: Option<String>,
}

impl StepStartMessage {
    pub fn new(step: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            step: Some(step.into()),
            start_time: Some(start_time.into()),
        }
    }
}
