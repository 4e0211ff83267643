//! Runtime step state models.
//!
//! This module defines the structures for reporting the live status of each
//! step in a batch.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Represents the current lifecycle status of a step.
///
/// The status progresses through these states:
/// Pending -> Running -> (Idle <-> Running) -> Complete
///
/// - Idle: a fixed-duration step has run past its standard duration
/// - Complete: terminal, timers are frozen
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// Step has not been started yet.
    Pending,

    /// Step is actively running and accruing active time.
    Running,

    /// Step has overrun its standard duration and is accruing idle time.
    Idle,

    /// Step has finished.
    Complete,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "PENDING",
            StepStatus::Running => "RUNNING",
            StepStatus::Idle => "IDLE",
            StepStatus::Complete => "COMPLETE",
        }
    }

    /// Whether the step has been started and not yet completed.
    pub fn is_active(&self) -> bool {
        matches!(self, StepStatus::Running | StepStatus::Idle)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot of one step, produced once per engine cycle.
///
/// All durations are in seconds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct StepSnapshot {
    /// Step name.
    pub name: String,

    /// Current lifecycle status.
    pub state: StepStatus,

    /// Configured standard duration.
    pub standard_duration: f64,

    /// Whether this is a processing (throughput-bound) step.
    pub is_processing_step: bool,

    /// When the step entered Running for the first time.
    pub start_time: Option<NaiveDateTime>,

    /// When the step entered Complete.
    pub end_time: Option<NaiveDateTime>,

    /// Wall-clock time since `start_time`, frozen on completion.
    pub elapsed_time: f64,

    /// Cumulative time spent Running.
    pub active_time: f64,

    /// Cumulative time spent Idle.
    pub idle_time: f64,

    /// Standard duration not yet consumed by active time.
    pub remaining_time: f64,

    /// Ratio of standard duration to active time, capped at 1.0.
    pub processing_performance: f64,
}

impl fmt::Display for StepSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            StepStatus::Pending => write!(f, "Step {}: State = PENDING", self.name),
            StepStatus::Running => write!(
                f,
                "Step {}: State = RUNNING, Elapsed Time = {:.2} seconds, Idle Time = {:.2} seconds, \
                 Active Time = {:.2} seconds, Remaining Time = {:.2} seconds, \
                 Processing performance = {:.2}",
                self.name,
                self.elapsed_time,
                self.idle_time,
                self.active_time,
                self.remaining_time,
                self.processing_performance
            ),
            StepStatus::Idle => write!(
                f,
                "Step {}: State = IDLE, Elapsed Time = {:.2} seconds, Idle Time = {:.2} seconds",
                self.name, self.elapsed_time, self.idle_time
            ),
            StepStatus::Complete => write!(
                f,
                "Step {}: State = COMPLETE, Elapsed Time = {:.2} seconds",
                self.name, self.elapsed_time
            ),
        }
    }
}
