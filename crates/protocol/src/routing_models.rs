//! Routing models for `.batch-tracker/routings/*.yaml`.
//!
//! A routing is the ordered list of process steps a batch moves through.
//! The order of `steps` is the process routing order and is trusted as-is.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single step in a routing.
///
/// # Example
///
/// ```yaml
/// step: fill-tank
/// duration: 1800
/// processing: true
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct RoutingStep {
    /// Step name, unique within its routing.
    ///
    /// Inbound step-start messages refer to steps by this name.
    #[serde(rename = "step")]
    pub name: String,

    /// Standard duration in seconds.
    ///
    /// For fixed-duration steps this is the time budget after which the
    /// step is considered idle. For processing steps it is the throughput
    /// target used to compute processing performance.
    #[serde(rename = "duration")]
    pub standard_duration: f64,

    /// Whether the step duration is throughput-bound rather than fixed.
    #[serde(rename = "processing", default)]
    pub is_processing_step: bool,
}

impl RoutingStep {
    pub fn new(name: impl Into<String>, standard_duration: f64, is_processing_step: bool) -> Self {
        Self {
            name: name.into(),
            standard_duration,
            is_processing_step,
        }
    }
}

/// A named routing, loaded from one YAML file.
///
/// # Example
///
/// ```yaml
/// name: batch-a
/// description: "Standard batch routing for line A"
/// steps:
///   - step: charge
///     duration: 600
///   - step: fill-tank
///     duration: 1800
///     processing: true
///   - step: changeover
///     duration: 900
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct Routing {
    /// Unique name identifying this routing.
    pub name: String,

    /// Optional human-readable description.
    #[serde(default)]
    pub description: String,

    /// Steps in process routing order.
    pub steps: Vec<RoutingStep>,
}
