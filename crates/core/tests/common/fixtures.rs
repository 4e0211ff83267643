//! Test fixtures for building routings, payloads and sample projects.

use bt_core::decode::StepStart;
use bt_protocol::routing_models::RoutingStep;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::TempDir;

/// Shift start used by every scenario.
#[allow(dead_code)]
pub fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap()
}

/// `t0` plus `secs` seconds.
#[allow(dead_code)]
pub fn at(secs: i64) -> NaiveDateTime {
    t0() + Duration::seconds(secs)
}

/// Build routing steps from `(name, standard_duration, is_processing_step)`.
#[allow(dead_code)]
pub fn routing(steps: &[(&str, f64, bool)]) -> Vec<RoutingStep> {
    steps
        .iter()
        .map(|(name, duration, processing)| RoutingStep::new(*name, *duration, *processing))
        .collect()
}

/// `A(10, fixed)`, `B(5, processing)`, `C(8, fixed)`.
#[allow(dead_code)]
pub fn abc_routing() -> Vec<RoutingStep> {
    routing(&[("A", 10.0, false), ("B", 5.0, true), ("C", 8.0, false)])
}

/// Wire payload for "`step` started at `at(secs)`".
#[allow(dead_code)]
pub fn payload(step: &str, secs: i64) -> String {
    let message = StepStart::new(step, at(secs)).to_message();
    serde_json::to_string(&message).unwrap()
}

/// Create a temporary project directory with `.batch-tracker` configuration.
///
/// Contains a `config.toml` and two routings, `line-a` and `line-b`.
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join(".batch-tracker/routings"))?;

    let config_toml = r#"
poll_interval_secs = 1
queue_name = "operation_queue"
snapshot_buffer = 16

[logging]
level = "warn"
"#;
    std::fs::write(root.join(".batch-tracker/config.toml"), config_toml)?;

    let line_a = r#"
name: line-a
description: "Three-step batch"
steps:
  - step: A
    duration: 10
  - step: B
    duration: 5
    processing: true
  - step: C
    duration: 8
"#;
    std::fs::write(root.join(".batch-tracker/routings/line-a.yaml"), line_a)?;

    let line_b = r#"
name: line-b
steps:
  - step: charge
    duration: 600
  - step: react
    duration: 3600
    processing: true
"#;
    std::fs::write(root.join(".batch-tracker/routings/line-b.yml"), line_b)?;

    Ok(temp_dir)
}
