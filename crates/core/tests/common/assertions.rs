//! Assertion helpers over events published by the engine.

use bt_protocol::ipc::Event;
use bt_protocol::step_models::{StepSnapshot, StepStatus};
use tokio::sync::mpsc::Receiver;

/// Drain every event currently buffered in `rx`.
#[allow(dead_code)]
pub fn drain_events(rx: &mut Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Names of started steps, in publication order.
#[allow(dead_code)]
pub fn started_steps(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::StepStarted { step, .. } => Some(step.clone()),
            _ => None,
        })
        .collect()
}

/// `(name, skipped)` of completed steps, in publication order.
#[allow(dead_code)]
pub fn completed_steps(events: &[Event]) -> Vec<(String, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::StepCompleted { step, skipped, .. } => Some((step.clone(), *skipped)),
            _ => None,
        })
        .collect()
}

/// Steps of the most recent status snapshot.
#[allow(dead_code)]
pub fn last_snapshot(events: &[Event]) -> Vec<StepSnapshot> {
    events
        .iter()
        .rev()
        .find_map(|e| match e {
            Event::StatusSnapshot { steps, .. } => Some(steps.clone()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("No status snapshot in {events:?}"))
}

/// Assert the state of every step, in routing order.
#[allow(dead_code)]
pub fn assert_states(snapshot: &[StepSnapshot], expected: &[StepStatus]) {
    let actual: Vec<StepStatus> = snapshot.iter().map(|s| s.state).collect();
    assert_eq!(actual, expected, "Unexpected step states in {snapshot:#?}");
}

/// Assert two timer readings agree to the millisecond.
#[allow(dead_code)]
pub fn assert_secs(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}s, got {actual}s"
    );
}
