//! Integration tests for the engine's poll, apply, tick and render cycle.

mod common;

use bt_core::clock::ManualClock;
use bt_core::engine::Engine;
use bt_core::sequence::{AdvanceError, Sequence};
use bt_core::transport::{InMemoryQueue, MockQueue};
use bt_protocol::ipc::Event;
use bt_protocol::step_models::StepStatus;
use common::*;
use std::time::Duration;
use tokio::sync::mpsc;

fn engine_with(
    queue: InMemoryQueue,
    clock: ManualClock,
) -> (Engine<InMemoryQueue, ManualClock>, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(256);
    let sequence = Sequence::new(&abc_routing()).unwrap();
    (Engine::new(sequence, queue, clock, tx), rx)
}

#[tokio::test]
async fn test_engine_tracks_batch_across_cycles() {
    let queue = InMemoryQueue::new();
    let clock = ManualClock::new(at(0));
    let (mut engine, mut rx) = engine_with(queue.clone(), clock.clone());

    // Cycle 1: A starts; clock already past its standard duration.
    queue.push(payload("A", 0)).await;
    clock.set(at(12));
    let report = engine.run_once().await;
    assert!(report.is_clean());
    assert_states(
        &report.snapshot,
        &[StepStatus::Idle, StepStatus::Pending, StepStatus::Pending],
    );

    let events = drain_events(&mut rx);
    assert_eq!(started_steps(&events), vec!["A"]);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::StepIdle { step, .. } if step == "A")));

    // Cycle 2: B starts at 15 and is ticked at 16.
    queue.push(payload("B", 15)).await;
    clock.set(at(16));
    let report = engine.run_once().await;
    assert_eq!(report.frame, 2);
    assert_eq!(report.applied, 1);

    let events = drain_events(&mut rx);
    assert_eq!(completed_steps(&events), vec![("A".to_string(), false)]);
    assert_eq!(started_steps(&events), vec!["B"]);

    let snapshot = last_snapshot(&events);
    assert_states(
        &snapshot,
        &[StepStatus::Complete, StepStatus::Running, StepStatus::Pending],
    );
    assert_secs(snapshot[0].elapsed_time, 15.0);
    assert_secs(snapshot[1].active_time, 1.0);
}

#[tokio::test]
async fn test_engine_applies_messages_in_arrival_order() {
    let queue = InMemoryQueue::new();
    queue
        .extend([payload("A", 0), payload("C", 10), payload("B", 5)])
        .await;
    let (mut engine, mut rx) = engine_with(queue, ManualClock::new(at(11)));

    let report = engine.run_once().await;

    assert_eq!(report.polled, 3);
    assert_eq!(report.applied, 2);
    assert_eq!(report.rejected.len(), 1);
    assert!(matches!(
        &report.rejected[0],
        AdvanceError::StaleEvent { step, .. } if step == "B"
    ));
    assert_eq!(engine.sequence().current_step_index(), 2);

    let events = drain_events(&mut rx);
    assert_eq!(
        completed_steps(&events),
        vec![("A".to_string(), false), ("B".to_string(), true)]
    );
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::EventRejected { step, .. } if step == "B")));
}

#[tokio::test]
async fn test_engine_drops_malformed_payloads() {
    let queue = InMemoryQueue::new();
    queue
        .extend([
            "not json".to_string(),
            r#"{"step": "A"}"#.to_string(),
            r#"{"step": "A", "start_time": "01/05/2024 06:00"}"#.to_string(),
            payload("A", 0),
        ])
        .await;
    let (mut engine, mut rx) = engine_with(queue.clone(), ManualClock::new(at(1)));

    let report = engine.run_once().await;

    assert_eq!(report.polled, 4);
    assert_eq!(report.decode_failures.len(), 3);
    assert_eq!(report.applied, 1);
    assert!(queue.is_empty().await);

    let events = drain_events(&mut rx);
    let failures = events
        .iter()
        .filter(|e| matches!(e, Event::DecodeFailed { .. }))
        .count();
    assert_eq!(failures, 3);
    assert_eq!(started_steps(&events), vec!["A"]);
}

#[tokio::test]
async fn test_engine_only_pops_messages_available_at_poll_time() {
    let queue = InMemoryQueue::new();
    queue.push(payload("A", 0)).await;
    let (mut engine, _rx) = engine_with(queue.clone(), ManualClock::new(at(1)));

    engine.run_once().await;
    queue.push(payload("B", 2)).await;
    assert_eq!(queue.len().await, 1);

    engine.run_once().await;
    assert!(queue.is_empty().await);
    assert_eq!(engine.sequence().current_step_index(), 1);
}

#[tokio::test]
async fn test_engine_recovers_after_transport_failure() {
    let inner = InMemoryQueue::new();
    inner.push(payload("A", 0)).await;
    let (tx, mut rx) = mpsc::channel(64);
    let sequence = Sequence::new(&abc_routing()).unwrap();
    let mut engine = Engine::new(
        sequence,
        MockQueue::flaky(inner, 1),
        ManualClock::new(at(3)),
        tx,
    );

    let report = engine.run_once().await;
    assert!(report.transport_error.is_some());
    assert_eq!(report.applied, 0);
    assert_eq!(report.snapshot.len(), 3);

    let report = engine.run_once().await;
    assert!(report.transport_error.is_none());
    assert_eq!(report.applied, 1);
    assert!(engine.queue().inner().is_empty().await);

    let events = drain_events(&mut rx);
    assert!(matches!(events[0], Event::TransportUnavailable { .. }));
    let snapshots = events
        .iter()
        .filter(|e| matches!(e, Event::StatusSnapshot { .. }))
        .count();
    assert_eq!(snapshots, 2);
}

#[tokio::test]
async fn test_engine_finish_closes_batch() {
    let queue = InMemoryQueue::new();
    queue.extend([payload("A", 0), payload("C", 20)]).await;
    let (mut engine, _rx) = engine_with(queue, ManualClock::new(at(25)));

    engine.run_once().await;
    let completed = engine.sequence_mut().finish(at(30)).unwrap();

    assert_eq!(completed.index, 2);
    assert!(!completed.skipped());
    assert!(engine.sequence().is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_run_forever_stops_on_shutdown() {
    let (mut engine, mut rx) = engine_with(InMemoryQueue::new(), ManualClock::new(at(0)));
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        shutdown_tx.send(()).await.unwrap();
    });

    let cycles = engine.run_forever(Duration::from_secs(1), shutdown_rx).await;
    stopper.await.unwrap();

    // Ticks at 0s, 1s and 2s.
    assert_eq!(cycles, 3);
    assert_eq!(engine.frame(), 3);

    let frames: Vec<u64> = drain_events(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::StatusSnapshot { frame, .. } => Some(frame),
            _ => None,
        })
        .collect();
    assert_eq!(frames, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_run_forever_stops_when_shutdown_sender_dropped() {
    let (mut engine, _rx) = engine_with(InMemoryQueue::new(), ManualClock::new(at(0)));
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(shutdown_tx);
    });

    let cycles = engine.run_forever(Duration::from_secs(1), shutdown_rx).await;
    assert_eq!(cycles, 2);
}
