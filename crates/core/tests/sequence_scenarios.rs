//! Scenario tests for advancing a batch along its routing.

mod common;

use bt_core::sequence::{AdvanceError, Sequence};
use bt_protocol::step_models::StepStatus;
use common::*;

#[test]
fn test_idle_step_is_corrected_and_completed_on_advance() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();

    sequence.advance("A", at(0)).unwrap();
    sequence.tick(at(12));

    let a = &sequence.steps()[0];
    assert_eq!(a.status(), StepStatus::Idle);
    assert_secs(a.active_time(), 12.0);

    let outcome = sequence.advance("B", at(15)).unwrap();
    assert_eq!(outcome.started, 1);
    assert_eq!(outcome.corrected, Some(0));
    assert_eq!(outcome.completed.len(), 1);
    assert_eq!(outcome.completed[0].index, 0);
    assert!(!outcome.completed[0].skipped());

    let a = &sequence.steps()[0];
    assert_eq!(a.status(), StepStatus::Complete);
    assert_eq!(a.end_time(), Some(at(15)));
    assert_secs(a.elapsed_time(), 15.0);

    let b = &sequence.steps()[1];
    assert_eq!(b.status(), StepStatus::Running);
    assert_eq!(b.start_time(), Some(at(15)));
    assert_eq!(sequence.current_step_index(), 1);
}

#[test]
fn test_event_for_earlier_step_is_stale() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();
    sequence.advance("A", at(0)).unwrap();
    sequence.advance("B", at(15)).unwrap();
    let before = sequence.render();

    let err = sequence.advance("A", at(20)).unwrap_err();
    assert_eq!(
        err,
        AdvanceError::StaleEvent {
            step: "A".to_string(),
            index: 0,
            current_step_index: 1,
        }
    );

    assert_eq!(sequence.render(), before);
    assert_states(
        &sequence.render(),
        &[StepStatus::Complete, StepStatus::Running, StepStatus::Pending],
    );
}

#[test]
fn test_jump_ahead_skips_pending_steps() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();

    let outcome = sequence.advance("C", at(30)).unwrap();

    assert_eq!(outcome.started, 2);
    assert_eq!(outcome.corrected, None);
    let skipped: Vec<(usize, bool)> = outcome
        .completed
        .iter()
        .map(|c| (c.index, c.skipped()))
        .collect();
    assert_eq!(skipped, vec![(0, true), (1, true)]);

    for step in &sequence.steps()[..2] {
        assert_eq!(step.status(), StepStatus::Complete);
        assert_eq!(step.start_time(), None);
        assert_eq!(step.end_time(), Some(at(30)));
        assert_eq!(step.elapsed_time(), 0.0);
        assert_eq!(step.active_time(), 0.0);
    }
}

#[test]
fn test_intermediate_steps_complete_exactly_once() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();
    let mut completions = vec![0; sequence.len()];

    for (name, secs) in [("A", 0), ("C", 20)] {
        let outcome = sequence.advance(name, at(secs)).unwrap();
        for completed in outcome.completed {
            completions[completed.index] += 1;
        }
    }
    if let Some(completed) = sequence.finish(at(40)) {
        completions[completed.index] += 1;
    }

    assert_eq!(completions, vec![1, 1, 1]);
    assert!(sequence.is_finished());
    assert!(sequence.finish(at(50)).is_none());
}

#[test]
fn test_restart_of_active_step_is_protocol_violation() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();
    sequence.advance("A", at(0)).unwrap();
    sequence.tick(at(12));

    match sequence.advance("A", at(13)) {
        Err(AdvanceError::ProtocolViolation { step, state }) => {
            assert_eq!(step, "A");
            assert_eq!(state, StepStatus::Idle);
        }
        other => panic!("Expected ProtocolViolation, got {other:?}"),
    }
    assert_eq!(sequence.steps()[0].start_time(), Some(at(0)));
}

#[test]
fn test_start_before_active_step_began_keeps_accrued_time() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();
    sequence.advance("A", at(10)).unwrap();
    sequence.tick(at(30));

    let err = sequence.advance("B", at(5)).unwrap_err();
    assert!(matches!(
        err,
        AdvanceError::OutOfOrder { ref active_step, active_start, .. }
            if active_step == "A" && active_start == at(10)
    ));

    let a = &sequence.steps()[0];
    assert_eq!(a.status(), StepStatus::Idle);
    assert_eq!(a.end_time(), None);
    assert_secs(a.active_time(), 20.0);
    assert_secs(a.elapsed_time(), 20.0);
    assert_eq!(sequence.steps()[1].status(), StepStatus::Pending);
    assert_eq!(sequence.current_step_index(), 0);
}

#[test]
fn test_unknown_step_is_distinct_from_stale() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();
    sequence.advance("B", at(5)).unwrap();

    let err = sequence.advance("Z", at(6)).unwrap_err();
    assert!(matches!(err, AdvanceError::UnknownStep { .. }));
    assert_eq!(err.step(), "Z");
    assert_eq!(sequence.current_step_index(), 1);
}

#[test]
fn test_processing_step_loses_performance_instead_of_idling() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();
    sequence.advance("B", at(0)).unwrap();

    let mut last = 1.0;
    for secs in [3, 5, 10, 20, 40] {
        sequence.tick(at(secs));
        let b = sequence.active_step().unwrap();
        assert_eq!(b.status(), StepStatus::Running);

        let performance = b.processing_performance();
        assert!(performance > 0.0 && performance <= 1.0);
        assert!(performance <= last);
        last = performance;
    }
    assert_secs(last, 5.0 / 40.0);
}

#[test]
fn test_idle_time_accrues_after_overrun() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();
    sequence.advance("A", at(0)).unwrap();

    sequence.tick(at(11));
    sequence.tick(at(14));
    sequence.tick(at(20));

    let a = &sequence.steps()[0];
    assert_eq!(a.status(), StepStatus::Idle);
    assert_secs(a.active_time(), 11.0);
    assert_secs(a.idle_time(), 9.0);
    assert_secs(a.elapsed_time(), 20.0);
    assert_eq!(a.remaining_time(), 0.0);

    // Correction keeps the accumulated idle time.
    sequence.advance("B", at(22)).unwrap();
    let a = &sequence.steps()[0];
    assert_secs(a.idle_time(), 9.0);
    assert_secs(a.active_time(), 13.0);
    assert_secs(a.elapsed_time(), 22.0);
}

#[test]
fn test_clock_behind_reference_accrues_nothing() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();
    sequence.advance("A", at(10)).unwrap();

    sequence.tick(at(5));
    assert_eq!(sequence.steps()[0].active_time(), 0.0);

    sequence.tick(at(14));
    assert_secs(sequence.steps()[0].active_time(), 4.0);
}

#[test]
fn test_render_is_pure() {
    let mut sequence = Sequence::new(&abc_routing()).unwrap();
    sequence.advance("A", at(0)).unwrap();
    sequence.tick(at(4));

    let first = sequence.render();
    let second = sequence.render();
    assert_eq!(first, second);
    assert_secs(first[0].remaining_time, 6.0);
}
