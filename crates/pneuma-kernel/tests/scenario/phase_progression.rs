//! End-to-end test: phase walking and cycle counting through `dispatch`.

use pneuma_kernel::{Kernel, PatternCatalog, SessionEvent};
use pneuma_types::{Phase, SessionStatus};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn started(pattern: &str) -> Kernel {
    let mut kernel = Kernel::boot(PatternCatalog::builtin(), 0).unwrap();
    kernel
        .dispatch(SessionEvent::LoadProtocol {
            pattern_id: pattern.into(),
            timestamp: 10,
        })
        .unwrap();
    kernel
        .dispatch(SessionEvent::StartSession { timestamp: 20 })
        .unwrap();
    kernel
}

/// Dispatch one tick and return every event it appended, including itself.
fn tick(kernel: &mut Kernel, dt: f64) -> Vec<SessionEvent> {
    let before = kernel.log().latest_sequence();
    kernel
        .dispatch(SessionEvent::Tick { dt, timestamp: 30 })
        .unwrap();
    kernel
        .log()
        .since(before)
        .iter()
        .map(|e| e.event.clone())
        .collect()
}

fn transition(from: Phase, to: Phase) -> SessionEvent {
    SessionEvent::PhaseTransition {
        from,
        to,
        timestamp: 30,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn box_pattern_walks_four_phases_then_closes_a_cycle() {
    let mut kernel = started("box");
    let t = SessionEvent::Tick { dt: 4.0, timestamp: 30 };

    assert_eq!(tick(&mut kernel, 4.0), vec![t.clone(), transition(Phase::Inhale, Phase::HoldIn)]);
    assert_eq!(tick(&mut kernel, 4.0), vec![t.clone(), transition(Phase::HoldIn, Phase::Exhale)]);
    assert_eq!(tick(&mut kernel, 4.0), vec![t.clone(), transition(Phase::Exhale, Phase::HoldOut)]);
    assert_eq!(
        tick(&mut kernel, 4.0),
        vec![
            t,
            transition(Phase::HoldOut, Phase::Inhale),
            SessionEvent::CycleComplete { count: 1, timestamp: 30 },
        ]
    );

    let state = &kernel.state().state;
    assert_eq!(state.phase, Phase::Inhale);
    assert_eq!(state.cycle_count, 1);
    assert_eq!(state.session_duration, 16.0);
    assert_eq!(state.status, SessionStatus::Running);
}

#[test]
fn calm_pattern_skips_both_holds() {
    let mut kernel = started("calm");

    let first = tick(&mut kernel, 4.0);
    assert_eq!(first[1], transition(Phase::Inhale, Phase::Exhale));
    assert_eq!(first.len(), 2);
    assert_eq!(kernel.state().state.phase_duration, 6.0);

    let second = tick(&mut kernel, 6.0);
    assert_eq!(second[1], transition(Phase::Exhale, Phase::Inhale));
    assert_eq!(second[2], SessionEvent::CycleComplete { count: 1, timestamp: 30 });
}

#[test]
fn short_ticks_accumulate_before_transition() {
    let mut kernel = started("box");
    for _ in 0..7 {
        assert_eq!(tick(&mut kernel, 0.5).len(), 1);
    }
    assert_eq!(kernel.state().state.phase_elapsed, 3.5);
    assert_eq!(tick(&mut kernel, 0.5).len(), 2);
    assert_eq!(kernel.state().state.phase, Phase::HoldIn);
    assert_eq!(kernel.state().state.phase_elapsed, 0.0);
}

#[test]
fn cycles_keep_counting_across_many_breaths() {
    let mut kernel = started("calm");
    for _ in 0..5 {
        tick(&mut kernel, 4.0);
        tick(&mut kernel, 6.0);
    }
    assert_eq!(kernel.state().state.cycle_count, 5);
    assert_eq!(kernel.metrics().cycles_completed, 5);
    assert_eq!(kernel.metrics().phase_transitions, 10);
}

#[test]
fn ticks_while_idle_never_move_the_phase() {
    let mut kernel = Kernel::boot(PatternCatalog::builtin(), 0).unwrap();
    kernel
        .dispatch(SessionEvent::LoadProtocol {
            pattern_id: "box".into(),
            timestamp: 1,
        })
        .unwrap();
    for _ in 0..10 {
        assert_eq!(tick(&mut kernel, 0.9).len(), 1);
    }
    let state = &kernel.state().state;
    assert_eq!(state.phase, Phase::Inhale);
    assert_eq!(state.phase_elapsed, 0.0);
    assert_eq!(state.cycle_count, 0);
}
