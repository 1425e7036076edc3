//! End-to-end test: command acceptance, no-op commands and subscriptions.

use std::sync::{Arc, Mutex};

use pneuma_kernel::{
    Disposition, IgnoreReason, InterruptionKind, Kernel, KernelSnapshot, PatternCatalog, SessionEvent,
    SessionMirror,
};
use pneuma_types::{Phase, SessionStatus};

fn booted() -> Kernel {
    Kernel::boot(PatternCatalog::builtin(), 0).unwrap()
}

fn dispatch(kernel: &mut Kernel, event: SessionEvent) -> Disposition {
    kernel.dispatch(event).unwrap()
}

#[test]
fn halt_when_idle_is_idempotent() {
    let mut kernel = booted();
    let before = kernel.state().state.clone();

    for _ in 0..3 {
        assert!(dispatch(
            &mut kernel,
            SessionEvent::Halt {
                reason: "again".into(),
                timestamp: 1,
            }
        )
        .is_applied());
    }

    let after = &kernel.state().state;
    assert_eq!(after.status, SessionStatus::Idle);
    assert_eq!(after.belief, before.belief);
    assert_eq!(kernel.log().len(), 4);
}

#[test]
fn interruption_while_paused_changes_nothing() {
    let mut kernel = booted();
    dispatch(
        &mut kernel,
        SessionEvent::LoadProtocol {
            pattern_id: "box".into(),
            timestamp: 1,
        },
    );
    dispatch(&mut kernel, SessionEvent::StartSession { timestamp: 2 });
    dispatch(&mut kernel, SessionEvent::Tick { dt: 0.5, timestamp: 3 });
    dispatch(
        &mut kernel,
        SessionEvent::UserInterruption {
            kind: InterruptionKind::Background,
            timestamp: 4,
        },
    );
    let paused = kernel.state().state.clone();
    assert_eq!(paused.status, SessionStatus::Paused);

    let outcome = dispatch(
        &mut kernel,
        SessionEvent::UserInterruption {
            kind: InterruptionKind::Pause,
            timestamp: 5,
        },
    );
    assert!(matches!(
        outcome,
        Disposition::Ignored(IgnoreReason::IncompatibleStatus {
            status: SessionStatus::Paused,
            ..
        })
    ));
    assert_eq!(kernel.state().state, paused);
    // Still logged for audit.
    assert_eq!(kernel.log().len(), 6);
}

#[test]
fn unknown_pattern_leaves_loaded_session_alone() {
    let mut kernel = booted();
    dispatch(
        &mut kernel,
        SessionEvent::LoadProtocol {
            pattern_id: "calm".into(),
            timestamp: 1,
        },
    );
    let before = kernel.state().state.clone();

    let outcome = dispatch(
        &mut kernel,
        SessionEvent::LoadProtocol {
            pattern_id: "missing".into(),
            timestamp: 2,
        },
    );
    assert_eq!(outcome, Disposition::Ignored(IgnoreReason::UnknownPattern("missing".into())));
    assert_eq!(kernel.state().state, before);
    assert_eq!(kernel.state().state.pattern_id(), Some("calm"));
}

#[test]
fn reload_mid_session_resets_progress() {
    let mut kernel = booted();
    dispatch(
        &mut kernel,
        SessionEvent::LoadProtocol {
            pattern_id: "box".into(),
            timestamp: 1,
        },
    );
    dispatch(&mut kernel, SessionEvent::StartSession { timestamp: 2 });
    for _ in 0..5 {
        dispatch(&mut kernel, SessionEvent::Tick { dt: 0.9, timestamp: 3 });
    }
    assert_eq!(kernel.state().state.phase, Phase::HoldIn);

    dispatch(
        &mut kernel,
        SessionEvent::LoadProtocol {
            pattern_id: "relax".into(),
            timestamp: 4,
        },
    );
    let state = &kernel.state().state;
    assert_eq!(state.status, SessionStatus::Idle);
    assert_eq!(state.phase, Phase::Inhale);
    assert_eq!(state.phase_elapsed, 0.0);
    assert_eq!(state.session_duration, 0.0);
    assert_eq!(state.phase_duration, 4.0);
}

#[test]
fn every_subscriber_sees_every_dispatch_in_order() {
    let mut kernel = booted();
    let first: Arc<Mutex<Vec<u64>>> = Arc::default();
    let second: Arc<Mutex<Vec<u64>>> = Arc::default();

    let sink = first.clone();
    kernel.subscribe(move |snap: &KernelSnapshot| sink.lock().unwrap().push(snap.sequence));
    let sink = second.clone();
    kernel.subscribe(move |snap: &KernelSnapshot| sink.lock().unwrap().push(snap.sequence));

    dispatch(
        &mut kernel,
        SessionEvent::LoadProtocol {
            pattern_id: "box".into(),
            timestamp: 1,
        },
    );
    dispatch(&mut kernel, SessionEvent::StartSession { timestamp: 2 });
    dispatch(&mut kernel, SessionEvent::Tick { dt: 4.0, timestamp: 3 });

    // Replay of BOOT, then LOAD, START, TICK and the phase transition.
    assert_eq!(*first.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(*first.lock().unwrap(), *second.lock().unwrap());
}

#[test]
fn mirror_only_forwards_visible_changes() {
    let mut kernel = booted();
    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();
    let mut mirror = SessionMirror::new();
    kernel.subscribe(move |snap| {
        if let Some(update) = mirror.observe(snap) {
            sink.lock().unwrap().push(update);
        }
    });

    dispatch(
        &mut kernel,
        SessionEvent::LoadProtocol {
            pattern_id: "calm".into(),
            timestamp: 1,
        },
    );
    dispatch(&mut kernel, SessionEvent::StartSession { timestamp: 2 });
    for _ in 0..20 {
        dispatch(&mut kernel, SessionEvent::Tick { dt: 0.5, timestamp: 3 });
    }

    let updates = updates.lock().unwrap();
    // Replay, RUNNING, EXHALE at 4 s, INHALE at 10 s, then the cycle count.
    let seen: Vec<_> = updates.iter().map(|u| (u.status, u.phase, u.cycle_count)).collect();
    assert_eq!(
        seen,
        vec![
            (SessionStatus::Idle, Phase::Inhale, 0),
            (SessionStatus::Running, Phase::Inhale, 0),
            (SessionStatus::Running, Phase::Exhale, 0),
            (SessionStatus::Running, Phase::Inhale, 0),
            (SessionStatus::Running, Phase::Inhale, 1),
        ]
    );
}
