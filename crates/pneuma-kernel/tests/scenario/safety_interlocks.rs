//! End-to-end test: autonomous safety interventions raised during ticks.

use pneuma_kernel::{Kernel, PatternCatalog, SafetyAction, SessionEvent};
use pneuma_types::{SessionStatus, TrustRecord, TrustRegistry, Visibility};

fn started(pattern: &str) -> Kernel {
    let mut kernel = Kernel::boot(PatternCatalog::builtin(), 0).unwrap();
    kernel
        .dispatch(SessionEvent::LoadProtocol {
            pattern_id: pattern.into(),
            timestamp: 1,
        })
        .unwrap();
    kernel
        .dispatch(SessionEvent::StartSession { timestamp: 2 })
        .unwrap();
    kernel
}

fn tick(kernel: &mut Kernel, dt: f64) {
    kernel
        .dispatch(SessionEvent::Tick { dt, timestamp: 3 })
        .unwrap();
}

fn low_trust(pattern: &str) -> TrustRegistry {
    TrustRegistry::new().with_record(pattern, TrustRecord::new(0.1).unwrap())
}

#[test]
fn low_trust_pattern_halts_once_entropy_is_high() {
    let mut kernel = started("box");
    kernel.set_visibility(Visibility::Hidden);

    while kernel.state().state.entropy <= 0.8 {
        tick(&mut kernel, 0.25);
        assert_eq!(kernel.state().state.status, SessionStatus::Running);
    }

    kernel.set_safety_registry(low_trust("box"));
    tick(&mut kernel, 0.25);

    let state = &kernel.state().state;
    assert_eq!(state.status, SessionStatus::SafetyLock);
    match &kernel.log().last().unwrap().event {
        SessionEvent::SafetyIntervention {
            risk_level, action, ..
        } => {
            assert_eq!(*action, SafetyAction::HaltPreventative);
            assert_eq!(*risk_level, 0.9);
        }
        other => panic!("expected safety intervention, got {:?}", other),
    }
    assert_eq!(kernel.metrics().interventions, 1);
}

#[test]
fn high_resonance_record_does_not_halt() {
    let mut kernel = started("box");
    kernel.set_safety_registry(TrustRegistry::new().with_record("box", TrustRecord::new(0.9).unwrap()));
    kernel.set_visibility(Visibility::Hidden);
    for _ in 0..12 {
        tick(&mut kernel, 0.5);
    }
    assert!(kernel.state().state.entropy > 0.8);
    assert_eq!(kernel.state().state.status, SessionStatus::Running);
}

#[test]
fn guarded_pattern_watchdog_forces_cooldown_after_thirty_cycles() {
    let mut kernel = started("energize");
    kernel.set_visibility(Visibility::Hidden);

    // Energize is 2-0-2-0: one cycle every eight half-second ticks.
    for _ in 0..(8 * 30) {
        tick(&mut kernel, 0.5);
    }
    let state = kernel.state().state.clone();
    assert_eq!(state.cycle_count, 30);
    assert_eq!(state.status, SessionStatus::Running);
    assert!(state.belief.arousal > 0.9);

    for _ in 0..8 {
        tick(&mut kernel, 0.5);
    }
    assert_eq!(kernel.state().state.status, SessionStatus::SafetyLock);

    let tail: Vec<_> = kernel.log().entries().iter().rev().take(2).map(|e| e.event.clone()).collect();
    assert_eq!(tail[1], SessionEvent::CycleComplete { count: 31, timestamp: 3 });
    assert!(matches!(
        tail[0],
        SessionEvent::SafetyIntervention {
            action: SafetyAction::CooldownForced,
            ..
        }
    ));
}

#[test]
fn lock_clears_only_through_load_or_halt() {
    let mut kernel = started("box");
    kernel
        .dispatch(SessionEvent::SafetyIntervention {
            risk_level: 0.8,
            action: SafetyAction::CooldownForced,
            timestamp: 4,
        })
        .unwrap();

    kernel.set_visibility(Visibility::Visible);
    for _ in 0..5 {
        tick(&mut kernel, 0.5);
    }
    assert_eq!(kernel.state().state.status, SessionStatus::SafetyLock);

    kernel
        .dispatch(SessionEvent::Halt {
            reason: "acknowledged".into(),
            timestamp: 5,
        })
        .unwrap();
    assert_eq!(kernel.state().state.status, SessionStatus::Idle);
}
