//! Property tests: the event log records exactly one entry per dispatch.

use std::sync::{Arc, Mutex};

use pneuma_kernel::{InterruptionKind, Kernel, PatternCatalog, SessionEvent};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a random external command.
fn arb_command() -> impl Strategy<Value = SessionEvent> {
    prop_oneof![
        prop::sample::select(vec!["box", "calm", "energize", "nope"]).prop_map(|id| {
            SessionEvent::LoadProtocol {
                pattern_id: id.to_string(),
                timestamp: 0,
            }
        }),
        Just(SessionEvent::StartSession { timestamp: 0 }),
        Just(SessionEvent::ResumeSession { timestamp: 0 }),
        prop_oneof![Just(InterruptionKind::Pause), Just(InterruptionKind::Background)]
            .prop_map(|kind| SessionEvent::UserInterruption { kind, timestamp: 0 }),
        Just(SessionEvent::Halt {
            reason: "prop".into(),
            timestamp: 0,
        }),
        (0.0f64..5.0).prop_map(|dt| SessionEvent::Tick { dt, timestamp: 0 }),
        (0.0f64..5.0).prop_map(|dt| SessionEvent::Tick { dt, timestamp: 0 }),
        (0.0f64..5.0).prop_map(|dt| SessionEvent::Tick { dt, timestamp: 0 }),
    ]
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Notifications (minus the replay) equal appended entries, sequences are
    /// contiguous and every hash verifies.
    #[test]
    fn log_length_matches_dispatch_count(
        commands in prop::collection::vec(arb_command(), 1..120),
    ) {
        let mut kernel = Kernel::boot(PatternCatalog::builtin(), 0).unwrap();
        let sequences: Arc<Mutex<Vec<u64>>> = Arc::default();
        let sink = sequences.clone();
        kernel.subscribe(move |snap| sink.lock().unwrap().push(snap.sequence));

        for command in commands.iter().cloned() {
            kernel.dispatch(command).unwrap();
        }

        let sequences = sequences.lock().unwrap();
        // One replay of BOOT, then one notification per appended entry.
        prop_assert_eq!(kernel.log().len(), sequences.len());
        for (index, seq) in sequences.iter().enumerate() {
            prop_assert_eq!(*seq, index as u64 + 1);
        }
        prop_assert!(kernel.log().len() >= commands.len() + 1);

        let report = kernel.log().verify();
        prop_assert!(report.is_clean());
        prop_assert_eq!(report.total_events as usize, kernel.log().len());
    }

    /// Each external command appears in the log in dispatch order.
    #[test]
    fn external_commands_keep_their_order(
        commands in prop::collection::vec(arb_command(), 1..60),
    ) {
        let mut kernel = Kernel::boot(PatternCatalog::builtin(), 0).unwrap();
        for command in commands.iter().cloned() {
            kernel.dispatch(command).unwrap();
        }
        let external: Vec<SessionEvent> = kernel
            .log()
            .iter()
            .skip(1)
            .map(|e| e.event.clone())
            .filter(|e| !e.is_internal())
            .collect();
        prop_assert_eq!(external, commands);
    }
}
