//! Property tests: zero-duration phases are never entered.

use pneuma_kernel::phase::next_phase;
use pneuma_kernel::{Kernel, PatternCatalog, SessionEvent};
use pneuma_types::{Pattern, Phase, PhaseTimings, RiskTier};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Zero or a positive duration, with zero well represented.
fn arb_duration() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.5f64..8.0]
}

fn arb_timings() -> impl Strategy<Value = PhaseTimings> {
    (0.5f64..8.0, arb_duration(), arb_duration(), arb_duration())
        .prop_map(|(i, hi, e, ho)| PhaseTimings::new(i, hi, e, ho))
}

fn arb_phase() -> impl Strategy<Value = Phase> {
    prop::sample::select(Phase::ALL.to_vec())
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// The phase machine only ever lands on phases with a positive duration.
    #[test]
    fn next_phase_is_always_active(timings in arb_timings(), current in arb_phase()) {
        let next = next_phase(current, &timings);
        prop_assert!(timings.is_active(next), "{:?} entered with {:?}", next, timings);
    }

    /// Driving a kernel with arbitrary ticks never exposes a zero-duration phase.
    #[test]
    fn kernel_never_sits_in_zero_phase(
        timings in arb_timings(),
        dts in prop::collection::vec(0.0f64..0.99, 1..200),
    ) {
        let mut catalog = PatternCatalog::empty();
        catalog
            .insert(Pattern::new("p", "Generated", timings, RiskTier::Open, 10))
            .unwrap();
        let mut kernel = Kernel::boot(catalog, 0).unwrap();
        kernel.dispatch(SessionEvent::LoadProtocol { pattern_id: "p".into(), timestamp: 0 }).unwrap();
        kernel.dispatch(SessionEvent::StartSession { timestamp: 0 }).unwrap();

        for dt in dts {
            kernel.dispatch(SessionEvent::Tick { dt, timestamp: 0 }).unwrap();
            let state = kernel.state();
            prop_assert!(timings.is_active(state.state.phase));
            prop_assert!(state.state.phase_duration > 0.0);
        }
    }
}
