//! Property tests: belief stays in the unit cube and entropy is monotone.

use pneuma_kernel::inference::{entropy, update};
use pneuma_types::{Belief, Interaction, Observation, Visibility};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_unit() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

fn arb_belief() -> impl Strategy<Value = Belief> {
    (arb_unit(), arb_unit(), arb_unit()).prop_map(|(a, t, r)| Belief::new(a, t, r))
}

fn arb_observation() -> impl Strategy<Value = Observation> {
    (
        0.0f64..5.0,
        prop_oneof![Just(Visibility::Visible), Just(Visibility::Hidden)],
        prop_oneof![
            Just(None),
            Just(Some(Interaction::Pause)),
            Just(Some(Interaction::Resume)),
            Just(Some(Interaction::Touch)),
        ],
    )
        .prop_map(|(dt, visibility, interaction)| Observation {
            timestamp: 0,
            delta_time: dt,
            visibility,
            interaction,
        })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Any single update keeps every component in [0, 1].
    #[test]
    fn update_stays_bounded(
        belief in arb_belief(),
        obs in arb_observation(),
        running in any::<bool>(),
    ) {
        let next = update(belief, &obs, running);
        prop_assert!(next.is_bounded(), "out of bounds: {:?}", next);
    }

    /// Long chains of updates never escape the bounds either.
    #[test]
    fn chained_updates_stay_bounded(
        belief in arb_belief(),
        steps in prop::collection::vec((arb_observation(), any::<bool>()), 1..100),
    ) {
        let mut b = belief;
        for (obs, running) in &steps {
            b = update(b, obs, *running);
            prop_assert!(b.is_bounded());
        }
    }

    /// Entropy never decreases as arousal increases.
    #[test]
    fn entropy_non_decreasing_in_arousal(
        a1 in arb_unit(),
        a2 in arb_unit(),
        attention in arb_unit(),
        rhythm in arb_unit(),
    ) {
        let (lo, hi) = if a1 <= a2 { (a1, a2) } else { (a2, a1) };
        let e_lo = entropy(&Belief::new(lo, attention, rhythm));
        let e_hi = entropy(&Belief::new(hi, attention, rhythm));
        prop_assert!(e_lo <= e_hi);
    }

    /// Entropy never increases as rhythm alignment increases.
    #[test]
    fn entropy_non_increasing_in_rhythm(
        arousal in arb_unit(),
        attention in arb_unit(),
        r1 in arb_unit(),
        r2 in arb_unit(),
    ) {
        let (lo, hi) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
        let e_lo = entropy(&Belief::new(arousal, attention, lo));
        let e_hi = entropy(&Belief::new(arousal, attention, hi));
        prop_assert!(e_hi <= e_lo);
    }

    /// Rhythm can suppress at most 80 % of arousal.
    #[test]
    fn entropy_keeps_residual(arousal in arb_unit(), rhythm in arb_unit()) {
        let e = entropy(&Belief::new(arousal, 0.5, rhythm));
        prop_assert!(e >= arousal * 0.2 - 1e-12);
        prop_assert!(e <= arousal + 1e-12);
    }
}
