//! Phase machine: phase ordering and cycle-boundary detection.

use pneuma_types::{Phase, PhaseTimings};

/// The phase after `current`, skipping zero-duration phases.
///
/// Walks the fixed order inhale → hold-in → exhale → hold-out at most four
/// steps. If every other phase is zero the walk wraps back to `current`.
pub fn next_phase(current: Phase, timings: &PhaseTimings) -> Phase {
    let mut candidate = current.successor();
    for _ in 0..Phase::ALL.len() - 1 {
        if timings.is_active(candidate) {
            return candidate;
        }
        candidate = candidate.successor();
    }
    candidate
}

/// Entering inhale closes a cycle.
pub fn is_cycle_boundary(phase: Phase) -> bool {
    phase == Phase::Inhale
}
