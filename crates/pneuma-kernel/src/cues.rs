//! Translate snapshot changes into audio, haptic and visual cues.
//!
//! Pure functions of two consecutive states; the host decides how to play
//! them.

use pneuma_types::{Phase, RuntimeState, SessionStatus};
use serde::{Deserialize, Serialize};

/// Orb scale at the bottom of a breath.
pub const MIN_SCALE: f64 = 0.6;
/// Orb scale at the top of a breath.
pub const MAX_SCALE: f64 = 1.0;

pub const PHASE_PULSE: HapticPulse = HapticPulse {
    duration_ms: 40,
    intensity: 0.5,
};
pub const ALERT_PULSE: HapticPulse = HapticPulse {
    duration_ms: 600,
    intensity: 1.0,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    SessionStart,
    SessionPause,
    SessionResume,
    SessionEnd,
    /// Entering the given phase.
    PhaseChime(Phase),
    CycleBell,
    Alert,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HapticPulse {
    pub duration_ms: u32,
    pub intensity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "cue", rename_all = "snake_case")]
pub enum Cue {
    Audio(AudioCue),
    Haptic(HapticPulse),
    Visual { phase: Phase, progress: f64, scale: f64 },
}

/// Orb scale for a phase at the given progress in [0, 1].
pub fn orb_scale(phase: Phase, progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    let span = MAX_SCALE - MIN_SCALE;
    match phase {
        Phase::Inhale => MIN_SCALE + span * p,
        Phase::HoldIn => MAX_SCALE,
        Phase::Exhale => MAX_SCALE - span * p,
        Phase::HoldOut => MIN_SCALE,
    }
}

/// Cues for the step from `prev` to `next`. `prev` is `None` for the first
/// state a host sees.
pub fn translate(prev: Option<&RuntimeState>, next: &RuntimeState) -> Vec<Cue> {
    let mut cues = Vec::new();
    let prev_status = prev.map(|p| p.status).unwrap_or_default();

    if prev_status != next.status {
        match (prev_status, next.status) {
            (_, SessionStatus::SafetyLock) => {
                cues.push(Cue::Audio(AudioCue::Alert));
                cues.push(Cue::Haptic(ALERT_PULSE));
            }
            (SessionStatus::Paused, SessionStatus::Running) => {
                cues.push(Cue::Audio(AudioCue::SessionResume))
            }
            (_, SessionStatus::Running) => cues.push(Cue::Audio(AudioCue::SessionStart)),
            (_, SessionStatus::Paused) => cues.push(Cue::Audio(AudioCue::SessionPause)),
            (SessionStatus::Running | SessionStatus::Paused, SessionStatus::Idle | SessionStatus::Halted) => {
                cues.push(Cue::Audio(AudioCue::SessionEnd))
            }
            _ => {}
        }
    }

    if let Some(prev) = prev {
        if next.is_running() && prev.is_running() && prev.phase != next.phase {
            cues.push(Cue::Audio(AudioCue::PhaseChime(next.phase)));
            cues.push(Cue::Haptic(PHASE_PULSE));
        }
        if next.cycle_count > prev.cycle_count {
            cues.push(Cue::Audio(AudioCue::CycleBell));
        }
    }

    if next.pattern.is_some() && matches!(next.status, SessionStatus::Running | SessionStatus::Paused) {
        let progress = next.phase_progress();
        cues.push(Cue::Visual {
            phase: next.phase,
            progress,
            scale: orb_scale(next.phase, progress),
        });
    }

    cues
}
