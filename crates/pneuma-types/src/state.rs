use serde::{Deserialize, Serialize};

use crate::belief::Belief;
use crate::pattern::Pattern;
use crate::phase::Phase;

/// Session lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Paused,
    /// Not produced by the reducer: HALT returns the kernel to `Idle`.
    /// Kept so that host layers can represent a finished session.
    Halted,
    /// Terminal for the session until LOAD_PROTOCOL or HALT.
    SafetyLock,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Idle => "IDLE",
            SessionStatus::Running => "RUNNING",
            SessionStatus::Paused => "PAUSED",
            SessionStatus::Halted => "HALTED",
            SessionStatus::SafetyLock => "SAFETY_LOCK",
        };
        f.write_str(s)
    }
}

/// The kernel's authoritative session state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeState {
    pub status: SessionStatus,
    /// `None` only before the first successful load.
    pub pattern: Option<Pattern>,
    pub phase: Phase,
    /// Seconds spent in the current phase.
    pub phase_elapsed: f64,
    /// Configured duration of the current phase in seconds.
    pub phase_duration: f64,
    pub cycle_count: u32,
    /// Seconds of RUNNING time since the last load.
    pub session_duration: f64,
    pub belief: Belief,
    /// Always derived from `belief`; recomputed after every reduction.
    pub entropy: f64,
}

impl RuntimeState {
    pub fn pattern_id(&self) -> Option<&str> {
        self.pattern.as_ref().map(|p| p.id.as_str())
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Fraction of the current phase already elapsed, in [0, 1].
    pub fn phase_progress(&self) -> f64 {
        if self.phase_duration <= 0.0 {
            return 0.0;
        }
        (self.phase_elapsed / self.phase_duration).clamp(0.0, 1.0)
    }
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            pattern: None,
            phase: Phase::Inhale,
            phase_elapsed: 0.0,
            phase_duration: 0.0,
            cycle_count: 0,
            session_duration: 0.0,
            belief: Belief::default(),
            entropy: 0.0,
        }
    }
}
