//! Inference model: belief dynamics and the derived entropy scalar.
//!
//! Both functions are pure. Identical inputs always give identical outputs,
//! which is what makes exact replay of a tick stream possible.

use pneuma_types::{clamp01, Belief, Observation};

/// Per-second rates applied while the session is not running.
pub mod idle_rates {
    pub const AROUSAL_DECAY: f64 = 0.10;
    pub const ATTENTION_DECAY: f64 = 0.20;
    pub const RHYTHM_DECAY: f64 = 0.10;
}

/// Per-second rates applied while running and interrupted.
pub mod interrupted_rates {
    pub const AROUSAL_RISE: f64 = 0.30;
    pub const ATTENTION_FALL: f64 = 0.50;
    pub const RHYTHM_FALL: f64 = 0.40;
}

/// Per-second rates applied while running undisturbed.
pub mod settled_rates {
    pub const AROUSAL_FALL: f64 = 0.05;
    pub const ATTENTION_RISE: f64 = 0.10;
    pub const RHYTHM_RISE: f64 = 0.20;
}

/// Share of arousal that perfect rhythm alignment can suppress.
pub const RHYTHM_SUPPRESSION: f64 = 0.8;

/// Advance `belief` by one observation.
pub fn update(belief: Belief, observation: &Observation, is_running: bool) -> Belief {
    let dt = observation.delta_time.max(0.0);

    let next = if !is_running {
        Belief {
            arousal: (belief.arousal - idle_rates::AROUSAL_DECAY * dt).max(0.0),
            attention: (belief.attention - idle_rates::ATTENTION_DECAY * dt).max(0.0),
            rhythm_alignment: (belief.rhythm_alignment - idle_rates::RHYTHM_DECAY * dt).max(0.0),
        }
    } else if observation.is_interrupted() {
        Belief {
            arousal: (belief.arousal + interrupted_rates::AROUSAL_RISE * dt).min(1.0),
            attention: (belief.attention - interrupted_rates::ATTENTION_FALL * dt).max(0.0),
            rhythm_alignment: (belief.rhythm_alignment - interrupted_rates::RHYTHM_FALL * dt)
                .max(0.0),
        }
    } else {
        Belief {
            arousal: (belief.arousal - settled_rates::AROUSAL_FALL * dt).max(0.0),
            attention: (belief.attention + settled_rates::ATTENTION_RISE * dt).min(1.0),
            rhythm_alignment: (belief.rhythm_alignment + settled_rates::RHYTHM_RISE * dt)
                .min(1.0),
        }
    };

    next.clamped()
}

/// Distress proxy: arousal damped by rhythm alignment, at most by 80 %.
pub fn entropy(belief: &Belief) -> f64 {
    clamp01(belief.arousal * (1.0 - belief.rhythm_alignment * RHYTHM_SUPPRESSION))
}
