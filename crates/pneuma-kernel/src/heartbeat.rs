//! Converts host monotonic timestamps into tick deltas.

use pneuma_types::Millis;
use tracing::warn;

/// Gaps at or above this many seconds are dropped rather than integrated.
pub const DEFAULT_MAX_GAP_SECS: f64 = 1.0;

#[derive(Clone, Debug)]
pub struct Heartbeat {
    last: Option<Millis>,
    max_gap_secs: f64,
    dropped: u64,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self::with_max_gap(DEFAULT_MAX_GAP_SECS)
    }

    pub fn with_max_gap(max_gap_secs: f64) -> Self {
        Self {
            last: None,
            max_gap_secs,
            dropped: 0,
        }
    }

    /// Delta in seconds since the previous beat, or `None` if this beat
    /// should not produce a tick.
    ///
    /// The first beat only anchors the clock. Suspend gaps and clocks that
    /// did not advance are dropped; the clock re-anchors either way.
    pub fn beat(&mut self, now: Millis) -> Option<f64> {
        let previous = self.last.replace(now)?;
        if now <= previous {
            self.dropped += 1;
            return None;
        }
        let dt = (now - previous) as f64 / 1000.0;
        if dt >= self.max_gap_secs {
            self.dropped += 1;
            warn!(gap_secs = dt, max_gap_secs = self.max_gap_secs, "Heartbeat gap dropped");
            return None;
        }
        Some(dt)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}
