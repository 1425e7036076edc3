use serde::{Deserialize, Serialize};

/// Clamp to the unit interval. NaN collapses to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// The kernel's simulated internal state.
///
/// All three components live in [0, 1]. Owned exclusively by the kernel;
/// everything else sees copies inside snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Belief {
    pub arousal: f64,
    pub attention: f64,
    pub rhythm_alignment: f64,
}

impl Belief {
    pub fn new(arousal: f64, attention: f64, rhythm_alignment: f64) -> Self {
        Self {
            arousal,
            attention,
            rhythm_alignment,
        }
        .clamped()
    }

    /// Copy with every component clamped to [0, 1].
    pub fn clamped(self) -> Self {
        Self {
            arousal: clamp01(self.arousal),
            attention: clamp01(self.attention),
            rhythm_alignment: clamp01(self.rhythm_alignment),
        }
    }

    pub fn is_bounded(&self) -> bool {
        [self.arousal, self.attention, self.rhythm_alignment]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}

impl Default for Belief {
    /// Neutral starting point: moderate arousal and attention, no rhythm yet.
    fn default() -> Self {
        Self {
            arousal: 0.5,
            attention: 0.5,
            rhythm_alignment: 0.0,
        }
    }
}
