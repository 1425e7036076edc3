use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::phase::{Phase, PhaseTimings};

/// Risk tier of a pattern.
///
/// The unlock thresholds for tiers 2 and 3 are enforced by the host UI, not
/// the kernel. The kernel only reads the tier in the hyperventilation
/// watchdog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RiskTier {
    /// Unrestricted.
    Open = 1,
    /// Requires a usage threshold.
    Guarded = 2,
    /// Requires a higher usage threshold.
    Advanced = 3,
}

impl TryFrom<u8> for RiskTier {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RiskTier::Open),
            2 => Ok(RiskTier::Guarded),
            3 => Ok(RiskTier::Advanced),
            other => Err(TypesError::InvalidRiskTier(other)),
        }
    }
}

impl From<RiskTier> for u8 {
    fn from(tier: RiskTier) -> Self {
        tier as u8
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tier {}", *self as u8)
    }
}

/// A breathing pattern from the static catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub timings: PhaseTimings,
    pub tier: RiskTier,
    /// Advisory only; the kernel never stops on its own when reached.
    pub recommended_cycles: u32,
}

impl Pattern {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        timings: PhaseTimings,
        tier: RiskTier,
        recommended_cycles: u32,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            timings,
            tier,
            recommended_cycles,
        }
    }

    /// Check the structural guarantees the phase machine relies on.
    ///
    /// Inhale must be positive so that zero-phase skipping always terminates
    /// on a real phase.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.id.trim().is_empty() {
            return Err(TypesError::EmptyPatternId);
        }
        for phase in Phase::ALL {
            let value = self.timings.duration(phase);
            if !value.is_finite() || value < 0.0 {
                return Err(TypesError::InvalidDuration {
                    pattern_id: self.id.clone(),
                    phase: phase.to_string(),
                    value,
                });
            }
        }
        if self.timings.inhale <= 0.0 {
            return Err(TypesError::ZeroInhale {
                pattern_id: self.id.clone(),
                value: self.timings.inhale,
            });
        }
        Ok(())
    }
}
