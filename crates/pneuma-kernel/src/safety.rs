//! Safety guard: autonomous interlocks evaluated once per running tick.
//!
//! Guards run in a fixed order and the first match wins, so a single tick
//! can raise at most one intervention. The thresholds are exact constants.

use pneuma_types::{RiskTier, RuntimeState, TrustRegistry};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Trust-based preventive halt: resonance below this...
pub const LOW_RESONANCE_THRESHOLD: f64 = 0.3;
/// ...combined with entropy above this.
pub const HIGH_ENTROPY_THRESHOLD: f64 = 0.8;
pub const PREVENTATIVE_RISK: f64 = 0.9;

/// Hyperventilation watchdog: tier-2 pattern past this many cycles...
pub const WATCHDOG_CYCLE_LIMIT: u32 = 30;
/// ...with arousal above this.
pub const WATCHDOG_AROUSAL_THRESHOLD: f64 = 0.9;
pub const COOLDOWN_RISK: f64 = 0.8;

/// Action requested by an intervention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyAction {
    HaltPreventative,
    CooldownForced,
}

/// Broad class of an intervention. Both classes lock the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterventionClass {
    Halt,
    Lock,
}

impl SafetyAction {
    pub fn class(self) -> InterventionClass {
        match self {
            SafetyAction::HaltPreventative => InterventionClass::Halt,
            SafetyAction::CooldownForced => InterventionClass::Lock,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SafetyAction::HaltPreventative => "HALT_PREVENTATIVE",
            SafetyAction::CooldownForced => "COOLDOWN_FORCED",
        }
    }
}

impl std::fmt::Display for SafetyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a guard that fired.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyIntervention {
    pub risk_level: f64,
    pub action: SafetyAction,
}

/// Evaluate the guards against the current state.
///
/// Returns `None` unless the kernel is running with a pattern loaded.
pub fn check(state: &RuntimeState, registry: &TrustRegistry) -> Option<SafetyIntervention> {
    if !state.is_running() {
        return None;
    }
    let pattern = state.pattern.as_ref()?;

    if let Some(record) = registry.get(&pattern.id) {
        if record.resonance_score < LOW_RESONANCE_THRESHOLD && state.entropy > HIGH_ENTROPY_THRESHOLD {
            warn!(
                pattern = %pattern.id,
                resonance = record.resonance_score,
                entropy = state.entropy,
                "Low-trust pattern under high entropy, halting"
            );
            return Some(SafetyIntervention {
                risk_level: PREVENTATIVE_RISK,
                action: SafetyAction::HaltPreventative,
            });
        }
    }

    if pattern.tier == RiskTier::Guarded
        && state.cycle_count > WATCHDOG_CYCLE_LIMIT
        && state.belief.arousal > WATCHDOG_AROUSAL_THRESHOLD
    {
        warn!(
            pattern = %pattern.id,
            cycles = state.cycle_count,
            arousal = state.belief.arousal,
            "Hyperventilation watchdog tripped, forcing cooldown"
        );
        return Some(SafetyIntervention {
            risk_level: COOLDOWN_RISK,
            action: SafetyAction::CooldownForced,
        });
    }

    None
}
