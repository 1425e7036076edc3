use thiserror::Error;

/// Errors raised while constructing validated types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypesError {
    #[error("pattern id must not be empty")]
    EmptyPatternId,

    #[error("pattern {pattern_id}: inhale duration must be positive, got {value}")]
    ZeroInhale { pattern_id: String, value: f64 },

    #[error("pattern {pattern_id}: {phase} duration must be finite and non-negative, got {value}")]
    InvalidDuration {
        pattern_id: String,
        phase: String,
        value: f64,
    },

    #[error("risk tier must be 1, 2 or 3, got {0}")]
    InvalidRiskTier(u8),

    #[error("resonance score must lie in [0, 1], got {0}")]
    ResonanceOutOfRange(f64),
}
