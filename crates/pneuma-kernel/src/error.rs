use pneuma_types::{SessionStatus, TypesError};
use thiserror::Error;

/// Errors from kernel operations.
///
/// Commands that do not fit the current state are not errors; they come
/// back as [`Disposition::Ignored`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("dispatch depth exceeded ({depth} > {max})")]
    DispatchDepthExceeded { depth: usize, max: usize },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] TypesError),

    #[error("pattern already in catalog: {0}")]
    DuplicatePattern(String),

    #[error("event encoding failed: {0}")]
    Encoding(String),
}

/// Why a command left the state untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum IgnoreReason {
    UnknownPattern(String),
    IncompatibleStatus {
        event: &'static str,
        status: SessionStatus,
    },
    NoPatternLoaded,
    InvalidDelta(f64),
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoreReason::UnknownPattern(id) => write!(f, "unknown pattern '{}'", id),
            IgnoreReason::IncompatibleStatus { event, status } => {
                write!(f, "{} not accepted while {}", event, status)
            }
            IgnoreReason::NoPatternLoaded => write!(f, "no pattern loaded"),
            IgnoreReason::InvalidDelta(dt) => write!(f, "invalid tick delta {}", dt),
        }
    }
}

/// Outcome of a dispatch. The event is logged and subscribers are notified
/// in both cases.
#[derive(Clone, Debug, PartialEq)]
pub enum Disposition {
    Applied,
    Ignored(IgnoreReason),
}

impl Disposition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Disposition::Applied)
    }
}
