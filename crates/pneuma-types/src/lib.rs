//! Core type definitions for the Pneuma session kernel.
//!
//! This crate provides the shared value types. No business logic, just types
//! and the invariants they carry by construction (bounded scalars, validated
//! pattern timings).

pub mod belief;
pub mod error;
pub mod ids;
pub mod observation;
pub mod pattern;
pub mod phase;
pub mod state;
pub mod trust;

// Re-export primary types at crate root for ergonomic use.
pub use belief::{clamp01, Belief};
pub use error::TypesError;
pub use ids::{EventId, IntegrityHash, IntegrityReport, SubscriptionId};
pub use observation::{Interaction, Observation, Visibility};
pub use pattern::{Pattern, RiskTier};
pub use phase::{Phase, PhaseTimings};
pub use state::{RuntimeState, SessionStatus};
pub use trust::{TrustRecord, TrustRegistry};

/// Host monotonic timestamp in milliseconds.
pub type Millis = u64;
