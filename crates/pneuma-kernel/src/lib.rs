//! Pneuma session kernel: a deterministic, event-sourced state machine for
//! guided breathing sessions.
//!
//! Every command and every internally raised event flows through
//! [`Kernel::dispatch`]. The kernel provides:
//! - An append-only, integrity-hashed event log
//! - A phase machine that skips zero-duration phases
//! - A belief model and its derived entropy scalar
//! - Autonomous safety interlocks evaluated on each running tick
//! - Synchronous state subscriptions with replay on subscribe

pub mod catalog;
pub mod cues;
pub mod error;
pub mod event;
pub mod heartbeat;
pub mod inference;
pub mod kernel;
pub mod log;
pub mod metrics;
pub mod mirror;
pub mod phase;
pub mod safety;
pub mod snapshot;
pub mod subscribers;

pub use catalog::PatternCatalog;
pub use cues::{AudioCue, Cue, HapticPulse};
pub use error::{Disposition, IgnoreReason, KernelError};
pub use event::{InterruptionKind, LoggedEvent, SessionEvent};
pub use heartbeat::Heartbeat;
pub use kernel::{Kernel, MAX_DISPATCH_DEPTH};
pub use log::{verify_entries, EventLog};
pub use metrics::SessionMetrics;
pub use mirror::{MirrorUpdate, SessionMirror};
pub use safety::{InterventionClass, SafetyAction, SafetyIntervention};
pub use snapshot::KernelSnapshot;
pub use subscribers::Delivery;
