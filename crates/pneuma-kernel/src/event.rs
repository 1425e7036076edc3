use pneuma_types::{EventId, IntegrityHash, Millis, Phase};
use serde::{Deserialize, Serialize};

use crate::error::KernelError;
use crate::safety::SafetyAction;

/// Kind of user interruption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterruptionKind {
    Pause,
    Background,
}

/// Every input the kernel accepts, plus the events it raises itself.
///
/// The reducer matches this exhaustively; adding a variant without handling
/// it is a build error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    // Kernel lifecycle
    Boot {
        timestamp: Millis,
    },

    // External commands
    LoadProtocol {
        #[serde(rename = "patternId")]
        pattern_id: String,
        timestamp: Millis,
    },
    StartSession {
        timestamp: Millis,
    },
    ResumeSession {
        timestamp: Millis,
    },
    UserInterruption {
        kind: InterruptionKind,
        timestamp: Millis,
    },
    Halt {
        reason: String,
        timestamp: Millis,
    },
    Tick {
        /// Seconds since the previous tick.
        #[serde(with = "delta")]
        dt: f64,
        timestamp: Millis,
    },

    // Raised internally while reducing a tick
    PhaseTransition {
        from: Phase,
        to: Phase,
        timestamp: Millis,
    },
    CycleComplete {
        count: u32,
        timestamp: Millis,
    },
    SafetyIntervention {
        #[serde(rename = "riskLevel")]
        risk_level: f64,
        action: SafetyAction,
        timestamp: Millis,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Boot { .. } => "BOOT",
            SessionEvent::LoadProtocol { .. } => "LOAD_PROTOCOL",
            SessionEvent::StartSession { .. } => "START_SESSION",
            SessionEvent::ResumeSession { .. } => "RESUME_SESSION",
            SessionEvent::UserInterruption { .. } => "USER_INTERRUPTION",
            SessionEvent::Halt { .. } => "HALT",
            SessionEvent::Tick { .. } => "TICK",
            SessionEvent::PhaseTransition { .. } => "PHASE_TRANSITION",
            SessionEvent::CycleComplete { .. } => "CYCLE_COMPLETE",
            SessionEvent::SafetyIntervention { .. } => "SAFETY_INTERVENTION",
        }
    }

    pub fn timestamp(&self) -> Millis {
        match self {
            SessionEvent::Boot { timestamp }
            | SessionEvent::LoadProtocol { timestamp, .. }
            | SessionEvent::StartSession { timestamp }
            | SessionEvent::ResumeSession { timestamp }
            | SessionEvent::UserInterruption { timestamp, .. }
            | SessionEvent::Halt { timestamp, .. }
            | SessionEvent::Tick { timestamp, .. }
            | SessionEvent::PhaseTransition { timestamp, .. }
            | SessionEvent::CycleComplete { timestamp, .. }
            | SessionEvent::SafetyIntervention { timestamp, .. } => *timestamp,
        }
    }

    /// Raised by the kernel itself rather than dispatched by a host.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            SessionEvent::PhaseTransition { .. }
                | SessionEvent::CycleComplete { .. }
                | SessionEvent::SafetyIntervention { .. }
        )
    }
}

/// An entry of the event log.
///
/// Immutable once created. The integrity hash covers the sequence number,
/// the id and the event body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Position in the log, starting at 1.
    pub sequence: u64,
    pub id: EventId,
    pub event: SessionEvent,
    /// BLAKE3 of (sequence + id + event)
    pub integrity_hash: IntegrityHash,
}

impl LoggedEvent {
    pub fn new(sequence: u64, id: EventId, event: SessionEvent) -> Result<Self, KernelError> {
        let integrity_hash = Self::compute_hash(sequence, &id, &event)?;
        Ok(Self {
            sequence,
            id,
            event,
            integrity_hash,
        })
    }

    /// An entry whose body cannot be encoded never verifies.
    pub fn verify_integrity(&self) -> bool {
        Self::compute_hash(self.sequence, &self.id, &self.event)
            .map(|hash| hash == self.integrity_hash)
            .unwrap_or(false)
    }

    fn compute_hash(sequence: u64, id: &EventId, event: &SessionEvent) -> Result<IntegrityHash, KernelError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"pneuma-event-v1:");
        hasher.update(&sequence.to_le_bytes());
        hasher.update(id.0.as_bytes());

        // JSON body for deterministic hashing
        let body = serde_json::to_vec(event).map_err(|e| KernelError::Encoding(e.to_string()))?;
        hasher.update(&body);

        Ok(IntegrityHash::from_bytes(*hasher.finalize().as_bytes()))
    }
}

/// Tick deltas as JSON. Finite values are plain numbers; NaN and the
/// infinities are written as strings so a log holding a rejected tick
/// still reads back and hashes distinctly.
mod delta {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    const NAN: &str = "NaN";
    const INFINITY: &str = "Infinity";
    const NEG_INFINITY: &str = "-Infinity";

    pub fn serialize<S: Serializer>(dt: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if dt.is_nan() {
            serializer.serialize_str(NAN)
        } else if *dt == f64::INFINITY {
            serializer.serialize_str(INFINITY)
        } else if *dt == f64::NEG_INFINITY {
            serializer.serialize_str(NEG_INFINITY)
        } else {
            serializer.serialize_f64(*dt)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(DeltaVisitor)
    }

    struct DeltaVisitor;

    impl<'de> Visitor<'de> for DeltaVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number, \"NaN\", \"Infinity\" or \"-Infinity\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}
