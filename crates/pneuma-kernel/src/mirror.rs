//! Low-frequency mirror of kernel state.
//!
//! Hosts that re-render on every tick would churn; the mirror forwards a
//! snapshot only when something a user can see has changed.

use pneuma_types::{Phase, SessionStatus};
use serde::{Deserialize, Serialize};

use crate::snapshot::KernelSnapshot;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorUpdate {
    pub sequence: u64,
    pub status: SessionStatus,
    pub phase: Phase,
    pub cycle_count: u32,
    pub pattern_id: Option<String>,
    pub entropy: f64,
}

#[derive(Clone, Debug, Default)]
pub struct SessionMirror {
    last: Option<(SessionStatus, Phase, u32)>,
    emitted: u64,
}

impl SessionMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an update when status, phase or cycle count differ from the
    /// last mirrored values. The first observation always emits.
    pub fn observe(&mut self, snapshot: &KernelSnapshot) -> Option<MirrorUpdate> {
        let state = &snapshot.state;
        let key = (state.status, state.phase, state.cycle_count);
        if self.last == Some(key) {
            return None;
        }
        self.last = Some(key);
        self.emitted += 1;
        Some(MirrorUpdate {
            sequence: snapshot.sequence,
            status: state.status,
            phase: state.phase,
            cycle_count: state.cycle_count,
            pattern_id: state.pattern_id().map(str::to_string),
            entropy: state.entropy,
        })
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}
