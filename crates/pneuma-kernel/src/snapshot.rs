use pneuma_types::RuntimeState;
use serde::{Deserialize, Serialize};

use crate::event::SessionEvent;

/// Immutable view of the kernel handed to subscribers and `state()` callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KernelSnapshot {
    /// Sequence of the last log entry reflected in `state`.
    pub sequence: u64,
    pub state: RuntimeState,
    /// The event whose reduction produced this snapshot. `None` for the
    /// replay a new subscriber receives.
    pub cause: Option<SessionEvent>,
}

impl KernelSnapshot {
    /// Same state, re-labelled as a replay for a late subscriber.
    pub fn as_replay(&self) -> Self {
        Self {
            sequence: self.sequence,
            state: self.state.clone(),
            cause: None,
        }
    }
}
