//! Append-only event log.
//!
//! The log records every dispatched event, external or internal, in the
//! exact order the kernel processed them. There is no API to remove,
//! reorder or rewrite an entry.

use pneuma_types::{EventId, IntegrityReport};
use tracing::debug;

use crate::error::KernelError;
use crate::event::{LoggedEvent, SessionEvent};

#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn append(&mut self, event: SessionEvent) -> Result<u64, KernelError> {
        let sequence = self.entries.len() as u64 + 1;
        let entry = LoggedEvent::new(sequence, EventId::new(), event)?;
        debug!(sequence, kind = entry.event.kind(), "Event appended");
        self.entries.push(entry);
        Ok(sequence)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest_sequence(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn last(&self) -> Option<&LoggedEvent> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[LoggedEvent] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter()
    }

    /// Entries with a sequence number greater than `after`.
    pub fn since(&self, after: u64) -> &[LoggedEvent] {
        let start = (after as usize).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// Re-check every integrity hash and the sequence progression.
    pub fn verify(&self) -> IntegrityReport {
        verify_entries(&self.entries)
    }
}

/// Verify a standalone slice of entries, e.g. one read back from disk.
pub fn verify_entries(entries: &[LoggedEvent]) -> IntegrityReport {
    let mut report = IntegrityReport {
        total_events: entries.len() as u64,
        ..IntegrityReport::default()
    };

    for (index, entry) in entries.iter().enumerate() {
        if entry.verify_integrity() {
            report.verified_events += 1;
        } else {
            report.corrupted_events += 1;
            report.corrupted_sequences.push(entry.sequence);
        }
        if entry.sequence != index as u64 + 1 {
            report.sequence_gaps.push(entry.sequence);
        }
    }

    report
}
