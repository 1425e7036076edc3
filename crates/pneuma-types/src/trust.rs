use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Historical outcome record for one pattern.
///
/// Owned by the settings layer. The kernel only reads it during safety
/// checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustRecord {
    /// Cumulative seconds spent in sessions with this pattern.
    pub exposure_secs: f64,
    /// Sessions that ended in a safety lock.
    pub adverse_events: u32,
    /// Confidence in [0, 1] that the pattern is comfortable for the user.
    pub resonance_score: f64,
    pub last_updated: DateTime<Utc>,
}

impl TrustRecord {
    pub fn new(resonance_score: f64) -> Result<Self, TypesError> {
        if !(0.0..=1.0).contains(&resonance_score) {
            return Err(TypesError::ResonanceOutOfRange(resonance_score));
        }
        Ok(Self {
            exposure_secs: 0.0,
            adverse_events: 0,
            resonance_score,
            last_updated: Utc::now(),
        })
    }
}

/// Read-only map from pattern id to trust record.
///
/// Replaced wholesale on the kernel, never patched in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustRegistry {
    records: HashMap<String, TrustRecord>,
}

impl TrustRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, pattern_id: impl Into<String>, record: TrustRecord) -> Self {
        self.records.insert(pattern_id.into(), record);
        self
    }

    pub fn get(&self, pattern_id: &str) -> Option<&TrustRecord> {
        self.records.get(pattern_id)
    }

    pub fn insert(&mut self, pattern_id: impl Into<String>, record: TrustRecord) -> Option<TrustRecord> {
        self.records.insert(pattern_id.into(), record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TrustRecord)> {
        self.records.iter()
    }
}

impl FromIterator<(String, TrustRecord)> for TrustRegistry {
    fn from_iter<I: IntoIterator<Item = (String, TrustRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
