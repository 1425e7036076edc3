//! Static pattern catalog.

use std::collections::BTreeMap;

use pneuma_types::{Pattern, PhaseTimings, RiskTier};
use tracing::debug;

use crate::error::KernelError;

/// Validated patterns keyed by id.
#[derive(Clone, Debug, Default)]
pub struct PatternCatalog {
    patterns: BTreeMap<String, Pattern>,
}

impl PatternCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The patterns shipped with the kernel.
    pub fn builtin() -> Self {
        let builtin = [
            Pattern::new("box", "Box Breathing", PhaseTimings::new(4.0, 4.0, 4.0, 4.0), RiskTier::Open, 12),
            Pattern::new("calm", "Calm", PhaseTimings::new(4.0, 0.0, 6.0, 0.0), RiskTier::Open, 15),
            Pattern::new("relax", "4-7-8 Relax", PhaseTimings::new(4.0, 7.0, 8.0, 0.0), RiskTier::Open, 4),
            Pattern::new("coherence", "Coherence", PhaseTimings::new(5.0, 0.0, 5.0, 0.0), RiskTier::Open, 30),
            Pattern::new("deep", "Deep Rest", PhaseTimings::new(4.0, 2.0, 6.0, 2.0), RiskTier::Open, 10),
            Pattern::new("energize", "Energize", PhaseTimings::new(2.0, 0.0, 2.0, 0.0), RiskTier::Guarded, 30),
            Pattern::new("awaken", "Awaken", PhaseTimings::new(1.5, 0.0, 1.5, 0.0), RiskTier::Advanced, 40),
        ];
        Self {
            patterns: builtin.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Add a pattern after validating it. Ids must be unique.
    pub fn insert(&mut self, pattern: Pattern) -> Result<(), KernelError> {
        pattern.validate()?;
        if self.patterns.contains_key(&pattern.id) {
            return Err(KernelError::DuplicatePattern(pattern.id));
        }
        debug!(pattern = %pattern.id, tier = %pattern.tier, "Pattern registered");
        self.patterns.insert(pattern.id.clone(), pattern);
        Ok(())
    }

    /// Add several patterns, stopping at the first invalid or duplicate one.
    pub fn merge(&mut self, patterns: impl IntoIterator<Item = Pattern>) -> Result<usize, KernelError> {
        let mut added = 0;
        for pattern in patterns {
            self.insert(pattern)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn get(&self, id: &str) -> Option<&Pattern> {
        self.patterns.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.patterns.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.values()
    }
}
