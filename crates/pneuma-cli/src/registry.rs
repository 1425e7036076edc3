//! Trust registry persistence and post-session bookkeeping.
//!
//! The kernel only ever reads the registry. This module owns writing it:
//! loading it before a session, folding the outcome in afterwards and
//! saving it back.

use std::path::Path;

use chrono::{DateTime, Utc};
use pneuma_types::{RuntimeState, SessionStatus, TrustRecord, TrustRegistry};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

/// Fraction of the distance toward `1 - entropy` that resonance moves per session.
pub const RESONANCE_LEARNING_RATE: f64 = 0.2;
/// Multiplier applied to resonance after a session that ended in a lock.
pub const ADVERSE_PENALTY: f64 = 0.5;
/// Starting resonance for a pattern with no history.
pub const INITIAL_RESONANCE: f64 = 0.5;

/// Read the registry, treating a missing file as empty.
pub fn load(path: &Path) -> CliResult<TrustRegistry> {
    if !path.exists() {
        debug!(path = %path.display(), "No registry file, starting empty");
        return Ok(TrustRegistry::new());
    }
    let raw = std::fs::read_to_string(path)?;
    let registry: TrustRegistry = serde_json::from_str(&raw)
        .map_err(|e| CliError::Registry(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), records = registry.len(), "Registry loaded");
    Ok(registry)
}

/// Write the registry to a temporary file, then rename it into place.
pub fn save(path: &Path, registry: &TrustRegistry) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(registry)?)?;
    std::fs::rename(&tmp, path)?;
    info!(path = %path.display(), records = registry.len(), "Registry saved");
    Ok(())
}

/// Fold a finished session into the record of its pattern.
///
/// Returns the updated record, or `None` when no pattern was loaded.
pub fn fold_session(
    registry: &mut TrustRegistry,
    final_state: &RuntimeState,
    now: DateTime<Utc>,
) -> Option<TrustRecord> {
    let pattern_id = final_state.pattern_id()?;
    let mut record = registry.get(pattern_id).cloned().unwrap_or(TrustRecord {
        exposure_secs: 0.0,
        adverse_events: 0,
        resonance_score: INITIAL_RESONANCE,
        last_updated: now,
    });

    let adverse = final_state.status == SessionStatus::SafetyLock;
    let target = 1.0 - final_state.entropy;

    record.exposure_secs += final_state.session_duration;
    record.resonance_score += (target - record.resonance_score) * RESONANCE_LEARNING_RATE;
    if adverse {
        record.adverse_events += 1;
        record.resonance_score *= ADVERSE_PENALTY;
    }
    record.resonance_score = record.resonance_score.clamp(0.0, 1.0);
    record.last_updated = now;

    info!(
        pattern = pattern_id,
        resonance = record.resonance_score,
        adverse,
        exposure_secs = record.exposure_secs,
        "Trust record updated"
    );
    registry.insert(pattern_id, record.clone());
    Some(record)
}
