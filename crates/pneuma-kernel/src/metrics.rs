use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Counters kept by the kernel across its lifetime.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Ticks reduced, in any status.
    pub ticks_applied: u64,
    /// Commands that were logged but left the state unchanged.
    pub commands_ignored: u64,
    pub phase_transitions: u64,
    pub cycles_completed: u64,
    pub interventions: u64,
    pub peak_entropy: f64,
    /// Entropy after each tick (last N values).
    pub entropy_history: VecDeque<f64>,
    max_history: usize,
}

impl SessionMetrics {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            ..Default::default()
        }
    }

    pub fn record_tick(&mut self, entropy: f64) {
        self.ticks_applied += 1;
        self.peak_entropy = self.peak_entropy.max(entropy);
        if self.max_history == 0 {
            return;
        }
        if self.entropy_history.len() == self.max_history {
            self.entropy_history.pop_front();
        }
        self.entropy_history.push_back(entropy);
    }

    pub fn record_ignored(&mut self) {
        self.commands_ignored += 1;
    }

    pub fn record_transition(&mut self) {
        self.phase_transitions += 1;
    }

    pub fn record_cycle(&mut self) {
        self.cycles_completed += 1;
    }

    pub fn record_intervention(&mut self) {
        self.interventions += 1;
    }

    pub fn avg_entropy(&self) -> f64 {
        if self.entropy_history.is_empty() {
            return 0.0;
        }
        self.entropy_history.iter().sum::<f64>() / self.entropy_history.len() as f64
    }
}
