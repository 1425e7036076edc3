//! Headless session driver.
//!
//! Owns the kernel for the length of one session and feeds it heartbeat
//! ticks, either from the tokio clock or from a virtual clock that advances
//! without sleeping.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pneuma_kernel::cues::{self, Cue};
use pneuma_kernel::{
    Heartbeat, Kernel, MirrorUpdate, PatternCatalog, SessionEvent, SessionMetrics, SessionMirror,
};
use pneuma_types::{Millis, RuntimeState, SessionStatus, TrustRegistry, Visibility};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

/// Options for one session, resolved from config and flags.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub pattern: String,
    /// Cycle target; `None` uses the pattern's recommendation.
    pub cycles: Option<u32>,
    pub tick_period_ms: u64,
    pub max_tick_gap_secs: f64,
    pub hidden_after_secs: Option<f64>,
}

/// Why the driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetReached,
    SafetyLock,
    Interrupted,
    /// Virtual clock ran past its budget without reaching the target.
    TimeBudget,
}

/// Printed at the end of `pneuma run`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub pattern: String,
    pub stop_reason: StopReason,
    pub status: SessionStatus,
    pub cycles: u32,
    pub session_duration_secs: f64,
    pub final_entropy: f64,
    pub log_events: usize,
    pub ticks_dropped: u64,
    pub mirror_updates: usize,
    pub cues_emitted: u64,
    pub metrics: SessionMetrics,
}

/// What the host side collects from kernel notifications.
#[derive(Debug, Default)]
struct HostFeed {
    previous: Option<RuntimeState>,
    mirror: SessionMirror,
    updates: Vec<MirrorUpdate>,
    cues: u64,
}

impl HostFeed {
    fn on_snapshot(&mut self, next: &RuntimeState, update: Option<MirrorUpdate>) {
        for cue in cues::translate(self.previous.as_ref(), next) {
            self.cues += 1;
            match cue {
                Cue::Visual { .. } => {}
                other => debug!(?other, "Cue"),
            }
        }
        if let Some(update) = update {
            info!(
                status = %update.status,
                phase = %update.phase,
                cycle = update.cycle_count,
                entropy = update.entropy,
                "Session"
            );
            self.updates.push(update);
        }
        self.previous = Some(next.clone());
    }
}

/// Drives one session. Every timestamp it logs is measured from the boot
/// timestamp, so the log stays chronological whichever clock runs it.
pub struct SessionRunner {
    kernel: Kernel,
    origin: Millis,
    heartbeat: Heartbeat,
    options: SessionOptions,
    target_cycles: u32,
    feed: Arc<Mutex<HostFeed>>,
}

impl SessionRunner {
    /// Boot a kernel, install the registry and load the pattern.
    pub fn new(
        catalog: PatternCatalog,
        registry: TrustRegistry,
        options: SessionOptions,
        boot_timestamp: Millis,
    ) -> CliResult<Self> {
        let pattern = catalog
            .get(&options.pattern)
            .cloned()
            .ok_or_else(|| CliError::UnknownPattern(options.pattern.clone()))?;
        let target_cycles = options.cycles.unwrap_or(pattern.recommended_cycles).max(1);

        let mut kernel = Kernel::boot(catalog, boot_timestamp)?;
        kernel.set_safety_registry(registry);

        let feed = Arc::new(Mutex::new(HostFeed::default()));
        let sink = feed.clone();
        kernel.subscribe(move |snapshot| {
            if let Ok(mut feed) = sink.lock() {
                let update = feed.mirror.observe(snapshot);
                feed.on_snapshot(&snapshot.state, update);
            }
        });

        kernel.dispatch(SessionEvent::LoadProtocol {
            pattern_id: pattern.id.clone(),
            timestamp: boot_timestamp,
        })?;

        info!(
            pattern = %pattern.id,
            label = %pattern.label,
            target_cycles,
            cycle_secs = pattern.timings.cycle_length(),
            "Session prepared"
        );

        Ok(Self {
            kernel,
            origin: boot_timestamp,
            heartbeat: Heartbeat::with_max_gap(options.max_tick_gap_secs),
            options,
            target_cycles,
            feed,
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn target_cycles(&self) -> u32 {
        self.target_cycles
    }

    /// Run on a virtual clock. Never sleeps.
    pub fn run_simulated(&mut self) -> CliResult<StopReason> {
        let period = self.options.tick_period_ms;
        let mut now = self.origin;
        self.start(now)?;

        let cycle_secs = self
            .kernel
            .state()
            .state
            .pattern
            .as_ref()
            .map(|p| p.timings.cycle_length())
            .unwrap_or(0.0);
        let budget_ms = ((f64::from(self.target_cycles) * cycle_secs * 2.0 + 60.0) * 1000.0) as Millis;

        loop {
            now += period;
            if let Some(reason) = self.beat(now)? {
                return Ok(reason);
            }
            if now - self.origin >= budget_ms {
                warn!(budget_ms, "Virtual time budget exhausted");
                self.halt("time budget", now)?;
                return Ok(StopReason::TimeBudget);
            }
        }
    }

    /// Run against the tokio clock until the target, a lock or `shutdown`.
    pub async fn run_realtime<F>(&mut self, shutdown: F) -> CliResult<StopReason>
    where
        F: std::future::Future<Output = ()>,
    {
        let base = self.origin;
        let started = tokio::time::Instant::now();
        let elapsed_ms = || base + started.elapsed().as_millis() as Millis;

        let mut interval = tokio::time::interval(Duration::from_millis(self.options.tick_period_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        self.start(elapsed_ms())?;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Some(reason) = self.beat(elapsed_ms())? {
                        return Ok(reason);
                    }
                }
                _ = &mut shutdown => {
                    info!("Received Ctrl+C, halting session");
                    self.halt("interrupted", elapsed_ms())?;
                    return Ok(StopReason::Interrupted);
                }
            }
        }
    }

    fn start(&mut self, now: Millis) -> CliResult<()> {
        self.heartbeat.beat(now);
        self.kernel
            .dispatch(SessionEvent::StartSession { timestamp: now })?;
        Ok(())
    }

    fn halt(&mut self, reason: &str, now: Millis) -> CliResult<()> {
        self.kernel.dispatch(SessionEvent::Halt {
            reason: reason.to_string(),
            timestamp: now,
        })?;
        Ok(())
    }

    /// One heartbeat. Returns a stop reason once the session is over.
    fn beat(&mut self, now: Millis) -> CliResult<Option<StopReason>> {
        let Some(dt) = self.heartbeat.beat(now) else {
            return Ok(None);
        };

        if let Some(after) = self.options.hidden_after_secs {
            let running_for = self.kernel.state().state.session_duration;
            if running_for >= after && self.kernel.visibility() == Visibility::Visible {
                info!(after_secs = after, "Host hidden");
                self.kernel.set_visibility(Visibility::Hidden);
            }
        }

        self.kernel
            .dispatch(SessionEvent::Tick { dt, timestamp: now })?;

        let snapshot = self.kernel.state();
        if snapshot.state.status == SessionStatus::SafetyLock {
            warn!(cycles = snapshot.state.cycle_count, "Session locked by safety guard");
            return Ok(Some(StopReason::SafetyLock));
        }
        if snapshot.state.cycle_count >= self.target_cycles {
            self.halt("target reached", now)?;
            return Ok(Some(StopReason::TargetReached));
        }
        Ok(None)
    }

    /// Summary of the session so far. A locked session keeps its
    /// SAFETY_LOCK status; the driver never halts after a lock.
    pub fn summary(&self, stop_reason: StopReason) -> SessionSummary {
        let snapshot = self.kernel.state();
        let (mirror_updates, cues_emitted) = self
            .feed
            .lock()
            .map(|feed| (feed.updates.len(), feed.cues))
            .unwrap_or_default();

        SessionSummary {
            pattern: self.options.pattern.clone(),
            stop_reason,
            status: snapshot.state.status,
            cycles: snapshot.state.cycle_count,
            session_duration_secs: snapshot.state.session_duration,
            final_entropy: snapshot.state.entropy,
            log_events: self.kernel.log().len(),
            ticks_dropped: self.heartbeat.dropped(),
            mirror_updates,
            cues_emitted,
            metrics: self.kernel.metrics().clone(),
        }
    }

    /// Mirror updates seen so far.
    pub fn mirror_updates(&self) -> Vec<MirrorUpdate> {
        self.feed
            .lock()
            .map(|feed| feed.updates.clone())
            .unwrap_or_default()
    }
}
