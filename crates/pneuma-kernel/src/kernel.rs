use std::sync::Arc;

use pneuma_types::{
    Interaction, Millis, Observation, Phase, RuntimeState, SessionStatus, SubscriptionId,
    TrustRegistry, Visibility,
};
use tracing::{debug, info, warn};

use crate::catalog::PatternCatalog;
use crate::error::{Disposition, IgnoreReason, KernelError};
use crate::event::SessionEvent;
use crate::inference;
use crate::log::EventLog;
use crate::metrics::SessionMetrics;
use crate::phase;
use crate::safety;
use crate::snapshot::KernelSnapshot;
use crate::subscribers::{Delivery, SubscriberFn, SubscriberSet};

/// An external dispatch plus one level of kernel-raised follow-ups.
pub const MAX_DISPATCH_DEPTH: usize = 2;

/// Multipliers applied to the belief when a running session is interrupted.
pub const PAUSE_ATTENTION_FACTOR: f64 = 0.8;
pub const PAUSE_RHYTHM_FACTOR: f64 = 0.5;

const ENTROPY_HISTORY: usize = 600;

/// The session kernel.
///
/// Owns the runtime state, the event log and the subscriber set. Every
/// dispatch runs the same pipeline: append to the log, reduce, recompute
/// entropy, notify subscribers. Follow-up events raised while reducing a
/// tick go through that same pipeline before the tick itself finishes, so
/// the log order is the causal order.
pub struct Kernel {
    state: RuntimeState,
    log: EventLog,
    catalog: PatternCatalog,
    registry: TrustRegistry,
    subscribers: SubscriberSet,
    visibility: Visibility,
    latest: Arc<KernelSnapshot>,
    metrics: SessionMetrics,
    depth: usize,
}

impl Kernel {
    /// Create a kernel and record its BOOT event.
    pub fn boot(catalog: PatternCatalog, timestamp: Millis) -> Result<Self, KernelError> {
        let mut state = RuntimeState::default();
        state.entropy = inference::entropy(&state.belief);

        let mut kernel = Self {
            latest: Arc::new(KernelSnapshot {
                sequence: 0,
                state: state.clone(),
                cause: None,
            }),
            state,
            log: EventLog::new(),
            catalog,
            registry: TrustRegistry::new(),
            subscribers: SubscriberSet::new(),
            visibility: Visibility::Visible,
            metrics: SessionMetrics::new(ENTROPY_HISTORY),
            depth: 0,
        };

        // BOOT reduces to nothing, so it is recorded and published directly.
        let boot = SessionEvent::Boot { timestamp };
        kernel.log.append(boot.clone())?;
        kernel.publish(Some(boot));
        info!(patterns = kernel.catalog.len(), "Kernel booted");
        Ok(kernel)
    }

    /// Dispatch a command or event.
    ///
    /// Commands that do not apply in the current state are still logged and
    /// still notify subscribers; they come back as `Disposition::Ignored`.
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<Disposition, KernelError> {
        if self.depth >= MAX_DISPATCH_DEPTH {
            return Err(KernelError::DispatchDepthExceeded {
                depth: self.depth + 1,
                max: MAX_DISPATCH_DEPTH,
            });
        }
        self.depth += 1;
        let outcome = self.process(event);
        self.depth -= 1;
        outcome
    }

    fn process(&mut self, event: SessionEvent) -> Result<Disposition, KernelError> {
        let sequence = self.log.append(event.clone())?;
        debug!(sequence, kind = event.kind(), depth = self.depth, "Dispatching");

        let outcome = self.reduce(&event);
        self.refresh_entropy();

        if let Ok(Disposition::Ignored(reason)) = &outcome {
            self.metrics.record_ignored();
            warn!(sequence, kind = event.kind(), %reason, "Command ignored");
        }

        self.publish(Some(event));
        outcome
    }

    fn reduce(&mut self, event: &SessionEvent) -> Result<Disposition, KernelError> {
        let disposition = match event {
            SessionEvent::Boot { .. } => Disposition::Applied,

            SessionEvent::LoadProtocol { pattern_id, .. } => self.load_protocol(pattern_id),

            SessionEvent::StartSession { .. } => match (self.state.status, &self.state.pattern) {
                (SessionStatus::Idle, Some(_)) => {
                    self.set_status(SessionStatus::Running);
                    Disposition::Applied
                }
                (SessionStatus::Idle, None) => Disposition::Ignored(IgnoreReason::NoPatternLoaded),
                (status, _) => incompatible(event, status),
            },

            SessionEvent::ResumeSession { .. } => match self.state.status {
                SessionStatus::Paused => {
                    self.set_status(SessionStatus::Running);
                    Disposition::Applied
                }
                status => incompatible(event, status),
            },

            SessionEvent::UserInterruption { kind, .. } => match self.state.status {
                SessionStatus::Running => {
                    let belief = &mut self.state.belief;
                    belief.attention *= PAUSE_ATTENTION_FACTOR;
                    belief.rhythm_alignment *= PAUSE_RHYTHM_FACTOR;
                    debug!(?kind, "Interruption penalty applied");
                    self.set_status(SessionStatus::Paused);
                    Disposition::Applied
                }
                status => incompatible(event, status),
            },

            SessionEvent::Halt { reason, .. } => {
                info!(%reason, "Session halted");
                self.set_status(SessionStatus::Idle);
                self.enter_phase(Phase::Inhale);
                Disposition::Applied
            }

            SessionEvent::Tick { dt, timestamp } => return self.tick(*dt, *timestamp),

            SessionEvent::PhaseTransition { from, to, .. } => {
                self.enter_phase(*to);
                self.metrics.record_transition();
                info!(%from, %to, duration = self.state.phase_duration, "Phase transition");
                Disposition::Applied
            }

            SessionEvent::CycleComplete { count, .. } => {
                self.state.cycle_count = self.state.cycle_count.max(*count);
                self.metrics.record_cycle();
                info!(cycles = self.state.cycle_count, "Cycle complete");
                Disposition::Applied
            }

            SessionEvent::SafetyIntervention {
                risk_level, action, ..
            } => {
                warn!(risk = risk_level, %action, "Safety intervention, locking session");
                self.metrics.record_intervention();
                self.set_status(SessionStatus::SafetyLock);
                Disposition::Applied
            }
        };
        Ok(disposition)
    }

    fn load_protocol(&mut self, pattern_id: &str) -> Disposition {
        let Some(pattern) = self.catalog.get(pattern_id).cloned() else {
            return Disposition::Ignored(IgnoreReason::UnknownPattern(pattern_id.to_string()));
        };

        info!(pattern = %pattern.id, tier = %pattern.tier, "Protocol loaded");
        self.state.pattern = Some(pattern);
        self.set_status(SessionStatus::Idle);
        self.enter_phase(Phase::Inhale);
        self.state.cycle_count = 0;
        self.state.session_duration = 0.0;
        // Arousal and attention carry over from whatever came before.
        self.state.belief.rhythm_alignment = 0.0;
        Disposition::Applied
    }

    fn tick(&mut self, dt: f64, timestamp: Millis) -> Result<Disposition, KernelError> {
        if !dt.is_finite() || dt < 0.0 {
            return Ok(Disposition::Ignored(IgnoreReason::InvalidDelta(dt)));
        }

        let observation = Observation {
            timestamp,
            delta_time: dt,
            visibility: self.visibility,
            interaction: (self.state.status == SessionStatus::Paused).then_some(Interaction::Pause),
        };
        self.state.belief = inference::update(self.state.belief, &observation, self.state.is_running());
        self.refresh_entropy();
        self.metrics.record_tick(self.state.entropy);

        let timings = match (&self.state.pattern, self.state.status) {
            (Some(pattern), SessionStatus::Running) => pattern.timings,
            _ => return Ok(Disposition::Applied),
        };

        self.state.phase_elapsed += dt;
        self.state.session_duration += dt;

        if self.state.phase_elapsed >= self.state.phase_duration {
            let from = self.state.phase;
            let to = phase::next_phase(from, &timings);
            self.dispatch(SessionEvent::PhaseTransition { from, to, timestamp })?;

            if phase::is_cycle_boundary(to) {
                let count = self.state.cycle_count + 1;
                self.dispatch(SessionEvent::CycleComplete { count, timestamp })?;
            }
        }

        if let Some(hit) = safety::check(&self.state, &self.registry) {
            self.dispatch(SessionEvent::SafetyIntervention {
                risk_level: hit.risk_level,
                action: hit.action,
                timestamp,
            })?;
        }

        Ok(Disposition::Applied)
    }

    fn enter_phase(&mut self, phase: Phase) {
        self.state.phase = phase;
        self.state.phase_elapsed = 0.0;
        self.state.phase_duration = self
            .state
            .pattern
            .as_ref()
            .map(|p| p.timings.duration(phase))
            .unwrap_or(0.0);
    }

    fn set_status(&mut self, next: SessionStatus) {
        let previous = self.state.status;
        self.state.status = next;
        if previous != next {
            info!(from = %previous, to = %next, "Status changed");
        }
    }

    fn refresh_entropy(&mut self) {
        self.state.entropy = inference::entropy(&self.state.belief);
    }

    fn publish(&mut self, cause: Option<SessionEvent>) {
        let snapshot = Arc::new(KernelSnapshot {
            sequence: self.log.latest_sequence(),
            state: self.state.clone(),
            cause,
        });
        self.latest = snapshot.clone();
        self.subscribers.notify(&snapshot);
    }

    /// Register an observer. It immediately receives the current state,
    /// then one call per subsequent dispatch.
    pub fn subscribe<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&KernelSnapshot) + Send + 'static,
    {
        self.subscribe_with(move |snapshot| {
            callback(snapshot);
            Delivery::Keep
        })
    }

    /// Like [`Kernel::subscribe`], but the callback decides after each
    /// notification whether to stay subscribed.
    pub fn subscribe_with<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&KernelSnapshot) -> Delivery + Send + 'static,
    {
        let boxed: SubscriberFn = Box::new(callback);
        let id = self.subscribers.add(boxed);
        let replay = self.latest.as_replay();
        self.subscribers.deliver_to(id, &replay);
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// The latest snapshot.
    pub fn state(&self) -> Arc<KernelSnapshot> {
        self.latest.clone()
    }

    /// Replace the trust registry wholesale.
    pub fn set_safety_registry(&mut self, registry: TrustRegistry) {
        debug!(records = registry.len(), "Safety registry replaced");
        self.registry = registry;
    }

    pub fn safety_registry(&self) -> &TrustRegistry {
        &self.registry
    }

    /// Host visibility, read when the next tick builds its observation.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        if self.visibility != visibility {
            debug!(?visibility, "Host visibility changed");
        }
        self.visibility = visibility;
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("status", &self.state.status)
            .field("pattern", &self.state.pattern_id())
            .field("log_len", &self.log.len())
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

fn incompatible(event: &SessionEvent, status: SessionStatus) -> Disposition {
    Disposition::Ignored(IgnoreReason::IncompatibleStatus {
        event: event.kind(),
        status,
    })
}
