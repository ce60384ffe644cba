//! Interval timer engine.
//!
//! This module provides the round timer state machine:
//! - Phase transitions (Idle → Prepare → Work → Rest → Work … → Idle)
//! - Tick-driven countdown with progress tracking
//! - Cue requests for round boundaries and warnings
//! - Pause/resume/stop controls
//!
//! Ticks arrive through a [`Clock`] subscription. Every subscription is tagged
//! with a generation number; a tick whose generation is not the current one
//! is dropped, so a torn-down subscription can never move the countdown.

use tokio::sync::{mpsc, watch};
use tokio::time::Duration;
use tracing::debug;

use super::clock::{Clock, TickSubscription};
use super::cue::{Cue, CueNotifier};
use super::warning::WarningPolicy;
use crate::types::{TimerPhase, TimerSnapshot, WorkoutConfig, PREPARE_SECONDS};

/// Default wall-clock length of one time unit.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// IntervalTimer
// ============================================================================

/// Round timer state machine.
///
/// All control methods are total: calls that make no sense in the current
/// state are ignored.
pub struct IntervalTimer {
    config: WorkoutConfig,
    warnings: WarningPolicy,
    tick_interval: Duration,

    phase: TimerPhase,
    current_round: u32,
    time_remaining: u32,
    initial_phase_duration: u32,
    is_paused: bool,
    warning_fired: bool,

    clock: Box<dyn Clock>,
    notifier: Box<dyn CueNotifier>,
    subscription: Option<Box<dyn TickSubscription>>,
    generation: u64,
    tick_tx: mpsc::UnboundedSender<u64>,
    tick_rx: mpsc::UnboundedReceiver<u64>,
    snapshot_tx: watch::Sender<TimerSnapshot>,
}

impl IntervalTimer {
    /// Creates an idle timer.
    pub fn new(
        config: WorkoutConfig,
        clock: impl Clock + 'static,
        notifier: impl CueNotifier + 'static,
    ) -> Self {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(TimerSnapshot::idle(&config));

        Self {
            time_remaining: config.work_seconds,
            initial_phase_duration: config.work_seconds,
            config,
            warnings: WarningPolicy::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            phase: TimerPhase::Idle,
            current_round: 1,
            is_paused: false,
            warning_fired: false,
            clock: Box::new(clock),
            notifier: Box::new(notifier),
            subscription: None,
            generation: 0,
            tick_tx,
            tick_rx,
            snapshot_tx,
        }
    }

    /// Sets the wall-clock length of one time unit.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Replaces the warning policy.
    pub fn with_warning_policy(mut self, warnings: WarningPolicy) -> Self {
        self.warnings = warnings;
        self
    }

    // ------------------------------------------------------------------------
    // Controls
    // ------------------------------------------------------------------------

    /// Starts a workout from idle, or resumes a paused one.
    pub fn start(&mut self) {
        if self.phase == TimerPhase::Idle {
            debug!(
                rounds = self.config.total_rounds,
                work = self.config.work_seconds,
                rest = self.config.rest_seconds,
                "Workout started"
            );
            self.current_round = 1;
            self.enter_phase(TimerPhase::Prepare, PREPARE_SECONDS);
        } else if self.is_paused {
            self.resume();
        }
    }

    /// Freezes the countdown. Ignored while idle or already paused.
    pub fn pause(&mut self) {
        if self.phase == TimerPhase::Idle || self.is_paused {
            return;
        }
        self.disarm();
        self.is_paused = true;
        debug!(phase = %self.phase, remaining = self.time_remaining, "Paused");
        self.publish();
    }

    /// Continues a paused countdown from where it stopped.
    pub fn resume(&mut self) {
        if !self.is_paused {
            return;
        }
        self.is_paused = false;
        self.arm();
        debug!(phase = %self.phase, remaining = self.time_remaining, "Resumed");
        self.publish();
    }

    /// Abandons the workout and returns to idle. Always legal.
    pub fn stop(&mut self) {
        self.reset();
        debug!("Stopped");
        self.publish();
    }

    /// Replaces the configuration. Only applied while idle.
    ///
    /// Returns true if the configuration was applied.
    pub fn configure(&mut self, config: WorkoutConfig) -> bool {
        if self.phase != TimerPhase::Idle {
            debug!("Ignoring configuration change during a workout");
            return false;
        }
        self.config = config;
        self.time_remaining = self.config.work_seconds;
        self.initial_phase_duration = self.config.work_seconds;
        self.publish();
        true
    }

    // ------------------------------------------------------------------------
    // Ticking
    // ------------------------------------------------------------------------

    /// Advances the countdown by one time unit.
    ///
    /// Ignored while idle or paused. The tick that brings the countdown to
    /// zero performs the phase transition.
    pub fn tick(&mut self) {
        if self.phase == TimerPhase::Idle || self.is_paused {
            return;
        }

        if self.time_remaining > 0 {
            let previous = self.time_remaining;
            self.time_remaining -= 1;

            if !self.warning_fired
                && self
                    .warnings
                    .crosses(self.phase, previous, self.time_remaining)
            {
                self.warning_fired = true;
                self.notifier.notify(Cue::Warning);
            }
        }

        if self.time_remaining == 0 {
            self.handle_phase_complete();
        }

        self.publish();
    }

    /// Applies every tick already delivered by the clock.
    ///
    /// Returns the number of ticks that were applied; stale ticks from a
    /// cancelled subscription are discarded.
    pub fn process_pending_ticks(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(generation) = self.tick_rx.try_recv() {
            if self.accept_tick(generation) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next tick from the clock and applies it.
    ///
    /// Returns false if the delivered tick was stale. Cancel-safe, so it can
    /// be used as a `tokio::select!` branch.
    pub async fn wait_for_tick(&mut self) -> bool {
        match self.tick_rx.recv().await {
            Some(generation) => self.accept_tick(generation),
            // The timer holds a sender, so the channel never closes
            None => false,
        }
    }

    fn accept_tick(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.subscription.is_none() {
            return false;
        }
        self.tick();
        true
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    fn handle_phase_complete(&mut self) {
        match self.phase {
            TimerPhase::Prepare => {
                self.enter_phase(TimerPhase::Work, self.config.work_seconds);
                self.notifier.notify(Cue::RoundStart);
            }
            TimerPhase::Work if self.current_round < self.config.total_rounds => {
                self.enter_phase(TimerPhase::Rest, self.config.rest_seconds);
                self.notifier.notify(Cue::RoundEnd);
            }
            TimerPhase::Work => {
                debug!(rounds = self.current_round, "Workout complete");
                self.reset();
                self.notifier.notify(Cue::RoundEnd);
            }
            TimerPhase::Rest => {
                self.current_round += 1;
                self.enter_phase(TimerPhase::Work, self.config.work_seconds);
                self.notifier.notify(Cue::RoundStart);
            }
            TimerPhase::Idle => {}
        }
    }

    fn enter_phase(&mut self, phase: TimerPhase, duration: u32) {
        self.phase = phase;
        self.is_paused = false;
        self.time_remaining = duration;
        self.initial_phase_duration = duration;
        self.warning_fired = false;
        debug!(
            phase = %phase,
            round = self.current_round,
            duration,
            "Entered phase"
        );
        self.arm();
        self.publish();
    }

    fn reset(&mut self) {
        self.disarm();
        self.phase = TimerPhase::Idle;
        self.is_paused = false;
        self.current_round = 1;
        self.time_remaining = self.config.work_seconds;
        self.initial_phase_duration = self.config.work_seconds;
        self.warning_fired = false;
    }

    // ------------------------------------------------------------------------
    // Subscription management
    // ------------------------------------------------------------------------

    /// Replaces the tick subscription. The previous one is torn down first.
    fn arm(&mut self) {
        self.disarm();
        self.generation += 1;

        let generation = self.generation;
        let tx = self.tick_tx.clone();
        let subscription = self.clock.schedule_repeating(
            self.tick_interval,
            Box::new(move || {
                let _ = tx.send(generation);
            }),
        );
        self.subscription = Some(subscription);
    }

    fn disarm(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    // ------------------------------------------------------------------------
    // Observable surface
    // ------------------------------------------------------------------------

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Returns the current observable state.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            current_round: self.current_round,
            total_rounds: self.config.total_rounds,
            time_remaining: self.time_remaining,
            progress: self.progress(),
            is_paused: self.is_paused,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn initial_phase_duration(&self) -> u32 {
        self.initial_phase_duration
    }

    /// Fraction of the current phase still remaining; 1.0 while idle.
    pub fn progress(&self) -> f64 {
        if self.phase == TimerPhase::Idle {
            return 1.0;
        }
        if self.initial_phase_duration == 0 {
            return 0.0;
        }
        f64::from(self.time_remaining) / f64::from(self.initial_phase_duration)
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Returns true while the countdown is advancing.
    pub fn is_running(&self) -> bool {
        self.phase != TimerPhase::Idle && !self.is_paused
    }

    /// Returns true while a tick subscription is held.
    pub fn has_subscription(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|subscription| subscription.is_active())
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl std::fmt::Debug for IntervalTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalTimer")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("current_round", &self.current_round)
            .field("time_remaining", &self.time_remaining)
            .field("is_paused", &self.is_paused)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
