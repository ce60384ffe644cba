//! Core data types for the round timer.
//!
//! This module defines the data structures used for:
//! - Workout phases
//! - Workout configuration with validation
//! - The observable snapshot published to presentation layers

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the warm-up countdown before the first round, in time units.
pub const PREPARE_SECONDS: u32 = 10;

/// Inclusive bounds accepted for the number of rounds.
pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 20;

// ============================================================================
// TimerPhase
// ============================================================================

/// Represents the current phase of a workout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// No workout in progress
    #[default]
    Idle,
    /// Warm-up countdown before the first round
    Prepare,
    /// A round is in progress
    Work,
    /// Rest between two rounds
    Rest,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Prepare => "prepare",
            TimerPhase::Work => "work",
            TimerPhase::Rest => "rest",
        }
    }

    /// Returns a short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "READY",
            TimerPhase::Prepare => "GET READY",
            TimerPhase::Work => "FIGHT",
            TimerPhase::Rest => "REST",
        }
    }

    /// Returns true if a workout is in progress (paused or not).
    pub fn is_active(&self) -> bool {
        !matches!(self, TimerPhase::Idle)
    }
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// WorkoutConfig
// ============================================================================

/// Errors produced when validating a [`WorkoutConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Round count is outside the accepted range.
    #[error("rounds must be between 1 and 20 (got {0})")]
    RoundsOutOfRange(u32),

    /// Work duration is zero.
    #[error("work duration must be at least one second")]
    ZeroWorkDuration,

    /// Rest duration is zero.
    #[error("rest duration must be at least one second")]
    ZeroRestDuration,
}

/// Configuration for a workout session.
///
/// Durations are expressed in whole time units (seconds at the default tick
/// interval).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    /// Number of work rounds (1-20)
    pub total_rounds: u32,
    /// Length of each round
    pub work_seconds: u32,
    /// Length of the rest between rounds
    pub rest_seconds: u32,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            total_rounds: 12,
            work_seconds: 120,
            rest_seconds: 60,
        }
    }
}

impl WorkoutConfig {
    /// Returns the configuration with the given round count.
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.total_rounds = rounds;
        self
    }

    /// Returns the configuration with the given work duration.
    pub fn with_work(mut self, minutes: u32, seconds: u32) -> Self {
        self.work_seconds = seconds_from_parts(minutes, seconds);
        self
    }

    /// Returns the configuration with the given rest duration.
    pub fn with_rest(mut self, minutes: u32, seconds: u32) -> Self {
        self.rest_seconds = seconds_from_parts(minutes, seconds);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.total_rounds) {
            return Err(ConfigError::RoundsOutOfRange(self.total_rounds));
        }
        if self.work_seconds == 0 {
            return Err(ConfigError::ZeroWorkDuration);
        }
        if self.rest_seconds == 0 {
            return Err(ConfigError::ZeroRestDuration);
        }
        Ok(())
    }

    /// Total ticks a full workout takes, including the warm-up.
    pub fn total_seconds(&self) -> u64 {
        let rounds = u64::from(self.total_rounds);
        u64::from(PREPARE_SECONDS)
            + rounds * u64::from(self.work_seconds)
            + rounds.saturating_sub(1) * u64::from(self.rest_seconds)
    }
}

/// Converts a `(minutes, seconds)` pair into whole seconds.
pub fn seconds_from_parts(minutes: u32, seconds: u32) -> u32 {
    minutes.saturating_mul(60).saturating_add(seconds)
}

/// Splits whole seconds into `(minutes, seconds)`.
pub fn split_seconds(total_seconds: u32) -> (u32, u32) {
    (total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Read-only view of the timer published to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub current_round: u32,
    pub total_rounds: u32,
    pub time_remaining: u32,
    /// Fraction of the current phase still remaining, in `[0.0, 1.0]`
    pub progress: f64,
    pub is_paused: bool,
}

impl TimerSnapshot {
    /// Snapshot of an idle timer for the given configuration.
    pub fn idle(config: &WorkoutConfig) -> Self {
        Self {
            phase: TimerPhase::Idle,
            current_round: 1,
            total_rounds: config.total_rounds,
            time_remaining: config.work_seconds,
            progress: 1.0,
            is_paused: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
