//! Display utilities for the round timer CLI.
//!
//! This module provides formatted output for:
//! - The live status line
//! - Cue announcements
//! - Workout summaries and errors
//! - JSON lines for machine consumers

use std::io::Write;

use serde_json::json;

use crate::engine::Cue;
use crate::heart_rate::{ConnectionState, HeartRateReading};
use crate::types::{split_seconds, TimerPhase, TimerSnapshot, WorkoutConfig};

/// Width of the progress bar in characters.
const PROGRESS_WIDTH: usize = 20;

/// How the session reports state changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Redrawn human-readable status line
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Display {
    mode: OutputMode,
}

impl Display {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Shows the workout plan before the warm-up starts.
    pub fn show_start(&self, config: &WorkoutConfig) {
        match self.mode {
            OutputMode::Text => {
                println!(
                    "* {} rounds of {} with {} rest",
                    config.total_rounds,
                    Self::format_time(config.work_seconds),
                    Self::format_time(config.rest_seconds)
                );
                println!("  Controls: [p]ause  [r]esume  [s]top  [m]ute  (Enter toggles pause)");
            }
            OutputMode::Json => {
                println!("{}", json!({ "event": "start", "config": config }));
            }
        }
    }

    /// Redraws the status line.
    pub fn show_status(&self, snapshot: &TimerSnapshot, heart_rate: Option<&HeartRateReading>) {
        match self.mode {
            OutputMode::Text => {
                print!("\r{}\x1b[K", Self::render_status(snapshot, heart_rate));
                let _ = std::io::stdout().flush();
            }
            OutputMode::Json => {
                let bpm = heart_rate.and_then(HeartRateReading::bpm);
                let sensor = heart_rate.map(|reading| reading.state.as_str());
                let status = json!({
                    "event": "status",
                    "snapshot": snapshot,
                    "bpm": bpm,
                    "sensor": sensor,
                });
                println!("{}", status);
            }
        }
    }

    /// Announces a cue on its own line.
    pub fn show_cue(&self, cue: Cue) {
        match self.mode {
            OutputMode::Text => println!("\r\x1b[K>> {}", Self::cue_message(cue)),
            OutputMode::Json => println!("{}", json!({ "event": "cue", "cue": cue })),
        }
    }

    /// Reports that cue sounds were muted or unmuted.
    pub fn show_sound(&self, enabled: bool) {
        match self.mode {
            OutputMode::Text => {
                println!("\r\x1b[K~ Sound {}", if enabled { "on" } else { "off" });
            }
            OutputMode::Json => println!("{}", json!({ "event": "sound", "enabled": enabled })),
        }
    }

    /// Shows the end-of-workout message.
    pub fn show_complete(&self, config: &WorkoutConfig) {
        match self.mode {
            OutputMode::Text => {
                println!("\r\x1b[K* Workout complete: {} rounds", config.total_rounds);
            }
            OutputMode::Json => println!("{}", json!({ "event": "complete" })),
        }
    }

    /// Shows the message for a workout stopped early.
    pub fn show_stopped(&self) {
        match self.mode {
            OutputMode::Text => println!("\r\x1b[K[] Workout stopped"),
            OutputMode::Json => println!("{}", json!({ "event": "stopped" })),
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }

    /// Renders the one-line status summary.
    pub fn render_status(snapshot: &TimerSnapshot, heart_rate: Option<&HeartRateReading>) -> String {
        let mut line = match snapshot.phase {
            TimerPhase::Idle => format!("{:<9}", snapshot.phase.label()),
            TimerPhase::Prepare => format!(
                "{:<9}  {}",
                snapshot.phase.label(),
                Self::format_time(snapshot.time_remaining)
            ),
            TimerPhase::Work | TimerPhase::Rest => format!(
                "ROUND {}/{}  {:<5}  {}",
                snapshot.current_round,
                snapshot.total_rounds,
                snapshot.phase.label(),
                Self::format_time(snapshot.time_remaining)
            ),
        };

        if snapshot.phase.is_active() {
            line.push_str("  ");
            line.push_str(&Self::progress_bar(snapshot.progress, PROGRESS_WIDTH));
        }
        if snapshot.is_paused {
            line.push_str("  PAUSED");
        }
        if let Some(sensor) = heart_rate.and_then(Self::heart_rate_tag) {
            line.push_str("  ");
            line.push_str(&sensor);
        }
        line
    }

    /// Sensor part of the status line. Nothing is shown while disconnected.
    fn heart_rate_tag(reading: &HeartRateReading) -> Option<String> {
        match reading.state {
            ConnectionState::Disconnected => None,
            ConnectionState::Scanning => Some("HR scanning...".to_string()),
            ConnectionState::Connecting => Some("HR connecting...".to_string()),
            ConnectionState::Connected => Some(match reading.bpm() {
                Some(bpm) => format!("{} bpm", bpm),
                None => "HR --".to_string(),
            }),
        }
    }

    /// Returns the announcement text for a cue.
    pub fn cue_message(cue: Cue) -> &'static str {
        match cue {
            Cue::RoundStart => "DING! Round start",
            Cue::RoundEnd => "DING! Round over",
            Cue::Warning => "Almost there...",
        }
    }

    /// Renders a progress bar of `width` cells, filled by `progress`.
    pub fn progress_bar(progress: f64, width: usize) -> String {
        let filled = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }

    /// Formats whole seconds as `M:SS`.
    pub fn format_time(total_seconds: u32) -> String {
        let (minutes, seconds) = split_seconds(total_seconds);
        format!("{}:{:02}", minutes, seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
