//! Command definitions for the round timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{seconds_from_parts, WorkoutConfig};

// ============================================================================
// CLI Structure
// ============================================================================

/// Round timer for boxing and interval workouts
#[derive(Parser, Debug)]
#[command(
    name = "roundtimer",
    version,
    about = "Round-based workout interval timer",
    long_about = "Runs rounds of work and rest with a 10 second warm-up, ringing a bell \n\
                  at every round boundary and warning shortly before each phase ends.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a workout in this terminal
    Start(StartArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Start Command Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Number of rounds (1-20)
    #[arg(
        short,
        long,
        default_value = "12",
        value_parser = clap::value_parser!(u32).range(1..=20)
    )]
    pub rounds: u32,

    /// Round length as M:SS or seconds
    #[arg(short, long, default_value = "2:00", value_parser = parse_phase_duration)]
    pub work: u32,

    /// Rest length as M:SS or seconds
    #[arg(short = 'b', long, default_value = "1:00", value_parser = parse_phase_duration)]
    pub rest: u32,

    /// Disable cue sounds
    #[arg(long)]
    pub no_sound: bool,

    /// Directory containing boxing-bell.* and gavel.* sound files
    #[arg(long, value_name = "DIR")]
    pub sounds_dir: Option<PathBuf>,

    /// Print one JSON object per state change instead of a status line
    #[arg(long)]
    pub json: bool,

    /// Show live heart rate from a Bluetooth LE sensor
    #[arg(long)]
    pub heart_rate: bool,

    /// Length of one time unit in milliseconds
    #[arg(
        long,
        hide = true,
        default_value = "1000",
        value_parser = clap::value_parser!(u64).range(1..=60_000)
    )]
    pub tick_ms: u64,
}

impl Default for StartArgs {
    fn default() -> Self {
        let config = WorkoutConfig::default();
        Self {
            rounds: config.total_rounds,
            work: config.work_seconds,
            rest: config.rest_seconds,
            no_sound: false,
            sounds_dir: None,
            json: false,
            heart_rate: false,
            tick_ms: 1000,
        }
    }
}

impl StartArgs {
    /// Builds the workout configuration from the arguments.
    pub fn workout_config(&self) -> WorkoutConfig {
        WorkoutConfig {
            total_rounds: self.rounds,
            work_seconds: self.work,
            rest_seconds: self.rest,
        }
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses a phase length given as `M:SS` or as plain seconds.
///
/// - Seconds in `M:SS` form must be below 60
/// - The total must be at least one second
fn parse_phase_duration(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let total = match s.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes
                .parse()
                .map_err(|_| format!("invalid minutes in '{s}'"))?;
            let seconds: u32 = seconds
                .parse()
                .map_err(|_| format!("invalid seconds in '{s}'"))?;
            if seconds >= 60 {
                return Err(format!("seconds must be below 60 in '{s}'"));
            }
            seconds_from_parts(minutes, seconds)
        }
        None => s
            .parse()
            .map_err(|_| format!("expected M:SS or seconds, got '{s}'"))?,
    };

    if total == 0 {
        return Err("duration must be at least one second".to_string());
    }
    Ok(total)
}

// ============================================================================
// Tests
// ============================================================================
