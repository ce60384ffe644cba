//! Round Timer Library
//!
//! This library provides the core functionality for the round timer CLI.
//! It includes:
//! - Interval timer engine (Prepare → Work → Rest rounds) with cue events
//! - Sound playback for round bells and warnings
//! - Heart-rate measurement decoding, a live reading feed and a Bluetooth LE
//!   sensor driver
//! - CLI command parsing, display utilities and the workout session loop
//! - Type definitions for configuration and observable state

pub mod cli;
pub mod engine;
pub mod heart_rate;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{ConfigError, TimerPhase, TimerSnapshot, WorkoutConfig};

// Re-export engine types
pub use engine::{
    ChannelNotifier, Clock, Cue, CueNotifier, IntervalTimer, ManualClock, NullNotifier,
    RecordingNotifier, TokioClock, WarningPolicy,
};

// Re-export heart rate types
pub use heart_rate::{
    decode_measurement, run_sensor, BleSensorLink, ConnectionState, HeartRateError,
    HeartRateFeed, HeartRateReading, SensorLink,
};

// Re-export sound types
pub use sound::{
    CueSounds, MockSoundPlayer, RodioSoundPlayer, SoundCueNotifier, SoundError, SoundPlayer,
    SoundSource, Tone,
};
