//! Generated alert tones.
//!
//! Used whenever a cue's sound asset is missing or cannot be decoded, so a
//! cue is always audible as long as an output device exists.

use std::time::Duration;

/// A synthesized alert tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Long, low alarm standing in for the round bell
    Alarm,
    /// Short, high beep standing in for the warning sound
    Beep,
}

impl Tone {
    /// Frequency of the sine wave in hertz.
    #[must_use]
    pub const fn frequency(&self) -> f32 {
        match self {
            Tone::Alarm => 880.0,
            Tone::Beep => 1320.0,
        }
    }

    /// How long the tone plays.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        match self {
            Tone::Alarm => Duration::from_millis(600),
            Tone::Beep => Duration::from_millis(150),
        }
    }

    /// Output gain applied to the sine wave.
    #[must_use]
    pub const fn amplitude(&self) -> f32 {
        0.25
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Tone::Alarm => "alarm",
            Tone::Beep => "beep",
        }
    }
}
