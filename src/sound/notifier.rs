//! Audible cue notifier.

use std::path::Path;

use tracing::{debug, warn};

use super::source::{resolve_sound, SoundSource, BELL_SOUND, WARNING_SOUND};
use super::tone::Tone;
use super::SoundPlayer;
use crate::engine::{Cue, CueNotifier};

/// Sounds assigned to each cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueSounds {
    /// Played for both round start and round end
    pub bell: SoundSource,
    pub warning: SoundSource,
}

impl Default for CueSounds {
    fn default() -> Self {
        Self {
            bell: SoundSource::tone(Tone::Alarm),
            warning: SoundSource::tone(Tone::Beep),
        }
    }
}

impl CueSounds {
    /// Looks up the cue sounds in `dir`, substituting tones for missing files.
    pub fn discover(dir: Option<&Path>) -> Self {
        Self {
            bell: resolve_sound(dir, BELL_SOUND, Tone::Alarm),
            warning: resolve_sound(dir, WARNING_SOUND, Tone::Beep),
        }
    }

    /// Returns the sound for a cue.
    pub fn for_cue(&self, cue: Cue) -> &SoundSource {
        match cue {
            Cue::RoundStart | Cue::RoundEnd => &self.bell,
            Cue::Warning => &self.warning,
        }
    }
}

/// Plays a sound for every cue.
///
/// Playback errors are logged and swallowed. This is the only place that
/// substitutes a tone: if a file cannot be opened or decoded, its fallback
/// tone is tried once before giving up.
#[derive(Debug)]
pub struct SoundCueNotifier<P> {
    player: P,
    sounds: CueSounds,
}

impl<P: SoundPlayer> SoundCueNotifier<P> {
    pub fn new(player: P, sounds: CueSounds) -> Self {
        Self { player, sounds }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn sounds(&self) -> &CueSounds {
        &self.sounds
    }
}

impl<P: SoundPlayer> CueNotifier for SoundCueNotifier<P> {
    fn notify(&self, cue: Cue) {
        if self.player.is_disabled() {
            return;
        }

        let source = self.sounds.for_cue(cue);
        debug!("Cue {} -> {}", cue.as_str(), source.name());

        let Err(e) = self.player.play(source) else {
            return;
        };

        if source.is_tone() || !e.should_fallback_to_tone() {
            warn!("Could not play {} cue: {}", cue.as_str(), e);
            return;
        }

        let tone = source.fallback_tone();
        warn!(
            "Could not play {} cue from '{}': {}, trying {} tone",
            cue.as_str(),
            source.name(),
            e,
            tone.name()
        );
        if let Err(e) = self.player.play(&SoundSource::tone(tone)) {
            warn!("Could not play {} cue: {}", cue.as_str(), e);
        }
    }
}
