//! Sound player implementation using rodio.
//!
//! This module provides the `RodioSoundPlayer` which uses the rodio v0.20
//! audio library for cross-platform sound playback.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use rodio::source::{SineWave, Source};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::SoundSource;
use super::tone::Tone;

/// A sound player that uses rodio for audio playback.
///
/// Sound playback is non-blocking; sounds continue playing in the background
/// for as long as the player is alive.
pub struct RodioSoundPlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    /// Whether sound playback is disabled.
    disabled: AtomicBool,
}

impl RodioSoundPlayer {
    /// Creates a new sound player.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(disabled: bool) -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
            disabled: AtomicBool::new(disabled),
        })
    }

    /// Plays a sound from the given source.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded, or if no
    /// sink could be created on the output stream.
    pub fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("Sound playback disabled, skipping");
            return Ok(());
        }

        match source {
            SoundSource::File { path, name, .. } => {
                debug!("Playing sound file: {}", name);
                self.play_file(path)
            }
            SoundSource::Tone(tone) => {
                debug!("Playing {} tone", tone.name());
                self.play_tone(*tone)
            }
        }
    }

    /// Plays a sound file from the filesystem.
    fn play_file(&self, path: &Path) -> Result<(), SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| SoundError::DecodeError(e.to_string()))?;

        let sink = self.new_sink()?;
        sink.append(decoder);
        sink.detach(); // Non-blocking: sound continues after function returns

        debug!("Sound playback started (detached)");
        Ok(())
    }

    /// Plays a generated tone.
    fn play_tone(&self, tone: Tone) -> Result<(), SoundError> {
        let wave = SineWave::new(tone.frequency())
            .take_duration(tone.duration())
            .amplify(tone.amplitude());

        let sink = self.new_sink()?;
        sink.append(wave);
        sink.detach();

        debug!("Tone playback started (detached)");
        Ok(())
    }

    fn new_sink(&self) -> Result<Sink, SoundError> {
        Sink::try_new(&self.stream_handle).map_err(|e| SoundError::StreamError(e.to_string()))
    }

    /// Returns true if sound playback is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Mutes or unmutes playback.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
        debug!(
            "Sound playback {}",
            if disabled { "disabled" } else { "enabled" }
        );
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Creates a sound player, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and the workout runs
/// silently.
#[must_use]
pub fn try_create_player() -> Option<RodioSoundPlayer> {
    match RodioSoundPlayer::new(false) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("Audio not available, cues will be silent: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: These tests may run in environments without audio hardware
    // (e.g., CI containers). Each one returns early if no device exists.

    #[test]
    fn test_disabled_player_skips_playback() {
        let player = match RodioSoundPlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(player.is_disabled());
        assert!(player.play(&SoundSource::tone(Tone::Beep)).is_ok());
    }

    #[test]
    fn test_set_disabled_toggles_mute() {
        let player = match RodioSoundPlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        player.set_disabled(false);
        assert!(!player.is_disabled());

        player.set_disabled(true);
        assert!(player.is_disabled());
    }

    #[test]
    fn test_debug_impl() {
        let player = match RodioSoundPlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        let debug_str = format!("{:?}", player);
        assert!(debug_str.contains("RodioSoundPlayer"));
    }

    #[test]
    fn test_missing_file_reports_file_not_found() {
        let player = match RodioSoundPlayer::new(false) {
            Ok(p) => p,
            Err(_) => return,
        };

        let source = SoundSource::file("missing", "/nonexistent/missing.mp3", Tone::Beep);
        let result = player.play(&source);

        // The player never substitutes a tone itself
        assert!(matches!(result, Err(SoundError::FileNotFound(_))));
        assert!(result.unwrap_err().should_fallback_to_tone());
    }

    #[test]
    fn test_undecodable_file_reports_decode_error() {
        let player = match RodioSoundPlayer::new(false) {
            Ok(p) => p,
            Err(_) => return,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boxing-bell.mp3");
        std::fs::write(&path, b"not audio").unwrap();

        let result = player.play(&SoundSource::file("boxing-bell", path, Tone::Alarm));

        assert!(matches!(result, Err(SoundError::DecodeError(_))));
    }

    #[test]
    fn test_try_create_player_does_not_panic() {
        let _ = try_create_player();
    }
}
