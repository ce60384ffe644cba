//! Sound playback for round cues.
//!
//! This module is the audio collaborator of the timer:
//!
//! - Sound file lookup in a sounds directory
//! - Generated fallback tones when a file is missing or undecodable
//! - Non-blocking audio playback
//! - A [`CueNotifier`](crate::engine::CueNotifier) that maps cues to sounds
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ SoundCueNotifier │ ← Cue → SoundSource
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   SoundPlayer    │────▶│   Sound files    │
//! │                  │     │  (sounds dir)    │
//! │                  │     ├──────────────────┤
//! │                  │────▶│ Generated tones  │
//! └──────────────────┘     │  (fallback)      │
//!                          └──────────────────┘
//! ```

mod error;
mod notifier;
mod player;
mod source;
mod tone;

pub use error::SoundError;
pub use notifier::{CueSounds, SoundCueNotifier};
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{
    default_sound_dir, find_sound_file, resolve_sound, SoundSource, BELL_SOUND, WARNING_SOUND,
};
pub use tone::Tone;

/// Trait for sound playback implementations.
///
/// This trait abstracts the sound playback functionality, allowing for
/// different implementations (e.g., rodio-based, mock for testing).
pub trait SoundPlayer {
    /// Plays a sound from the given source.
    ///
    /// This method should be non-blocking; the sound plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, source: &SoundSource) -> Result<(), SoundError>;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Mutes or unmutes playback.
    fn set_disabled(&self, disabled: bool);
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, source)
    }

    fn is_disabled(&self) -> bool {
        RodioSoundPlayer::is_disabled(self)
    }

    fn set_disabled(&self, disabled: bool) {
        RodioSoundPlayer::set_disabled(self, disabled);
    }
}

/// Mock sound player for testing.
///
/// `set_should_fail` makes every play fail with a stream error.
/// `set_fail_files` makes only file sources fail, as an undecodable file
/// would, so fallback tones still play.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: std::sync::Mutex<Vec<SoundSource>>,
    attempts: std::sync::atomic::AtomicUsize,
    disabled: std::sync::atomic::AtomicBool,
    should_fail: std::sync::atomic::AtomicBool,
    fail_files: std::sync::atomic::AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set_fail_files(&self, fail_files: bool) {
        self.fail_files
            .store(fail_files, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of successful plays.
    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap().len()
    }

    /// Number of `play` calls, failed ones included.
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(std::sync::atomic::Ordering::SeqCst)
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<SoundSource> {
        self.play_calls.lock().unwrap().clone()
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.is_disabled() {
            return Ok(());
        }
        self.attempts
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SoundError::StreamError("Mock failure".to_string()));
        }
        if source.is_file() && self.fail_files.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SoundError::DecodeError(format!(
                "Mock decode failure: {}",
                source.name()
            )));
        }
        self.play_calls.lock().unwrap().push(source.clone());
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled
            .store(disabled, std::sync::atomic::Ordering::SeqCst);
    }
}
