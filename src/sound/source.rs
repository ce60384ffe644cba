//! Sound source management.
//!
//! Cue sounds are plain audio files looked up by stem in a sounds directory
//! (`boxing-bell.mp3`, `gavel.wav`, ...). A missing file resolves to a
//! generated [`Tone`] instead.

use std::path::{Path, PathBuf};

use super::error::SoundError;
use super::tone::Tone;

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// An audio file on disk, with the tone to play if it cannot be decoded.
    File {
        /// The name of the sound (file stem, e.g. "boxing-bell").
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
        /// Tone substituted when the file fails to play.
        fallback: Tone,
    },
    /// A generated tone.
    Tone(Tone),
}

impl SoundSource {
    /// Creates a new file sound source.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>, fallback: Tone) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
            fallback,
        }
    }

    /// Creates a new tone sound source.
    #[must_use]
    pub fn tone(tone: Tone) -> Self {
        Self::Tone(tone)
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } => name,
            Self::Tone(tone) => tone.name(),
        }
    }

    /// Returns true if this is a file sound.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Returns true if this is a generated tone.
    #[must_use]
    pub fn is_tone(&self) -> bool {
        matches!(self, Self::Tone(_))
    }

    /// Returns the file path if this is a file sound.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Tone(_) => None,
        }
    }

    /// Returns the tone played when this source is unavailable.
    #[must_use]
    pub fn fallback_tone(&self) -> Tone {
        match self {
            Self::File { fallback, .. } => *fallback,
            Self::Tone(tone) => *tone,
        }
    }
}

/// Supported audio file extensions, in lookup order.
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "aiff", "m4a"];

/// File stem of the round start/end bell.
pub const BELL_SOUND: &str = "boxing-bell";

/// File stem of the warning sound.
pub const WARNING_SOUND: &str = "gavel";

/// Returns the default directory searched for cue sounds.
///
/// `<data dir>/roundtimer/sounds`, or `None` if the platform has no data
/// directory.
#[must_use]
pub fn default_sound_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("roundtimer").join("sounds"))
}

/// Finds a sound file by stem in `dir`.
///
/// # Errors
///
/// Returns `SoundError::FileNotFound` if no file with a supported extension
/// exists.
pub fn find_sound_file(dir: &Path, stem: &str, fallback: Tone) -> Result<SoundSource, SoundError> {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
        .map(|path| SoundSource::file(stem, path, fallback))
        .ok_or_else(|| {
            SoundError::FileNotFound(format!("'{}' in {}", stem, dir.display()))
        })
}

/// Resolves a sound by stem, substituting the tone if the file is missing.
#[must_use]
pub fn resolve_sound(dir: Option<&Path>, stem: &str, fallback: Tone) -> SoundSource {
    match dir {
        Some(dir) => find_sound_file(dir, stem, fallback).unwrap_or_else(|e| {
            tracing::debug!("{}, using {} tone", e, fallback.name());
            SoundSource::tone(fallback)
        }),
        None => SoundSource::tone(fallback),
    }
}
