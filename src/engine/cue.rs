//! Cue events emitted by the timer and the notifier seam they flow through.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// A discrete audible event requested by the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// A round has started
    RoundStart,
    /// A round has ended (also sent once when the workout completes)
    RoundEnd,
    /// The current phase is about to end
    Warning,
}

impl Cue {
    /// Returns the string representation of the cue.
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::RoundStart => "round_start",
            Cue::RoundEnd => "round_end",
            Cue::Warning => "warning",
        }
    }
}

/// Receiver of cue requests.
///
/// Implementations must not block and must never fail from the caller's
/// point of view: errors are logged and swallowed by the notifier.
pub trait CueNotifier {
    /// Delivers a cue.
    fn notify(&self, cue: Cue);
}

impl<T: CueNotifier + ?Sized> CueNotifier for Box<T> {
    fn notify(&self, cue: Cue) {
        (**self).notify(cue)
    }
}

impl<T: CueNotifier + ?Sized> CueNotifier for Arc<T> {
    fn notify(&self, cue: Cue) {
        (**self).notify(cue)
    }
}

/// Notifier that discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl CueNotifier for NullNotifier {
    fn notify(&self, _cue: Cue) {}
}

/// Notifier that forwards cues into an unbounded channel.
///
/// Lets an event loop handle cues (for example, audio playback) outside the
/// timer's call path.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Cue>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<Cue>) -> Self {
        Self { tx }
    }
}

impl CueNotifier for ChannelNotifier {
    fn notify(&self, cue: Cue) {
        if self.tx.send(cue).is_err() {
            debug!("Cue receiver dropped, discarding {}", cue.as_str());
        }
    }
}

/// Notifier that records every cue, for tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    cues: Arc<Mutex<Vec<Cue>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every cue received so far, in order.
    #[must_use]
    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().unwrap().clone()
    }

    /// Returns how many times the given cue was received.
    #[must_use]
    pub fn count(&self, cue: Cue) -> usize {
        self.cues.lock().unwrap().iter().filter(|c| **c == cue).count()
    }

    pub fn clear(&self) {
        self.cues.lock().unwrap().clear();
    }
}

impl CueNotifier for RecordingNotifier {
    fn notify(&self, cue: Cue) {
        self.cues.lock().unwrap().push(cue);
    }
}
