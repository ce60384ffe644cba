//! Engine module for the round timer.
//!
//! - `timer`: the interval timer state machine
//! - `clock`: tick sources (tokio-backed and manual)
//! - `cue`: cue events and notifier implementations
//! - `warning`: per-phase warning thresholds

pub mod clock;
pub mod cue;
pub mod timer;
pub mod warning;

pub use clock::{Clock, ManualClock, TickCallback, TickSubscription, TokioClock};
pub use cue::{ChannelNotifier, Cue, CueNotifier, NullNotifier, RecordingNotifier};
pub use timer::{IntervalTimer, DEFAULT_TICK_INTERVAL};
pub use warning::WarningPolicy;
