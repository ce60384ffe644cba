//! Interactive workout session.
//!
//! Drives one [`IntervalTimer`] in the terminal: ticks from a tokio clock,
//! control commands from stdin, Ctrl-C, cue playback and status redraws all
//! run on a single `select!` loop. With `--heart-rate`, the Bluetooth sensor
//! loop runs alongside it on the same task.

use std::convert::Infallible;
use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;
use tracing::{debug, warn};

use super::commands::StartArgs;
use super::display::{Display, OutputMode};
use crate::engine::{ChannelNotifier, Cue, CueNotifier, IntervalTimer, TokioClock};
use crate::heart_rate::{run_sensor, BleSensorLink, HeartRateFeed, HeartRateReading, RETRY_DELAY};
use crate::sound::{
    default_sound_dir, try_create_player, CueSounds, RodioSoundPlayer, SoundCueNotifier,
    SoundPlayer,
};
use crate::types::{TimerPhase, WorkoutConfig};

/// Time left for the final bell to ring out before the process exits.
const FINAL_BELL_LINGER: Duration = Duration::from_millis(1500);

// ============================================================================
// SessionOptions
// ============================================================================

/// Everything needed to run one workout.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub config: WorkoutConfig,
    pub tick_interval: Duration,
    pub sound: bool,
    pub sounds_dir: Option<PathBuf>,
    pub output: OutputMode,
    pub heart_rate: bool,
}

impl SessionOptions {
    /// Builds validated options from command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the workout configuration is invalid.
    pub fn from_args(args: &StartArgs) -> Result<Self> {
        let config = args.workout_config();
        config.validate().context("Invalid workout configuration")?;

        Ok(Self {
            config,
            tick_interval: Duration::from_millis(args.tick_ms),
            sound: !args.no_sound,
            sounds_dir: args.sounds_dir.clone().or_else(default_sound_dir),
            output: if args.json {
                OutputMode::Json
            } else {
                OutputMode::Text
            },
            heart_rate: args.heart_rate,
        })
    }
}

// ============================================================================
// Controls
// ============================================================================

/// A control typed by the user during a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    /// Pause if running, resume if paused
    Toggle,
    Stop,
    /// Mute or unmute cue sounds
    Mute,
}

impl ControlCommand {
    /// Parses one line of input. Unknown input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" => Some(Self::Toggle),
            "p" | "pause" => Some(Self::Pause),
            "r" | "resume" => Some(Self::Resume),
            "s" | "stop" | "q" | "quit" => Some(Self::Stop),
            "m" | "mute" => Some(Self::Mute),
            _ => None,
        }
    }
}

/// Applies a control to the timer. `Mute` concerns the sound player only
/// and leaves the timer untouched.
pub fn apply_control(timer: &mut IntervalTimer, command: ControlCommand) {
    match command {
        ControlCommand::Pause => timer.pause(),
        ControlCommand::Resume => timer.resume(),
        ControlCommand::Toggle if timer.is_paused() => timer.resume(),
        ControlCommand::Toggle => timer.pause(),
        ControlCommand::Stop => timer.stop(),
        ControlCommand::Mute => {}
    }
}

/// Flips the mute state of `player` and returns whether sound is now on.
pub fn toggle_mute(player: &impl SoundPlayer) -> bool {
    let muted = !player.is_disabled();
    player.set_disabled(muted);
    !muted
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every round was completed
    Completed,
    /// The user stopped the workout early
    Stopped,
}

// ============================================================================
// Session loop
// ============================================================================

/// Runs one workout, feeding the status line from a Bluetooth heart-rate
/// sensor when `options.heart_rate` is set.
///
/// # Errors
///
/// Returns an error if the workout session fails.
pub async fn run_session(options: SessionOptions) -> Result<SessionOutcome> {
    let feed = HeartRateFeed::new();
    let heart_rate = feed.subscribe();

    if !options.heart_rate {
        return run_workout(options, heart_rate).await;
    }

    tokio::select! {
        outcome = run_workout(options, heart_rate) => outcome,
        never = drive_ble_sensor(&feed) => match never {},
    }
}

/// Keeps `feed` connected to the first heart-rate sensor in range.
///
/// Without a usable adapter the feed stays disconnected.
async fn drive_ble_sensor(feed: &HeartRateFeed) -> Infallible {
    match BleSensorLink::new().await {
        Ok(mut link) => run_sensor(&mut link, feed, RETRY_DELAY).await,
        Err(e) => warn!("Heart rate sensor unavailable: {}", e),
    }
    std::future::pending().await
}

/// Runs one workout to completion or until the user stops it.
///
/// `heart_rate` is display-only; pass a receiver from a [`HeartRateFeed`].
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be installed.
pub async fn run_workout(
    options: SessionOptions,
    mut heart_rate: watch::Receiver<HeartRateReading>,
) -> Result<SessionOutcome> {
    let display = Display::new(options.output);
    let sound = build_sound_notifier(&options);

    let (cue_tx, mut cue_rx) = mpsc::unbounded_channel();
    let mut timer = IntervalTimer::new(
        options.config.clone(),
        TokioClock::new(),
        ChannelNotifier::new(cue_tx),
    )
    .with_tick_interval(options.tick_interval);
    let mut snapshots = timer.subscribe();

    let mut controls = spawn_control_reader();
    let mut controls_open = true;
    let mut heart_rate_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    display.show_start(&options.config);
    timer.start();
    display.show_status(&snapshots.borrow_and_update(), Some(&*heart_rate.borrow()));

    let outcome = loop {
        tokio::select! {
            _ = timer.wait_for_tick() => {}
            Some(cue) = cue_rx.recv() => {
                play_cue(&display, sound.as_ref(), cue);
            }
            Ok(()) = snapshots.changed() => {
                display.show_status(&snapshots.borrow_and_update(), Some(&*heart_rate.borrow()));
            }
            line = controls.recv(), if controls_open => match line {
                Some(line) => match ControlCommand::parse(&line) {
                    Some(command) => {
                        debug!("Control: {:?}", command);
                        apply_control(&mut timer, command);
                        match command {
                            ControlCommand::Stop => break SessionOutcome::Stopped,
                            ControlCommand::Mute => {
                                let enabled = sound
                                    .as_ref()
                                    .is_some_and(|sound| toggle_mute(sound.player()));
                                display.show_sound(enabled);
                            }
                            _ => {}
                        }
                    }
                    None => debug!("Ignoring unknown control '{}'", line.trim()),
                },
                None => {
                    debug!("Control input closed");
                    controls_open = false;
                }
            },
            changed = heart_rate.changed(), if heart_rate_open => {
                if changed.is_ok() {
                    display.show_status(&snapshots.borrow(), Some(&*heart_rate.borrow_and_update()));
                } else {
                    heart_rate_open = false;
                }
            }
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl-C")?;
                timer.stop();
                break SessionOutcome::Stopped;
            }
        }

        if timer.phase() == TimerPhase::Idle {
            break SessionOutcome::Completed;
        }
    };

    // Cues and the Idle snapshot from the final transition are still queued
    while let Ok(cue) = cue_rx.try_recv() {
        play_cue(&display, sound.as_ref(), cue);
    }
    if snapshots.has_changed().unwrap_or(false) {
        display.show_status(&snapshots.borrow_and_update(), Some(&*heart_rate.borrow()));
    }

    match outcome {
        SessionOutcome::Completed => {
            display.show_complete(&options.config);
            if sound.is_some() {
                tokio::time::sleep(FINAL_BELL_LINGER).await;
            }
        }
        SessionOutcome::Stopped => display.show_stopped(),
    }

    Ok(outcome)
}

fn play_cue(display: &Display, sound: Option<&impl CueNotifier>, cue: Cue) {
    display.show_cue(cue);
    if let Some(sound) = sound {
        sound.notify(cue);
    }
}

fn build_sound_notifier(options: &SessionOptions) -> Option<SoundCueNotifier<RodioSoundPlayer>> {
    if !options.sound {
        debug!("Sound disabled");
        return None;
    }

    let player = try_create_player()?;
    let sounds = CueSounds::discover(options.sounds_dir.as_deref());
    debug!(
        "Cue sounds: bell={}, warning={}",
        sounds.bell.name(),
        sounds.warning.name()
    );
    Some(SoundCueNotifier::new(player, sounds))
}

/// Reads control lines from stdin on a dedicated thread.
///
/// The channel closes when stdin reaches end of file.
fn spawn_control_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    let spawned = std::thread::Builder::new()
        .name("controls".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read controls: {}", e);
                        break;
                    }
                }
            }
        });

    if let Err(e) = spawned {
        warn!("Interactive controls unavailable: {}", e);
    }
    rx
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ManualClock, NullNotifier};
    use crate::sound::MockSoundPlayer;

    mod control_command_tests {
        use super::*;

        #[test]
        fn test_parse_aliases() {
            assert_eq!(ControlCommand::parse("p"), Some(ControlCommand::Pause));
            assert_eq!(ControlCommand::parse("PAUSE"), Some(ControlCommand::Pause));
            assert_eq!(ControlCommand::parse("r"), Some(ControlCommand::Resume));
            assert_eq!(ControlCommand::parse(" resume "), Some(ControlCommand::Resume));
            assert_eq!(ControlCommand::parse("s"), Some(ControlCommand::Stop));
            assert_eq!(ControlCommand::parse("q"), Some(ControlCommand::Stop));
            assert_eq!(ControlCommand::parse("quit"), Some(ControlCommand::Stop));
            assert_eq!(ControlCommand::parse("m"), Some(ControlCommand::Mute));
            assert_eq!(ControlCommand::parse("Mute"), Some(ControlCommand::Mute));
        }

        #[test]
        fn test_empty_line_toggles() {
            assert_eq!(ControlCommand::parse(""), Some(ControlCommand::Toggle));
            assert_eq!(ControlCommand::parse("   "), Some(ControlCommand::Toggle));
        }

        #[test]
        fn test_unknown_input() {
            assert_eq!(ControlCommand::parse("jump"), None);
        }

        #[test]
        fn test_apply_toggle() {
            let mut timer =
                IntervalTimer::new(WorkoutConfig::default(), ManualClock::new(), NullNotifier);
            timer.start();

            apply_control(&mut timer, ControlCommand::Toggle);
            assert!(timer.is_paused());

            apply_control(&mut timer, ControlCommand::Toggle);
            assert!(!timer.is_paused());

            apply_control(&mut timer, ControlCommand::Stop);
            assert_eq!(timer.phase(), TimerPhase::Idle);
        }

        #[test]
        fn test_mute_leaves_timer_alone() {
            let mut timer =
                IntervalTimer::new(WorkoutConfig::default(), ManualClock::new(), NullNotifier);
            timer.start();
            let before = timer.snapshot();

            apply_control(&mut timer, ControlCommand::Mute);

            assert_eq!(timer.snapshot(), before);
        }

        #[test]
        fn test_toggle_mute_flips_player() {
            let player = MockSoundPlayer::new();

            assert!(!toggle_mute(&player));
            assert!(player.is_disabled());

            assert!(toggle_mute(&player));
            assert!(!player.is_disabled());
        }

        #[test]
        fn test_muted_notifier_plays_nothing() {
            let notifier = SoundCueNotifier::new(MockSoundPlayer::new(), CueSounds::default());

            toggle_mute(notifier.player());
            notifier.notify(Cue::RoundStart);
            toggle_mute(notifier.player());
            notifier.notify(Cue::RoundEnd);

            assert_eq!(notifier.player().play_count(), 1);
        }

        #[test]
        fn test_toggle_while_idle_does_nothing() {
            let mut timer =
                IntervalTimer::new(WorkoutConfig::default(), ManualClock::new(), NullNotifier);

            apply_control(&mut timer, ControlCommand::Toggle);

            assert_eq!(timer.phase(), TimerPhase::Idle);
            assert!(!timer.is_paused());
        }
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_from_args() {
            let args = StartArgs {
                rounds: 3,
                work: 30,
                rest: 10,
                no_sound: true,
                sounds_dir: Some(PathBuf::from("/sounds")),
                json: true,
                heart_rate: true,
                tick_ms: 50,
            };

            let options = SessionOptions::from_args(&args).unwrap();

            assert_eq!(options.config.total_rounds, 3);
            assert_eq!(options.tick_interval, Duration::from_millis(50));
            assert!(!options.sound);
            assert_eq!(options.sounds_dir, Some(PathBuf::from("/sounds")));
            assert_eq!(options.output, OutputMode::Json);
            assert!(options.heart_rate);
        }

        #[test]
        fn test_from_args_rejects_invalid_config() {
            let args = StartArgs {
                rounds: 0,
                ..StartArgs::default()
            };

            let err = SessionOptions::from_args(&args).unwrap_err();
            assert!(format!("{:#}", err).contains("rounds must be between 1 and 20"));
        }
    }
}
