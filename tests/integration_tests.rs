//! Integration tests for complete workouts driven through the public API.
//!
//! These tests exercise the timer engine together with its collaborators:
//! - Full round sequences with a manual clock
//! - Cue ordering as seen by a notifier
//! - Controls applied at every phase
//! - Real tokio-driven ticking with paused time
//! - Sound cue fallback and the heart-rate feed

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Duration;

use roundtimer::engine::{
    ChannelNotifier, Cue, IntervalTimer, ManualClock, RecordingNotifier, TokioClock,
};
use roundtimer::heart_rate::{ConnectionState, HeartRateFeed};
use roundtimer::sound::{CueSounds, MockSoundPlayer, SoundCueNotifier, SoundSource, Tone};
use roundtimer::types::{TimerPhase, WorkoutConfig, PREPARE_SECONDS};

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a timer driven by a manual clock and observed by a recorder.
fn create_timer(config: WorkoutConfig) -> (IntervalTimer, ManualClock, RecordingNotifier) {
    let clock = ManualClock::new();
    let cues = RecordingNotifier::new();
    let timer = IntervalTimer::new(config, clock.clone(), cues.clone());
    (timer, clock, cues)
}

/// Delivers one tick and lets the timer apply it.
fn tick(timer: &mut IntervalTimer, clock: &ManualClock) {
    clock.advance();
    timer.process_pending_ticks();
}

/// Delivers `n` ticks.
fn tick_n(timer: &mut IntervalTimer, clock: &ManualClock, n: u32) {
    for _ in 0..n {
        tick(timer, clock);
    }
}

/// Phase entries observed while ticking until the timer goes idle.
fn run_to_completion(timer: &mut IntervalTimer, clock: &ManualClock) -> Vec<(TimerPhase, u32)> {
    let mut entries = vec![(timer.phase(), timer.current_round())];
    let mut guard = 0;
    while timer.phase() != TimerPhase::Idle {
        let before = (timer.phase(), timer.current_round());
        tick(timer, clock);
        let after = (timer.phase(), timer.current_round());
        if after != before {
            entries.push(after);
        }
        guard += 1;
        assert!(guard < 100_000, "workout never finished");
    }
    entries
}

fn config(rounds: u32, work: u32, rest: u32) -> WorkoutConfig {
    WorkoutConfig {
        total_rounds: rounds,
        work_seconds: work,
        rest_seconds: rest,
    }
}

// ============================================================================
// Full Workout Tests
// ============================================================================

mod workout_tests {
    use super::*;

    #[test]
    fn test_two_round_example_sequence() {
        let (mut timer, clock, cues) = create_timer(config(2, 5, 3));
        timer.start();

        let entries = run_to_completion(&mut timer, &clock);

        assert_eq!(
            entries,
            vec![
                (TimerPhase::Prepare, 1),
                (TimerPhase::Work, 1),
                (TimerPhase::Rest, 1),
                (TimerPhase::Work, 2),
                (TimerPhase::Idle, 1),
            ]
        );

        let round_cues: Vec<Cue> = cues
            .cues()
            .into_iter()
            .filter(|cue| *cue != Cue::Warning)
            .collect();
        assert_eq!(
            round_cues,
            vec![Cue::RoundStart, Cue::RoundEnd, Cue::RoundStart, Cue::RoundEnd]
        );
    }

    #[test]
    fn test_two_round_example_total_ticks() {
        let (mut timer, clock, _cues) = create_timer(config(2, 5, 3));
        timer.start();

        tick_n(&mut timer, &clock, PREPARE_SECONDS + 5 + 3 + 5 - 1);
        assert_eq!(timer.phase(), TimerPhase::Work);
        assert_eq!(timer.time_remaining(), 1);

        tick(&mut timer, &clock);
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn test_round_counts_for_every_round_total() {
        for rounds in 1..=20 {
            let (mut timer, clock, cues) = create_timer(config(rounds, 2, 1));
            timer.start();

            let entries = run_to_completion(&mut timer, &clock);

            let works = entries.iter().filter(|(p, _)| *p == TimerPhase::Work).count();
            let rests = entries.iter().filter(|(p, _)| *p == TimerPhase::Rest).count();
            assert_eq!(works, rounds as usize, "rounds={}", rounds);
            assert_eq!(rests, rounds as usize - 1, "rounds={}", rounds);
            assert_eq!(cues.count(Cue::RoundStart), rounds as usize);
            assert_eq!(cues.count(Cue::RoundEnd), rounds as usize);
        }
    }

    #[test]
    fn test_completion_resets_like_stop() {
        let (mut timer, clock, _cues) = create_timer(config(1, 3, 3));
        timer.start();

        run_to_completion(&mut timer, &clock);

        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.current_round(), 1);
        assert_eq!(timer.time_remaining(), 3);
        assert_eq!(timer.progress(), 1.0);
        assert!(!timer.is_paused());
        assert_eq!(clock.active_subscriptions(), 0);
    }

    #[test]
    fn test_warnings_fire_once_per_long_phase() {
        let (mut timer, clock, cues) = create_timer(config(2, 30, 20));
        timer.start();

        run_to_completion(&mut timer, &clock);

        // Prepare, two work phases and one rest
        assert_eq!(cues.count(Cue::Warning), 4);
    }

    #[test]
    fn test_workout_can_be_repeated() {
        let (mut timer, clock, cues) = create_timer(config(1, 2, 1));

        timer.start();
        run_to_completion(&mut timer, &clock);
        timer.start();
        run_to_completion(&mut timer, &clock);

        assert_eq!(cues.count(Cue::RoundStart), 2);
        assert_eq!(cues.count(Cue::RoundEnd), 2);
    }
}

// ============================================================================
// Control Tests
// ============================================================================

mod control_tests {
    use super::*;

    /// Ticks needed from start to reach each active phase.
    fn ticks_to(phase: TimerPhase) -> u32 {
        match phase {
            TimerPhase::Prepare => 2,
            TimerPhase::Work => PREPARE_SECONDS + 2,
            TimerPhase::Rest => PREPARE_SECONDS + 20 + 2,
            TimerPhase::Idle => 0,
        }
    }

    #[test]
    fn test_stop_from_every_phase_and_pause_state() {
        for phase in [TimerPhase::Prepare, TimerPhase::Work, TimerPhase::Rest] {
            for paused in [false, true] {
                let (mut timer, clock, _cues) = create_timer(config(3, 20, 15));
                timer.start();
                tick_n(&mut timer, &clock, ticks_to(phase));
                assert_eq!(timer.phase(), phase);
                if paused {
                    timer.pause();
                }

                timer.stop();

                assert_eq!(timer.phase(), TimerPhase::Idle, "{:?} paused={}", phase, paused);
                assert_eq!(timer.current_round(), 1);
                assert!(!timer.is_paused());
                assert_eq!(timer.progress(), 1.0);
                assert_eq!(clock.active_subscriptions(), 0);
            }
        }
    }

    #[test]
    fn test_pause_resume_preserves_state_in_every_phase() {
        for phase in [TimerPhase::Prepare, TimerPhase::Work, TimerPhase::Rest] {
            let (mut timer, clock, _cues) = create_timer(config(3, 20, 15));
            timer.start();
            tick_n(&mut timer, &clock, ticks_to(phase));
            let before = timer.snapshot();

            timer.pause();
            tick_n(&mut timer, &clock, 5);
            timer.resume();

            let after = timer.snapshot();
            assert_eq!(after.phase, before.phase);
            assert_eq!(after.current_round, before.current_round);
            assert_eq!(after.time_remaining, before.time_remaining);
            assert!(!after.is_paused);

            tick(&mut timer, &clock);
            assert_eq!(timer.time_remaining(), before.time_remaining - 1);
        }
    }

    #[test]
    fn test_never_more_than_one_live_subscription() {
        let (mut timer, clock, _cues) = create_timer(config(2, 3, 2));
        timer.start();

        while timer.phase() != TimerPhase::Idle {
            assert!(clock.active_subscriptions() <= 1);
            timer.pause();
            assert_eq!(clock.active_subscriptions(), 0);
            timer.start();
            assert_eq!(clock.active_subscriptions(), 1);
            tick(&mut timer, &clock);
        }
        assert_eq!(clock.active_subscriptions(), 0);
    }

    #[test]
    fn test_progress_non_increasing_within_phase() {
        let (mut timer, clock, _cues) = create_timer(config(2, 7, 4));
        timer.start();

        let mut last = (timer.phase(), timer.current_round(), timer.progress());
        while timer.phase() != TimerPhase::Idle {
            tick(&mut timer, &clock);
            let now = (timer.phase(), timer.current_round(), timer.progress());
            if (now.0, now.1) == (last.0, last.1) {
                assert!(now.2 <= last.2);
            } else {
                assert_eq!(now.2, 1.0);
            }
            last = now;
        }
    }
}

// ============================================================================
// Observer Tests
// ============================================================================

mod observer_tests {
    use super::*;

    #[test]
    fn test_snapshot_receiver_tracks_phase_changes() {
        let (mut timer, clock, _cues) = create_timer(config(1, 2, 1));
        let snapshots = timer.subscribe();

        timer.start();
        assert_eq!(snapshots.borrow().phase, TimerPhase::Prepare);

        tick_n(&mut timer, &clock, PREPARE_SECONDS);
        assert_eq!(snapshots.borrow().phase, TimerPhase::Work);
        assert_eq!(snapshots.borrow().time_remaining, 2);

        tick_n(&mut timer, &clock, 2);
        assert_eq!(snapshots.borrow().phase, TimerPhase::Idle);
    }
}

// ============================================================================
// Tokio Clock Tests
// ============================================================================

mod tokio_clock_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_workout_runs_on_tokio_time() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = IntervalTimer::new(config(1, 3, 1), TokioClock::new(), ChannelNotifier::new(tx));

        let started = tokio::time::Instant::now();
        timer.start();
        while timer.phase() != TimerPhase::Idle {
            timer.wait_for_tick().await;
        }

        let expected = Duration::from_secs(u64::from(PREPARE_SECONDS) + 3);
        assert!(started.elapsed() >= expected);
        assert!(started.elapsed() < expected + Duration::from_secs(1));

        let mut cues = Vec::new();
        while let Ok(cue) = rx.try_recv() {
            cues.push(cue);
        }
        assert_eq!(cues, vec![Cue::Warning, Cue::RoundStart, Cue::RoundEnd]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_tick_interval() {
        let mut timer = IntervalTimer::new(
            config(2, 1, 1),
            TokioClock::new(),
            RecordingNotifier::new(),
        )
        .with_tick_interval(Duration::from_millis(10));

        let started = tokio::time::Instant::now();
        timer.start();
        while timer.phase() != TimerPhase::Idle {
            timer.wait_for_tick().await;
        }

        let expected = Duration::from_millis(10 * u64::from(PREPARE_SECONDS + 3));
        assert!(started.elapsed() >= expected);
        assert!(started.elapsed() < expected + Duration::from_millis(10));
    }
}

// ============================================================================
// Collaborator Tests
// ============================================================================

mod collaborator_tests {
    use super::*;

    #[test]
    fn test_sound_failure_does_not_affect_countdown() {
        let player = MockSoundPlayer::new();
        player.set_should_fail(true);
        let notifier = Arc::new(SoundCueNotifier::new(player, CueSounds::default()));
        let clock = ManualClock::new();
        let mut timer = IntervalTimer::new(config(2, 5, 3), clock.clone(), Arc::clone(&notifier));

        timer.start();
        let entries = run_to_completion(&mut timer, &clock);

        assert_eq!(entries.len(), 5);
        assert_eq!(notifier.player().play_count(), 0);
    }

    #[test]
    fn test_missing_sound_files_fall_back_to_tones() {
        let dir = tempfile::tempdir().unwrap();
        let sounds = CueSounds::discover(Some(dir.path()));
        let notifier = Arc::new(SoundCueNotifier::new(MockSoundPlayer::new(), sounds));
        let clock = ManualClock::new();
        let mut timer = IntervalTimer::new(config(1, 2, 1), clock.clone(), Arc::clone(&notifier));

        timer.start();
        run_to_completion(&mut timer, &clock);

        let calls = notifier.player().get_play_calls();
        assert_eq!(
            calls,
            vec![
                SoundSource::tone(Tone::Beep),
                SoundSource::tone(Tone::Alarm),
                SoundSource::tone(Tone::Alarm),
            ]
        );
    }

    #[test]
    fn test_undecodable_files_play_each_fallback_once() {
        let sounds = CueSounds {
            bell: SoundSource::file("boxing-bell", "/sounds/boxing-bell.mp3", Tone::Alarm),
            warning: SoundSource::file("gavel", "/sounds/gavel.mp3", Tone::Beep),
        };
        let player = MockSoundPlayer::new();
        player.set_fail_files(true);
        let notifier = Arc::new(SoundCueNotifier::new(player, sounds));
        let clock = ManualClock::new();
        let mut timer = IntervalTimer::new(config(1, 2, 1), clock.clone(), Arc::clone(&notifier));

        timer.start();
        run_to_completion(&mut timer, &clock);

        // One file attempt plus one tone per cue
        assert_eq!(notifier.player().attempt_count(), 6);
        assert_eq!(
            notifier.player().get_play_calls(),
            vec![
                SoundSource::tone(Tone::Beep),
                SoundSource::tone(Tone::Alarm),
                SoundSource::tone(Tone::Alarm),
            ]
        );
    }

    #[test]
    fn test_heart_rate_never_touches_timer() {
        let (mut timer, clock, _cues) = create_timer(config(2, 5, 3));
        let feed = HeartRateFeed::new();
        let readings = feed.subscribe();
        timer.start();
        tick_n(&mut timer, &clock, 4);
        let before = timer.snapshot();

        feed.set_state(ConnectionState::Connected);
        feed.record_measurement(&[0x00, 150]).unwrap();
        assert!(feed.record_measurement(&[0x01, 0x10]).is_err());
        feed.set_state(ConnectionState::Disconnected);

        assert_eq!(timer.snapshot(), before);
        assert_eq!(readings.borrow().bpm(), None);
    }
}
