//! Warning cue policy.
//!
//! A warning fires when a tick carries the countdown from above a phase's
//! threshold to at-or-below it, once per phase entry. A phase that begins at
//! or below its threshold never warns, and the tick that reaches zero ends
//! the phase instead of warning.

use crate::types::TimerPhase;

/// Default threshold for work and rest phases.
pub const DEFAULT_ROUND_WARNING: u32 = 10;

/// Default threshold for the warm-up countdown.
pub const DEFAULT_PREPARE_WARNING: u32 = 3;

/// Per-phase warning thresholds. `None` disables the warning for that phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningPolicy {
    pub prepare: Option<u32>,
    pub work: Option<u32>,
    pub rest: Option<u32>,
}

impl Default for WarningPolicy {
    fn default() -> Self {
        Self {
            prepare: Some(DEFAULT_PREPARE_WARNING),
            work: Some(DEFAULT_ROUND_WARNING),
            rest: Some(DEFAULT_ROUND_WARNING),
        }
    }
}

impl WarningPolicy {
    /// Policy with every warning disabled.
    pub fn silent() -> Self {
        Self {
            prepare: None,
            work: None,
            rest: None,
        }
    }

    /// Returns the threshold for the given phase.
    pub fn threshold(&self, phase: TimerPhase) -> Option<u32> {
        match phase {
            TimerPhase::Idle => None,
            TimerPhase::Prepare => self.prepare,
            TimerPhase::Work => self.work,
            TimerPhase::Rest => self.rest,
        }
    }

    /// Returns true if moving from `previous` to `remaining` crosses the
    /// phase's threshold.
    pub fn crosses(&self, phase: TimerPhase, previous: u32, remaining: u32) -> bool {
        match self.threshold(phase) {
            Some(threshold) => remaining > 0 && previous > threshold && remaining <= threshold,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let policy = WarningPolicy::default();
        assert_eq!(policy.threshold(TimerPhase::Prepare), Some(3));
        assert_eq!(policy.threshold(TimerPhase::Work), Some(10));
        assert_eq!(policy.threshold(TimerPhase::Rest), Some(10));
        assert_eq!(policy.threshold(TimerPhase::Idle), None);
    }

    #[test]
    fn test_crosses_exactly_at_threshold() {
        let policy = WarningPolicy::default();
        assert!(policy.crosses(TimerPhase::Work, 11, 10));
        assert!(!policy.crosses(TimerPhase::Work, 12, 11));
        assert!(!policy.crosses(TimerPhase::Work, 10, 9));
    }

    #[test]
    fn test_prepare_uses_its_own_threshold() {
        let policy = WarningPolicy::default();
        assert!(!policy.crosses(TimerPhase::Prepare, 11, 10));
        assert!(policy.crosses(TimerPhase::Prepare, 4, 3));
    }

    #[test]
    fn test_reaching_zero_never_warns() {
        let policy = WarningPolicy {
            work: Some(0),
            ..WarningPolicy::default()
        };
        assert!(!policy.crosses(TimerPhase::Work, 1, 0));
    }

    #[test]
    fn test_silent_policy() {
        let policy = WarningPolicy::silent();
        assert!(!policy.crosses(TimerPhase::Work, 11, 10));
        assert!(!policy.crosses(TimerPhase::Prepare, 4, 3));
    }
}
