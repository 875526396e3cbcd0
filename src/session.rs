//! Session State
//!
//! Ephemeral per-turn state for the one active learner. Rescue mode always
//! implies the `DirectCue` tier; every mutation here keeps that true.

use serde::{Deserialize, Serialize};

use crate::types::HintTier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_target: Option<String>,
    pub consecutive_errors: u32,
    pub last_interaction_ms: i64,
    pub current_tier: HintTier,
    pub is_in_rescue_mode: bool,
}

impl SessionState {
    /// Fresh session: no target, least help.
    pub fn new(now_ms: i64) -> Self {
        Self {
            current_target: None,
            consecutive_errors: 0,
            last_interaction_ms: now_ms,
            current_tier: HintTier::Concept,
            is_in_rescue_mode: false,
        }
    }

    pub fn is_current_target(&self, target: &str) -> bool {
        self.current_target.as_deref() == Some(target)
    }

    /// Switches to a new target, clearing the turn-local counters.
    pub(crate) fn begin_turn(&mut self, target: &str, tier: HintTier, now_ms: i64) {
        self.current_target = Some(target.to_string());
        self.consecutive_errors = 0;
        self.is_in_rescue_mode = false;
        self.last_interaction_ms = now_ms;
        self.current_tier = tier;
    }

    /// One wrong answer: the tier drops on every error, and reaching
    /// `rescue_after` consecutive errors forces the direct cue.
    pub(crate) fn register_error(&mut self, rescue_after: u32) {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);

        if self.consecutive_errors >= 1 {
            self.current_tier = self.current_tier.downgrade();
        }

        if self.consecutive_errors >= rescue_after {
            self.is_in_rescue_mode = true;
            self.current_tier = HintTier::DirectCue;
        }
    }

    pub fn idle_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.last_interaction_ms
    }

    /// Inactivity step: one tier more help and the idle window restarts.
    /// Does not count as an error and never sets rescue mode.
    pub(crate) fn register_timeout(&mut self, now_ms: i64) {
        self.current_tier = self.current_tier.downgrade();
        self.last_interaction_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let state = SessionState::new(5);
        assert_eq!(state.current_target, None);
        assert_eq!(state.current_tier, HintTier::Concept);
        assert_eq!(state.consecutive_errors, 0);
        assert!(!state.is_in_rescue_mode);
        assert_eq!(state.last_interaction_ms, 5);
    }

    #[test]
    fn test_errors_step_down_then_rescue() {
        let mut state = SessionState::new(0);
        state.begin_turn("Mars", HintTier::Concept, 0);

        state.register_error(3);
        assert_eq!(state.current_tier, HintTier::Position);
        state.register_error(3);
        assert_eq!(state.current_tier, HintTier::Appearance);
        assert!(!state.is_in_rescue_mode);

        state.register_error(3);
        assert_eq!(state.current_tier, HintTier::DirectCue);
        assert!(state.is_in_rescue_mode);
    }

    #[test]
    fn test_rescue_is_sticky_until_new_turn() {
        let mut state = SessionState::new(0);
        state.begin_turn("Mars", HintTier::Position, 0);
        for _ in 0..5 {
            state.register_error(3);
        }
        assert!(state.is_in_rescue_mode);
        assert_eq!(state.consecutive_errors, 5);

        state.register_timeout(20_000);
        assert!(state.is_in_rescue_mode);
        assert_eq!(state.current_tier, HintTier::DirectCue);

        state.begin_turn("Venus", HintTier::Position, 30_000);
        assert!(!state.is_in_rescue_mode);
        assert_eq!(state.consecutive_errors, 0);
    }

    #[test]
    fn test_timeout_does_not_set_rescue() {
        let mut state = SessionState::new(0);
        state.begin_turn("Mars", HintTier::Appearance, 0);
        state.register_timeout(11_000);
        assert_eq!(state.current_tier, HintTier::DirectCue);
        assert!(!state.is_in_rescue_mode);
        assert_eq!(state.consecutive_errors, 0);
        assert_eq!(state.last_interaction_ms, 11_000);
    }
}
