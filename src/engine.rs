//! Adaptive Scaffolding Engine
//!
//! Decides, turn by turn, how much help the learner gets:
//! - New turn: starting tier from the item's mastery score
//! - Wrong answer: one tier more help per error, rescue after repeated errors
//! - Inactivity: one tier more help per elapsed timeout window
//!
//! One engine serves one learner. Every operation runs to completion on the
//! caller's thread; callers sequence calls themselves.

use crate::clock::{Clock, SystemClock};
use crate::config::ScaffoldingConfig;
use crate::mastery::MasteryStore;
use crate::session::SessionState;
use crate::store::KeyValueStore;
use crate::types::{ErrorOutcome, HintTier, SuccessOutcome, TimeoutCheck, VisualCommand};

pub struct ScaffoldingEngine<S, C = SystemClock> {
    config: ScaffoldingConfig,
    mastery: MasteryStore<S>,
    session: SessionState,
    clock: C,
}

impl<S: KeyValueStore> ScaffoldingEngine<S, SystemClock> {
    pub fn new(store: S, config: ScaffoldingConfig) -> Self {
        Self::with_clock(store, config, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> ScaffoldingEngine<S, C> {
    pub fn with_clock(store: S, config: ScaffoldingConfig, clock: C) -> Self {
        let mastery = MasteryStore::load(store, config.storage_key.clone());
        let session = SessionState::new(clock.now_ms());
        Self {
            config,
            mastery,
            session,
            clock,
        }
    }

    pub fn config(&self) -> &ScaffoldingConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn mastery(&self) -> &MasteryStore<S> {
        &self.mastery
    }

    pub fn current_tier(&self) -> HintTier {
        self.session.current_tier
    }

    pub fn is_in_rescue_mode(&self) -> bool {
        self.session.is_in_rescue_mode
    }

    pub fn score(&self, item: &str, level: &str) -> f64 {
        self.mastery.score(item, level)
    }

    /// Starts a turn for `target` and returns its starting tier.
    ///
    /// Calling again with the current target is a no-op that returns the
    /// current tier: errors, rescue mode and the idle timer are kept, so a
    /// repeated start from a UI refresh cannot wipe an in-progress turn.
    pub fn start_turn(&mut self, target: &str, level: &str) -> HintTier {
        if self.session.is_current_target(target) {
            tracing::debug!(target = %target, "start_turn skipped, same target");
            return self.session.current_tier;
        }

        let score = self.mastery.score(target, level);
        let tier = self.config.tier_thresholds.starting_tier(score);
        tracing::debug!(
            target = %target,
            level = %level,
            previous = ?self.session.current_target,
            score,
            tier = %tier,
            "start_turn"
        );

        self.session.begin_turn(target, tier, self.clock.now_ms());
        tier
    }

    /// Records a correct answer. Tier and error count are left alone; the
    /// next `start_turn` resets them.
    pub fn record_success(&mut self, item: &str, level: &str) -> SuccessOutcome {
        let now = self.clock.now_ms();
        let elapsed_ms = self.session.idle_ms(now);
        let mastery_score = self.mastery.record_success(item, level, elapsed_ms, now);

        SuccessOutcome {
            was_quick: elapsed_ms < self.config.quick_response_ms,
            mastery_score,
            elapsed_ms,
        }
    }

    /// Records a wrong answer and steps the help level.
    pub fn record_error(&mut self, item: &str, level: &str, clicked_item: Option<&str>) -> ErrorOutcome {
        let now = self.clock.now_ms();
        self.mastery.record_attempt_failure(item, level, now);

        let was_rescue = self.session.is_in_rescue_mode;
        self.session.register_error(self.config.rescue_after_errors);

        tracing::debug!(
            item = %item,
            clicked = ?clicked_item,
            consecutive_errors = self.session.consecutive_errors,
            tier = %self.session.current_tier,
            "Error recorded"
        );
        if self.session.is_in_rescue_mode && !was_rescue {
            tracing::info!(item = %item, level = %level, "Rescue mode activated");
        }

        ErrorOutcome {
            current_tier: self.session.current_tier,
            is_in_rescue_mode: self.session.is_in_rescue_mode,
            consecutive_errors: self.session.consecutive_errors,
            clicked_item: clicked_item.map(str::to_string),
            visual_command: self
                .session
                .is_in_rescue_mode
                .then(|| VisualCommand::highlight(item)),
        }
    }

    /// Polls for inactivity. Past the timeout window the tier drops one step
    /// and the window restarts; otherwise nothing changes.
    pub fn check_timeout(&mut self) -> TimeoutCheck {
        let now = self.clock.now_ms();
        if self.session.idle_ms(now) <= self.config.timeout_ms {
            return TimeoutCheck::Active;
        }

        self.session.register_timeout(now);
        let current_tier = self.session.current_tier;
        tracing::debug!(tier = %current_tier, target = ?self.session.current_target, "Timeout");

        TimeoutCheck::TimedOut {
            current_tier,
            should_rescue: current_tier.is_direct_cue(),
        }
    }

    /// New game: fresh session, mastery untouched.
    pub fn reset_session(&mut self) {
        self.session = SessionState::new(self.clock.now_ms());
        tracing::debug!("Session reset");
    }

    // ==================== Practice Aggregation ====================

    /// Items below the practice threshold, weakest first. Ties keep input
    /// order.
    pub fn entities_needing_practice<'a, I>(&self, level: &str, all_items: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut scored: Vec<(&str, f64)> = all_items
            .into_iter()
            .map(|item| (item, self.mastery.score(item, level)))
            .filter(|(_, score)| *score < self.config.practice_threshold)
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.into_iter().map(|(item, _)| item.to_string()).collect()
    }

    /// True when every item scores at least `threshold`. An empty item list
    /// is mastered.
    pub fn is_level_mastered<'a, I>(&self, level: &str, all_items: I, threshold: f64) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        all_items
            .into_iter()
            .all(|item| self.mastery.score(item, level) >= threshold)
    }

    /// `is_level_mastered` at the configured practice threshold
    pub fn is_level_mastered_default<'a, I>(&self, level: &str, all_items: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.is_level_mastered(level, all_items, self.config.practice_threshold)
    }
}
