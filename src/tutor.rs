//! Turn Orchestrator
//!
//! Sequences a game turn on top of the engine: announce the target, react to
//! a correct answer, a wrong click or inactivity, and speak the result. Speech
//! goes through an [`Announcer`]; rendering acts on the returned
//! [`VisualCommand`].

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::engine::ScaffoldingEngine;
use crate::knowledge::{HintResolver, KnowledgeBase};
use crate::store::KeyValueStore;
use crate::types::{HintTier, TimeoutCheck, VisualCommand};

// ==================== Collaborators ====================

/// Speech output. Fire-and-forget: game logic never waits on it.
pub trait Announcer {
    fn announce(&mut self, text: &str);
}

/// Logs announcements instead of speaking them
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnnouncer;

impl Announcer for TracingAnnouncer {
    fn announce(&mut self, text: &str) {
        tracing::info!(text = %text, "announce");
    }
}

/// Keeps everything announced, in order
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub lines: Vec<String>,
}

impl Transcript {
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}

impl Announcer for Transcript {
    fn announce(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

// ==================== Types ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Find the named item
    #[default]
    Quiz,
    /// Items are introduced with a fact; no praise is spoken
    Train,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Hint,
    TimeoutHint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
    pub tier: HintTier,
    pub is_rescue: bool,
    pub visual_command: Option<VisualCommand>,
    pub consecutive_errors: u32,
    pub mastery_score: Option<f64>,
    pub was_quick: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMasteryInfo {
    pub is_fully_mastered: bool,
    pub needs_practice: Vec<String>,
    pub mastered_count: usize,
    pub total_count: usize,
}

// ==================== GeoTutor ====================

pub struct GeoTutor<S, A, C = SystemClock> {
    engine: ScaffoldingEngine<S, C>,
    knowledge: KnowledgeBase,
    resolver: HintResolver,
    announcer: A,
}

impl<S: KeyValueStore, A: Announcer, C: Clock> GeoTutor<S, A, C> {
    pub fn new(
        engine: ScaffoldingEngine<S, C>,
        knowledge: KnowledgeBase,
        resolver: HintResolver,
        announcer: A,
    ) -> Self {
        Self {
            engine,
            knowledge,
            resolver,
            announcer,
        }
    }

    pub fn engine(&self) -> &ScaffoldingEngine<S, C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ScaffoldingEngine<S, C> {
        &mut self.engine
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn announcer(&self) -> &A {
        &self.announcer
    }

    pub fn start_turn(&mut self, target: &str, level: &str) -> HintTier {
        self.engine.start_turn(target, level)
    }

    pub fn reset_session(&mut self) {
        self.engine.reset_session();
    }

    fn pick_fun_fact(&mut self, level: &str, item: &str) -> Option<String> {
        let facts = self.knowledge.level(level)?.fun_facts(item);
        self.resolver.choose(facts).map(str::to_string)
    }

    fn pick_praise(&mut self, level: &str) -> String {
        let phrases = &self.knowledge.phrases(level).correct;
        self.resolver.choose(phrases).unwrap_or_default().to_string()
    }

    fn pick_encouragement(&mut self, level: &str) -> String {
        let phrases = &self.knowledge.phrases(level).encouragement;
        self.resolver.choose(phrases).unwrap_or_default().to_string()
    }

    /// Speaks the target prompt (quiz) or its introduction (train).
    pub fn announce_target(
        &mut self,
        target: &str,
        level: &str,
        mode: GameMode,
        specific_fact: Option<&str>,
    ) -> String {
        let message = match mode {
            GameMode::Quiz => self.knowledge.prompt_for(level, target),
            GameMode::Train => {
                let fact = match specific_fact {
                    Some(fact) => Some(fact.to_string()),
                    None => self.pick_fun_fact(level, target),
                };
                format!("This is {target}! {}", fact.unwrap_or_default())
                    .trim_end()
                    .to_string()
            }
        };

        self.announcer.announce(&message);
        message
    }

    pub fn handle_correct(&mut self, item: &str, level: &str, mode: GameMode) -> Feedback {
        let outcome = self.engine.record_success(item, level);

        let message = match mode {
            // The level screen already shows the fact; nothing is spoken
            GameMode::Train => "Great! Let's learn about the next one!".to_string(),
            GameMode::Quiz => {
                let fact = match self.pick_fun_fact(level, item) {
                    Some(fact) => fact,
                    None => self.pick_praise(level),
                };
                let message = format!("That's right! {fact}").trim_end().to_string();
                self.announcer.announce(&message);
                message
            }
        };

        Feedback {
            kind: FeedbackKind::Success,
            message,
            tier: self.engine.current_tier(),
            is_rescue: false,
            visual_command: None,
            consecutive_errors: self.engine.session().consecutive_errors,
            mastery_score: Some(outcome.mastery_score),
            was_quick: Some(outcome.was_quick),
        }
    }

    pub fn handle_incorrect(&mut self, target: &str, clicked: Option<&str>, level: &str) -> Feedback {
        let outcome = self.engine.record_error(target, level, clicked);

        let message = if outcome.is_in_rescue_mode {
            format!("I'll help you! {target} is glowing now. Tap the glowing one!")
        } else {
            let hint = self
                .resolver
                .hint(&self.knowledge, level, target, outcome.current_tier);
            let encouragement = self.pick_encouragement(level);
            let message = match clicked {
                Some(clicked) => format!("That's {clicked}! {encouragement} {hint}"),
                None => format!("{encouragement} {hint}"),
            };
            message.split_whitespace().collect::<Vec<_>>().join(" ")
        };

        self.announcer.announce(&message);

        Feedback {
            kind: FeedbackKind::Hint,
            message,
            tier: outcome.current_tier,
            is_rescue: outcome.is_in_rescue_mode,
            visual_command: outcome.visual_command,
            consecutive_errors: outcome.consecutive_errors,
            mastery_score: None,
            was_quick: None,
        }
    }

    /// Polls for inactivity; `None` while the learner is still within the
    /// window.
    pub fn handle_timeout(&mut self, target: &str, level: &str) -> Option<Feedback> {
        let TimeoutCheck::TimedOut {
            current_tier,
            should_rescue,
        } = self.engine.check_timeout()
        else {
            return None;
        };

        let (message, visual_command) = if should_rescue {
            (
                format!("Let me help you find {target}! Look where it's glowing!"),
                Some(VisualCommand::highlight(target)),
            )
        } else {
            let hint = self
                .resolver
                .hint(&self.knowledge, level, target, current_tier);
            (format!("Need a hint? {hint}"), None)
        };

        self.announcer.announce(&message);

        Some(Feedback {
            kind: FeedbackKind::TimeoutHint,
            message,
            tier: current_tier,
            is_rescue: should_rescue,
            visual_command,
            consecutive_errors: self.engine.session().consecutive_errors,
            mastery_score: None,
            was_quick: None,
        })
    }

    pub fn announce_level_complete(&mut self, level: &str) -> String {
        let message = self.knowledge.phrases(level).level_complete.clone();
        self.announcer.announce(&message);
        message
    }

    pub fn level_mastery_info<'a, I>(&self, level: &str, items: I) -> LevelMasteryInfo
    where
        I: IntoIterator<Item = &'a str>,
    {
        let items: Vec<&str> = items.into_iter().collect();
        let is_fully_mastered = self
            .engine
            .is_level_mastered_default(level, items.iter().copied());
        let needs_practice = self
            .engine
            .entities_needing_practice(level, items.iter().copied());

        LevelMasteryInfo {
            is_fully_mastered,
            mastered_count: items.len() - needs_practice.len(),
            total_count: items.len(),
            needs_practice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ScaffoldingConfig;
    use crate::knowledge::HintCandidates;
    use crate::store::MemoryStore;

    const LEVEL: &str = "solar-system";

    fn tutor() -> (GeoTutor<MemoryStore, Transcript, ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        let engine =
            ScaffoldingEngine::with_clock(MemoryStore::new(), ScaffoldingConfig::default(), clock.clone());
        let tutor = GeoTutor::new(
            engine,
            KnowledgeBase::bundled().unwrap(),
            HintResolver::with_seed(3),
            Transcript::default(),
        );
        (tutor, clock)
    }

    #[test]
    fn test_announce_target_modes() {
        let (mut tutor, _) = tutor();
        assert_eq!(tutor.announce_target("Mars", LEVEL, GameMode::Quiz, None), "Find Mars!");
        assert_eq!(
            tutor.announce_target("Mars", LEVEL, GameMode::Train, None),
            "This is Mars! Mars has big volcanoes!"
        );
        assert_eq!(
            tutor.announce_target("Mars", LEVEL, GameMode::Train, Some("It is red.")),
            "This is Mars! It is red."
        );
        assert_eq!(tutor.announce_target("Pluto", LEVEL, GameMode::Train, None), "This is Pluto!");
        assert_eq!(tutor.announcer().lines.len(), 4);
    }

    #[test]
    fn test_correct_answer_speaks_fun_fact() {
        let (mut tutor, _) = tutor();
        tutor.start_turn("Mars", LEVEL);
        let feedback = tutor.handle_correct("Mars", LEVEL, GameMode::Quiz);
        assert_eq!(feedback.kind, FeedbackKind::Success);
        assert_eq!(feedback.message, "That's right! Mars has big volcanoes!");
        assert_eq!(feedback.mastery_score, Some(1.0));
        assert_eq!(tutor.announcer().last(), Some("That's right! Mars has big volcanoes!"));
    }

    #[test]
    fn test_train_mode_correct_is_silent() {
        let (mut tutor, _) = tutor();
        tutor.start_turn("Mars", LEVEL);
        let feedback = tutor.handle_correct("Mars", LEVEL, GameMode::Train);
        assert_eq!(feedback.message, "Great! Let's learn about the next one!");
        assert!(tutor.announcer().lines.is_empty());
    }

    #[test]
    fn test_incorrect_hint_then_rescue() {
        let (mut tutor, _) = tutor();
        tutor.start_turn("Mars", LEVEL);

        let first = tutor.handle_incorrect("Mars", Some("Venus"), LEVEL);
        assert_eq!(first.kind, FeedbackKind::Hint);
        assert_eq!(first.tier, HintTier::Appearance);
        assert!(first.message.starts_with("That's Venus! "));
        let base = KnowledgeBase::bundled().unwrap();
        let candidates = base.candidates(LEVEL, "Mars", HintTier::Appearance);
        let HintCandidates::Pool(pool) = candidates else {
            panic!("expected a hint pool");
        };
        assert!(pool.iter().any(|hint| first.message.ends_with(hint.as_str())));

        tutor.handle_incorrect("Mars", None, LEVEL);
        let third = tutor.handle_incorrect("Mars", Some("Earth"), LEVEL);
        assert!(third.is_rescue);
        assert_eq!(third.tier, HintTier::DirectCue);
        assert_eq!(third.visual_command, Some(VisualCommand::highlight("Mars")));
        assert_eq!(third.message, "I'll help you! Mars is glowing now. Tap the glowing one!");
    }

    #[test]
    fn test_timeout_feedback() {
        let (mut tutor, clock) = tutor();
        tutor.start_turn("Mars", LEVEL);
        assert!(tutor.handle_timeout("Mars", LEVEL).is_none());

        clock.advance(11_000);
        let first = tutor.handle_timeout("Mars", LEVEL).unwrap();
        assert_eq!(first.kind, FeedbackKind::TimeoutHint);
        assert!(first.message.starts_with("Need a hint? "));
        assert!(!first.is_rescue);

        clock.advance(11_000);
        let second = tutor.handle_timeout("Mars", LEVEL).unwrap();
        assert!(second.is_rescue);
        assert_eq!(second.message, "Let me help you find Mars! Look where it's glowing!");
        assert_eq!(second.visual_command, Some(VisualCommand::highlight("Mars")));
    }

    #[test]
    fn test_level_mastery_info() {
        let (mut tutor, _) = tutor();
        for planet in ["Mercury", "Venus"] {
            tutor.start_turn(planet, LEVEL);
            tutor.handle_correct(planet, LEVEL, GameMode::Train);
        }
        let items = ["Mercury", "Venus", "Earth"];
        let info = tutor.level_mastery_info(LEVEL, items);
        assert!(!info.is_fully_mastered);
        assert_eq!(info.needs_practice, vec!["Earth"]);
        assert_eq!(info.mastered_count, 2);
        assert_eq!(info.total_count, 3);
    }

    #[test]
    fn test_level_complete_phrase() {
        let (mut tutor, _) = tutor();
        assert_eq!(
            tutor.announce_level_complete(LEVEL),
            "Wow! You found all the planets! You're a Space Explorer!"
        );
        assert_eq!(
            tutor.announce_level_complete("moon-map"),
            "Great job! You finished this level!"
        );
    }
}
