//! Hint Knowledge Base
//!
//! Per-level, per-item hint pools keyed by tier, plus the spoken phrase sets.
//! The engine only chooses a tier; this module turns (item, tier) into text.
//!
//! Four levels ship with the crate (`data/*.json`): `solar-system`,
//! `world-map`, `north-america` and `us-states`.

use std::collections::HashMap;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::types::HintTier;

const BUNDLED_LEVELS: [&str; 4] = [
    include_str!("../data/solar-system.json"),
    include_str!("../data/world-map.json"),
    include_str!("../data/north-america.json"),
    include_str!("../data/us-states.json"),
];

/// Hint for a level the knowledge base does not know
pub const GENERIC_HINT: &str = "Look carefully!";

const ITEM_PLACEHOLDER: &str = "{item}";

// ==================== Data ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityKnowledge {
    #[serde(default)]
    pub tier4: Vec<String>,
    #[serde(default)]
    pub tier3: Vec<String>,
    #[serde(default)]
    pub tier2: Vec<String>,
    #[serde(default)]
    pub fun_facts: Vec<String>,
}

impl EntityKnowledge {
    fn pool(&self, tier: HintTier) -> &[String] {
        match tier {
            HintTier::Concept => &self.tier4,
            HintTier::Position => &self.tier3,
            HintTier::Appearance => &self.tier2,
            HintTier::DirectCue => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phrases {
    pub correct: Vec<String>,
    pub encouragement: Vec<String>,
    pub level_complete: String,
}

impl Phrases {
    pub fn generic() -> Self {
        Self {
            correct: vec!["Good!".to_string()],
            encouragement: vec!["Try again!".to_string()],
            level_complete: "Great job! You finished this level!".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelKnowledge {
    pub level: String,
    /// Quiz prompt template, `{item}` is replaced by the target
    pub prompt: String,
    /// Hint for an item missing from `knowledge`
    pub unknown_hint: String,
    /// Fixed text for the direct-cue tier; levels without one reuse tier 2
    #[serde(default)]
    pub direct_cue: Option<String>,
    /// Items in play order
    pub items: Vec<String>,
    pub knowledge: HashMap<String, EntityKnowledge>,
    pub phrases: Phrases,
}

impl LevelKnowledge {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn entity(&self, item: &str) -> Option<&EntityKnowledge> {
        self.knowledge.get(item)
    }

    pub fn prompt_for(&self, item: &str) -> String {
        self.prompt.replace(ITEM_PLACEHOLDER, item)
    }

    pub fn unknown_hint_for(&self, item: &str) -> String {
        self.unknown_hint.replace(ITEM_PLACEHOLDER, item)
    }

    pub fn fun_facts(&self, item: &str) -> &[String] {
        self.entity(item).map(|e| e.fun_facts.as_slice()).unwrap_or(&[])
    }

    /// Every string `hint` could return for (item, tier).
    pub fn candidates(&self, item: &str, tier: HintTier) -> HintCandidates<'_> {
        let Some(entity) = self.entity(item) else {
            return HintCandidates::Fixed(self.unknown_hint_for(item));
        };

        if tier.is_direct_cue() {
            if let Some(cue) = &self.direct_cue {
                return HintCandidates::Fixed(cue.clone());
            }
        }

        let pool = entity.pool(tier);
        if !pool.is_empty() {
            return HintCandidates::Pool(pool);
        }
        if !entity.tier2.is_empty() {
            return HintCandidates::Pool(&entity.tier2);
        }
        HintCandidates::Fixed(self.unknown_hint_for(item))
    }
}

/// Candidate set for one (item, tier)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintCandidates<'a> {
    Fixed(String),
    Pool(&'a [String]),
}

impl HintCandidates<'_> {
    pub fn contains(&self, text: &str) -> bool {
        match self {
            HintCandidates::Fixed(fixed) => fixed == text,
            HintCandidates::Pool(pool) => pool.iter().any(|h| h == text),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            HintCandidates::Fixed(_) => 1,
            HintCandidates::Pool(pool) => pool.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==================== Knowledge Base ====================

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    levels: HashMap<String, LevelKnowledge>,
    generic_phrases: Phrases,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            levels: HashMap::new(),
            generic_phrases: Phrases::generic(),
        }
    }
}

impl KnowledgeBase {
    /// Knowledge base with the four bundled levels
    pub fn bundled() -> Result<Self, serde_json::Error> {
        let mut base = Self::default();
        for json in BUNDLED_LEVELS {
            base.insert(LevelKnowledge::from_json(json)?);
        }
        Ok(base)
    }

    pub fn insert(&mut self, level: LevelKnowledge) {
        self.levels.insert(level.level.clone(), level);
    }

    pub fn level(&self, level: &str) -> Option<&LevelKnowledge> {
        self.levels.get(level)
    }

    pub fn level_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.levels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Items of a level in play order; empty for an unknown level.
    pub fn items(&self, level: &str) -> &[String] {
        self.level(level).map(|l| l.items.as_slice()).unwrap_or(&[])
    }

    pub fn phrases(&self, level: &str) -> &Phrases {
        self.level(level)
            .map(|l| &l.phrases)
            .unwrap_or(&self.generic_phrases)
    }

    pub fn prompt_for(&self, level: &str, item: &str) -> String {
        match self.level(level) {
            Some(l) => l.prompt_for(item),
            None => format!("Find {item}!"),
        }
    }

    pub fn candidates(&self, level: &str, item: &str, tier: HintTier) -> HintCandidates<'_> {
        match self.level(level) {
            Some(l) => l.candidates(item, tier),
            None => HintCandidates::Fixed(GENERIC_HINT.to_string()),
        }
    }
}

// ==================== Hint Resolver ====================

/// Picks concrete text from candidate pools.
pub struct HintResolver {
    rng: ChaCha8Rng,
}

impl Default for HintResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HintResolver {
    /// Resolver seeded from the system clock
    pub fn new() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::with_seed(seed)
    }

    /// Reproducible resolver
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn hint(&mut self, base: &KnowledgeBase, level: &str, item: &str, tier: HintTier) -> String {
        match base.candidates(level, item, tier) {
            HintCandidates::Fixed(text) => text,
            HintCandidates::Pool(pool) => self
                .choose(pool)
                .map(str::to_string)
                .unwrap_or_else(|| GENERIC_HINT.to_string()),
        }
    }

    pub fn choose<'a>(&mut self, pool: &'a [String]) -> Option<&'a str> {
        pool.choose(&mut self.rng).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> KnowledgeBase {
        KnowledgeBase::bundled().unwrap()
    }

    #[test]
    fn test_bundled_levels_load() {
        let base = base();
        assert_eq!(
            base.level_names(),
            vec!["north-america", "solar-system", "us-states", "world-map"]
        );
        assert_eq!(base.items("solar-system").len(), 8);
        assert_eq!(base.items("us-states").len(), 50);
        assert_eq!(base.items("north-america"), ["Canada", "United States", "Mexico"]);
    }

    #[test]
    fn test_every_bundled_item_has_tier_pools() {
        let base = base();
        for name in base.level_names() {
            let level = base.level(name).unwrap();
            for item in &level.items {
                for tier in [HintTier::Concept, HintTier::Position, HintTier::Appearance] {
                    match level.candidates(item, tier) {
                        HintCandidates::Pool(pool) => assert!(!pool.is_empty()),
                        other => panic!("{name}/{item} tier {tier} fell back to {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn test_direct_cue_for_solar_system() {
        let base = base();
        let candidates = base.candidates("solar-system", "Mars", HintTier::DirectCue);
        assert_eq!(
            candidates,
            HintCandidates::Fixed("I'm making it glow! Tap the glowing planet!".to_string())
        );
    }

    #[test]
    fn test_direct_cue_falls_back_to_appearance_pool() {
        let base = base();
        let level = base.level("world-map").unwrap();
        let direct = level.candidates("Africa", HintTier::DirectCue);
        let appearance = level.candidates("Africa", HintTier::Appearance);
        assert_eq!(direct, appearance);
    }

    #[test]
    fn test_unknown_item_and_level_fallbacks() {
        let base = base();
        assert_eq!(
            base.candidates("solar-system", "Pluto", HintTier::Position),
            HintCandidates::Fixed("Look for Pluto!".to_string())
        );
        assert_eq!(
            base.candidates("us-states", "Puerto Rico", HintTier::Concept),
            HintCandidates::Fixed("Look for Puerto Rico! It might be near the middle.".to_string())
        );
        assert_eq!(
            base.candidates("moon-map", "Crater", HintTier::Concept),
            HintCandidates::Fixed(GENERIC_HINT.to_string())
        );
    }

    #[test]
    fn test_resolved_hint_is_a_candidate() {
        let base = base();
        let mut resolver = HintResolver::with_seed(7);
        for tier in HintTier::ALL {
            for _ in 0..20 {
                let hint = resolver.hint(&base, "solar-system", "Mars", tier);
                assert!(base.candidates("solar-system", "Mars", tier).contains(&hint));
            }
        }
    }

    #[test]
    fn test_seeded_resolvers_agree() {
        let base = base();
        let mut a = HintResolver::with_seed(99);
        let mut b = HintResolver::with_seed(99);
        for _ in 0..10 {
            assert_eq!(
                a.hint(&base, "us-states", "Texas", HintTier::Concept),
                b.hint(&base, "us-states", "Texas", HintTier::Concept)
            );
        }
    }

    #[test]
    fn test_prompts_and_phrases() {
        let base = base();
        assert_eq!(base.prompt_for("solar-system", "Mars"), "Find Mars!");
        assert_eq!(base.prompt_for("world-map", "Asia"), "Can you find Asia?");
        assert_eq!(base.prompt_for("north-america", "Mexico"), "Where is Mexico?");
        assert_eq!(base.prompt_for("us-states", "Ohio"), "Tap on Ohio!");
        assert_eq!(base.prompt_for("moon-map", "Crater"), "Find Crater!");
        assert_eq!(base.phrases("moon-map").encouragement, vec!["Try again!"]);
        assert!(!base.phrases("solar-system").correct.is_empty());
    }
}
