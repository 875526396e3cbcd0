//! Common Types and Constants
//!
//! Shared data structures used across the scaffolding modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Constants ====================

/// Key the serialized mastery map is stored under
pub const DEFAULT_STORAGE_KEY: &str = "geogenie_mastery";

/// Inactivity window before a timeout downgrades the tier (ms)
pub const DEFAULT_TIMEOUT_MS: i64 = 10_000;

/// Responses faster than this count as quick (ms)
pub const DEFAULT_QUICK_RESPONSE_MS: i64 = 3_000;

/// Consecutive errors within one turn that trigger rescue mode
pub const DEFAULT_RESCUE_AFTER_ERRORS: u32 = 3;

/// Score below which an item needs more practice
pub const DEFAULT_PRACTICE_THRESHOLD: f64 = 0.7;

/// Score above which an item starts at the concept tier
pub const MASTERED_SCORE: f64 = 0.8;

/// Score above which an item starts at the position tier
pub const DEVELOPING_SCORE: f64 = 0.5;

/// Score above which an item starts at the appearance tier
pub const EMERGING_SCORE: f64 = 0.2;

// ==================== Hint Tiers ====================

/// How much help a hint gives.
///
/// Ordered by difficulty: `DirectCue` (1) gives the most help, `Concept` (4)
/// the least. Serialized as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum HintTier {
    /// "I will show you": the target is highlighted
    DirectCue = 1,
    /// What the item looks like ("the red one")
    Appearance = 2,
    /// Where the item is ("after Earth")
    Position = 3,
    /// An abstract clue ("the red planet")
    Concept = 4,
}

impl HintTier {
    pub const ALL: [HintTier; 4] = [
        HintTier::DirectCue,
        HintTier::Appearance,
        HintTier::Position,
        HintTier::Concept,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(HintTier::DirectCue),
            2 => Some(HintTier::Appearance),
            3 => Some(HintTier::Position),
            4 => Some(HintTier::Concept),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// One step more help, floored at `DirectCue`.
    pub fn downgrade(self) -> Self {
        match self {
            HintTier::Concept => HintTier::Position,
            HintTier::Position => HintTier::Appearance,
            HintTier::Appearance | HintTier::DirectCue => HintTier::DirectCue,
        }
    }

    pub fn is_direct_cue(self) -> bool {
        self == HintTier::DirectCue
    }
}

impl From<HintTier> for u8 {
    fn from(tier: HintTier) -> Self {
        tier.as_u8()
    }
}

impl TryFrom<u8> for HintTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        HintTier::from_u8(value).ok_or_else(|| format!("hint tier out of range: {value}"))
    }
}

impl fmt::Display for HintTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

// ==================== Mastery Types ====================

/// Durable proficiency record for one (level, item) pair.
///
/// Field names match the browser storage format so exported maps load as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    pub attempts: u32,
    pub successes: u32,
    #[serde(default)]
    pub last_seen: Option<i64>,
    #[serde(default, rename = "averageTime")]
    pub average_response_ms: Option<f64>,
}

impl MasteryRecord {
    /// `successes / attempts`, or 0 for an unattempted item.
    pub fn score(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes.min(self.attempts) as f64 / self.attempts as f64
    }
}

// ==================== Operation Results ====================

/// Result of recording a correct answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessOutcome {
    /// Answered faster than the quick-response window
    pub was_quick: bool,
    /// Mastery score after the update
    pub mastery_score: f64,
    /// Time since the last interaction (ms)
    pub elapsed_ms: i64,
}

/// Result of recording a wrong answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorOutcome {
    pub current_tier: HintTier,
    pub is_in_rescue_mode: bool,
    pub consecutive_errors: u32,
    /// What the learner clicked instead, if anything
    pub clicked_item: Option<String>,
    /// Present whenever rescue mode is active
    pub visual_command: Option<VisualCommand>,
}

/// Result of polling for inactivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeoutCheck {
    /// Still within the inactivity window; nothing changed
    Active,
    /// The window elapsed; the tier was downgraded and the clock restarted
    TimedOut {
        current_tier: HintTier,
        should_rescue: bool,
    },
}

impl TimeoutCheck {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TimeoutCheck::TimedOut { .. })
    }

    pub fn current_tier(&self) -> Option<HintTier> {
        match self {
            TimeoutCheck::TimedOut { current_tier, .. } => Some(*current_tier),
            TimeoutCheck::Active => None,
        }
    }

    pub fn should_rescue(&self) -> bool {
        matches!(
            self,
            TimeoutCheck::TimedOut {
                should_rescue: true,
                ..
            }
        )
    }
}

/// Command for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum VisualCommand {
    Highlight { target: String },
}

impl VisualCommand {
    pub fn highlight(target: impl Into<String>) -> Self {
        VisualCommand::Highlight {
            target: target.into(),
        }
    }
}
