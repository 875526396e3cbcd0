use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::{
    HintTier, DEFAULT_PRACTICE_THRESHOLD, DEFAULT_QUICK_RESPONSE_MS, DEFAULT_RESCUE_AFTER_ERRORS,
    DEFAULT_STORAGE_KEY, DEFAULT_TIMEOUT_MS, DEVELOPING_SCORE, EMERGING_SCORE, MASTERED_SCORE,
};

/// Score cut-offs used to pick a turn's starting tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub mastered: f64,
    pub developing: f64,
    pub emerging: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            mastered: MASTERED_SCORE,
            developing: DEVELOPING_SCORE,
            emerging: EMERGING_SCORE,
        }
    }
}

impl TierThresholds {
    /// Starting tier for a mastery score.
    ///
    /// Low and unseen scores start at `Position`, not `DirectCue`: a new item
    /// gets the same first hint as a moderately practised one.
    pub fn starting_tier(&self, score: f64) -> HintTier {
        if score > self.mastered {
            HintTier::Concept
        } else if score > self.developing {
            HintTier::Position
        } else if score > self.emerging {
            HintTier::Appearance
        } else {
            HintTier::Position
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldingConfig {
    pub storage_key: String,
    pub timeout_ms: i64,
    pub quick_response_ms: i64,
    pub rescue_after_errors: u32,
    pub practice_threshold: f64,
    pub tier_thresholds: TierThresholds,
}

impl Default for ScaffoldingConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            quick_response_ms: DEFAULT_QUICK_RESPONSE_MS,
            rescue_after_errors: DEFAULT_RESCUE_AFTER_ERRORS,
            practice_threshold: DEFAULT_PRACTICE_THRESHOLD,
            tier_thresholds: TierThresholds::default(),
        }
    }
}

impl ScaffoldingConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GEOGENIE_STORAGE_KEY") {
            if !val.trim().is_empty() {
                config.storage_key = val;
            }
        }
        // Windows must be positive; a non-positive timeout fires on every poll
        if let Ok(val) = std::env::var("GEOGENIE_TIMEOUT_MS") {
            config.timeout_ms = val
                .parse::<i64>()
                .ok()
                .filter(|ms| *ms > 0)
                .unwrap_or(config.timeout_ms);
        }
        if let Ok(val) = std::env::var("GEOGENIE_QUICK_RESPONSE_MS") {
            config.quick_response_ms = val
                .parse::<i64>()
                .ok()
                .filter(|ms| *ms > 0)
                .unwrap_or(config.quick_response_ms);
        }
        if let Ok(val) = std::env::var("GEOGENIE_RESCUE_AFTER_ERRORS") {
            config.rescue_after_errors = val
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(config.rescue_after_errors);
        }
        if let Ok(val) = std::env::var("GEOGENIE_PRACTICE_THRESHOLD") {
            config.practice_threshold = val
                .parse::<f64>()
                .ok()
                .filter(|t| (0.0..=1.0).contains(t))
                .unwrap_or(config.practice_threshold);
        }

        config
    }
}

/// Settings for the `geogenie` binary.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub log_level: String,
    pub data_dir: PathBuf,
    pub hint_seed: Option<u64>,
    pub scaffolding: ScaffoldingConfig,
}

impl CliConfig {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let data_dir = std::env::var("GEOGENIE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./geogenie-data"));

        let hint_seed = std::env::var("GEOGENIE_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());

        Self {
            log_level,
            data_dir,
            hint_seed,
            scaffolding: ScaffoldingConfig::from_env(),
        }
    }
}
