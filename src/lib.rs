//! # geogenie-scaffold - adaptive hint scaffolding for the GeoGenie tutor
//!
//! Decides how much help a young learner gets while finding places on a map:
//!
//! - **Mastery Store** - durable per-(level, item) attempts and successes
//! - **Tier Selection** - the starting hint tier for a turn, from mastery
//! - **Error / Timeout Tracking** - within-turn back-off toward more help,
//!   ending in a sticky rescue mode with a direct visual cue
//! - **Practice Aggregation** - weakest-first practice lists, level mastery
//!
//! Tiers run from 4 (`Concept`, least help) to 1 (`DirectCue`, most help).
//!
//! ## Modules
//!
//! - [`engine`] - `ScaffoldingEngine`, the per-learner state machine
//! - [`mastery`] - mastery records and their persistence
//! - [`session`] - ephemeral turn state
//! - [`store`] - `KeyValueStore` bindings (memory, files)
//! - [`knowledge`] - hint pools and phrase sets for the bundled levels
//! - [`tutor`] - turn orchestration: prompts, feedback, speech
//! - [`config`] / [`logging`] / [`clock`] - ambient plumbing
//!
//! ## Example
//!
//! ```rust
//! use geogenie_scaffold::{HintTier, MemoryStore, ScaffoldingConfig, ScaffoldingEngine};
//!
//! let mut engine = ScaffoldingEngine::new(MemoryStore::new(), ScaffoldingConfig::default());
//! assert_eq!(engine.start_turn("Mars", "solar-system"), HintTier::Position);
//!
//! let outcome = engine.record_error("Mars", "solar-system", Some("Venus"));
//! assert_eq!(outcome.current_tier, HintTier::Appearance);
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod logging;
pub mod mastery;
pub mod session;
pub mod store;
pub mod tutor;
pub mod types;

pub use types::*;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CliConfig, ScaffoldingConfig, TierThresholds};
pub use engine::ScaffoldingEngine;
pub use error::{StoreError, StoreResult};
pub use knowledge::{HintCandidates, HintResolver, KnowledgeBase, LevelKnowledge};
pub use mastery::MasteryStore;
pub use session::SessionState;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use tutor::{
    Announcer, Feedback, FeedbackKind, GameMode, GeoTutor, LevelMasteryInfo, TracingAnnouncer,
    Transcript,
};
