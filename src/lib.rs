//! Bubble Rush - a reaction-time aim trainer
//!
//! Core modules:
//! - `sim`: Session state machine, scoring, spawning and timers
//! - `settings`: Player preferences and their validation
//! - `highscores`: Ranked score history
//! - `challenges`: Achievement definitions and completion tracking
//! - `persistence`: Typed JSON load/save over a key-value store
//! - `platform`: Browser/native platform abstraction

pub mod challenges;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use challenges::{CHALLENGES, Challenge, CompletedChallenges};
pub use highscores::{ScoreLedger, ScoreRecord, Tag};
pub use settings::{CrosshairType, Difficulty, GameMode, ScreenMode, Settings};
pub use sim::{ClickOutcome, SessionEngine, SessionEvent, SessionPhase, SessionState, Target};
