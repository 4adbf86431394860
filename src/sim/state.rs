//! Session state and core simulation types
//!
//! Everything the presentation layer renders comes from here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::area::PlayArea;
use crate::challenges::ChallengeId;
use crate::highscores::ScoreRecord;
use crate::settings::{Difficulty, GameMode};

/// Lives at the start of a survival session
pub const STARTING_LIVES: u8 = 3;
/// Survival level at session start
pub const STARTING_LEVEL: u32 = 1;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    /// No session started yet
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Timers stopped, stats frozen
    Paused,
    /// Session finished (terminal)
    Ended,
}

/// Canonical session stats, owned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub hits: u32,
    pub misses: u32,
    /// Seconds remaining (time trial)
    pub time_left: u32,
    /// Remaining lives (survival)
    pub lives: u8,
    /// Difficulty tier (survival)
    pub level: u32,
    /// Mode locked in at start
    pub mode: GameMode,
    /// Duration locked in at start (s)
    pub duration: u32,
    /// Difficulty locked in at start
    pub difficulty: Difficulty,
    pub phase: SessionPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(GameMode::default(), 0)
    }
}

impl SessionState {
    /// Fresh state for a session that has not started
    pub fn new(mode: GameMode, duration: u32) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            hits: 0,
            misses: 0,
            time_left: duration,
            lives: STARTING_LIVES,
            level: STARTING_LEVEL,
            mode,
            duration,
            difficulty: Difficulty::default(),
            phase: SessionPhase::Idle,
        }
    }

    /// Running or paused
    pub fn is_playing(&self) -> bool {
        matches!(self.phase, SessionPhase::Running | SessionPhase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Total resolved clicks/expiries
    pub fn attempts(&self) -> u32 {
        self.hits + self.misses
    }

    /// Hit percentage; 100 when nothing was attempted
    pub fn accuracy(&self) -> f64 {
        match self.attempts() {
            0 => 100.0,
            n => self.hits as f64 / n as f64 * 100.0,
        }
    }
}

/// The single live target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Left edge of the bounding square
    pub x: f32,
    /// Top edge of the bounding square
    pub y: f32,
    /// Diameter (px)
    pub size: f32,
    /// Engine clock (ms) when the target appeared
    pub spawned_at: u64,
}

impl Target {
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.radius(), self.y + self.radius())
    }

    /// Point-in-circle test
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance_squared(self.center()) <= self.radius() * self.radius()
    }

    /// Whether the whole bounding square lies inside `area`
    pub fn fits_in(&self, area: &PlayArea) -> bool {
        self.x >= area.x
            && self.y >= area.y
            && self.x + self.size <= area.right()
            && self.y + self.size <= area.bottom()
    }

    /// Move the target back inside `area` (top-left wins if it cannot fit)
    pub fn clamp_into(&mut self, area: &PlayArea) {
        let (min, max) = area.origin_range(self.size);
        self.x = self.x.clamp(min.x, max.x);
        self.y = self.y.clamp(min.y, max.y);
    }
}

/// Notifications for the presentation layer (sound cues, floating text, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    Started {
        mode: GameMode,
    },
    TargetSpawned {
        target: Target,
    },
    Hit {
        points: u64,
        reaction_time_ms: u64,
        combo: u32,
    },
    Miss {
        lives: u8,
    },
    /// Survival target timed out (followed by a Miss)
    TargetExpired,
    LevelUp {
        level: u32,
    },
    Paused,
    Resumed,
    Ended {
        /// Persisted record, if anything was attempted
        record: Option<ScoreRecord>,
        /// Challenges completed for the first time this session
        new_challenges: Vec<ChallengeId>,
    },
}

/// Everything needed to draw a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub target: Option<Target>,
    pub area: PlayArea,
}
