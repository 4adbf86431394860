//! Achievement challenges
//!
//! Challenge definitions are plain data: each one names a predicate from a
//! fixed set, so definitions stay serializable. Completion is tracked
//! separately as a persisted set of ids.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, CHALLENGES_KEY};
use crate::platform::KeyValueStore;
use crate::settings::GameMode;
use crate::sim::SessionState;

/// Stable challenge identifier (what gets persisted)
pub type ChallengeId = &'static str;

/// Condition a finished session must meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengePredicate {
    /// Reach level 5 in survival
    NoviceSurvivor,
    /// 90% accuracy over at least 50 hits
    PrecisionMaster,
    /// 50-hit combo
    ComboKing,
    /// Play a time trial of 5+ minutes to the end
    Marathon,
}

impl ChallengePredicate {
    /// Evaluate against final session stats. Must not have side effects.
    ///
    /// Only reads what was locked into the session at start, so settings
    /// edited mid-session can't change the outcome.
    pub fn holds(&self, state: &SessionState) -> bool {
        match self {
            ChallengePredicate::NoviceSurvivor => {
                state.mode == GameMode::Survival && state.level >= 5
            }
            ChallengePredicate::PrecisionMaster => {
                state.hits >= 50 && state.accuracy() >= 90.0
            }
            ChallengePredicate::ComboKing => state.max_combo >= 50,
            ChallengePredicate::Marathon => {
                state.mode == GameMode::TimeTrial
                    && state.duration >= 300
                    && state.time_left == 0
            }
        }
    }
}

/// A challenge definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub title: &'static str,
    pub description: &'static str,
    pub predicate: ChallengePredicate,
}

/// Every challenge in the game
pub const CHALLENGES: [Challenge; 4] = [
    Challenge {
        id: "novice_survivor",
        title: "Superviviente Novato",
        description: "Alcanza el nivel 5 en modo supervivencia",
        predicate: ChallengePredicate::NoviceSurvivor,
    },
    Challenge {
        id: "precision_master",
        title: "Maestro de Precisión",
        description: "90% de precisión con al menos 50 aciertos",
        predicate: ChallengePredicate::PrecisionMaster,
    },
    Challenge {
        id: "combo_king",
        title: "Rey del Combo",
        description: "Encadena un combo de 50",
        predicate: ChallengePredicate::ComboKing,
    },
    Challenge {
        id: "marathon",
        title: "Maratón",
        description: "Completa una contrarreloj de 5 minutos o más",
        predicate: ChallengePredicate::Marathon,
    },
];

/// Look up a challenge definition by id
pub fn find(id: &str) -> Option<&'static Challenge> {
    CHALLENGES.iter().find(|c| c.id == id)
}

/// Ids of every challenge the final stats satisfy
pub fn evaluate(state: &SessionState) -> Vec<ChallengeId> {
    CHALLENGES
        .iter()
        .filter(|c| c.predicate.holds(state))
        .map(|c| c.id)
        .collect()
}

/// Persisted set of completed challenge ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedChallenges {
    ids: Vec<String>,
}

impl CompletedChallenges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.ids.iter().any(|c| c == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add an id; returns true if it was not already completed
    pub fn insert(&mut self, id: &str) -> bool {
        if self.is_completed(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Union in the given ids, returning the newly completed ones
    pub fn merge(&mut self, ids: &[ChallengeId]) -> Vec<ChallengeId> {
        ids.iter().copied().filter(|id| self.insert(id)).collect()
    }

    /// Definitions paired with completion status, for display
    pub fn board(&self) -> Vec<(&'static Challenge, bool)> {
        CHALLENGES
            .iter()
            .map(|c| (c, self.is_completed(c.id)))
            .collect()
    }

    /// Load from storage; malformed content means nothing completed
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw: Vec<String> = persistence::load_json(store, CHALLENGES_KEY).unwrap_or_default();
        let mut completed = Self::new();
        for id in &raw {
            completed.insert(id);
        }
        log::info!("Loaded {} completed challenges", completed.len());
        completed
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        persistence::save_json(store, CHALLENGES_KEY, &self.ids);
    }
}
