//! Score history ledger
//!
//! Persisted as a JSON array, ranked by score, keeps the top 50 sessions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persistence::{self, SCORES_KEY};
use crate::platform::KeyValueStore;
use crate::settings::{Difficulty, GameMode};
use crate::sim::SessionState;

/// Maximum number of records to keep
pub const MAX_HIGH_SCORES: usize = 50;

/// Post-session badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    /// Accuracy of 95% or better
    #[serde(rename = "Cirujano")]
    Surgeon,
    /// Max combo of 30 or more
    #[serde(rename = "Ninja")]
    Ninja,
    /// Score above 50 000
    #[serde(rename = "Leyenda")]
    Legend,
    /// More than two hits per second of session duration
    #[serde(rename = "Flash")]
    Flash,
}

impl Tag {
    pub fn label(&self) -> &'static str {
        match self {
            Tag::Surgeon => "Cirujano",
            Tag::Ninja => "Ninja",
            Tag::Legend => "Leyenda",
            Tag::Flash => "Flash",
        }
    }

    /// Tags earned by a finished session, in display order
    pub fn derive(state: &SessionState, accuracy: f64) -> Vec<Tag> {
        let hits_per_sec = f64::from(state.hits) / f64::from(state.duration.max(1));
        [
            (Tag::Surgeon, accuracy >= 95.0),
            (Tag::Ninja, state.max_combo >= 30),
            (Tag::Legend, state.score > 50_000),
            (Tag::Flash, hits_per_sec > 2.0),
        ]
        .into_iter()
        .filter_map(|(tag, earned)| earned.then_some(tag))
        .collect()
    }
}

/// A finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: u64,
    /// Unix timestamp (ms) when the session ended
    pub date: f64,
    pub score: u64,
    pub max_combo: u32,
    /// Hit percentage (0-100)
    pub accuracy: f64,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl ScoreRecord {
    /// Build the record for a finished session
    pub fn from_session(id: u64, date: f64, state: &SessionState) -> Self {
        let accuracy = state.accuracy();
        Self {
            id,
            date,
            score: state.score,
            max_combo: state.max_combo,
            accuracy,
            difficulty: state.difficulty,
            mode: state.mode,
            tags: Tag::derive(state, accuracy),
        }
    }
}

/// Ranked score history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreLedger {
    entries: Vec<ScoreRecord>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records, best first
    pub fn entries(&self) -> &[ScoreRecord] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Longest combo across all kept sessions
    pub fn best_streak(&self) -> u32 {
        self.entries.iter().map(|e| e.max_combo).max().unwrap_or(0)
    }

    /// Insert a record in memory without persisting
    ///
    /// Returns the rank achieved (1-indexed), or None if it fell off the end.
    pub fn insert(&mut self, entry: ScoreRecord) -> Option<usize> {
        let id = entry.id;
        self.entries.insert(0, entry);
        // Stable: a new record ranks ahead of older equal scores
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
        self.entries.iter().position(|e| e.id == id).map(|i| i + 1)
    }

    /// Insert a record and persist the ledger (persistence faults are logged)
    pub fn record(&mut self, entry: ScoreRecord, store: &mut dyn KeyValueStore) -> Option<usize> {
        let rank = self.insert(entry);
        self.save(store);
        rank
    }

    /// Load from storage; malformed content means an empty history
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(Value::Array(items)) = persistence::load_value(store, SCORES_KEY) else {
            log::info!("No score history found, starting fresh");
            return Self::new();
        };

        let total = items.len();
        let mut entries: Vec<ScoreRecord> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if entries.len() < total {
            log::warn!("Dropped {} malformed score records", total - entries.len());
        }
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);

        log::info!("Loaded {} score records", entries.len());
        Self { entries }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        persistence::save_json(store, SCORES_KEY, &self.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    fn record(id: u64, score: u64, max_combo: u32) -> ScoreRecord {
        ScoreRecord {
            id,
            date: 0.0,
            score,
            max_combo,
            accuracy: 100.0,
            difficulty: Difficulty::Normal,
            mode: GameMode::TimeTrial,
            tags: Vec::new(),
        }
    }

    fn finished(hits: u32, misses: u32, max_combo: u32, score: u64, duration: u32) -> SessionState {
        SessionState {
            hits,
            misses,
            max_combo,
            score,
            ..SessionState::new(GameMode::TimeTrial, duration)
        }
    }

    #[test]
    fn test_keeps_top_50_of_51() {
        let mut ledger = ScoreLedger::new();
        for i in 0..51u64 {
            // Scores 100, 200, ... inserted in scrambled order
            let score = ((i * 37) % 51 + 1) * 100;
            ledger.insert(record(i, score, 0));
        }
        assert_eq!(ledger.len(), MAX_HIGH_SCORES);
        assert_eq!(ledger.top_score(), Some(5100));
        assert_eq!(ledger.entries().last().map(|e| e.score), Some(200));
        assert!(ledger.entries().windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_insert_reports_rank() {
        let mut ledger = ScoreLedger::new();
        assert_eq!(ledger.insert(record(1, 500, 0)), Some(1));
        assert_eq!(ledger.insert(record(2, 900, 0)), Some(1));
        assert_eq!(ledger.insert(record(3, 100, 0)), Some(3));
        // Ties rank ahead of older entries
        assert_eq!(ledger.insert(record(4, 500, 0)), Some(2));
    }

    #[test]
    fn test_low_score_falls_off_full_ledger() {
        let mut ledger = ScoreLedger::new();
        for i in 0..MAX_HIGH_SCORES as u64 {
            ledger.insert(record(i, 1000 + i, 0));
        }
        assert_eq!(ledger.insert(record(999, 1, 0)), None);
        assert_eq!(ledger.len(), MAX_HIGH_SCORES);
    }

    #[test]
    fn test_best_streak() {
        let mut ledger = ScoreLedger::new();
        assert_eq!(ledger.best_streak(), 0);
        ledger.insert(record(1, 10, 12));
        ledger.insert(record(2, 99, 4));
        assert_eq!(ledger.best_streak(), 12);
    }

    #[test]
    fn test_persist_and_reload() {
        let mut store = MemoryStorage::new();
        let mut ledger = ScoreLedger::new();
        ledger.record(record(1, 300, 2), &mut store);
        ledger.record(record(2, 700, 5), &mut store);

        let loaded = ScoreLedger::load(&store);
        assert_eq!(loaded, ledger);
        assert_eq!(loaded.top_score(), Some(700));
    }

    #[test]
    fn test_malformed_history_is_empty() {
        let mut store = MemoryStorage::new();
        store.set(SCORES_KEY, "{\"entries\": []}").unwrap();
        assert!(ScoreLedger::load(&store).is_empty());

        store.set(SCORES_KEY, "not json").unwrap();
        assert!(ScoreLedger::load(&store).is_empty());
    }

    #[test]
    fn test_bad_elements_dropped() {
        let mut store = MemoryStorage::new();
        let good = serde_json::to_value(record(7, 42, 1)).unwrap();
        let raw = serde_json::json!([good, {"score": "lots"}, 17]);
        store.set(SCORES_KEY, &raw.to_string()).unwrap();

        let ledger = ScoreLedger::load(&store);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].id, 7);
    }

    #[test]
    fn test_quota_failure_keeps_memory_state() {
        let mut store = MemoryStorage::with_quota(10);
        let mut ledger = ScoreLedger::new();
        assert_eq!(ledger.record(record(1, 300, 2), &mut store), Some(1));
        assert_eq!(ledger.len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_tags_in_display_order() {
        let state = finished(130, 0, 40, 60_000, 60);
        let tags = Tag::derive(&state, state.accuracy());
        assert_eq!(tags, vec![Tag::Surgeon, Tag::Ninja, Tag::Legend, Tag::Flash]);
    }

    #[test]
    fn test_tag_thresholds() {
        // 94% accuracy, combo 29, score exactly 50 000, exactly 2 hits/s
        let state = finished(94, 6, 29, 50_000, 47);
        assert!(Tag::derive(&state, state.accuracy()).is_empty());

        let state = finished(95, 5, 30, 50_001, 60);
        assert_eq!(
            Tag::derive(&state, state.accuracy()),
            vec![Tag::Surgeon, Tag::Ninja, Tag::Legend]
        );
    }

    #[test]
    fn test_tag_labels_serialize_as_badges() {
        let json = serde_json::to_string(&vec![Tag::Surgeon, Tag::Legend]).unwrap();
        assert_eq!(json, "[\"Cirujano\",\"Leyenda\"]");
        assert_eq!(Tag::Flash.label(), "Flash");
    }
}
