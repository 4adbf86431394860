//! Game settings and preferences
//!
//! Persisted separately from score history. Everything read back from storage
//! (or handed over by the settings panel) goes through [`validate`], which
//! repairs each field independently instead of rejecting the whole blob.

use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::persistence::{self, SETTINGS_KEY};
use crate::platform::KeyValueStore;

/// Target size bounds (px)
pub const BUBBLE_SIZE_RANGE: RangeInclusive<u32> = 10..=300;
/// Post-hit respawn delay bounds (ms)
pub const SPAWN_DELAY_RANGE: RangeInclusive<u64> = 0..=5000;
/// Time-trial duration bounds (s)
pub const DURATION_RANGE: RangeInclusive<u32> = 5..=3600;
/// Pointer sensitivity bounds
pub const SENSITIVITY_RANGE: RangeInclusive<f32> = 0.1..=10.0;

/// Session rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// Fixed duration, score as much as possible
    #[default]
    TimeTrial,
    /// Three lives, targets shrink and expire faster every level
    Survival,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::TimeTrial => "Time Trial",
            GameMode::Survival => "Survival",
        }
    }
}

/// How much of the viewport the play area occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScreenMode {
    Full,
    #[default]
    Board,
    Compact,
}

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    /// User-tuned bubble size and spawn delay
    Custom,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Custom => "Custom",
        }
    }

    /// Preset (bubble size px, spawn delay ms); Custom has none
    pub fn preset(&self) -> Option<(u32, u64)> {
        match self {
            Difficulty::Easy => Some((80, 400)),
            Difficulty::Normal => Some((60, 200)),
            Difficulty::Hard => Some((40, 0)),
            Difficulty::Custom => None,
        }
    }
}

/// Crosshair glyph drawn by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CrosshairType {
    Dot,
    #[default]
    Cross,
    Circle,
    Plus,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub game_mode: GameMode,
    pub screen_mode: ScreenMode,
    pub difficulty: Difficulty,
    /// Target diameter (px)
    pub bubble_size: u32,
    /// Delay before the next target after a hit (ms, time trial only)
    pub spawn_delay: u64,
    /// Time-trial length (s)
    pub duration: u32,
    pub sound_enabled: bool,
    pub sensitivity: f32,
    pub crosshair_type: CrosshairType,
    /// `#rgb` or `#rrggbb`
    pub crosshair_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_mode: GameMode::TimeTrial,
            screen_mode: ScreenMode::Board,
            difficulty: Difficulty::Normal,
            bubble_size: 60,
            spawn_delay: 200,
            duration: 60,
            sound_enabled: true,
            sensitivity: 1.0,
            crosshair_type: CrosshairType::Cross,
            crosshair_color: "#00ff88".to_string(),
        }
    }
}

impl Settings {
    /// Apply a difficulty preset (Custom leaves size/delay untouched)
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        if let Some((size, delay)) = difficulty.preset() {
            self.bubble_size = size;
            self.spawn_delay = delay;
        }
    }

    /// Run programmatically-built settings through the validator
    pub fn sanitized(&self) -> Self {
        serde_json::to_value(self)
            .map(|v| validate(&v))
            .unwrap_or_default()
    }

    /// Parse a stored blob; anything unreadable yields defaults
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str::<Value>(json)
            .map(|v| validate(&v))
            .unwrap_or_default()
    }

    /// Load settings from storage, validated field by field
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load_value(store, SETTINGS_KEY) {
            Some(raw) => {
                log::info!("Loaded settings from storage");
                validate(&raw)
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings (errors logged and ignored)
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        persistence::save_json(store, SETTINGS_KEY, self);
    }
}

/// Sanitize untrusted configuration into safe [`Settings`]
///
/// Total: never fails. Numeric fields are clamped into range; wrong-typed,
/// missing or unknown values fall back to the field default.
pub fn validate(raw: &Value) -> Settings {
    let defaults = Settings::default();
    let Some(obj) = raw.as_object() else {
        return defaults;
    };

    Settings {
        game_mode: enum_field(obj, "gameMode").unwrap_or(defaults.game_mode),
        screen_mode: enum_field(obj, "screenMode").unwrap_or(defaults.screen_mode),
        difficulty: enum_field(obj, "difficulty").unwrap_or(defaults.difficulty),
        bubble_size: number_field(obj, "bubbleSize")
            .map(|v| clamp_round(v, *BUBBLE_SIZE_RANGE.start(), *BUBBLE_SIZE_RANGE.end()))
            .unwrap_or(defaults.bubble_size),
        spawn_delay: number_field(obj, "spawnDelay")
            .map(|v| {
                v.round()
                    .clamp(*SPAWN_DELAY_RANGE.start() as f64, *SPAWN_DELAY_RANGE.end() as f64)
                    as u64
            })
            .unwrap_or(defaults.spawn_delay),
        duration: number_field(obj, "duration")
            .map(|v| clamp_round(v, *DURATION_RANGE.start(), *DURATION_RANGE.end()))
            .unwrap_or(defaults.duration),
        sound_enabled: obj
            .get("soundEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.sound_enabled),
        sensitivity: number_field(obj, "sensitivity")
            .map(|v| {
                (v as f32).clamp(*SENSITIVITY_RANGE.start(), *SENSITIVITY_RANGE.end())
            })
            .unwrap_or(defaults.sensitivity),
        crosshair_type: enum_field(obj, "crosshairType").unwrap_or(defaults.crosshair_type),
        crosshair_color: obj
            .get("crosshairColor")
            .and_then(Value::as_str)
            .filter(|s| is_hex_color(s))
            .map(str::to_owned)
            .unwrap_or(defaults.crosshair_color),
    }
}

fn enum_field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    serde_json::from_value(obj.get(key)?.clone()).ok()
}

fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key)?.as_f64().filter(|v| v.is_finite())
}

fn clamp_round(v: f64, min: u32, max: u32) -> u32 {
    v.round().clamp(min as f64, max as f64) as u32
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use proptest::prelude::*;
    use serde_json::json;

    fn in_range(s: &Settings) -> bool {
        BUBBLE_SIZE_RANGE.contains(&s.bubble_size)
            && SPAWN_DELAY_RANGE.contains(&s.spawn_delay)
            && DURATION_RANGE.contains(&s.duration)
            && SENSITIVITY_RANGE.contains(&s.sensitivity)
            && is_hex_color(&s.crosshair_color)
    }

    #[test]
    fn test_default_roundtrip() {
        let defaults = Settings::default();
        let json = serde_json::to_string(&defaults).unwrap();
        assert_eq!(Settings::from_json(&json), defaults);
    }

    #[test]
    fn test_non_object_yields_defaults() {
        assert_eq!(validate(&json!(null)), Settings::default());
        assert_eq!(validate(&json!([1, 2, 3])), Settings::default());
        assert_eq!(Settings::from_json("{{{"), Settings::default());
    }

    #[test]
    fn test_fields_repaired_independently() {
        let raw = json!({
            "gameMode": "survival",
            "screenMode": "widescreen",
            "difficulty": "hard",
            "bubbleSize": 5000,
            "spawnDelay": -20,
            "duration": "sixty",
            "soundEnabled": "yes",
            "sensitivity": 0.5,
            "crosshairType": "circle",
            "crosshairColor": "red",
        });
        let s = validate(&raw);
        assert_eq!(s.game_mode, GameMode::Survival);
        assert_eq!(s.screen_mode, ScreenMode::Board);
        assert_eq!(s.difficulty, Difficulty::Hard);
        assert_eq!(s.bubble_size, 300);
        assert_eq!(s.spawn_delay, 0);
        assert_eq!(s.duration, 60);
        assert!(s.sound_enabled);
        assert!((s.sensitivity - 0.5).abs() < f32::EPSILON);
        assert_eq!(s.crosshair_type, CrosshairType::Circle);
        assert_eq!(s.crosshair_color, "#00ff88");
    }

    #[test]
    fn test_hex_color_forms() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#A0b1C2"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("#ggg"));
    }

    #[test]
    fn test_apply_difficulty() {
        let mut s = Settings::default();
        s.apply_difficulty(Difficulty::Hard);
        assert_eq!((s.bubble_size, s.spawn_delay), (40, 0));

        s.bubble_size = 123;
        s.apply_difficulty(Difficulty::Custom);
        assert_eq!(s.bubble_size, 123);
        assert_eq!(s.difficulty, Difficulty::Custom);
    }

    #[test]
    fn test_sanitized_clamps_programmatic_values() {
        let s = Settings {
            bubble_size: 1,
            duration: 99_999,
            ..Settings::default()
        };
        let s = s.sanitized();
        assert_eq!(s.bubble_size, 10);
        assert_eq!(s.duration, 3600);
    }

    #[test]
    fn test_load_save_through_storage() {
        let mut store = MemoryStorage::new();
        assert_eq!(Settings::load(&store), Settings::default());

        let mut s = Settings::default();
        s.game_mode = GameMode::Survival;
        s.screen_mode = ScreenMode::Compact;
        s.save(&mut store);
        assert_eq!(Settings::load(&store), s);

        store.set(SETTINGS_KEY, "\"garbage\"").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            (-1.0e7f64..1.0e7).prop_map(Value::from),
            "[a-z#0-9]{0,8}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn prop_validate_in_range_and_idempotent(
            mode in arb_value(),
            size in arb_value(),
            delay in arb_value(),
            duration in arb_value(),
            sensitivity in arb_value(),
            color in arb_value(),
        ) {
            let raw = json!({
                "gameMode": mode,
                "bubbleSize": size,
                "spawnDelay": delay,
                "duration": duration,
                "sensitivity": sensitivity,
                "crosshairColor": color,
            });
            let once = validate(&raw);
            prop_assert!(in_range(&once));
            let twice = validate(&serde_json::to_value(&once).unwrap());
            prop_assert_eq!(once, twice);
        }
    }
}
