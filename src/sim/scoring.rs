//! Points, combo and level rules
//!
//! Pure functions of the current state; the engine applies the outcome.

use super::state::SessionState;
use crate::settings::{GameMode, Settings};

/// Base points for any hit
pub const BASE_POINTS: f64 = 100.0;
/// Maximum speed bonus (instant reaction)
pub const MAX_SPEED_BONUS: u64 = 100;
/// Bubble size that earns a 1.0 size multiplier (px)
pub const REFERENCE_SIZE: f64 = 150.0;
/// Extra multiplier per combo step
pub const COMBO_STEP: f64 = 0.1;
/// Survival level goes up every this many consecutive hits
pub const COMBO_PER_LEVEL: u32 = 10;
/// Score lost per miss
pub const MISS_PENALTY: u64 = 50;

/// Result of a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub points_awarded: u64,
    pub new_combo: u32,
    pub new_level: u32,
}

/// Result of a miss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissOutcome {
    pub new_combo: u32,
    pub new_lives: u8,
    pub new_score: u64,
    /// Survival ran out of lives
    pub terminal: bool,
}

/// Bonus for reacting quickly: one point lost per 10ms
pub fn speed_bonus(reaction_time_ms: u64) -> u64 {
    MAX_SPEED_BONUS.saturating_sub(reaction_time_ms / 10)
}

/// Smaller targets are worth proportionally more (unbounded as size shrinks)
pub fn size_multiplier(settings: &Settings) -> f64 {
    REFERENCE_SIZE / f64::from(settings.bubble_size.max(1))
}

pub fn combo_multiplier(combo: u32) -> f64 {
    1.0 + COMBO_STEP * f64::from(combo)
}

pub fn on_hit(state: &SessionState, settings: &Settings, reaction_time_ms: u64) -> HitOutcome {
    let raw = (BASE_POINTS + speed_bonus(reaction_time_ms) as f64)
        * size_multiplier(settings)
        * combo_multiplier(state.combo);
    let new_combo = state.combo.saturating_add(1);
    let levelled = state.mode == GameMode::Survival && new_combo % COMBO_PER_LEVEL == 0;

    HitOutcome {
        points_awarded: raw.round() as u64,
        new_combo,
        new_level: if levelled {
            state.level.saturating_add(1)
        } else {
            state.level
        },
    }
}

pub fn on_miss(state: &SessionState) -> MissOutcome {
    let new_lives = match state.mode {
        GameMode::Survival => state.lives.saturating_sub(1),
        GameMode::TimeTrial => state.lives,
    };
    MissOutcome {
        new_combo: 0,
        new_lives,
        new_score: state.score.saturating_sub(MISS_PENALTY),
        terminal: state.mode == GameMode::Survival && new_lives == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn time_trial() -> (SessionState, Settings) {
        let settings = Settings {
            bubble_size: 60,
            spawn_delay: 200,
            duration: 60,
            ..Settings::default()
        };
        (SessionState::new(GameMode::TimeTrial, 60), settings)
    }

    #[test]
    fn test_reference_hit_scores_475() {
        let (state, settings) = time_trial();
        assert_eq!(speed_bonus(100), 90);
        assert_eq!(size_multiplier(&settings), 2.5);
        assert_eq!(combo_multiplier(0), 1.0);

        let out = on_hit(&state, &settings, 100);
        assert_eq!(out.points_awarded, 475);
        assert_eq!(out.new_combo, 1);
        assert_eq!(out.new_level, 1);
    }

    #[test]
    fn test_slow_reaction_gets_no_bonus() {
        assert_eq!(speed_bonus(1000), 0);
        assert_eq!(speed_bonus(u64::MAX), 0);
        assert_eq!(speed_bonus(0), 100);
    }

    #[test]
    fn test_combo_uses_pre_increment_value() {
        let (mut state, settings) = time_trial();
        state.combo = 5;
        // (100 + 0) * 2.5 * 1.5
        assert_eq!(on_hit(&state, &settings, 5000).points_awarded, 375);
    }

    #[test]
    fn test_time_trial_never_levels() {
        let (mut state, settings) = time_trial();
        state.combo = 9;
        assert_eq!(on_hit(&state, &settings, 0).new_level, 1);
    }

    #[test]
    fn test_survival_level_at_tenth_combo() {
        let settings = Settings::default();
        let mut state = SessionState::new(GameMode::Survival, 60);
        for _ in 0..9 {
            let out = on_hit(&state, &settings, 300);
            state.combo = out.new_combo;
            state.level = out.new_level;
            assert_eq!(state.level, 1);
        }
        let out = on_hit(&state, &settings, 300);
        assert_eq!(out.new_combo, 10);
        assert_eq!(out.new_level, 2);
    }

    #[test]
    fn test_miss_penalty_floors_at_zero() {
        let (mut state, _) = time_trial();
        state.score = 30;
        state.combo = 7;
        let out = on_miss(&state);
        assert_eq!(out.new_score, 0);
        assert_eq!(out.new_combo, 0);
        assert_eq!(out.new_lives, 3);
        assert!(!out.terminal);
    }

    #[test]
    fn test_survival_last_life_is_terminal() {
        let mut state = SessionState::new(GameMode::Survival, 60);
        state.lives = 1;
        let out = on_miss(&state);
        assert_eq!(out.new_lives, 0);
        assert!(out.terminal);
    }

    proptest! {
        #[test]
        fn prop_faster_never_scores_less(
            fast in 0u64..5000,
            extra in 0u64..5000,
            combo in 0u32..200,
            size in 10u32..=300,
        ) {
            let settings = Settings { bubble_size: size, ..Settings::default() };
            let mut state = SessionState::new(GameMode::TimeTrial, 60);
            state.combo = combo;
            let quick = on_hit(&state, &settings, fast).points_awarded;
            let slow = on_hit(&state, &settings, fast + extra).points_awarded;
            prop_assert!(quick >= slow);
        }

        #[test]
        fn prop_misses_reset_combo_and_keep_score_non_negative(
            score in 0u64..10_000,
            combo in 0u32..100,
            misses in 1usize..50,
        ) {
            let mut state = SessionState::new(GameMode::TimeTrial, 60);
            state.score = score;
            state.combo = combo;
            for _ in 0..misses {
                let out = on_miss(&state);
                prop_assert!(out.new_score <= state.score);
                state.score = out.new_score;
                state.combo = out.new_combo;
            }
            prop_assert_eq!(state.combo, 0);
            prop_assert_eq!(state.score, score.saturating_sub(MISS_PENALTY * misses as u64));
        }
    }
}
