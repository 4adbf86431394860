//! Target spawning and lifetime rules
//!
//! Decides where the next target appears, how long to wait before it
//! appears, and (survival) when a live target has been ignored too long.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::area::PlayArea;
use super::state::Target;
use crate::settings::{GameMode, Settings};

/// Survival: smallest target size (px)
pub const MIN_SURVIVAL_SIZE: f32 = 30.0;
/// Survival: size lost per level (px)
pub const SURVIVAL_SHRINK_PER_LEVEL: f32 = 2.0;
/// Survival: respawn delay at level 0 (ms)
pub const SURVIVAL_BASE_DELAY_MS: u64 = 500;
/// Survival: respawn delay reduction per level (ms)
pub const SURVIVAL_DELAY_STEP_MS: u64 = 50;
/// Survival: target lifespan at level 0 (ms)
pub const SURVIVAL_BASE_LIFESPAN_MS: u64 = 3000;
/// Survival: lifespan reduction per level (ms)
pub const SURVIVAL_LIFESPAN_STEP_MS: u64 = 150;
/// Survival: shortest target lifespan (ms)
pub const MIN_LIFESPAN_MS: u64 = 600;

/// Diameter of the next target
pub fn target_size(settings: &Settings, mode: GameMode, level: u32) -> f32 {
    let base = settings.bubble_size as f32;
    match mode {
        GameMode::TimeTrial => base,
        GameMode::Survival => {
            (base - level as f32 * SURVIVAL_SHRINK_PER_LEVEL).max(MIN_SURVIVAL_SIZE)
        }
    }
}

/// Wait between a hit and the next spawn (ms)
pub fn next_respawn_delay(settings: &Settings, mode: GameMode, level: u32) -> u64 {
    match mode {
        GameMode::TimeTrial => settings.spawn_delay,
        GameMode::Survival => SURVIVAL_BASE_DELAY_MS
            .saturating_sub(u64::from(level).saturating_mul(SURVIVAL_DELAY_STEP_MS)),
    }
}

/// How long a survival target stays up before counting as a miss (ms)
pub fn lifespan(level: u32) -> u64 {
    SURVIVAL_BASE_LIFESPAN_MS
        .saturating_sub(u64::from(level).saturating_mul(SURVIVAL_LIFESPAN_STEP_MS))
        .max(MIN_LIFESPAN_MS)
}

/// Whether `target` has outlived its survival lifespan at `now`
pub fn is_expired(target: &Target, now: u64, level: u32) -> bool {
    now.saturating_sub(target.spawned_at) > lifespan(level)
}

/// Seeded target placement
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    rng: Pcg32,
}

impl SpawnScheduler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Place a new target uniformly inside `area`
    pub fn spawn(
        &mut self,
        area: &PlayArea,
        settings: &Settings,
        mode: GameMode,
        level: u32,
        now: u64,
    ) -> Target {
        let size = target_size(settings, mode, level);
        let (min, max) = area.origin_range(size);
        Target {
            x: self.rng.random_range(min.x..=max.x),
            y: self.rng.random_range(min.y..=max.y),
            size,
            spawned_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(size: u32) -> Settings {
        Settings {
            bubble_size: size,
            ..Settings::default()
        }
    }

    #[test]
    fn test_survival_size_shrinks_to_floor() {
        let s = settings(60);
        assert_eq!(target_size(&s, GameMode::TimeTrial, 20), 60.0);
        assert_eq!(target_size(&s, GameMode::Survival, 1), 58.0);
        assert_eq!(target_size(&s, GameMode::Survival, 10), 40.0);
        assert_eq!(target_size(&s, GameMode::Survival, 50), 30.0);
        // Settings already below the floor are lifted to it
        assert_eq!(target_size(&settings(20), GameMode::Survival, 1), 30.0);
    }

    #[test]
    fn test_respawn_delay() {
        let s = Settings {
            spawn_delay: 750,
            ..Settings::default()
        };
        assert_eq!(next_respawn_delay(&s, GameMode::TimeTrial, 9), 750);
        assert_eq!(next_respawn_delay(&s, GameMode::Survival, 1), 450);
        assert_eq!(next_respawn_delay(&s, GameMode::Survival, 10), 0);
        assert_eq!(next_respawn_delay(&s, GameMode::Survival, 500), 0);
    }

    #[test]
    fn test_lifespan_and_expiry() {
        assert_eq!(lifespan(1), 2850);
        assert_eq!(lifespan(16), 600);
        assert_eq!(lifespan(u32::MAX), 600);

        let t = Target {
            x: 0.0,
            y: 0.0,
            size: 30.0,
            spawned_at: 1000,
        };
        assert!(!is_expired(&t, 3850, 1));
        assert!(is_expired(&t, 3851, 1));
        // Clock earlier than spawn never expires
        assert!(!is_expired(&t, 0, 1));
    }

    #[test]
    fn test_spawn_fits_area() {
        let area = PlayArea::new(50.0, 80.0, 300.0, 200.0);
        let mut spawner = SpawnScheduler::new(42);
        let s = settings(60);
        for i in 0..200 {
            let t = spawner.spawn(&area, &s, GameMode::TimeTrial, 1, i);
            assert!(t.fits_in(&area), "{t:?} outside {area:?}");
            assert_eq!(t.spawned_at, i);
        }
    }

    #[test]
    fn test_spawn_in_tiny_area_pins_to_origin() {
        let area = PlayArea::new(5.0, 7.0, 20.0, 20.0);
        let mut spawner = SpawnScheduler::new(1);
        let t = spawner.spawn(&area, &settings(100), GameMode::TimeTrial, 1, 0);
        assert_eq!((t.x, t.y), (5.0, 7.0));
    }

    #[test]
    fn test_same_seed_same_positions() {
        let area = PlayArea::new(0.0, 0.0, 800.0, 600.0);
        let s = Settings::default();
        let mut a = SpawnScheduler::new(7);
        let mut b = SpawnScheduler::new(7);
        for _ in 0..10 {
            assert_eq!(
                a.spawn(&area, &s, GameMode::Survival, 3, 0),
                b.spawn(&area, &s, GameMode::Survival, 3, 0)
            );
        }
    }
}
