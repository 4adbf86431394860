//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes only from the caller's clock
//! - Seeded RNG only
//! - No rendering or platform dependencies (storage goes through a trait)

pub mod area;
pub mod engine;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod timers;

pub use area::PlayArea;
pub use engine::{DEFAULT_VIEWPORT, SessionEngine};
pub use hit_test::{ClickOutcome, resolve_click};
pub use scoring::{HitOutcome, MissOutcome, on_hit, on_miss};
pub use spawn::SpawnScheduler;
pub use state::{
    STARTING_LEVEL, STARTING_LIVES, SessionEvent, SessionPhase, SessionSnapshot, SessionState,
    Target,
};
pub use timers::{COUNTDOWN_INTERVAL_MS, EXPIRY_POLL_INTERVAL_MS};
