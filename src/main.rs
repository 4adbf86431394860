//! Bubble Rush entry point
//!
//! On the web this exposes the engine to the page's JS presentation layer.
//! Natively it runs a headless autoplay session and logs the results.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use glam::Vec2;
    use wasm_bindgen::prelude::*;

    use bubble_rush::platform::{KeyValueStore, LocalStorage, MemoryStorage};
    use bubble_rush::{ClickOutcome, SessionEngine, Settings};

    type Store = Box<dyn KeyValueStore>;

    /// Game instance handed to JS
    #[wasm_bindgen]
    pub struct BubbleGame {
        engine: SessionEngine<Store>,
    }

    #[wasm_bindgen]
    impl BubbleGame {
        #[wasm_bindgen(constructor)]
        pub fn new(seed: f64) -> BubbleGame {
            let store: Store = match LocalStorage::open() {
                Ok(storage) => Box::new(storage),
                Err(e) => {
                    log::warn!("{e}, progress will not be saved");
                    Box::new(MemoryStorage::new())
                }
            };
            BubbleGame {
                engine: SessionEngine::new(store, seed as u64),
            }
        }

        pub fn set_viewport(&mut self, width: f32, height: f32) {
            self.engine.set_viewport(width, height);
        }

        /// Start with the stored settings
        pub fn start(&mut self) {
            let settings = self.engine.settings().clone();
            self.engine.start(&settings);
        }

        /// Start with settings from the settings panel (validated)
        pub fn start_with(&mut self, settings_json: &str) {
            let settings = Settings::from_json(settings_json);
            self.engine.start(&settings);
        }

        pub fn update_settings(&mut self, settings_json: &str) {
            match serde_json::from_str(settings_json) {
                Ok(raw) => self.engine.update_settings(&raw),
                Err(e) => log::warn!("Ignoring unreadable settings: {e}"),
            }
        }

        /// Advance to `now` (performance.now() ms)
        pub fn update(&mut self, now: f64) {
            self.engine.update(now.max(0.0) as u64);
        }

        /// Returns "hit", "miss" or "ignored"
        pub fn click(&mut self, x: f32, y: f32) -> String {
            match self.engine.click(Vec2::new(x, y)) {
                ClickOutcome::Hit => "hit",
                ClickOutcome::Miss => "miss",
                ClickOutcome::Ignored => "ignored",
            }
            .to_string()
        }

        pub fn pause(&mut self) {
            self.engine.pause();
        }

        pub fn resume(&mut self) {
            self.engine.resume();
        }

        pub fn surrender(&mut self) {
            self.engine.surrender();
        }

        pub fn snapshot_json(&self) -> String {
            serde_json::to_string(&self.engine.snapshot()).unwrap_or_default()
        }

        pub fn events_json(&mut self) -> String {
            serde_json::to_string(&self.engine.drain_events()).unwrap_or_default()
        }

        pub fn settings_json(&self) -> String {
            serde_json::to_string(self.engine.settings()).unwrap_or_default()
        }

        pub fn scores_json(&self) -> String {
            serde_json::to_string(self.engine.ledger().entries()).unwrap_or_default()
        }

        pub fn challenges_json(&self) -> String {
            let board: Vec<_> = self
                .engine
                .completed_challenges()
                .board()
                .into_iter()
                .map(|(c, completed)| {
                    serde_json::json!({
                        "id": c.id,
                        "title": c.title,
                        "description": c.description,
                        "isCompleted": completed,
                    })
                })
                .collect();
            serde_json::to_string(&board).unwrap_or_default()
        }

        pub fn best_streak(&self) -> u32 {
            self.engine.best_streak()
        }
    }

    #[wasm_bindgen(start)]
    pub fn wasm_main() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Bubble Rush (web) starting...");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bubble Rush (native) starting...");
    log::info!("Native mode runs a headless autoplay demo - serve the web build to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xB0B);

    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use bubble_rush::platform::MemoryStorage;
    use bubble_rush::{GameMode, SessionEngine, SessionEvent, Settings};

    /// ~60 fps
    const FRAME_MS: u64 = 16;
    /// Give up on a session after this much simulated time
    const MAX_SIM_MS: u64 = 10 * 60 * 1000;

    /// Simple bot: waits a human-ish reaction time, then clicks, sometimes badly
    struct Autoplayer {
        rng: Pcg32,
        aim_at: Option<(u64, Vec2)>,
    }

    impl Autoplayer {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                aim_at: None,
            }
        }

        fn plan(&mut self, spawned_at: u64, center: Vec2, radius: f32) {
            let reaction = self.rng.random_range(180..900);
            let point = if self.rng.random_bool(0.85) {
                center
            } else {
                center + Vec2::new(radius * 1.5, 0.0)
            };
            self.aim_at = Some((spawned_at + reaction, point));
        }

        fn click_due(&mut self, now: u64) -> Option<Vec2> {
            match self.aim_at {
                Some((at, point)) if now >= at => {
                    self.aim_at = None;
                    Some(point)
                }
                _ => None,
            }
        }
    }

    fn handle_events(engine: &mut SessionEngine<MemoryStorage>, bot: &mut Autoplayer) {
        for event in engine.drain_events() {
            match event {
                SessionEvent::TargetSpawned { target } => {
                    bot.plan(target.spawned_at, target.center(), target.radius());
                }
                SessionEvent::LevelUp { level } => log::info!("Level {level}"),
                SessionEvent::Ended {
                    record,
                    new_challenges,
                } => {
                    if let Some(record) = record {
                        let tags: Vec<_> = record.tags.iter().map(|t| t.label()).collect();
                        println!(
                            "{}: score {} | best combo {} | accuracy {:.1}% | tags {:?}",
                            record.mode.as_str(),
                            record.score,
                            record.max_combo,
                            record.accuracy,
                            tags
                        );
                    }
                    for id in new_challenges {
                        println!("Challenge completed: {id}");
                    }
                }
                _ => {}
            }
        }
    }

    pub fn run(seed: u64) {
        let mut engine = SessionEngine::new(MemoryStorage::new(), seed);
        let mut bot = Autoplayer::new(seed ^ 0x5EED);

        for mode in [GameMode::TimeTrial, GameMode::Survival] {
            let settings = Settings {
                game_mode: mode,
                duration: 15,
                ..Settings::default()
            };
            engine.start(&settings);

            let start = engine.now();
            let mut now = start;
            while engine.state().is_playing() && now - start < MAX_SIM_MS {
                now += FRAME_MS;
                engine.update(now);

                handle_events(&mut engine, &mut bot);

                if let Some(point) = bot.click_due(now) {
                    engine.click(point);
                }
            }
            engine.surrender();
            handle_events(&mut engine, &mut bot);
        }

        println!(
            "History: {} sessions, top score {}, best streak {}",
            engine.ledger().len(),
            engine.ledger().top_score().unwrap_or(0),
            engine.best_streak()
        );
    }
}
