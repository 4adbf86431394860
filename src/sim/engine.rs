//! Session state machine
//!
//! `Idle -> Running <-> Paused -> Ended`. The engine owns the session state,
//! the live target and every timer; the presentation layer feeds it discrete
//! commands plus the current clock via [`SessionEngine::update`], and reads
//! back snapshots and events.
//!
//! Commands that don't make sense in the current phase are ignored, since
//! duplicate or out-of-order input from the UI is expected.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde_json::Value;

use super::area::PlayArea;
use super::hit_test::{ClickOutcome, resolve_click};
use super::scoring;
use super::spawn::{self, SpawnScheduler};
use super::state::{SessionEvent, SessionPhase, SessionSnapshot, SessionState, Target};
use super::timers::{TimerKind, Timers};
use crate::challenges::{self, CompletedChallenges};
use crate::highscores::{ScoreLedger, ScoreRecord};
use crate::platform::{KeyValueStore, time};
use crate::settings::{self, GameMode, Settings};

/// Viewport assumed until the presentation layer reports one
pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

pub struct SessionEngine<S: KeyValueStore> {
    store: S,
    settings: Settings,
    state: SessionState,
    target: Option<Target>,
    viewport: Vec2,
    area: PlayArea,
    timers: Timers,
    spawner: SpawnScheduler,
    id_rng: Pcg32,
    /// Engine clock (ms), advanced by `update`
    now: u64,
    paused_at: Option<u64>,
    ledger: ScoreLedger,
    completed: CompletedChallenges,
    events: Vec<SessionEvent>,
}

impl<S: KeyValueStore> SessionEngine<S> {
    /// Create an engine, restoring settings and history from `store`
    pub fn new(store: S, seed: u64) -> Self {
        let settings = Settings::load(&store);
        let ledger = ScoreLedger::load(&store);
        let completed = CompletedChallenges::load(&store);
        let area = PlayArea::for_screen(settings.screen_mode, DEFAULT_VIEWPORT);

        Self {
            store,
            state: SessionState::new(settings.game_mode, settings.duration),
            settings,
            target: None,
            viewport: DEFAULT_VIEWPORT,
            area,
            timers: Timers::default(),
            spawner: SpawnScheduler::new(seed),
            id_rng: Pcg32::seed_from_u64(seed.rotate_left(32)),
            now: 0,
            paused_at: None,
            ledger,
            completed,
            events: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn area(&self) -> &PlayArea {
        &self.area
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn completed_challenges(&self) -> &CompletedChallenges {
        &self.completed
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Engine clock (ms)
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Longest combo in the saved history
    pub fn best_streak(&self) -> u32 {
        self.ledger.best_streak()
    }

    /// Everything needed to draw the current frame
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            target: self.target,
            area: self.area,
        }
    }

    /// Take the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // === Configuration ===

    /// Replace settings from untrusted input; validated and persisted
    ///
    /// An in-progress session keeps its mode, duration and difficulty until
    /// the next start. Size, delay and screen mode apply immediately.
    pub fn update_settings(&mut self, raw: &Value) {
        let settings = settings::validate(raw);
        settings.save(&mut self.store);
        let screen_changed = settings.screen_mode != self.settings.screen_mode;
        self.settings = settings;
        if screen_changed {
            self.relayout();
        }
    }

    /// Report the current viewport size (px)
    ///
    /// A non-finite dimension keeps the default for that axis.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let viewport = Vec2::new(width, height);
        if !viewport.is_finite() {
            log::warn!("Ignoring non-finite viewport {width}x{height}");
        }
        self.viewport = Vec2::select(viewport.is_finite_mask(), viewport, DEFAULT_VIEWPORT);
        self.relayout();
    }

    fn relayout(&mut self) {
        self.area = PlayArea::for_screen(self.settings.screen_mode, self.viewport);
        if let Some(target) = &mut self.target {
            target.clamp_into(&self.area);
        }
    }

    // === Commands ===

    /// Start a fresh session with `settings`
    ///
    /// Anything still in progress is ended (and recorded) first.
    pub fn start(&mut self, settings: &Settings) {
        if self.state.is_playing() {
            self.end_session();
        }

        let settings = settings.sanitized();
        if settings != self.settings {
            settings.save(&mut self.store);
        }
        let screen_changed = settings.screen_mode != self.settings.screen_mode;
        self.settings = settings;
        if screen_changed {
            self.relayout();
        }

        self.state = SessionState::new(self.settings.game_mode, self.settings.duration);
        self.state.difficulty = self.settings.difficulty;
        self.state.phase = SessionPhase::Running;
        self.paused_at = None;
        self.timers.cancel_all();
        self.arm_periodic();

        log::info!(
            "Session started: {} ({}s, {}px)",
            self.state.mode.as_str(),
            self.state.duration,
            self.settings.bubble_size
        );
        self.events.push(SessionEvent::Started {
            mode: self.state.mode,
        });
        self.spawn_target();
    }

    /// Advance the engine clock to `now` (ms), firing any timers due
    ///
    /// Timers fire in deadline order, each one seeing the clock at its own
    /// deadline. A clock that goes backwards is treated as standing still.
    pub fn update(&mut self, now: u64) {
        let now = now.max(self.now);
        while self.state.is_running() {
            let delay = spawn::next_respawn_delay(&self.settings, self.state.mode, self.state.level);
            let Some((kind, at)) = self.timers.next_due(now, delay) else {
                break;
            };
            self.now = at;
            self.timers.complete(kind, at);
            self.fire(kind);
        }
        self.now = now;
    }

    /// One countdown step (time trial)
    ///
    /// Normally driven by [`update`](Self::update); exposed for hosts that
    /// run their own one-second interval instead.
    pub fn tick(&mut self) {
        if !self.state.is_running() || self.state.mode != GameMode::TimeTrial {
            return;
        }
        self.state.time_left = self.state.time_left.saturating_sub(1);
        if self.state.time_left == 0 {
            log::debug!("Time up");
            self.end_session();
        }
    }

    /// Register a hit on the live target
    pub fn hit(&mut self, reaction_time_ms: u64) {
        if !self.state.is_running() || self.target.is_none() {
            log::debug!("Ignoring hit in {:?}", self.state.phase);
            return;
        }

        let out = scoring::on_hit(&self.state, &self.settings, reaction_time_ms);
        self.state.score = self.state.score.saturating_add(out.points_awarded);
        self.state.combo = out.new_combo;
        self.state.max_combo = self.state.max_combo.max(out.new_combo);
        self.state.hits += 1;
        self.events.push(SessionEvent::Hit {
            points: out.points_awarded,
            reaction_time_ms,
            combo: out.new_combo,
        });
        if out.new_level > self.state.level {
            self.state.level = out.new_level;
            log::debug!("Level up: {}", out.new_level);
            self.events.push(SessionEvent::LevelUp {
                level: out.new_level,
            });
        }

        self.target = None;
        self.timers.request_respawn(self.now);
    }

    /// Register a miss (click off target, or expiry)
    pub fn miss(&mut self) {
        if !self.state.is_running() {
            log::debug!("Ignoring miss in {:?}", self.state.phase);
            return;
        }

        let out = scoring::on_miss(&self.state);
        self.state.combo = out.new_combo;
        self.state.lives = out.new_lives;
        self.state.score = out.new_score;
        self.state.misses += 1;
        self.events.push(SessionEvent::Miss {
            lives: out.new_lives,
        });
        if out.terminal {
            log::debug!("Out of lives");
            self.end_session();
        }
    }

    /// Resolve a pointer click and apply it
    pub fn click(&mut self, point: Vec2) -> ClickOutcome {
        if !self.state.is_running() {
            return ClickOutcome::Ignored;
        }
        let outcome = resolve_click(point, self.target.as_ref(), &self.area);
        match outcome {
            ClickOutcome::Hit => {
                let reaction = self
                    .target
                    .map(|t| self.now.saturating_sub(t.spawned_at))
                    .unwrap_or(0);
                self.hit(reaction);
            }
            ClickOutcome::Miss => self.miss(),
            ClickOutcome::Ignored => {}
        }
        outcome
    }

    pub fn pause(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.state.phase = SessionPhase::Paused;
        self.timers.cancel_periodic();
        self.paused_at = Some(self.now);
        self.events.push(SessionEvent::Paused);
        log::debug!("Paused at {}ms", self.now);
    }

    /// Resume from where the session was paused
    ///
    /// Paused time is not counted: a live survival target keeps the rest of
    /// its lifespan and a pending respawn keeps the rest of its delay. The
    /// countdown restarts a full interval from the resume point.
    pub fn resume(&mut self) {
        if !self.state.is_paused() {
            return;
        }
        let paused_for = self
            .paused_at
            .take()
            .map_or(0, |at| self.now.saturating_sub(at));
        if let Some(target) = &mut self.target {
            target.spawned_at = target.spawned_at.saturating_add(paused_for);
        }
        self.timers.defer_respawn(paused_for);
        self.state.phase = SessionPhase::Running;
        self.arm_periodic();
        self.events.push(SessionEvent::Resumed);
        log::debug!("Resumed after {paused_for}ms");
    }

    /// Give up: end now, keeping the stats so far
    pub fn surrender(&mut self) {
        if self.state.is_playing() {
            log::info!("Session surrendered");
            self.end_session();
        }
    }

    // === Internals ===

    fn arm_periodic(&mut self) {
        match self.state.mode {
            GameMode::TimeTrial => self.timers.arm_countdown(self.now),
            GameMode::Survival => self.timers.arm_expiry_poll(self.now),
        }
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Countdown => self.tick(),
            TimerKind::ExpiryPoll => self.check_expiry(),
            TimerKind::Respawn => {
                if self.target.is_none() {
                    self.spawn_target();
                }
            }
        }
    }

    fn check_expiry(&mut self) {
        if self.state.mode != GameMode::Survival {
            return;
        }
        let expired = self
            .target
            .is_some_and(|t| spawn::is_expired(&t, self.now, self.state.level));
        if !expired {
            return;
        }

        self.target = None;
        self.events.push(SessionEvent::TargetExpired);
        self.miss();
        if self.state.is_running() {
            self.spawn_target();
        }
    }

    fn spawn_target(&mut self) {
        let target = self.spawner.spawn(
            &self.area,
            &self.settings,
            self.state.mode,
            self.state.level,
            self.now,
        );
        self.target = Some(target);
        self.events.push(SessionEvent::TargetSpawned { target });
    }

    /// Enter Ended: idempotent teardown, then record and evaluate
    fn end_session(&mut self) {
        if self.state.phase == SessionPhase::Ended {
            return;
        }
        self.state.phase = SessionPhase::Ended;
        self.timers.cancel_all();
        self.target = None;
        self.paused_at = None;

        if self.state.attempts() == 0 {
            log::info!("Session ended with no attempts, nothing recorded");
            self.events.push(SessionEvent::Ended {
                record: None,
                new_challenges: Vec::new(),
            });
            return;
        }

        let record = ScoreRecord::from_session(
            self.id_rng.random(),
            time::wall_clock_ms(),
            &self.state,
        );
        let rank = self.ledger.record(record.clone(), &mut self.store);

        let satisfied = challenges::evaluate(&self.state);
        let new_challenges = self.completed.merge(&satisfied);
        if !new_challenges.is_empty() {
            self.completed.save(&mut self.store);
        }

        log::info!(
            "Session ended: score {} ({} hits, {} misses, {:.1}% accuracy), rank {:?}",
            record.score,
            self.state.hits,
            self.state.misses,
            record.accuracy,
            rank
        );
        self.events.push(SessionEvent::Ended {
            record: Some(record),
            new_challenges,
        });
    }
}
