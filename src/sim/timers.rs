//! Session timing sources
//!
//! Three independent timers drive a session: the time-trial countdown, the
//! survival expiry poll, and the one-shot respawn after a hit. They are kept
//! as plain deadlines on the engine clock so cancelling is just clearing a
//! field, and nothing can fire after it has been cleared.
//!
//! The respawn deadline is not stored. Only the moment the respawn was
//! requested is kept; the delay is supplied by the caller every time the
//! timer is evaluated, so level or settings changes made while it is pending
//! are always honoured.

/// Time-trial countdown period (ms)
pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;
/// Survival expiry poll period (ms)
pub const EXPIRY_POLL_INTERVAL_MS: u64 = 100;

/// Which timer fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKind {
    Countdown,
    ExpiryPoll,
    Respawn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    countdown_at: Option<u64>,
    expiry_poll_at: Option<u64>,
    respawn_requested_at: Option<u64>,
}

impl Timers {
    /// Tear down everything
    pub fn cancel_all(&mut self) {
        *self = Self::default();
    }

    /// Stop the periodic timers, keeping any pending respawn request
    pub fn cancel_periodic(&mut self) {
        self.countdown_at = None;
        self.expiry_poll_at = None;
    }

    /// A deadline past the end of the clock is never armed
    pub fn arm_countdown(&mut self, now: u64) {
        self.countdown_at = now.checked_add(COUNTDOWN_INTERVAL_MS);
    }

    pub fn arm_expiry_poll(&mut self, now: u64) {
        self.expiry_poll_at = now.checked_add(EXPIRY_POLL_INTERVAL_MS);
    }

    pub fn request_respawn(&mut self, now: u64) {
        self.respawn_requested_at = Some(now);
    }

    /// Push a pending respawn back by `by` ms, keeping the part of the delay
    /// already waited
    pub fn defer_respawn(&mut self, by: u64) {
        if let Some(at) = &mut self.respawn_requested_at {
            *at = at.saturating_add(by);
        }
    }

    pub fn respawn_pending(&self) -> bool {
        self.respawn_requested_at.is_some()
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    /// Earliest timer due at or before `now`
    ///
    /// Ties resolve countdown first, then expiry poll, then respawn.
    pub fn next_due(&self, now: u64, respawn_delay: u64) -> Option<(TimerKind, u64)> {
        let respawn_at = self
            .respawn_requested_at
            .map(|t| t.saturating_add(respawn_delay));
        [
            (TimerKind::Countdown, self.countdown_at),
            (TimerKind::ExpiryPoll, self.expiry_poll_at),
            (TimerKind::Respawn, respawn_at),
        ]
        .into_iter()
        .filter_map(|(kind, at)| at.filter(|&at| at <= now).map(|at| (kind, at)))
        .min_by_key(|&(kind, at)| (at, kind))
    }

    /// Mark `kind` as fired at `at`: periodic timers re-arm, respawn clears
    pub fn complete(&mut self, kind: TimerKind, at: u64) {
        match kind {
            TimerKind::Countdown => self.arm_countdown(at),
            TimerKind::ExpiryPoll => self.arm_expiry_poll(at),
            TimerKind::Respawn => self.respawn_requested_at = None,
        }
    }
}
