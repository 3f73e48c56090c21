use std::time::{Duration, Instant};

pub const SKIP_HOLD: Duration = Duration::from_millis(1000);
pub const EXIT_HOLD: Duration = Duration::from_millis(1500);
pub const TAP_DEBOUNCE: Duration = Duration::from_millis(500);

/// Longest silence between auto-repeated key events that still counts as
/// one continuous hold. Covers the usual initial key-repeat delay.
const REPEAT_GAP: Duration = Duration::from_millis(750);

/// Hold-to-confirm for destructive actions.
///
/// Terminals report a held key as a stream of repeated presses, so a hold is
/// a run of `observe` calls with no gap longer than the repeat gap. The gate
/// fires once the run lasts `hold`; after firing it stays latched until the
/// key has been quiet for `debounce`.
#[derive(Debug, Clone)]
pub struct HoldGate {
    hold: Duration,
    debounce: Duration,
    run_started: Option<Instant>,
    last_seen: Option<Instant>,
    latched: bool,
}

impl HoldGate {
    pub fn new(hold: Duration, debounce: Duration) -> Self {
        Self {
            hold,
            debounce,
            run_started: None,
            last_seen: None,
            latched: false,
        }
    }

    pub fn skip() -> Self {
        Self::new(SKIP_HOLD, TAP_DEBOUNCE)
    }

    pub fn exit() -> Self {
        Self::new(EXIT_HOLD, TAP_DEBOUNCE)
    }

    /// No hold required; repeats are still debounced.
    pub fn tap() -> Self {
        Self::new(Duration::ZERO, TAP_DEBOUNCE)
    }

    /// Record a key event; returns true when the action should fire.
    pub fn observe(&mut self, at: Instant) -> bool {
        let gap = self.last_seen.map(|last| at.saturating_duration_since(last));
        self.last_seen = Some(at);

        if self.latched {
            match gap {
                Some(g) if g < self.debounce => return false,
                _ => self.latched = false,
            }
            self.run_started = Some(at);
        } else if gap.is_none_or(|g| g > REPEAT_GAP) {
            self.run_started = Some(at);
        }

        let started = *self.run_started.get_or_insert(at);
        if at.saturating_duration_since(started) >= self.hold {
            self.latched = true;
            self.run_started = None;
            return true;
        }
        false
    }

    /// How far along the current hold is, 0.0 to 1.0.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.hold.is_zero() {
            return 0.0;
        }
        match (self.run_started, self.last_seen) {
            (Some(start), Some(last)) if now.saturating_duration_since(last) <= REPEAT_GAP => {
                (now.saturating_duration_since(start).as_secs_f64() / self.hold.as_secs_f64())
                    .min(1.0)
            }
            _ => 0.0,
        }
    }

    pub fn cancel(&mut self) {
        self.run_started = None;
        self.last_seen = None;
        self.latched = false;
    }
}
