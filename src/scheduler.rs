//! Telemetry cadence.
//!
//! The control loop polls a [`Ticker`] with the current uptime on every
//! pass; when it fires, the loop hands the session an
//! [`Event::TimerTick`](crate::events::Event::TimerTick).
//!
//! ```text
//!   loop pass ──▶ Ticker::poll(now) ──true──▶ session.handle(TimerTick)
//!                         │
//!                       false ──▶ (nothing)
//! ```
//!
//! The ticker fires only once strictly more than one period has elapsed
//! since the last firing, and it starts counting at boot (time 0). Ticks
//! that are missed while the loop is blocked (a feed, say) are not
//! replayed; the next poll fires once and the cadence resumes from there.

/// Periodic trigger driven by a monotonic millisecond clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticker {
    period_ms: u32,
    last_ms: u64,
}

impl Ticker {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last_ms: 0,
        }
    }

    /// Returns `true` (and re-arms) when more than one period has passed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) > u64::from(self.period_ms) {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Re-arm from `now_ms` without firing.
    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_strictly_after_period() {
        let mut t = Ticker::new(600);
        assert!(!t.poll(0));
        assert!(!t.poll(600));
        assert!(t.poll(601));
        assert!(!t.poll(1201));
        assert!(t.poll(1202));
    }

    #[test]
    fn missed_ticks_collapse_into_one() {
        let mut t = Ticker::new(600);
        assert!(t.poll(601));
        // Loop blocked for a whole feed.
        assert!(t.poll(7000));
        assert!(!t.poll(7100));
        assert!(t.poll(7601));
    }

    #[test]
    fn reset_rearms_without_firing() {
        let mut t = Ticker::new(600);
        t.reset(5000);
        assert!(!t.poll(5600));
        assert!(t.poll(5601));
        assert_eq!(t.period_ms(), 600);
    }

    #[test]
    fn clock_going_backwards_never_fires() {
        let mut t = Ticker::new(600);
        t.reset(10_000);
        assert!(!t.poll(0));
    }
}
