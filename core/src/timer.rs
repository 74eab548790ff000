//! Single-shot countdown timer advanced explicitly by the simulation tick.

use std::time::Duration;

/// Countdown that fires at most once per arming.
///
/// The timer never calls back into its owner. [`Timer::tick`] reports the
/// firing instead, which lets the owner react while it still holds exclusive
/// access to its own state. Overshoot is preserved: when a tick carries the
/// elapsed time past the duration, the surplus stays on the clock and
/// [`Timer::rearm`] lets the next countdown start from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    duration: Duration,
    elapsed: Duration,
    armed: bool,
}

impl Timer {
    /// Creates a disarmed timer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            duration: Duration::ZERO,
            elapsed: Duration::ZERO,
            armed: false,
        }
    }

    /// Arms the timer with a fresh countdown, discarding any overshoot.
    pub fn arm(&mut self, duration: Duration) {
        self.duration = duration;
        self.elapsed = Duration::ZERO;
        self.armed = true;
    }

    /// Arms the timer with a new duration while keeping the carried overshoot.
    pub fn rearm(&mut self, duration: Duration) {
        self.duration = duration;
        self.armed = true;
    }

    /// Stops the timer and clears its accumulated time.
    pub fn cancel(&mut self) {
        self.elapsed = Duration::ZERO;
        self.armed = false;
    }

    /// Advances the countdown, returning `true` when it expires.
    ///
    /// An expired timer subtracts its duration from the elapsed time and
    /// disarms, so a single tick fires at most once regardless of its size.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.armed {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.duration {
            return false;
        }
        self.elapsed -= self.duration;
        self.armed = false;
        true
    }

    /// Reports whether the timer is counting down.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Configured duration of the current countdown.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Time accumulated toward the countdown, including any overshoot.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Time left until expiry; zero for a disarmed timer.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        if !self.armed {
            return Duration::ZERO;
        }
        self.duration.saturating_sub(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_timer_never_fires() {
        let mut timer = Timer::new();
        assert!(!timer.tick(Duration::from_secs(10)));
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[test]
    fn overshoot_carries_into_rearm() {
        let mut timer = Timer::new();
        timer.arm(Duration::from_secs(2));
        assert!(!timer.tick(Duration::from_millis(1_500)));
        assert!(timer.tick(Duration::from_millis(600)));
        assert!(!timer.is_armed());
        assert_eq!(timer.elapsed(), Duration::from_millis(100));

        timer.rearm(Duration::from_secs(2));
        assert_eq!(timer.remaining(), Duration::from_millis(1_900));
    }

    #[test]
    fn arm_discards_overshoot() {
        let mut timer = Timer::new();
        timer.arm(Duration::from_secs(1));
        assert!(timer.tick(Duration::from_millis(1_700)));
        timer.arm(Duration::from_secs(1));
        assert_eq!(timer.remaining(), Duration::from_secs(1));
    }

    #[test]
    fn cancel_stops_countdown() {
        let mut timer = Timer::new();
        timer.arm(Duration::from_secs(1));
        timer.cancel();
        assert!(!timer.tick(Duration::from_secs(5)));
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }
}
