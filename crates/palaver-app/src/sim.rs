//! Virtual time for deterministic tests.
//!
//! The state machines take time as method parameters and never read a
//! clock, so tests can drive them with a [`SimClock`] and step through
//! expiry schedules exactly.

use std::{
    ops::{Add, Sub},
    time::Duration,
};

/// A point in virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// The simulation epoch.
    pub const START: Self = Self(Duration::ZERO);
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}

impl Sub<SimInstant> for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: SimInstant) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

/// Manually advanced clock producing [`SimInstant`]s.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Duration,
}

impl SimClock {
    /// Create a clock at the simulation epoch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> SimInstant {
        SimInstant(self.now)
    }

    /// Move time forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_monotonic() {
        let mut clock = SimClock::new();
        let start = clock.now();
        clock.advance(Duration::from_secs(1));
        assert!(clock.now() > start);
        assert_eq!(clock.now() - start, Duration::from_secs(1));
    }
}
