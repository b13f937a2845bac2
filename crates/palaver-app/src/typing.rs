//! Ephemeral typing indicator.
//!
//! Receiver-side debounce of `typing` events: at most one indicator is
//! active (last typer wins), and it self-expires after a quiet period. A
//! renewal replaces the pending deadline rather than stacking a second
//! expiry, so the indicator clears exactly [`TYPING_TIMEOUT`] after the
//! *last* signal.

use std::{ops::Add, time::Duration};

/// Quiet period after which an indicator clears without renewal.
pub const TYPING_TIMEOUT: Duration = Duration::from_secs(2);

/// The active indicator, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Indicator<I> {
    user: String,
    deadline: I,
}

/// Debounced "peer is typing" state.
///
/// Generic over the instant type so tests drive expiry with virtual time.
#[derive(Debug, Clone, Default)]
pub struct TypingSignal<I> {
    current: Option<Indicator<I>>,
}

impl<I> TypingSignal<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create with no active indicator.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Record a typing signal, replacing any pending expiry.
    ///
    /// A later typer silently overrides an earlier one.
    pub fn observe(&mut self, user: impl Into<String>, now: I) {
        self.current = Some(Indicator { user: user.into(), deadline: now + TYPING_TIMEOUT });
    }

    /// Expire the indicator if its quiet period has elapsed.
    ///
    /// Returns `true` if an indicator was cleared by this tick.
    pub fn tick(&mut self, now: I) -> bool {
        match &self.current {
            Some(indicator) if now >= indicator.deadline => {
                self.current = None;
                true
            },
            _ => false,
        }
    }

    /// Cancel any pending indicator. Called on teardown so no expiry fires
    /// after disconnect, and as part of the room-switch transaction.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Identity currently shown as typing. `None` if no active indicator.
    pub fn user(&self) -> Option<&str> {
        self.current.as_ref().map(|indicator| indicator.user.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimClock;

    #[test]
    fn clears_after_quiet_period() {
        let mut clock = SimClock::new();
        let mut typing = TypingSignal::new();

        typing.observe("bob", clock.now());
        assert_eq!(typing.user(), Some("bob"));

        clock.advance(TYPING_TIMEOUT - Duration::from_millis(1));
        assert!(!typing.tick(clock.now()));
        assert_eq!(typing.user(), Some("bob"));

        clock.advance(Duration::from_millis(1));
        assert!(typing.tick(clock.now()));
        assert_eq!(typing.user(), None);
    }

    #[test]
    fn renewal_resets_rather_than_stacks() {
        let mut clock = SimClock::new();
        let mut typing = TypingSignal::new();

        typing.observe("bob", clock.now());
        clock.advance(Duration::from_millis(1500));
        typing.observe("bob", clock.now());

        // Original deadline has passed, renewed one has not.
        clock.advance(Duration::from_millis(1500));
        assert!(!typing.tick(clock.now()));
        assert_eq!(typing.user(), Some("bob"));

        clock.advance(Duration::from_millis(500));
        assert!(typing.tick(clock.now()));
        assert_eq!(typing.user(), None);
    }

    #[test]
    fn later_typer_overrides_earlier_one() {
        let clock = SimClock::new();
        let mut typing = TypingSignal::new();

        typing.observe("bob", clock.now());
        typing.observe("carol", clock.now());
        assert_eq!(typing.user(), Some("carol"));
    }

    #[test]
    fn clear_cancels_the_pending_expiry() {
        let mut clock = SimClock::new();
        let mut typing = TypingSignal::new();

        typing.observe("bob", clock.now());
        typing.clear();
        assert_eq!(typing.user(), None);

        // The cancelled deadline must not report a clear later.
        clock.advance(TYPING_TIMEOUT * 2);
        assert!(!typing.tick(clock.now()));
    }
}
