#![forbid(unsafe_code)]

//! Trailing-edge debouncer on top of host timers.
//!
//! # Design
//!
//! [`Debouncer`] wraps a zero-argument action. Each [`trigger`] cancels the
//! pending timer (if any) and schedules a new one; the action runs only when
//! a full delay elapses without another trigger.
//!
//! Every scheduled timer carries a generation number. The timer task holds
//! only a `Weak` reference to the debouncer state and runs the action only if
//! its generation is still the pending one, so a superseded or canceled timer
//! is inert even if the host already queued it.
//!
//! # Invariants
//!
//! 1. At most one pending timer exists at any instant.
//! 2. The action never runs inside [`trigger`], even with a zero delay.
//! 3. After [`cancel`] (or drop) the action does not run until the next
//!    [`trigger`].
//!
//! [`trigger`]: Debouncer::trigger
//! [`cancel`]: Debouncer::cancel

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::host::{Host, TimerId};

/// Convert a loosely typed millisecond value into a delay.
///
/// Negative, NaN and infinite inputs clamp to zero; fractions truncate.
#[must_use]
pub fn clamp_millis(millis: f64) -> Duration {
    if !millis.is_finite() || millis <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis(millis as u64)
}

struct DebounceState {
    host: Rc<dyn Host>,
    action: Rc<dyn Fn()>,
    delay: Duration,
    /// Pending timer and the generation it was scheduled under.
    pending: Cell<Option<(TimerId, u64)>>,
    generation: Cell<u64>,
    fired: Cell<u64>,
}

impl DebounceState {
    fn fire(&self, generation: u64) {
        match self.pending.get() {
            Some((_, pending)) if pending == generation => {
                self.pending.set(None);
                self.fired.set(self.fired.get() + 1);
                (self.action)();
            }
            _ => {}
        }
    }

    fn cancel(&self) {
        if let Some((id, _)) = self.pending.take() {
            self.host.clear_timeout(id);
        }
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}

/// Collapses bursts of triggers into one trailing call.
pub struct Debouncer {
    state: Rc<DebounceState>,
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.state.delay)
            .field("pending", &self.is_pending())
            .field("fired", &self.state.fired.get())
            .finish()
    }
}

impl Debouncer {
    /// Create a debouncer that runs `action` `delay` after the last trigger.
    #[must_use]
    pub fn new(host: Rc<dyn Host>, delay: Duration, action: impl Fn() + 'static) -> Self {
        Self {
            state: Rc::new(DebounceState {
                host,
                action: Rc::new(action),
                delay,
                pending: Cell::new(None),
                generation: Cell::new(0),
                fired: Cell::new(0),
            }),
        }
    }

    /// Restart the quiet period. Replaces any pending schedule.
    pub fn trigger(&self) {
        let state = &self.state;
        if let Some((id, _)) = state.pending.take() {
            state.host.clear_timeout(id);
        }
        let generation = state.generation.get().wrapping_add(1);
        state.generation.set(generation);

        let weak: Weak<DebounceState> = Rc::downgrade(state);
        let id = state.host.set_timeout(
            state.delay,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.fire(generation);
                }
            }),
        );
        state.pending.set(Some((id, generation)));
    }

    /// Discard the pending schedule without running the action. Idempotent.
    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// Whether a trailing call is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.pending.get().is_some()
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.state.delay
    }

    /// Number of trailing calls executed so far.
    #[must_use]
    pub fn fire_count(&self) -> u64 {
        self.state.fired.get()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.state.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeadlessHost, Size};

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        (count, move || count_clone.set(count_clone.get() + 1))
    }

    fn host() -> Rc<HeadlessHost> {
        Rc::new(HeadlessHost::new(Size::new(800, 600)))
    }

    #[test]
    fn trailing_call_after_quiet_period() {
        let host = host();
        let (count, action) = counter();
        let debouncer = Debouncer::new(host.clone(), Duration::from_millis(100), action);

        debouncer.trigger();
        assert!(debouncer.is_pending());
        host.advance(Duration::from_millis(99));
        assert_eq!(count.get(), 0);
        host.advance(Duration::from_millis(1));
        assert_eq!(count.get(), 1);
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.fire_count(), 1);
    }

    #[test]
    fn retrigger_restarts_window() {
        let host = host();
        let (count, action) = counter();
        let debouncer = Debouncer::new(host.clone(), Duration::from_millis(100), action);

        debouncer.trigger();
        host.advance(Duration::from_millis(50));
        debouncer.trigger();
        host.advance(Duration::from_millis(99));
        assert_eq!(count.get(), 0);
        host.advance(Duration::from_millis(1));
        assert_eq!(count.get(), 1);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn only_one_timer_outstanding() {
        let host = host();
        let (_count, action) = counter();
        let debouncer = Debouncer::new(host.clone(), Duration::from_millis(100), action);
        for _ in 0..10 {
            debouncer.trigger();
        }
        assert_eq!(host.pending_timers(), 1);
    }

    #[test]
    fn zero_delay_is_deferred() {
        let host = host();
        let (count, action) = counter();
        let debouncer = Debouncer::new(host.clone(), Duration::ZERO, action);

        debouncer.trigger();
        assert_eq!(count.get(), 0);
        host.run_pending();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn cancel_discards_and_is_idempotent() {
        let host = host();
        let (count, action) = counter();
        let debouncer = Debouncer::new(host.clone(), Duration::from_millis(10), action);

        debouncer.cancel();
        debouncer.trigger();
        debouncer.cancel();
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        host.advance(Duration::from_millis(100));
        assert_eq!(count.get(), 0);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn drop_cancels_pending() {
        let host = host();
        let (count, action) = counter();
        let debouncer = Debouncer::new(host.clone(), Duration::from_millis(10), action);
        debouncer.trigger();
        drop(debouncer);
        assert_eq!(host.pending_timers(), 0);
        host.advance(Duration::from_millis(100));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn stale_generation_is_inert() {
        let host = host();
        let (count, action) = counter();
        let debouncer = Debouncer::new(host.clone(), Duration::from_millis(10), action);
        debouncer.trigger();
        // A timer from an older generation must not run the action.
        debouncer.state.fire(0);
        assert_eq!(count.get(), 0);
        assert!(debouncer.is_pending());
    }

    #[test]
    fn clamp_millis_edges() {
        assert_eq!(clamp_millis(-1.0), Duration::ZERO);
        assert_eq!(clamp_millis(f64::NAN), Duration::ZERO);
        assert_eq!(clamp_millis(f64::INFINITY), Duration::ZERO);
        assert_eq!(clamp_millis(0.0), Duration::ZERO);
        assert_eq!(clamp_millis(99.9), Duration::from_millis(99));
    }
}
