#![forbid(unsafe_code)]

//! Version-tracked size state for presentation layers.
//!
//! # Design
//!
//! [`SizeWatch`] is the adapter between a [`Binding`] and UI code that wants a
//! render-time value: it owns the binding and writes every delivered size
//! into a [`SizeState`]. UI code reads [`SizeWatch::get`], dirty-checks with
//! [`SizeWatch::version`], or subscribes for change callbacks.
//!
//! [`SizeState`] stores subscribers as `Weak` callbacks; the strong side
//! lives in the [`StateSubscription`] guard, so dropping the guard
//! unsubscribes. Dead entries are pruned lazily on the next notification.
//!
//! # Invariants
//!
//! 1. `version` increments exactly once per delivery that changes the size.
//! 2. Delivering a size equal to the current one is a no-op (no version bump,
//!    no notifications).
//! 3. Subscribers are notified in registration order.
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: writing the state from one of its own subscribers
//!   starts a nested notification round before the outer one finishes.
//!   Later subscribers of the outer round then see the newer value.
//! - **Subscriber leak**: guards stored indefinitely keep their callbacks
//!   alive.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::{Binding, Config, ResizeObserver, Size};

type CallbackRc = Rc<dyn Fn(&Size)>;
type CallbackWeak = Weak<dyn Fn(&Size)>;

struct StateInner {
    value: Size,
    version: u64,
    subscribers: Vec<CallbackWeak>,
}

/// Shared, version-tracked size with change notification.
///
/// Cloning creates a new handle to the **same** state.
#[derive(Clone)]
pub struct SizeState {
    inner: Rc<RefCell<StateInner>>,
}

impl std::fmt::Debug for SizeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SizeState")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl SizeState {
    #[must_use]
    pub fn new(value: Size) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StateInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub fn get(&self) -> Size {
        self.inner.borrow().value
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Store `value`, notifying subscribers if it differs from the current
    /// size.
    pub fn set(&self, value: Size) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Subscribe to changes. Dropping the guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&Size) + 'static) -> StateSubscription {
        let strong: CallbackRc = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        StateSubscription {
            _guard: Box::new(strong),
        }
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let callbacks: Vec<CallbackRc> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        let value = self.get();
        for cb in &callbacks {
            cb(&value);
        }
    }
}

/// RAII guard for a [`SizeState`] subscriber.
pub struct StateSubscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for StateSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSubscription").finish_non_exhaustive()
    }
}

/// A live size value backed by a [`Binding`].
///
/// Dropping the watch unsubscribes the binding.
#[derive(Debug)]
pub struct SizeWatch {
    state: SizeState,
    binding: Binding,
}

impl SizeWatch {
    /// Observe `config` and expose the result as a version-tracked value.
    ///
    /// The value is initialized from the current size, so a fresh watch
    /// reports version 0.
    #[must_use]
    pub fn new(observer: &ResizeObserver, config: Config) -> Self {
        let state = SizeState::new(observer.current_size(config.kind));
        let writer = state.clone();
        let binding = observer.observe(config, move |size| writer.set(size));
        Self { state, binding }
    }

    /// Latest size.
    #[must_use]
    pub fn get(&self) -> Size {
        self.state.get()
    }

    /// Number of changes observed since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    /// Subscribe to size changes.
    pub fn subscribe(&self, callback: impl Fn(&Size) + 'static) -> StateSubscription {
        self.state.subscribe(callback)
    }

    /// Handle to the underlying state, for passing down to child views.
    #[must_use]
    pub fn state(&self) -> SizeState {
        self.state.clone()
    }

    #[must_use]
    pub fn config(&self) -> Config {
        self.binding.config()
    }

    /// Switch to another configuration (see [`Binding::reconfigure`]).
    pub fn reconfigure(&self, config: Config) {
        self.binding.reconfigure(config);
    }

    /// Stop observing; the last value stays readable.
    pub fn stop(&self) {
        self.binding.unsubscribe();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.binding.is_active()
    }
}

/// Watch the window size with the given debounce delay.
#[must_use]
pub fn watch_window_size(observer: &ResizeObserver, debounce: Duration) -> SizeWatch {
    SizeWatch::new(observer, Config::window().with_debounce(debounce))
}

/// Watch the visual viewport size with the given debounce delay.
#[must_use]
pub fn watch_viewport_size(observer: &ResizeObserver, debounce: Duration) -> SizeWatch {
    SizeWatch::new(observer, Config::viewport().with_debounce(debounce))
}
