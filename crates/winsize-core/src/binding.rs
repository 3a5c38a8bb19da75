#![forbid(unsafe_code)]

//! Per-consumer handle returned by [`ResizeObserver::observe`].
//!
//! A [`Binding`] exclusively owns its consumer slot (callback, config, last
//! delivered size). The observer's registry only keeps a `Weak` reference for
//! dispatch, so the binding decides the slot's lifetime.
//!
//! # Invariants
//!
//! 1. After [`Binding::unsubscribe`] returns, the callback is never invoked
//!    again, including by a dispatch loop that is already running.
//! 2. `unsubscribe` is idempotent; dropping the binding unsubscribes it.
//! 3. [`Binding::set_callback`] keeps the consumer's position in dispatch
//!    order.
//!
//! [`ResizeObserver::observe`]: crate::ResizeObserver::observe

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::SubscriptionKey;
use crate::observer::{self, ObserverInner};
use crate::{Config, Size};

/// Shared state of one registered consumer.
pub(crate) struct ConsumerSlot {
    pub(crate) id: u64,
    pub(crate) alive: Cell<bool>,
    pub(crate) config: Cell<Config>,
    pub(crate) last: Cell<Size>,
    callback: RefCell<Rc<dyn Fn(Size)>>,
}

impl ConsumerSlot {
    pub(crate) fn new(id: u64, config: Config, callback: Rc<dyn Fn(Size)>) -> Self {
        Self {
            id,
            alive: Cell::new(true),
            config: Cell::new(config),
            last: Cell::new(Size::ZERO),
            callback: RefCell::new(callback),
        }
    }

    pub(crate) fn key(&self) -> SubscriptionKey {
        self.config.get().key()
    }

    /// Deliver `size` if the slot is still live and registered under `key`.
    ///
    /// Returns whether the callback ran.
    pub(crate) fn deliver(&self, key: SubscriptionKey, size: Size) -> bool {
        if !self.alive.get() || self.key() != key {
            return false;
        }
        self.last.set(size);
        // Clone out so the callback may replace itself.
        let callback = Rc::clone(&self.callback.borrow());
        callback(size);
        true
    }
}

/// Handle for one observing consumer.
///
/// Dropping the binding unsubscribes it.
pub struct Binding {
    observer: Rc<ObserverInner>,
    slot: Rc<ConsumerSlot>,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.slot.id)
            .field("config", &self.slot.config.get())
            .field("active", &self.slot.alive.get())
            .field("current", &self.slot.last.get())
            .finish()
    }
}

impl Binding {
    pub(crate) fn new(observer: Rc<ObserverInner>, slot: Rc<ConsumerSlot>) -> Self {
        Self { observer, slot }
    }

    /// Stop observing. Idempotent.
    ///
    /// Removes the registration synchronously; if this was the last consumer
    /// of its configuration, the underlying listeners are removed and the
    /// pending debounce timer is canceled.
    pub fn unsubscribe(&self) {
        if !self.slot.alive.replace(false) {
            return;
        }
        observer::unregister(&self.observer, &self.slot);
    }

    /// Whether the binding is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.slot.alive.get()
    }

    /// Last size delivered to this binding.
    #[must_use]
    pub fn current(&self) -> Size {
        self.slot.last.get()
    }

    #[must_use]
    pub fn config(&self) -> Config {
        self.slot.config.get()
    }

    /// Replace the callback, keeping this consumer's dispatch position.
    ///
    /// No immediate delivery happens; the new callback sees the next update.
    pub fn set_callback(&self, on_change: impl Fn(Size) + 'static) {
        *self.slot.callback.borrow_mut() = Rc::new(on_change);
    }

    /// Move the binding to a different configuration.
    ///
    /// Equivalent to unsubscribing from the old key and observing under the
    /// new one: the old subscription detaches if it becomes empty, the new
    /// one attaches if it was empty, and the current size is delivered
    /// immediately. A no-op when `config` equals the current one. On an
    /// inactive binding only the stored config changes.
    pub fn reconfigure(&self, config: Config) {
        if self.slot.config.get() == config {
            return;
        }
        if !self.slot.alive.get() {
            self.slot.config.set(config);
            return;
        }
        observer::unregister(&self.observer, &self.slot);
        self.slot.config.set(config);
        observer::register(&self.observer, &self.slot);
        observer::deliver_current(&self.observer, &self.slot);
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
