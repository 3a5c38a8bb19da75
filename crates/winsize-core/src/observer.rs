#![forbid(unsafe_code)]

//! Shared-listener registry with debounced fan-out.
//!
//! # Design
//!
//! [`ResizeObserver`] maps each [`SubscriptionKey`] `(kind, debounce)` to one
//! subscription: the host listener handles, a [`Debouncer`] with the key's
//! delay, and the ordered list of registered consumers.
//!
//! ```text
//! resize / scroll event ─▶ Debouncer::trigger ─(quiet period)─▶ flush(key)
//!                                                                 │
//!                               SizeSource::read(kind), once ◀────┘
//!                                                                 │
//!                    consumer 1, consumer 2, ... (registration order)
//! ```
//!
//! Per-key state machine:
//!
//! ```text
//! Detached ──first observe──▶ Attached ──last unsubscribe──▶ Detached
//!            (listen + new debouncer)    (unlisten + cancel timer)
//! ```
//!
//! Listener set per key: `Window` listens to window `resize`. `Viewport`
//! listens to visual viewport `resize` and `scroll` when the capability
//! exists, and to window `resize` otherwise.
//!
//! # Invariants
//!
//! 1. A key is attached iff it has at least one registered consumer; each
//!    attached key owns exactly one listener set and one debouncer.
//! 2. Consumers under a key are notified in registration order.
//! 3. The size is read once per flush, at fire time (last write wins).
//! 4. No registry borrow is held while consumer callbacks run, so callbacks
//!    may observe, unsubscribe or reconfigure re-entrantly.
//! 5. Detaching cancels the key's pending timer; no trailing dispatch fires
//!    afterwards.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No environment (server-side) | Consumers receive [`Size::ZERO`]; listeners are installed but the host never fires them |
//! | Consumer dropped mid-dispatch | Skipped via liveness check |
//! | Consumer moved to another key mid-dispatch | Skipped via key check |

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::binding::{Binding, ConsumerSlot};
use crate::config::SubscriptionKey;
use crate::debounce::Debouncer;
use crate::host::{EventTarget, Host, ListenerId};
use crate::source::SizeSource;
use crate::{Config, Size, SizeKind};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

struct Subscription {
    listeners: Vec<ListenerId>,
    debouncer: Debouncer,
    consumers: Vec<Weak<ConsumerSlot>>,
}

#[derive(Default)]
struct Registry {
    subscriptions: BTreeMap<SubscriptionKey, Subscription>,
    next_consumer: u64,
}

pub(crate) struct ObserverInner {
    host: Rc<dyn Host>,
    registry: RefCell<Registry>,
}

/// Multiplexes consumers onto one debounced listener set per configuration.
///
/// Cloning creates another handle to the **same** registry.
#[derive(Clone)]
pub struct ResizeObserver {
    inner: Rc<ObserverInner>,
}

impl std::fmt::Debug for ResizeObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry.borrow();
        let keys: Vec<String> = registry
            .subscriptions
            .iter()
            .map(|(key, sub)| format!("{key}:{}", sub.consumers.len()))
            .collect();
        f.debug_struct("ResizeObserver")
            .field("subscriptions", &keys)
            .finish()
    }
}

impl ResizeObserver {
    /// Create an empty registry on top of `host`.
    #[must_use]
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                host,
                registry: RefCell::new(Registry::default()),
            }),
        }
    }

    /// Start observing with `config`.
    ///
    /// The current size is delivered to `on_change` before this returns.
    /// Subsequent updates arrive after each debounced burst of environment
    /// events until the returned [`Binding`] is unsubscribed or dropped.
    pub fn observe(&self, config: Config, on_change: impl Fn(Size) + 'static) -> Binding {
        let id = {
            let mut registry = self.inner.registry.borrow_mut();
            registry.next_consumer += 1;
            registry.next_consumer
        };
        let slot = Rc::new(ConsumerSlot::new(id, config, Rc::new(on_change)));
        register(&self.inner, &slot);
        deliver_current(&self.inner, &slot);
        Binding::new(Rc::clone(&self.inner), slot)
    }

    /// Read the current size for `kind` directly from the host.
    #[must_use]
    pub fn current_size(&self, kind: SizeKind) -> Size {
        SizeSource::from_host(&*self.inner.host).read(kind)
    }

    /// Number of attached subscriptions (distinct keys with consumers).
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.registry.borrow().subscriptions.len()
    }

    /// Number of consumers registered under `config`'s key.
    #[must_use]
    pub fn consumer_count(&self, config: Config) -> usize {
        self.inner
            .registry
            .borrow()
            .subscriptions
            .get(&config.key())
            .map_or(0, |sub| sub.consumers.len())
    }

    /// Whether `config`'s key currently owns a listener set.
    #[must_use]
    pub fn is_attached(&self, config: Config) -> bool {
        self.inner
            .registry
            .borrow()
            .subscriptions
            .contains_key(&config.key())
    }

    /// Whether `config`'s key has a debounced dispatch scheduled.
    #[must_use]
    pub fn is_pending(&self, config: Config) -> bool {
        self.inner
            .registry
            .borrow()
            .subscriptions
            .get(&config.key())
            .is_some_and(|sub| sub.debouncer.is_pending())
    }

    /// True when no consumer is registered.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.inner.registry.borrow().subscriptions.is_empty()
    }

    /// The host this observer runs on.
    #[must_use]
    pub fn host(&self) -> &Rc<dyn Host> {
        &self.inner.host
    }
}

// ---------------------------------------------------------------------------
// Registry operations (shared with Binding)
// ---------------------------------------------------------------------------

/// Append `slot` to its key, attaching the key if it was detached.
pub(crate) fn register(inner: &Rc<ObserverInner>, slot: &Rc<ConsumerSlot>) {
    let key = slot.key();
    let attached = inner.registry.borrow().subscriptions.contains_key(&key);
    if !attached {
        let subscription = attach(inner, key);
        inner
            .registry
            .borrow_mut()
            .subscriptions
            .insert(key, subscription);
    }

    let mut registry = inner.registry.borrow_mut();
    if let Some(sub) = registry.subscriptions.get_mut(&key) {
        sub.consumers.push(Rc::downgrade(slot));
        #[cfg(feature = "tracing")]
        debug!(
            key = %key,
            consumer = slot.id,
            consumers = sub.consumers.len(),
            "resize observer: register"
        );
    }
}

/// Remove `slot` from its key, detaching the key if it became empty.
pub(crate) fn unregister(inner: &Rc<ObserverInner>, slot: &Rc<ConsumerSlot>) {
    let key = slot.key();
    let detached = {
        let mut registry = inner.registry.borrow_mut();
        let Some(sub) = registry.subscriptions.get_mut(&key) else {
            return;
        };
        let target = Rc::as_ptr(slot);
        sub.consumers
            .retain(|weak| !std::ptr::eq(weak.as_ptr(), target) && weak.strong_count() > 0);

        #[cfg(feature = "tracing")]
        debug!(
            key = %key,
            consumer = slot.id,
            consumers = sub.consumers.len(),
            "resize observer: unregister"
        );

        if sub.consumers.is_empty() {
            registry.subscriptions.remove(&key)
        } else {
            None
        }
    };

    if let Some(subscription) = detached {
        detach(inner, key, subscription);
    }
}

/// Deliver the current size to `slot` immediately, bypassing the debouncer.
pub(crate) fn deliver_current(inner: &Rc<ObserverInner>, slot: &Rc<ConsumerSlot>) {
    let key = slot.key();
    let size = SizeSource::from_host(&*inner.host).read(key.kind);
    slot.deliver(key, size);
}

fn listen_targets(inner: &ObserverInner, kind: SizeKind) -> &'static [EventTarget] {
    match kind {
        SizeKind::Window => &[EventTarget::WindowResize],
        SizeKind::Viewport => {
            if SizeSource::from_host(&*inner.host).has_viewport() {
                &[EventTarget::ViewportResize, EventTarget::ViewportScroll]
            } else {
                &[EventTarget::WindowResize]
            }
        }
    }
}

fn attach(inner: &Rc<ObserverInner>, key: SubscriptionKey) -> Subscription {
    let weak = Rc::downgrade(inner);
    let debouncer = Debouncer::new(Rc::clone(&inner.host), key.debounce, move || {
        if let Some(inner) = weak.upgrade() {
            flush(&inner, key);
        }
    });

    let weak = Rc::downgrade(inner);
    let handler: Rc<dyn Fn()> = Rc::new(move || {
        if let Some(inner) = weak.upgrade() {
            on_event(&inner, key);
        }
    });

    let targets = listen_targets(inner, key.kind);
    let listeners = targets
        .iter()
        .map(|&target| inner.host.listen(target, Rc::clone(&handler)))
        .collect();

    #[cfg(feature = "tracing")]
    debug!(key = %key, targets = ?targets, "resize observer: attach");

    Subscription {
        listeners,
        debouncer,
        consumers: Vec::new(),
    }
}

fn detach(inner: &Rc<ObserverInner>, key: SubscriptionKey, subscription: Subscription) {
    subscription.debouncer.cancel();
    for id in &subscription.listeners {
        inner.host.unlisten(*id);
    }

    #[cfg(feature = "tracing")]
    debug!(key = %key, "resize observer: detach");
    #[cfg(not(feature = "tracing"))]
    let _ = key;
}

fn on_event(inner: &Rc<ObserverInner>, key: SubscriptionKey) {
    let registry = inner.registry.borrow();
    if let Some(sub) = registry.subscriptions.get(&key) {
        #[cfg(feature = "tracing")]
        trace!(key = %key, "resize observer: trigger");
        sub.debouncer.trigger();
    }
}

fn flush(inner: &Rc<ObserverInner>, key: SubscriptionKey) {
    let size = SizeSource::from_host(&*inner.host).read(key.kind);
    let slots: Vec<Rc<ConsumerSlot>> = {
        let mut registry = inner.registry.borrow_mut();
        let Some(sub) = registry.subscriptions.get_mut(&key) else {
            return;
        };
        sub.consumers.retain(|weak| weak.strong_count() > 0);
        sub.consumers.iter().filter_map(Weak::upgrade).collect()
    };

    #[cfg(feature = "tracing")]
    trace!(key = %key, size = %size, consumers = slots.len(), "resize observer: dispatch");

    for slot in &slots {
        slot.deliver(key, size);
    }
}
