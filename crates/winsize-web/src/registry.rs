#![forbid(unsafe_code)]

//! Thread-local process-wide observer.
//!
//! JavaScript callers have nowhere to keep a [`ResizeObserver`], so watchers
//! created from JS share one per thread. It is created on first use and
//! released once no subscription remains.
//!
//! # Invariants
//!
//! - At most one observer exists per thread at a time.
//! - [`release_if_idle`] only drops an observer whose registry is empty, so
//!   live listeners are never orphaned.
//! - Bindings keep their observer alive on their own; releasing the slot
//!   while a binding is still in flight cannot invalidate it.

use std::cell::RefCell;
use std::rc::Rc;

use winsize_core::{Host, ResizeObserver};

thread_local! {
    static SHARED: RefCell<Option<ResizeObserver>> = const { RefCell::new(None) };
}

/// Return the shared observer, creating it with `make_host` if absent.
pub fn shared_observer(make_host: impl FnOnce() -> Rc<dyn Host>) -> ResizeObserver {
    SHARED.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(observer) = slot.as_ref() {
            return observer.clone();
        }
        let observer = ResizeObserver::new(make_host());
        #[cfg(feature = "tracing")]
        tracing::debug!("shared resize observer created");
        *slot = Some(observer.clone());
        observer
    })
}

/// Drop the shared observer if it has no subscriptions. Returns `true` if
/// it was released.
pub fn release_if_idle() -> bool {
    SHARED.with(|slot| {
        let mut slot = slot.borrow_mut();
        let idle = slot.as_ref().is_some_and(ResizeObserver::is_idle);
        if idle {
            *slot = None;
            #[cfg(feature = "tracing")]
            tracing::debug!("shared resize observer released");
        }
        idle
    })
}

/// Whether a shared observer currently exists on this thread.
#[must_use]
pub fn is_initialized() -> bool {
    SHARED.with(|slot| slot.borrow().is_some())
}
