#![forbid(unsafe_code)]

//! [`Host`] implementation backed by the browser.
//!
//! Dimension queries go through `web-sys`; listeners are passive
//! `gloo-events` listeners and timers are `gloo-timers` timeouts. Both are
//! RAII handles held in id-keyed maps, so `unlisten` / `clear_timeout` are a
//! map removal.
//!
//! # Failure Modes
//!
//! | Condition                         | Behavior                                |
//! |-----------------------------------|-----------------------------------------|
//! | No `window` (worker, SSR)         | No environment; listeners inert; timers still run |
//! | No `visualViewport`               | Viewport reads `None`; viewport listeners inert |
//! | `innerWidth` not a number         | Dimension unavailable, fallback chain continues |
//! | Timer fires                       | Entry pruned on the next timer call, never inside its own callback |

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo_timers::callback::Timeout;
use winsize_core::{Dimensions, Environment, EventTarget, Host, ListenerId, Size, TimerId};

struct PendingTimeout {
    _timeout: Timeout,
    done: Rc<Cell<bool>>,
}

/// Browser host for the resize observer.
pub struct BrowserHost {
    window: Option<web_sys::Window>,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<ListenerId, Option<EventListener>>>,
    timers: RefCell<HashMap<TimerId, PendingTimeout>>,
}

impl BrowserHost {
    /// Bind to the global `window`, or degrade to a non-interactive host
    /// when there is none.
    #[must_use]
    pub fn new() -> Self {
        let window = web_sys::window();
        #[cfg(feature = "tracing")]
        if window.is_none() {
            tracing::warn!("no global window; size reads will be zero");
        }
        Self {
            window,
            next_id: Cell::new(1),
            listeners: RefCell::new(HashMap::new()),
            timers: RefCell::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        id
    }

    fn event_source(&self, target: EventTarget) -> Option<web_sys::EventTarget> {
        let window = self.window.as_ref()?;
        match target {
            EventTarget::WindowResize => Some(window.clone().into()),
            EventTarget::ViewportResize | EventTarget::ViewportScroll => {
                window.visual_viewport().map(Into::into)
            }
        }
    }

    fn document(&self) -> Option<web_sys::Document> {
        self.window.as_ref()?.document()
    }

    fn prune_timers(&self) {
        // Only entries whose callback has returned are marked done.
        self.timers.borrow_mut().retain(|_, pending| !pending.done.get());
    }

    /// Number of installed listener handles, inert ones included.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of timers scheduled and not yet pruned.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers
            .borrow()
            .values()
            .filter(|pending| !pending.done.get())
            .count()
    }
}

impl Default for BrowserHost {
    fn default() -> Self {
        Self::new()
    }
}

fn client_dimensions(element: &web_sys::Element) -> Dimensions {
    Dimensions {
        width: u32::try_from(element.client_width()).ok(),
        height: u32::try_from(element.client_height()).ok(),
    }
}

impl Environment for BrowserHost {
    fn inner_size(&self) -> Dimensions {
        let Some(window) = self.window.as_ref() else {
            return Dimensions::UNAVAILABLE;
        };
        Dimensions::from_f64(
            window.inner_width().ok().and_then(|v| v.as_f64()),
            window.inner_height().ok().and_then(|v| v.as_f64()),
        )
    }

    fn document_client_size(&self) -> Dimensions {
        self.document()
            .and_then(|document| document.document_element())
            .map_or(Dimensions::UNAVAILABLE, |root| client_dimensions(&root))
    }

    fn body_client_size(&self) -> Dimensions {
        self.document()
            .and_then(|document| document.body())
            .map_or(Dimensions::UNAVAILABLE, |body| client_dimensions(&body))
    }

    fn visual_viewport_size(&self) -> Option<Size> {
        let viewport = self.window.as_ref()?.visual_viewport()?;
        Some(Size::from_f64(viewport.width(), viewport.height()))
    }
}

impl Host for BrowserHost {
    fn environment(&self) -> Option<&dyn Environment> {
        self.window.as_ref().map(|_| self as &dyn Environment)
    }

    fn listen(&self, target: EventTarget, handler: Rc<dyn Fn()>) -> ListenerId {
        let id = ListenerId(self.next_id());
        let listener = self.event_source(target).map(|source| {
            let options = EventListenerOptions {
                phase: EventListenerPhase::Bubble,
                passive: true,
            };
            EventListener::new_with_options(&source, target.event_type(), options, move |_event| {
                handler();
            })
        });
        #[cfg(feature = "tracing")]
        if listener.is_none() {
            tracing::warn!(?target, "event source unavailable; listener is inert");
        }
        self.listeners.borrow_mut().insert(id, listener);
        id
    }

    fn unlisten(&self, id: ListenerId) {
        let removed = self.listeners.borrow_mut().remove(&id);
        drop(removed);
    }

    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        self.prune_timers();
        let id = TimerId(self.next_id());
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let done = Rc::new(Cell::new(false));
        let done_flag = Rc::clone(&done);
        let timeout = Timeout::new(millis, move || {
            task();
            done_flag.set(true);
        });
        self.timers.borrow_mut().insert(
            id,
            PendingTimeout {
                _timeout: timeout,
                done,
            },
        );
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        let removed = self.timers.borrow_mut().remove(&id);
        drop(removed);
        self.prune_timers();
    }
}
