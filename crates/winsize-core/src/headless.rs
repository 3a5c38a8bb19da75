#![forbid(unsafe_code)]

//! Deterministic in-memory host with a virtual clock.
//!
//! [`HeadlessHost`] implements [`Host`] without a browser so the engine can be
//! driven step by step in tests and simulations:
//!
//! ```text
//! host.resize_window(w, h)   // update layers, fire window resize listeners
//! host.advance(dt)           // move the clock, run due timers in order
//! host.listener_count()      // inspect installed listeners
//! ```
//!
//! # Determinism
//!
//! Time only moves through [`advance`](HeadlessHost::advance). Timers due at
//! the same instant run in scheduling order. Listeners for one target run in
//! installation order; a listener removed by an earlier handler in the same
//! dispatch is skipped.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use crate::Size;
use crate::host::{Dimensions, Environment, EventTarget, Host, ListenerId, TimerId};

type TimerTask = Box<dyn FnOnce()>;

struct HeadlessState {
    interactive: bool,
    inner: Dimensions,
    document: Dimensions,
    body: Dimensions,
    viewport: Option<Size>,

    now: Duration,
    next_id: u64,

    listeners: BTreeMap<ListenerId, (EventTarget, Rc<dyn Fn()>)>,
    /// Timers ordered by (due time, scheduling sequence).
    timers: BTreeMap<(Duration, u64), (TimerId, TimerTask)>,
    timer_slots: HashMap<TimerId, (Duration, u64)>,

    listeners_installed: u64,
    listeners_removed: u64,
}

impl HeadlessState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory [`Host`] for tests and headless simulation.
pub struct HeadlessHost {
    state: RefCell<HeadlessState>,
}

impl std::fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HeadlessHost")
            .field("interactive", &state.interactive)
            .field("now", &state.now)
            .field("inner", &state.inner)
            .field("viewport", &state.viewport)
            .field("listeners", &state.listeners.len())
            .field("timers", &state.timers.len())
            .finish()
    }
}

impl HeadlessHost {
    /// Interactive host whose window layers all report `size`. No visual
    /// viewport capability.
    #[must_use]
    pub fn new(size: Size) -> Self {
        let dims = Dimensions::from(size);
        Self::with_state(true, dims, None)
    }

    /// Non-interactive host: no environment, listeners never fire.
    #[must_use]
    pub fn server() -> Self {
        Self::with_state(false, Dimensions::UNAVAILABLE, None)
    }

    /// Enable the visual viewport capability with an initial size.
    #[must_use]
    pub fn with_viewport(self, size: Size) -> Self {
        self.state.borrow_mut().viewport = Some(size);
        self
    }

    fn with_state(interactive: bool, dims: Dimensions, viewport: Option<Size>) -> Self {
        Self {
            state: RefCell::new(HeadlessState {
                interactive,
                inner: dims,
                document: dims,
                body: dims,
                viewport,
                now: Duration::ZERO,
                next_id: 0,
                listeners: BTreeMap::new(),
                timers: BTreeMap::new(),
                timer_slots: HashMap::new(),
                listeners_installed: 0,
                listeners_removed: 0,
            }),
        }
    }

    // -- Environment mutation ----------------------------------------------

    /// Replace the three window layers without firing events.
    pub fn set_layers(&self, inner: Dimensions, document: Dimensions, body: Dimensions) {
        let mut state = self.state.borrow_mut();
        state.inner = inner;
        state.document = document;
        state.body = body;
    }

    /// Set the window size without firing events.
    pub fn set_window_size(&self, width: u32, height: u32) {
        let dims = Dimensions::new(width, height);
        self.set_layers(dims, dims, dims);
    }

    /// Set the visual viewport size (or remove the capability) without
    /// firing events.
    pub fn set_viewport_size(&self, size: Option<Size>) {
        self.state.borrow_mut().viewport = size;
    }

    /// Resize the window and fire window `resize` listeners.
    pub fn resize_window(&self, width: u32, height: u32) {
        self.set_window_size(width, height);
        self.dispatch(EventTarget::WindowResize);
    }

    /// Resize the visual viewport and fire its `resize` listeners.
    pub fn resize_viewport(&self, width: u32, height: u32) {
        self.set_viewport_size(Some(Size::new(width, height)));
        self.dispatch(EventTarget::ViewportResize);
    }

    /// Fire visual viewport `scroll` listeners.
    pub fn scroll_viewport(&self) {
        self.dispatch(EventTarget::ViewportScroll);
    }

    /// Fire every listener installed for `target`.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, target: EventTarget) -> usize {
        let handlers: Vec<(ListenerId, Rc<dyn Fn()>)> = {
            let state = self.state.borrow();
            if !state.interactive {
                return 0;
            }
            state
                .listeners
                .iter()
                .filter(|(_, (t, _))| *t == target)
                .map(|(id, (_, handler))| (*id, Rc::clone(handler)))
                .collect()
        };

        let mut invoked = 0;
        for (id, handler) in handlers {
            if !self.state.borrow().listeners.contains_key(&id) {
                continue;
            }
            handler();
            invoked += 1;
        }
        invoked
    }

    // -- Clock --------------------------------------------------------------

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Advance the clock by `dt`, running every timer that comes due.
    ///
    /// Timers scheduled by running tasks are honored if they fall inside the
    /// window. Returns the number of tasks run.
    pub fn advance(&self, dt: Duration) -> usize {
        let target = self.now().saturating_add(dt);
        let mut ran = 0;
        loop {
            let task = {
                let mut state = self.state.borrow_mut();
                let due = match state.timers.first_key_value() {
                    Some((&(due, _), _)) if due <= target => due,
                    _ => break,
                };
                let Some((_, (id, task))) = state.timers.pop_first() else {
                    break;
                };
                state.timer_slots.remove(&id);
                state.now = due;
                task
            };
            task();
            ran += 1;
        }
        self.state.borrow_mut().now = target;
        ran
    }

    /// Run timers that are already due (zero-delay tasks) without moving
    /// the clock.
    pub fn run_pending(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    // -- Introspection ------------------------------------------------------

    /// Number of timers waiting to run.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Number of live listeners across all targets.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Number of live listeners for `target`.
    #[must_use]
    pub fn listener_count_for(&self, target: EventTarget) -> usize {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|(t, _)| *t == target)
            .count()
    }

    /// Total `listen` calls since creation.
    #[must_use]
    pub fn listeners_installed(&self) -> u64 {
        self.state.borrow().listeners_installed
    }

    /// Total effective `unlisten` calls since creation.
    #[must_use]
    pub fn listeners_removed(&self) -> u64 {
        self.state.borrow().listeners_removed
    }
}

impl Environment for HeadlessHost {
    fn inner_size(&self) -> Dimensions {
        self.state.borrow().inner
    }

    fn document_client_size(&self) -> Dimensions {
        self.state.borrow().document
    }

    fn body_client_size(&self) -> Dimensions {
        self.state.borrow().body
    }

    fn visual_viewport_size(&self) -> Option<Size> {
        self.state.borrow().viewport
    }
}

impl Host for HeadlessHost {
    fn environment(&self) -> Option<&dyn Environment> {
        if self.state.borrow().interactive {
            Some(self)
        } else {
            None
        }
    }

    fn listen(&self, target: EventTarget, handler: Rc<dyn Fn()>) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_id());
        state.listeners.insert(id, (target, handler));
        state.listeners_installed += 1;
        id
    }

    fn unlisten(&self, id: ListenerId) {
        let mut state = self.state.borrow_mut();
        if state.listeners.remove(&id).is_some() {
            state.listeners_removed += 1;
        }
    }

    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        let mut state = self.state.borrow_mut();
        let seq = state.next_id();
        let id = TimerId(seq);
        let due = state.now.saturating_add(delay);
        state.timers.insert((due, seq), (id, task));
        state.timer_slots.insert(id, (due, seq));
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.timer_slots.remove(&id) {
            state.timers.remove(&slot);
        }
    }
}
