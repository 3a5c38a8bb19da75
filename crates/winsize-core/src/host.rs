#![forbid(unsafe_code)]

//! Host seam: environment queries, event listeners and timers.
//!
//! Everything the engine needs from the outside world goes through [`Host`].
//! The browser implementation lives in `winsize-web`; [`HeadlessHost`]
//! provides a deterministic implementation with a virtual clock.
//!
//! # Contract
//!
//! - All calls happen on one thread. Implementations use interior
//!   mutability and take `&self`.
//! - `set_timeout` must never run `task` synchronously, even for a zero
//!   delay. The task runs on a later turn of the host's event loop.
//! - Handlers passed to `listen` and tasks passed to `set_timeout` may
//!   re-enter the host (install or remove listeners, schedule or clear
//!   timers). Implementations must not hold internal borrows while invoking
//!   them.
//! - `unlisten` and `clear_timeout` are idempotent; unknown ids are ignored.
//!
//! [`HeadlessHost`]: crate::HeadlessHost

use std::rc::Rc;
use std::time::Duration;

use crate::Size;
use crate::size::px_from_f64;

/// Handle for a listener installed with [`Host::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Handle for a timer scheduled with [`Host::set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Environment event sources the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventTarget {
    /// `resize` on the window.
    WindowResize,
    /// `resize` on the visual viewport.
    ViewportResize,
    /// `scroll` on the visual viewport (position changes during pinch-zoom).
    ViewportScroll,
}

impl EventTarget {
    /// DOM event type name.
    #[must_use]
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::WindowResize | Self::ViewportResize => "resize",
            Self::ViewportScroll => "scroll",
        }
    }
}

/// Per-dimension reading of one environment layer.
///
/// A `None` dimension means the layer could not provide it. A zero reading
/// is treated the same way by [`SizeSource`](crate::SizeSource), since
/// partially initialized documents report 0 before layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Dimensions {
    /// Layer that reports nothing.
    pub const UNAVAILABLE: Self = Self {
        width: None,
        height: None,
    };

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Build from optional floating-point browser measurements, rounding to
    /// whole pixels.
    #[must_use]
    pub fn from_f64(width: Option<f64>, height: Option<f64>) -> Self {
        Self {
            width: width.map(px_from_f64),
            height: height.map(px_from_f64),
        }
    }
}

impl From<Size> for Dimensions {
    fn from(size: Size) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Queried environment state.
pub trait Environment {
    /// Window inner size.
    fn inner_size(&self) -> Dimensions;

    /// Client size of the document's root element.
    fn document_client_size(&self) -> Dimensions;

    /// Client size of the document body.
    fn body_client_size(&self) -> Dimensions;

    /// Visual viewport size, or `None` when the capability is absent.
    fn visual_viewport_size(&self) -> Option<Size>;
}

/// Platform services used by the engine.
pub trait Host {
    /// The interactive environment, or `None` in a server-side context.
    fn environment(&self) -> Option<&dyn Environment>;

    /// Install a passive listener for `target`.
    fn listen(&self, target: EventTarget, handler: Rc<dyn Fn()>) -> ListenerId;

    /// Remove a listener installed with [`listen`](Self::listen).
    fn unlisten(&self, id: ListenerId);

    /// Schedule `task` to run once after `delay`, on a later turn.
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId;

    /// Cancel a pending timer. No-op if it already ran or was cleared.
    fn clear_timeout(&self, id: TimerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_names() {
        assert_eq!(EventTarget::WindowResize.event_type(), "resize");
        assert_eq!(EventTarget::ViewportResize.event_type(), "resize");
        assert_eq!(EventTarget::ViewportScroll.event_type(), "scroll");
    }

    #[test]
    fn dimensions_from_size() {
        let dims = Dimensions::from(Size::new(10, 20));
        assert_eq!(dims, Dimensions::new(10, 20));
        assert_eq!(Dimensions::default(), Dimensions::UNAVAILABLE);
    }

    #[test]
    fn dimensions_from_f64() {
        let dims = Dimensions::from_f64(Some(1279.5), None);
        assert_eq!(dims.width, Some(1280));
        assert_eq!(dims.height, None);
    }
}
