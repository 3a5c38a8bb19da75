#![forbid(unsafe_code)]

//! Core: debounced window and viewport size observation.
//!
//! # Role in winsize
//! `winsize-core` is the host-agnostic engine. It owns the subscription
//! registry that multiplexes many consumers onto one underlying resize
//! listener per configuration, the trailing-edge debouncer, and the size
//! source fallback chain. Platform access goes through the [`Host`] seam, so
//! the same engine runs in a browser (`winsize-web`) or against the
//! deterministic [`HeadlessHost`] in tests.
//!
//! # Primary responsibilities
//! - **Size / Config**: value types identifying what is observed and how.
//! - **Debouncer**: trailing-edge coalescing of resize storms.
//! - **SizeSource**: window / visual-viewport reads with silent fallback.
//! - **ResizeObserver**: attach/detach state machine and fan-out.
//! - **Binding**: per-consumer RAII handle.
//! - **SizeWatch**: version-tracked value for presentation layers.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use std::time::Duration;
//! use winsize_core::{Config, HeadlessHost, ResizeObserver, Size};
//!
//! let host = Rc::new(HeadlessHost::new(Size::new(1024, 768)));
//! let observer = ResizeObserver::new(host.clone());
//!
//! let binding = observer.observe(Config::window(), |size| {
//!     println!("now {}x{}", size.width, size.height);
//! });
//! assert_eq!(binding.current(), Size::new(1024, 768));
//!
//! host.resize_window(500, 500);
//! host.advance(Duration::from_millis(100));
//! assert_eq!(binding.current(), Size::new(500, 500));
//! ```

pub mod binding;
pub mod config;
pub mod debounce;
pub mod headless;
pub mod host;
pub mod logging;
pub mod observer;
pub mod reactive;
pub mod size;
pub mod source;

pub use binding::Binding;
pub use config::{Config, DEFAULT_DEBOUNCE, ParseSizeKindError, SizeKind, SubscriptionKey};
pub use debounce::{Debouncer, clamp_millis};
pub use headless::HeadlessHost;
pub use host::{Dimensions, Environment, EventTarget, Host, ListenerId, TimerId};
pub use observer::ResizeObserver;
pub use reactive::{
    SizeState, SizeWatch, StateSubscription, watch_viewport_size, watch_window_size,
};
pub use size::Size;
pub use source::SizeSource;

// Re-export tracing macros at crate root for downstream hosts.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
