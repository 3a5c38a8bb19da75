#![forbid(unsafe_code)]

//! Browser host and JavaScript exports for winsize.
//!
//! On `wasm32` this crate provides [`BrowserHost`], the `web-sys` backed
//! implementation of [`winsize_core::Host`], and the `wasm-bindgen` exported
//! `WindowSizeWatcher` class. Watchers created from JavaScript share one
//! thread-local [`ResizeObserver`](winsize_core::ResizeObserver), see
//! [`registry`].
//!
//! Rust applications compiled to `wasm32` can skip the JS layer and use the
//! core directly:
//!
//! ```ignore
//! use std::rc::Rc;
//! use winsize_core::{Config, ResizeObserver};
//! use winsize_web::BrowserHost;
//!
//! let observer = ResizeObserver::new(Rc::new(BrowserHost::new()));
//! let _binding = observer.observe(Config::viewport(), |size| {
//!     web_sys::console::log_1(&format!("{size}").into());
//! });
//! ```

pub mod options;
pub mod registry;

pub use options::{OptionsError, WatcherOptions};

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHost;
#[cfg(target_arch = "wasm32")]
pub use wasm::{WindowSizeWatcher, read_size};

// Watcher core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod watcher_core;

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::time::Duration;

    use winsize_core::{Host, Size};

    use crate::options::WatcherOptions;
    use crate::registry;
    use crate::watcher_core::WatcherCore;

    /// Native stand-in for the JS constructor path: options, shared
    /// observer, watcher, dispose.
    #[test]
    fn watcher_lifecycle_on_shared_observer() {
        let host = Rc::new(winsize_core::HeadlessHost::new(Size::new(800, 600)));
        let config = WatcherOptions {
            debounce_ms: Some(50.0),
            kind: Some("window".to_owned()),
        }
        .to_config()
        .unwrap();

        let observer = registry::shared_observer(|| host.clone() as Rc<dyn Host>);
        let mut first = WatcherCore::new(&observer, config, None);
        let mut second = WatcherCore::new(&registry::shared_observer(|| unreachable!()), config, None);
        assert_eq!(host.listener_count(), 1);

        host.resize_window(300, 200);
        host.advance(Duration::from_millis(50));
        assert_eq!(first.size(), Size::new(300, 200));
        assert_eq!(second.size(), Size::new(300, 200));

        assert!(first.dispose());
        assert!(!registry::release_if_idle());
        assert!(second.dispose());
        assert!(registry::release_if_idle());
        assert_eq!(host.listener_count(), 0);
    }
}
