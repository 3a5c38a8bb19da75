#![forbid(unsafe_code)]

//! Host-independent state behind the JS `WindowSizeWatcher`.
//!
//! Wraps a [`SizeWatch`] plus an optional change callback. The callback is
//! invoked once with the size current at construction, then after every
//! debounced change. Kept free of `wasm-bindgen` types so it can be tested
//! natively against [`HeadlessHost`](winsize_core::HeadlessHost).

use std::rc::Rc;

use winsize_core::{Config, ResizeObserver, Size, SizeWatch, StateSubscription};

pub struct WatcherCore {
    watch: SizeWatch,
    subscription: Option<StateSubscription>,
}

impl WatcherCore {
    pub fn new(observer: &ResizeObserver, config: Config, on_change: Option<Rc<dyn Fn(Size)>>) -> Self {
        let watch = SizeWatch::new(observer, config);
        let subscription = on_change.map(|callback| {
            callback(watch.get());
            watch.subscribe(move |size| callback(*size))
        });
        Self {
            watch,
            subscription,
        }
    }

    pub fn size(&self) -> Size {
        self.watch.get()
    }

    pub fn version(&self) -> u64 {
        self.watch.version()
    }

    pub fn config(&self) -> Config {
        self.watch.config()
    }

    pub fn is_active(&self) -> bool {
        self.watch.is_active()
    }

    /// Stop observing and drop the change callback. The last size stays
    /// readable. Returns `true` on the first call only.
    pub fn dispose(&mut self) -> bool {
        let was_active = self.watch.is_active();
        self.watch.stop();
        drop(self.subscription.take());
        was_active
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use winsize_core::HeadlessHost;

    use super::*;

    fn setup() -> (Rc<HeadlessHost>, ResizeObserver) {
        let host = Rc::new(HeadlessHost::new(Size::new(1024, 768)));
        let observer = ResizeObserver::new(host.clone());
        (host, observer)
    }

    #[test]
    fn callback_gets_initial_and_debounced_sizes() {
        let (host, observer) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let core = WatcherCore::new(
            &observer,
            Config::window(),
            Some(Rc::new(move |size| sink.borrow_mut().push(size))),
        );

        host.resize_window(500, 400);
        host.advance(Duration::from_millis(100));

        assert_eq!(
            *seen.borrow(),
            vec![Size::new(1024, 768), Size::new(500, 400)]
        );
        assert_eq!(core.size(), Size::new(500, 400));
        assert_eq!(core.version(), 1);
    }

    #[test]
    fn unchanged_size_does_not_notify() {
        let (host, observer) = setup();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let core = WatcherCore::new(
            &observer,
            Config::window(),
            Some(Rc::new(move |_| *sink.borrow_mut() += 1)),
        );

        host.resize_window(1024, 768);
        host.advance(Duration::from_millis(100));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(core.version(), 0);
    }

    #[test]
    fn dispose_detaches_and_keeps_last_size() {
        let (host, observer) = setup();
        let mut core = WatcherCore::new(&observer, Config::viewport(), None);
        assert!(core.is_active());
        assert_eq!(host.listener_count(), 1);

        assert!(core.dispose());
        assert!(!core.dispose());
        assert!(!core.is_active());
        assert!(observer.is_idle());

        host.resize_window(1, 1);
        host.advance(Duration::from_millis(100));
        assert_eq!(core.size(), Size::new(1024, 768));
        assert_eq!(core.config(), Config::viewport());
    }
}
