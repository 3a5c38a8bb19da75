//! Property-based invariant tests for the resize observer registry.
//!
//! These tests verify structural invariants that must hold for **any**
//! sequence of observe / unsubscribe / reconfigure operations and any
//! resize event timing:
//!
//! 1. Live listener sets equal the number of keys with active consumers.
//! 2. Each key's consumer count matches the model.
//! 3. An idle observer leaves no listeners and no timers behind.
//! 4. A burst of events produces one dispatch per quiet gap, carrying the
//!    size current at fire time.
//! 5. Inactive bindings never receive deliveries.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use winsize_core::{Binding, Config, HeadlessHost, ResizeObserver, Size, SubscriptionKey};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Observe(usize),
    Unsubscribe(usize),
    Reconfigure(usize, usize),
    Resize(u32, u32),
    Advance(u64),
}

/// A small palette of configs so keys collide often.
fn configs() -> Vec<Config> {
    vec![
        Config::window(),
        Config::window().with_debounce(Duration::from_millis(10)),
        Config::viewport(),
        Config::viewport().with_debounce(Duration::ZERO),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..4).prop_map(Op::Observe),
        2 => (0usize..16).prop_map(Op::Unsubscribe),
        1 => (0usize..16, 0usize..4).prop_map(|(b, c)| Op::Reconfigure(b, c)),
        2 => (1u32..2000, 1u32..2000).prop_map(|(w, h)| Op::Resize(w, h)),
        2 => (0u64..250).prop_map(Op::Advance),
    ]
}

struct Tracked {
    binding: Binding,
    deliveries_while_inactive: Rc<Cell<u32>>,
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn listener_sets_match_active_keys(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let host = Rc::new(HeadlessHost::new(Size::new(800, 600)));
        let observer = ResizeObserver::new(host.clone());
        let palette = configs();
        let mut tracked: Vec<Tracked> = Vec::new();

        for op in ops {
            match op {
                Op::Observe(c) => {
                    let binding = observer.observe(palette[c], |_| {});
                    tracked.push(Tracked {
                        binding,
                        deliveries_while_inactive: Rc::new(Cell::new(0)),
                    });
                }
                Op::Unsubscribe(i) => {
                    if let Some(t) = tracked.get(i) {
                        t.binding.unsubscribe();
                        // Any later delivery to this binding is a violation.
                        let counter = Rc::clone(&t.deliveries_while_inactive);
                        t.binding.set_callback(move |_| counter.set(counter.get() + 1));
                    }
                }
                Op::Reconfigure(i, c) => {
                    if let Some(t) = tracked.get(i) {
                        t.binding.reconfigure(palette[c]);
                    }
                }
                Op::Resize(w, h) => host.resize_window(w, h),
                Op::Advance(dt) => {
                    host.advance(Duration::from_millis(dt));
                }
            }

            // Model: active bindings grouped by key.
            let mut model: BTreeMap<SubscriptionKey, usize> = BTreeMap::new();
            for t in tracked.iter().filter(|t| t.binding.is_active()) {
                *model.entry(t.binding.config().key()).or_default() += 1;
            }

            // No viewport capability: every key owns exactly one listener.
            prop_assert_eq!(host.listener_count(), model.len());
            prop_assert_eq!(observer.subscription_count(), model.len());
            for config in &palette {
                let expected = model.get(&config.key()).copied().unwrap_or(0);
                prop_assert_eq!(observer.consumer_count(*config), expected);
                prop_assert_eq!(observer.is_attached(*config), expected > 0);
            }
            prop_assert!(host.pending_timers() <= model.len());
        }

        for t in &tracked {
            prop_assert_eq!(t.deliveries_while_inactive.get(), 0);
        }

        drop(tracked);
        prop_assert!(observer.is_idle());
        prop_assert_eq!(host.listener_count(), 0);
        prop_assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn bursts_dispatch_once_per_quiet_gap(
        gaps in proptest::collection::vec(0u64..300, 1..40),
        delay in 1u64..200,
    ) {
        let host = Rc::new(HeadlessHost::new(Size::new(1, 1)));
        let observer = ResizeObserver::new(host.clone());
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let _binding = observer.observe(
            Config::window().with_debounce(Duration::from_millis(delay)),
            move |size| log_clone.borrow_mut().push(size),
        );
        log.borrow_mut().clear();

        let mut expected = Vec::new();
        let mut last_size = Size::ZERO;
        for (i, gap) in gaps.iter().enumerate() {
            if i > 0 {
                host.advance(Duration::from_millis(*gap));
                if *gap >= delay {
                    expected.push(last_size);
                }
            }
            let side = u32::try_from(i).unwrap_or(u32::MAX) + 2;
            host.resize_window(side, side);
            last_size = Size::new(side, side);
        }
        host.advance(Duration::from_millis(delay));
        expected.push(last_size);

        prop_assert_eq!(&*log.borrow(), &expected);
    }
}
