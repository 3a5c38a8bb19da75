#![forbid(unsafe_code)]

//! Structured logging support.
//!
//! Runtime events are emitted with `tracing` when the `tracing` feature is
//! enabled; without it every call site compiles away. Levels:
//!
//! | Level | Events |
//! |-------|--------|
//! | `debug` | attach, detach, register, unregister |
//! | `trace` | debounce trigger, dispatch fan-out |
//! | `warn`  | degraded host environment |
//!
//! The `tracing-json` feature adds [`init_json_logging`] for native tools and
//! tests that want machine-readable output.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

/// Install a global JSON subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
