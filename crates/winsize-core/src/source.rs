#![forbid(unsafe_code)]

//! Size reads with capability fallback.
//!
//! # Fallback chain
//!
//! ```text
//! Viewport: visual viewport ──(absent)──┐
//!                                       ▼
//! Window:   inner size → root element client size → body client size → 0
//! ```
//!
//! The window chain is resolved per dimension: a layer that reports `None`
//! or 0 for one dimension hands that dimension to the next layer while the
//! other dimension may still come from an earlier layer.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No environment (server-side) | [`Size::ZERO`] |
//! | No visual viewport | Silent fallback to window chain |
//! | Every window layer unavailable | Dimension reads as 0 |

use crate::host::{Dimensions, Environment, Host};
use crate::{Size, SizeKind};

/// Reads the current dimensions from an environment.
#[derive(Clone, Copy)]
pub struct SizeSource<'a> {
    env: Option<&'a dyn Environment>,
}

impl std::fmt::Debug for SizeSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeSource")
            .field("interactive", &self.env.is_some())
            .finish()
    }
}

impl<'a> SizeSource<'a> {
    /// Source backed by the host's environment (if any).
    #[must_use]
    pub fn from_host(host: &'a dyn Host) -> Self {
        Self {
            env: host.environment(),
        }
    }

    #[must_use]
    pub fn new(env: &'a dyn Environment) -> Self {
        Self { env: Some(env) }
    }

    /// Source for a non-interactive context. Every read returns
    /// [`Size::ZERO`].
    #[must_use]
    pub const fn server() -> Self {
        Self { env: None }
    }

    /// Whether an interactive environment is present.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.env.is_some()
    }

    /// Whether the visual viewport capability is available.
    #[must_use]
    pub fn has_viewport(&self) -> bool {
        self.env
            .is_some_and(|env| env.visual_viewport_size().is_some())
    }

    /// Read the current size for `kind`.
    #[must_use]
    pub fn read(&self, kind: SizeKind) -> Size {
        let Some(env) = self.env else {
            return Size::ZERO;
        };
        match kind {
            SizeKind::Viewport => env
                .visual_viewport_size()
                .unwrap_or_else(|| window_size(env)),
            SizeKind::Window => window_size(env),
        }
    }
}

fn window_size(env: &dyn Environment) -> Size {
    let layers = [
        env.inner_size(),
        env.document_client_size(),
        env.body_client_size(),
    ];
    Size::new(
        first_nonzero(&layers, |d| d.width),
        first_nonzero(&layers, |d| d.height),
    )
}

fn first_nonzero(layers: &[Dimensions], pick: impl Fn(&Dimensions) -> Option<u32>) -> u32 {
    layers
        .iter()
        .filter_map(pick)
        .find(|&v| v > 0)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeEnv {
        inner: Dimensions,
        document: Dimensions,
        body: Dimensions,
        viewport: Option<Size>,
    }

    impl Environment for FakeEnv {
        fn inner_size(&self) -> Dimensions {
            self.inner
        }
        fn document_client_size(&self) -> Dimensions {
            self.document
        }
        fn body_client_size(&self) -> Dimensions {
            self.body
        }
        fn visual_viewport_size(&self) -> Option<Size> {
            self.viewport
        }
    }

    #[test]
    fn server_reads_zero() {
        let source = SizeSource::server();
        assert!(!source.is_interactive());
        assert!(!source.has_viewport());
        assert_eq!(source.read(SizeKind::Window), Size::ZERO);
        assert_eq!(source.read(SizeKind::Viewport), Size::ZERO);
    }

    #[test]
    fn window_prefers_inner_size() {
        let env = FakeEnv {
            inner: Dimensions::new(1024, 768),
            document: Dimensions::new(1000, 700),
            body: Dimensions::new(900, 600),
            ..FakeEnv::default()
        };
        assert_eq!(SizeSource::new(&env).read(SizeKind::Window), Size::new(1024, 768));
    }

    #[test]
    fn window_falls_back_per_dimension() {
        let env = FakeEnv {
            inner: Dimensions {
                width: Some(0),
                height: Some(768),
            },
            document: Dimensions {
                width: None,
                height: Some(700),
            },
            body: Dimensions::new(900, 600),
            ..FakeEnv::default()
        };
        assert_eq!(SizeSource::new(&env).read(SizeKind::Window), Size::new(900, 768));
    }

    #[test]
    fn window_all_layers_missing_reads_zero() {
        let env = FakeEnv::default();
        assert_eq!(SizeSource::new(&env).read(SizeKind::Window), Size::ZERO);
    }

    #[test]
    fn viewport_uses_visual_viewport() {
        let env = FakeEnv {
            inner: Dimensions::new(1024, 768),
            viewport: Some(Size::new(512, 384)),
            ..FakeEnv::default()
        };
        let source = SizeSource::new(&env);
        assert!(source.has_viewport());
        assert_eq!(source.read(SizeKind::Viewport), Size::new(512, 384));
        assert_eq!(source.read(SizeKind::Window), Size::new(1024, 768));
    }

    #[test]
    fn viewport_falls_back_to_window() {
        let env = FakeEnv {
            inner: Dimensions::new(1024, 768),
            ..FakeEnv::default()
        };
        let source = SizeSource::new(&env);
        assert!(!source.has_viewport());
        assert_eq!(source.read(SizeKind::Viewport), Size::new(1024, 768));
    }
}
