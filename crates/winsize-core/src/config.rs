#![forbid(unsafe_code)]

//! Observation configuration and subscription keys.
//!
//! A [`Config`] names *what* a consumer observes ([`SizeKind`]) and *how*
//! updates are coalesced (the debounce delay). Consumers whose configs are
//! equal share a single underlying subscription; the [`SubscriptionKey`] is
//! that identity.
//!
//! Configs are immutable values. Changing the debounce delay of a live
//! consumer is modeled as leaving one key and joining another (see
//! [`Binding::reconfigure`](crate::Binding::reconfigure)), never as mutating
//! a subscription in place.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::debounce::clamp_millis;

/// Debounce delay used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Which dimensions a subscription reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SizeKind {
    /// Window inner size (`innerWidth` / `innerHeight`).
    #[default]
    Window,
    /// Visual viewport size, accounting for pinch-zoom and on-screen
    /// keyboards. Falls back to [`SizeKind::Window`] when unsupported.
    Viewport,
}

impl SizeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::Viewport => "viewport",
        }
    }
}

impl fmt::Display for SizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`SizeKind`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSizeKindError {
    input: String,
}

impl ParseSizeKindError {
    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseSizeKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown size kind: {:?} (expected \"window\" or \"viewport\")",
            self.input
        )
    }
}

impl std::error::Error for ParseSizeKindError {}

impl FromStr for SizeKind {
    type Err = ParseSizeKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" => Ok(Self::Window),
            "viewport" => Ok(Self::Viewport),
            _ => Err(ParseSizeKindError {
                input: s.to_string(),
            }),
        }
    }
}

/// Configuration for one observing consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Quiet period after the last resize event before consumers are
    /// notified. Default: 100ms.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "debounce_ms", with = "duration_millis", default = "default_debounce")
    )]
    pub debounce: Duration,
    /// Dimensions to report. Default: [`SizeKind::Window`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: SizeKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            kind: SizeKind::Window,
        }
    }
}

impl Config {
    /// Window size with the default debounce delay.
    #[must_use]
    pub const fn window() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            kind: SizeKind::Window,
        }
    }

    /// Visual viewport size with the default debounce delay.
    #[must_use]
    pub const fn viewport() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            kind: SizeKind::Viewport,
        }
    }

    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the debounce delay from a loosely typed millisecond value.
    ///
    /// Negative, NaN and infinite inputs clamp to zero.
    #[must_use]
    pub fn with_debounce_millis(mut self, millis: f64) -> Self {
        self.debounce = clamp_millis(millis);
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: SizeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Identity of the shared subscription this config maps to.
    #[must_use]
    pub const fn key(&self) -> SubscriptionKey {
        SubscriptionKey {
            kind: self.kind,
            debounce: self.debounce,
        }
    }
}

/// Identity of one shared subscription: `(kind, debounce)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionKey {
    pub kind: SizeKind,
    pub debounce: Duration,
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}ms", self.kind, self.debounce.as_millis())
    }
}

#[cfg(feature = "serde")]
fn default_debounce() -> Duration {
    DEFAULT_DEBOUNCE
}

#[cfg(feature = "serde")]
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_window_constructor() {
        let config = Config::default();
        assert_eq!(config, Config::window());
        assert_eq!(config.debounce, Duration::from_millis(100));
        assert_eq!(config.kind, SizeKind::Window);
    }

    #[test]
    fn builder_methods() {
        let config = Config::viewport().with_debounce(Duration::from_millis(250));
        assert_eq!(config.kind, SizeKind::Viewport);
        assert_eq!(config.debounce, Duration::from_millis(250));

        let config = config.with_kind(SizeKind::Window);
        assert_eq!(config.kind, SizeKind::Window);
    }

    #[test]
    fn debounce_millis_clamps() {
        assert_eq!(
            Config::window().with_debounce_millis(-20.0).debounce,
            Duration::ZERO
        );
        assert_eq!(
            Config::window().with_debounce_millis(f64::NAN).debounce,
            Duration::ZERO
        );
        assert_eq!(
            Config::window().with_debounce_millis(42.9).debounce,
            Duration::from_millis(42)
        );
    }

    #[test]
    fn keys_distinguish_kind_and_delay() {
        let a = Config::window().key();
        let b = Config::window().with_debounce(Duration::from_millis(50)).key();
        let c = Config::viewport().key();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, Config::default().key());
        assert_eq!(c.to_string(), "viewport@100ms");
    }

    #[test]
    fn parse_size_kind() {
        assert_eq!("window".parse::<SizeKind>(), Ok(SizeKind::Window));
        assert_eq!(" Viewport ".parse::<SizeKind>(), Ok(SizeKind::Viewport));
        let err = "screen".parse::<SizeKind>().unwrap_err();
        assert_eq!(err.input(), "screen");
        assert!(err.to_string().contains("screen"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_millis() {
        let config = Config::viewport().with_debounce(Duration::from_millis(250));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"debounce_ms":250,"kind":"viewport"}"#);

        let parsed: Config = serde_json::from_str(r#"{"kind":"window"}"#).unwrap();
        assert_eq!(parsed, Config::window());
    }
}
