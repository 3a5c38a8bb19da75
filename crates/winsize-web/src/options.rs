#![forbid(unsafe_code)]

//! Watcher options as read from a JavaScript options object.
//!
//! The JS layer extracts raw fields with `Reflect`; everything after that is
//! plain Rust so the validation rules are testable natively.
//!
//! | Field          | Accepted                 | Otherwise                    |
//! |----------------|--------------------------|------------------------------|
//! | `debounceTime` | finite number, ms        | default (100 ms)             |
//! | `kind`         | `"window"`, `"viewport"` | non-string: default; unknown string: [`OptionsError`] |

use std::fmt;

use winsize_core::{Config, ParseSizeKindError, SizeKind};

/// Raw option fields. `None` means absent or of the wrong JS type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatcherOptions {
    pub debounce_ms: Option<f64>,
    pub kind: Option<String>,
}

impl WatcherOptions {
    /// Validate and convert into a [`Config`].
    pub fn to_config(&self) -> Result<Config, OptionsError> {
        let mut config = Config::default();
        if let Some(ms) = self.debounce_ms.filter(|ms| ms.is_finite()) {
            config = config.with_debounce_millis(ms);
        }
        if let Some(kind) = &self.kind {
            let kind: SizeKind = kind.parse().map_err(OptionsError::UnknownKind)?;
            config = config.with_kind(kind);
        }
        Ok(config)
    }
}

/// Errors from validating [`WatcherOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// `kind` was a string naming neither `window` nor `viewport`.
    UnknownKind(ParseSizeKindError),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind(err) => write!(f, "invalid watcher options: {err}"),
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownKind(err) => Some(err),
        }
    }
}
