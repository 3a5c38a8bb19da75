#![forbid(unsafe_code)]

//! Width/height pair reported to consumers.

use std::fmt;

/// Immutable width/height pair in CSS pixels.
///
/// Depending on the [`SizeKind`](crate::SizeKind) of the subscription this is
/// either the window's inner size or the visual viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Hydration-safe default reported when no environment exists.
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Build a size from floating-point browser measurements.
    ///
    /// Values are rounded to the nearest pixel. Negative and non-finite
    /// inputs become 0; values beyond `u32::MAX` saturate.
    #[must_use]
    pub fn from_f64(width: f64, height: f64) -> Self {
        Self::new(px_from_f64(width), px_from_f64(height))
    }

    /// True when both dimensions are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Convert a browser pixel measurement to a whole pixel count.
#[must_use]
pub(crate) fn px_from_f64(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let rounded = value.round();
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_default() {
        assert_eq!(Size::default(), Size::ZERO);
        assert!(Size::ZERO.is_zero());
        assert!(!Size::new(1, 0).is_zero());
    }

    #[test]
    fn from_f64_rounds_and_clamps() {
        assert_eq!(Size::from_f64(1023.6, 767.4), Size::new(1024, 767));
        assert_eq!(Size::from_f64(-5.0, f64::NAN), Size::ZERO);
        assert_eq!(Size::from_f64(f64::INFINITY, 1e12).height, u32::MAX);
    }

    #[test]
    fn display_format() {
        assert_eq!(Size::new(1024, 768).to_string(), "1024x768");
    }

    #[test]
    fn from_tuple() {
        let size: Size = (3, 4).into();
        assert_eq!(size, Size::new(3, 4));
    }
}
