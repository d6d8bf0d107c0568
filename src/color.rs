//! 24-bit RGB color values: parsing, formatting, and brightness shifts.
//!
//! Colors travel as `#rrggbb` strings in persisted settings and in generated
//! CSS, so the serde impls keep that string shape on the wire.

use crate::error::ColorParseError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build a color from raw channel values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a strict `#rrggbb` hex color (case-insensitive).
    ///
    /// Anything else is rejected so malformed values never reach color
    /// arithmetic or generated stylesheets.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::new(input))?;
        // from_str_radix tolerates a leading sign, so every byte must be
        // checked as a hex digit before slicing into channel pairs.
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::new(input));
        }
        let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| ColorParseError::new(input))?;
        let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| ColorParseError::new(input))?;
        let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| ColorParseError::new(input))?;
        Ok(Self { r, g, b })
    }

    /// Shift brightness by a signed percentage.
    ///
    /// Each channel moves by round(2.55 x percent), with halves rounding
    /// toward positive infinity, then saturates to the channel range.
    pub fn shift(self, percent: i16) -> Self {
        let amt = (2.55_f64 * f64::from(percent) + 0.5).floor() as i32;
        Self {
            r: shift_channel(self.r, amt),
            g: shift_channel(self.g, amt),
            b: shift_channel(self.b, amt),
        }
    }
}

/// Apply a signed channel delta with saturation at both ends.
fn shift_channel(value: u8, amt: i32) -> u8 {
    (i32::from(value) + amt).clamp(0, 255) as u8
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}
