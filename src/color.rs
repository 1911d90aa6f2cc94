//! Background colour values used when flattening results
//!
//! A colour is either the `Transparent` sentinel, which tells the compositor
//! to keep the result's own alpha channel, or a solid RGBA value.

use crate::error::{BgRemovalError, Result};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Swatches offered by the background picker, darkest first
pub const PRESET_BACKGROUNDS: [&str; 10] = [
    "#111827", // Dark gray
    "#1F2937", // Slightly lighter gray
    "#374151", // Medium gray
    "#4B5563", // Light gray
    "#6B7280", // Very light gray
    "#000000", // Black
    "#18181B", // Dark slate
    "#3F3F46", // Medium slate
    "#52525B", // Light slate
    "#71717A", // Very light slate
];

/// Background colour for composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BackgroundColor {
    /// Skip the fill step and keep the source alpha
    #[default]
    Transparent,
    /// Fill the surface with this colour before drawing
    Solid(Rgba<u8>),
}

impl BackgroundColor {
    /// Opaque colour from RGB components
    #[must_use]
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Solid(Rgba([r, g, b, 255]))
    }

    /// Parse a colour string
    ///
    /// Accepts `transparent` (case-insensitive), `#RGB`, `#RRGGBB` and
    /// `#RRGGBBAA`, with or without the leading `#`.
    ///
    /// # Examples
    /// ```rust
    /// use bgremove_gallery::BackgroundColor;
    ///
    /// let gray = BackgroundColor::parse("#111827").unwrap();
    /// assert_eq!(gray, BackgroundColor::rgb(0x11, 0x18, 0x27));
    /// assert_eq!(BackgroundColor::parse("transparent").unwrap(), BackgroundColor::Transparent);
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("transparent") {
            return Ok(Self::Transparent);
        }

        let hex = value.trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BgRemovalError::invalid_config(format!(
                "Invalid colour '{}': expected #RGB, #RRGGBB, #RRGGBBAA or 'transparent'",
                value
            )));
        }

        let channel = |range: std::ops::Range<usize>| -> Result<u8> {
            hex.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(|| {
                    BgRemovalError::invalid_config(format!("Invalid colour component in '{}'", value))
                })
        };

        match hex.len() {
            3 => Ok(Self::rgb(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
            )),
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::Solid(Rgba([
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            ]))),
            _ => Err(BgRemovalError::invalid_config(format!(
                "Invalid colour '{}': expected #RGB, #RRGGBB, #RRGGBBAA or 'transparent'",
                value
            ))),
        }
    }

    /// Hex form of the colour; opaque colours omit the alpha byte
    #[must_use]
    pub fn to_hex(&self) -> String {
        match self {
            Self::Transparent => "transparent".to_string(),
            Self::Solid(Rgba([r, g, b, 255])) => format!("#{:02x}{:02x}{:02x}", r, g, b),
            Self::Solid(Rgba([r, g, b, a])) => format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a),
        }
    }

    #[must_use]
    pub fn is_transparent(&self) -> bool {
        matches!(self, Self::Transparent)
    }

    /// All picker presets as parsed colours
    #[must_use]
    pub fn presets() -> Vec<Self> {
        PRESET_BACKGROUNDS
            .iter()
            .filter_map(|hex| Self::parse(hex).ok())
            .collect()
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for BackgroundColor {
    type Err = BgRemovalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BackgroundColor {
    type Error = BgRemovalError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<BackgroundColor> for String {
    fn from(color: BackgroundColor) -> Self {
        color.to_hex()
    }
}
