//! ARGB color used by field values and rendering

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 8-bit ARGB color.
///
/// Text form is `#AARRGGBB`, which is also how colors are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::argb(0, 255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Convert to image crate RGBA order
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}', expected #AARRGGBB")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 8 && h.is_ascii())
            .ok_or_else(|| ParseColorError(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Color::argb(channel(0)?, channel(2)?, channel(4)?, channel(6)?))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_text_form() {
        let c = Color::argb(0x80, 0x12, 0xAB, 0xFF);
        assert_eq!(c.to_string(), "#8012ABFF");
        assert_eq!("#8012abff".parse::<Color>(), Ok(c));
    }

    #[test]
    fn test_color_rejects_short_forms() {
        assert!("#FF0000".parse::<Color>().is_err());
        assert!("FF0000FF".parse::<Color>().is_err());
        assert!("#GG0000FF".parse::<Color>().is_err());
    }

    #[test]
    fn test_rgba_order() {
        assert_eq!(Color::argb(1, 2, 3, 4).to_rgba_u8(), [2, 3, 4, 1]);
    }
}
