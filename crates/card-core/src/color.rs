//! CSS-style colors

use crate::{CardError, Result};
use std::fmt;
use std::str::FromStr;

/// RGBA color (values 0 - 255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Black color
    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// White color
    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Fully transparent black
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or one of
    /// `black`, `white`, `transparent`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "black" => return Ok(Self::black()),
            "white" => return Ok(Self::white()),
            "transparent" => return Ok(Self::transparent()),
            _ => {}
        }

        let invalid = || CardError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

        let parsed = match hex.len() {
            3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
            4 => (nibble(0), nibble(1), nibble(2), nibble(3)),
            6 => (byte(0), byte(2), byte(4), Ok(255)),
            8 => (byte(0), byte(2), byte(4), byte(6)),
            _ => return Err(invalid()),
        };

        match parsed {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Self::rgba(r, g, b, a)),
            _ => Err(invalid()),
        }
    }

    /// Parse, or return `fallback` when the string is not a color
    pub fn parse_or(s: &str, fallback: Color) -> Self {
        Self::parse(s).unwrap_or(fallback)
    }

    /// `#rrggbb`, or `#rrggbbaa` when not opaque
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl FromStr for Color {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_hex() {
        assert_eq!(Color::parse("#F7F8FA").unwrap(), Color::rgb(0xF7, 0xF8, 0xFA));
        assert_eq!(Color::parse("#3b82f6").unwrap(), Color::rgb(0x3B, 0x82, 0xF6));
    }

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(Color::parse("#fff").unwrap(), Color::white());
        assert_eq!(Color::parse("#f008").unwrap(), Color::rgba(255, 0, 0, 0x88));
    }

    #[test]
    fn test_parse_with_alpha() {
        assert_eq!(
            Color::parse("#00000080").unwrap(),
            Color::rgba(0, 0, 0, 0x80)
        );
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Color::parse("White").unwrap(), Color::white());
        assert_eq!(Color::parse("transparent").unwrap(), Color::transparent());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Color::parse("").is_err());
        assert!(Color::parse("000000").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gggggg").is_err());
        assert!(Color::parse("#ééé").is_err());
    }

    #[test]
    fn test_parse_or_fallback() {
        assert_eq!(Color::parse_or("nope", Color::white()), Color::white());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::rgb(0xF7, 0xF8, 0xFA).to_hex(), "#F7F8FA");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_hex(), "#01020304");
    }
}
