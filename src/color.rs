use crate::error::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An 8-bit-per-channel color as stored in Tiled documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Alpha.
    pub a: u8,
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

/// Where the alpha channel sits in a hex literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// `#AARRGGBB` / `#ARGB`, used by most Tiled attributes.
    AlphaFirst,
    /// `#RRGGBBAA` / `#RGBA`.
    AlphaLast,
}

impl Color {
    /// Color from its four channels.
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color { a, r, g, b }
    }

    /// Unpacks `0xAARRGGBB`.
    pub const fn from_argb(raw: u32) -> Self {
        Color {
            a: (raw >> 24) as u8,
            r: (raw >> 16) as u8,
            g: (raw >> 8) as u8,
            b: raw as u8,
        }
    }

    /// Unpacks `0xRRGGBBAA`.
    pub const fn from_rgba(raw: u32) -> Self {
        Color {
            r: (raw >> 24) as u8,
            g: (raw >> 16) as u8,
            b: (raw >> 8) as u8,
            a: raw as u8,
        }
    }

    /// Packs as `0xAARRGGBB`.
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Packs as `0xRRGGBBAA`.
    pub const fn to_rgba(self) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | self.a as u32
    }

    /// Decodes an alpha-first literal (`#AARRGGBB` family).
    pub fn from_hex_argb(literal: &str) -> Result<Self> {
        Self::from_hex(literal, ChannelOrder::AlphaFirst)
    }

    /// Decodes an alpha-last literal (`#RRGGBBAA` family).
    pub fn from_hex_rgba(literal: &str) -> Result<Self> {
        Self::from_hex(literal, ChannelOrder::AlphaLast)
    }

    /// Decodes a 3, 4, 6 or 8 digit hex literal with an optional leading `#`.
    ///
    /// Literals without alpha get `0xff`. In the 3/4 digit forms every digit
    /// is one nibble and is doubled, so `#f80` reads as `#ff8800`.
    pub fn from_hex(literal: &str, order: ChannelOrder) -> Result<Self> {
        let invalid = || MapError::InvalidColorLiteral {
            raw_text: literal.to_string(),
        };

        let digits = literal.strip_prefix('#').unwrap_or(literal);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut channels = [0xffu8; 4];
        let components: Vec<u8> = match digits.len() {
            3 | 4 => digits.bytes().map(|d| nibble(d) * 0x11).collect(),
            6 | 8 => digits
                .as_bytes()
                .chunks(2)
                .map(|pair| nibble(pair[0]) << 4 | nibble(pair[1]))
                .collect(),
            _ => return Err(invalid()),
        };

        // channels is laid out a, r, g, b
        match (components.len(), order) {
            (3, _) => channels[1..].copy_from_slice(&components),
            (4, ChannelOrder::AlphaFirst) => channels.copy_from_slice(&components),
            (4, ChannelOrder::AlphaLast) => {
                channels[1..].copy_from_slice(&components[..3]);
                channels[0] = components[3];
            }
            _ => return Err(invalid()),
        }

        let [a, r, g, b] = channels;
        Ok(Color { a, r, g, b })
    }
}

fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

impl FromStr for Color {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_hex_argb(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_literal_length() {
        let cases = [
            ("#ABC", "ffaabbcc"),
            ("#8ABC", "88aabbcc"),
            ("#A1B2C3", "ffa1b2c3"),
            ("#80A1B2C3", "80a1b2c3"),
        ];
        for (literal, canonical) in cases {
            let color = Color::from_hex_argb(literal).expect(literal);
            assert_eq!(color.to_string(), canonical);
            let again = Color::from_hex_argb(&color.to_string()).expect("canonical");
            assert_eq!(again, color);
        }
    }

    #[test]
    fn short_digits_are_nibbles_not_decimals() {
        // 'f' must read as 15 and expand to 0xff, never fail a decimal parse
        let color = Color::from_hex_argb("#f09").expect("short literal");
        assert_eq!(color, Color::new(0xff, 0xff, 0x00, 0x99));
    }

    #[test]
    fn alpha_position_follows_channel_order() {
        let argb = Color::from_hex_argb("11223344").expect("argb");
        assert_eq!(argb, Color::new(0x11, 0x22, 0x33, 0x44));

        let rgba = Color::from_hex_rgba("11223344").expect("rgba");
        assert_eq!(rgba, Color::new(0x44, 0x11, 0x22, 0x33));

        let rgba_short = Color::from_hex_rgba("#1234").expect("rgba short");
        assert_eq!(rgba_short, Color::new(0x44, 0x11, 0x22, 0x33));

        let opaque = Color::from_hex_rgba("#102030").expect("no alpha");
        assert_eq!(opaque.a, 0xff);
    }

    #[test]
    fn packed_forms_agree() {
        let color = Color::new(0x80, 0x10, 0x20, 0x30);
        assert_eq!(color.to_argb(), 0x8010_2030);
        assert_eq!(color.to_rgba(), 0x1020_3080);
        assert_eq!(Color::from_argb(color.to_argb()), color);
        assert_eq!(Color::from_rgba(color.to_rgba()), color);
    }

    #[test]
    fn rejects_bad_literals() {
        for literal in ["", "#", "#12", "#12345", "#1234567", "#123456789", "#gg0000", "#+12"] {
            let err = Color::from_hex_argb(literal).unwrap_err();
            assert!(
                matches!(err, MapError::InvalidColorLiteral { ref raw_text } if raw_text == literal),
                "{literal}"
            );
        }
    }
}
