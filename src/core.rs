pub use kurbo::{Affine, Point, Rect, Vec2};

use crate::error::{DriftboxError, DriftboxResult};

/// Logical canvas size in CSS-like pixels (pre device-pixel-ratio).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Straight-alpha RGBA color, 8 bits per channel.
///
/// Serializes as a hex string (`"#rrggbb"`, or `"#rrggbbaa"` when not fully
/// opaque); deserializes from `#rgb`, `#rrggbb`, or `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses `#rgb`, `#rrggbb`, or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(s: &str) -> DriftboxResult<Self> {
        let raw = s.trim();
        let raw = raw.strip_prefix('#').unwrap_or(raw);

        // The length match and slices below are byte-indexed.
        if !raw.is_ascii() {
            return Err(DriftboxError::validation(format!(
                "hex color \"{s}\" must be ASCII"
            )));
        }

        fn hex_byte(pair: &str) -> DriftboxResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| DriftboxError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        fn hex_nibble(ch: &str) -> DriftboxResult<u8> {
            let n = u8::from_str_radix(ch, 16)
                .map_err(|_| DriftboxError::validation(format!("invalid hex digit \"{ch}\"")))?;
            Ok(n << 4 | n)
        }

        match raw.len() {
            3 => Ok(Self::opaque(
                hex_nibble(&raw[0..1])?,
                hex_nibble(&raw[1..2])?,
                hex_nibble(&raw[2..3])?,
            )),
            6 => Ok(Self::opaque(
                hex_byte(&raw[0..2])?,
                hex_byte(&raw[2..4])?,
                hex_byte(&raw[4..6])?,
            )),
            8 => Ok(Self::new(
                hex_byte(&raw[0..2])?,
                hex_byte(&raw[2..4])?,
                hex_byte(&raw[4..6])?,
                hex_byte(&raw[6..8])?,
            )),
            _ => Err(DriftboxError::validation(format!(
                "hex color \"{s}\" must be #rgb, #rrggbb, or #rrggbbaa"
            ))),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
