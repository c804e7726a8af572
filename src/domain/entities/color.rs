use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub hex: String,
}

impl Color {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            hex: format!("#{:02x}{:02x}{:02x}", r, g, b),
        }
    }

    /// Parses `#rrggbb` (case-insensitive); the stored hex is normalized to lowercase.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Color::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// True when `hex` is well formed and agrees with the rgb channels.
    pub fn is_consistent(&self) -> bool {
        Color::from_hex(&self.hex).is_some_and(|parsed| parsed.r == self.r && parsed.g == self.g && parsed.b == self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: Color,
    pub secondary_color: Color,
    pub accent_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: Color::from_rgb(59, 130, 246),
            secondary_color: Color::from_rgb(147, 51, 234),
            accent_color: Color::from_rgb(236, 72, 153),
        }
    }
}
