//! Deterministic source colors.
//!
//! Project summaries and the render surface must agree on a source's color,
//! so both go through [`source_color`].

use sha1::{Digest, Sha1};

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#RRGGBB` in upper case.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// The fixed 8-color source palette.
pub const SOURCE_PALETTE: [Rgb; 8] = [
    Rgb::new(0xFF, 0x6B, 0x6B),
    Rgb::new(0x4E, 0xCD, 0xC4),
    Rgb::new(0x45, 0xB7, 0xD1),
    Rgb::new(0x96, 0xCE, 0xB4),
    Rgb::new(0xFE, 0xCA, 0x57),
    Rgb::new(0xFF, 0x9F, 0xF3),
    Rgb::new(0x54, 0xA0, 0xFF),
    Rgb::new(0x5F, 0x27, 0xCD),
];

/// Palette slot for a source name. Stable across processes and platforms.
#[must_use]
pub fn source_color_index(source: &str) -> usize {
    let digest = Sha1::digest(source.as_bytes());
    usize::from(digest[0]) % SOURCE_PALETTE.len()
}

#[must_use]
pub fn source_color(source: &str) -> Rgb {
    SOURCE_PALETTE[source_color_index(source)]
}
