// src/pixel.rs

//! Defines the `Pixel` color value and the `BlendMode` policy consulted by the
//! compositor. A `Pixel` is four 8-bit channels laid out r, g, b, a in memory,
//! so a whole frame of them can be handed to a display backend as one byte
//! slice without conversion.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A single RGBA color value with 8 bits per channel.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable,
)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// Creates a fully opaque pixel from red, green, and blue components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Pixel { r, g, b, a: 255 }
    }

    /// Creates a pixel with an explicit alpha component.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Pixel { r, g, b, a }
    }
}

impl Default for Pixel {
    /// Returns opaque black, the value out-of-range buffer reads resolve to.
    fn default() -> Self {
        Pixel::new(0, 0, 0)
    }
}

/// The standard palette. `DARK_` variants sit at half intensity and
/// `VERY_DARK_` variants at quarter intensity of their base color.
impl Pixel {
    pub const WHITE: Pixel = Pixel::new(255, 255, 255);
    pub const GREY: Pixel = Pixel::new(192, 192, 192);
    pub const DARK_GREY: Pixel = Pixel::new(128, 128, 128);
    pub const VERY_DARK_GREY: Pixel = Pixel::new(64, 64, 64);
    pub const RED: Pixel = Pixel::new(255, 0, 0);
    pub const DARK_RED: Pixel = Pixel::new(128, 0, 0);
    pub const VERY_DARK_RED: Pixel = Pixel::new(64, 0, 0);
    pub const YELLOW: Pixel = Pixel::new(255, 255, 0);
    pub const DARK_YELLOW: Pixel = Pixel::new(128, 128, 0);
    pub const VERY_DARK_YELLOW: Pixel = Pixel::new(64, 64, 0);
    pub const GREEN: Pixel = Pixel::new(0, 255, 0);
    pub const DARK_GREEN: Pixel = Pixel::new(0, 128, 0);
    pub const VERY_DARK_GREEN: Pixel = Pixel::new(0, 64, 0);
    pub const CYAN: Pixel = Pixel::new(0, 255, 255);
    pub const DARK_CYAN: Pixel = Pixel::new(0, 128, 128);
    pub const VERY_DARK_CYAN: Pixel = Pixel::new(0, 64, 64);
    pub const BLUE: Pixel = Pixel::new(0, 0, 255);
    pub const DARK_BLUE: Pixel = Pixel::new(0, 0, 128);
    pub const VERY_DARK_BLUE: Pixel = Pixel::new(0, 0, 64);
    pub const MAGENTA: Pixel = Pixel::new(255, 0, 255);
    pub const DARK_MAGENTA: Pixel = Pixel::new(128, 0, 128);
    pub const VERY_DARK_MAGENTA: Pixel = Pixel::new(64, 0, 64);
    pub const BLACK: Pixel = Pixel::new(0, 0, 0);
    /// Fully transparent black.
    pub const BLANK: Pixel = Pixel::rgba(0, 0, 0, 0);
}

/// Selects how the compositor combines an incoming pixel with the pixel
/// already stored at the target location.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
pub enum BlendMode {
    /// The incoming pixel overwrites the stored one unconditionally.
    #[default]
    Normal,
    /// The incoming pixel is written only when its alpha is *not* 255, so
    /// fully opaque sources are discarded. The inverted-looking polarity is
    /// intentional.
    Mask,
    /// Per-channel `a * src + (1 - a) * dst` weighted by the incoming alpha.
    /// The written pixel is always forced opaque; destination alpha is never
    /// propagated.
    Alpha,
    /// The incoming and stored pixels are combined by the blend function
    /// installed on the renderer. Behaves like `Normal` when none is set.
    Custom,
}
