// src/sprite.rs

//! The off-screen pixel buffer that primitives draw into and frames are
//! presented from. Dimensions are fixed at construction; loading an image
//! produces a new buffer rather than resizing one in place.

use crate::pixel::Pixel;
use anyhow::{Context, Result};
use std::path::Path;

/// A fixed-size, row-major buffer of RGBA pixels.
///
/// All access is bounds-checked internally: reads outside the buffer return
/// `Pixel::default()` and writes outside it are dropped, so callers never
/// pre-clip coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: i32,
    height: i32,
    data: Vec<Pixel>,
}

impl Sprite {
    /// Creates a sprite filled with the default pixel. Non-positive
    /// dimensions produce an empty 0x0 buffer.
    pub fn new(width: i32, height: i32) -> Self {
        if width <= 0 || height <= 0 {
            return Sprite {
                width: 0,
                height: 0,
                data: Vec::new(),
            };
        }
        Sprite {
            width,
            height,
            data: vec![Pixel::default(); (width as usize) * (height as usize)],
        }
    }

    /// Decodes an image file into a sprite, converting to RGBA.
    ///
    /// # Errors
    /// Returns an error when the file cannot be opened or decoded; no sprite
    /// exists in that case.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("failed to load sprite from '{}'", path.display()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        let data = decoded
            .pixels()
            .map(|p| Pixel::rgba(p.0[0], p.0[1], p.0[2], p.0[3]))
            .collect();
        Ok(Sprite {
            width: width as i32,
            height: height as i32,
            data,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns the pixel at `(x, y)`, or the default pixel when the
    /// coordinates fall outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Pixel {
        if x >= 0 && x < self.width && y >= 0 && y < self.height {
            self.data[(y * self.width + x) as usize]
        } else {
            Pixel::default()
        }
    }

    /// Stores `p` at `(x, y)`. Out-of-range writes are silently dropped.
    pub fn set_pixel(&mut self, x: i32, y: i32, p: Pixel) {
        if x >= 0 && x < self.width && y >= 0 && y < self.height {
            self.data[(y * self.width + x) as usize] = p;
        }
    }

    /// Samples the buffer with normalized coordinates.
    ///
    /// The coordinates are scaled by the buffer dimensions and truncated to
    /// integers. Inputs at or above 1.0 land one past the last row or column
    /// and resolve to the default pixel through the ordinary bounds check;
    /// there is deliberately no clamping.
    pub fn sample(&self, u: f32, v: f32) -> Pixel {
        let x = (u * self.width as f32) as i32;
        let y = (v * self.height as f32) as i32;
        self.pixel(x, y)
    }

    /// The pixel data in row-major order.
    pub fn data(&self) -> &[Pixel] {
        &self.data
    }

    /// The pixel data viewed as raw RGBA bytes, suitable for frame upload.
    pub fn raw_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}
