//! Rendering characters into monochrome bitmaps.

mod outline;
mod pen;
mod strike;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{codepoint::GlyphSlot, Error};

pub use outline::OutlineRenderer;
pub use pen::BezPathPen;

/// A square `size × size` grid of on/off pixels.
///
/// The origin is the top left corner, `y` grows downwards.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBitmap {
    size: u32,
    pixels: Vec<bool>,
}

impl PixelBitmap {
    /// Creates a blank bitmap.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            pixels: vec![false; (size * size) as usize],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the pixel at `(x, y)`; pixels outside the grid are unset.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.size && y < self.size && self.pixels[(y * self.size + x) as usize]
    }

    /// Sets the pixel at `(x, y)`. Writes outside the grid are dropped.
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.size && y < self.size {
            self.pixels[(y * self.size + x) as usize] = on;
        }
    }

    pub fn is_blank(&self) -> bool {
        !self.pixels.contains(&true)
    }
}

impl std::fmt::Debug for PixelBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "PixelBitmap({}x{})", self.size, self.size)?;
        for y in 0..self.size {
            for x in 0..self.size {
                f.write_str(if self.get(x, y) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A font backend that can draw a character into a bitmap.
///
/// The ascender line of the font is placed at `y_offset` pixels from the
/// top of the bitmap and the glyph origin at the left edge. A pixel is set
/// when any ink covers it under a binary threshold.
pub trait GlyphRenderer {
    fn render(&mut self, ch: char, size: u32, y_offset: i32) -> Result<PixelBitmap, Error>;
}

impl<R: GlyphRenderer + ?Sized> GlyphRenderer for &mut R {
    fn render(&mut self, ch: char, size: u32, y_offset: i32) -> Result<PixelBitmap, Error> {
        (**self).render(ch, size, y_offset)
    }
}

/// Per size vertical draw offsets, in pixels.
///
/// Sizes without an entry are drawn with no offset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, i32>",
    into = "BTreeMap<String, i32>"
)]
pub struct VerticalOffsets(IndexMap<u32, i32>);

impl VerticalOffsets {
    /// Offsets with no entries.
    pub fn none() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, size: u32) -> i32 {
        self.0.get(&size).copied().unwrap_or_default()
    }

    pub fn set(&mut self, size: u32, offset: i32) {
        self.0.insert(size, offset);
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.0.iter().map(|(size, offset)| (*size, *offset))
    }
}

impl Default for VerticalOffsets {
    /// The corrections tuned for SimSun on a 128x64 OLED: 12px glyphs sit two
    /// pixels higher.
    fn default() -> Self {
        Self([(12, -2), (16, 0)].into_iter().collect())
    }
}

impl FromIterator<(u32, i32)> for VerticalOffsets {
    fn from_iter<T: IntoIterator<Item = (u32, i32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<BTreeMap<String, i32>> for VerticalOffsets {
    type Error = String;

    fn try_from(map: BTreeMap<String, i32>) -> Result<Self, Self::Error> {
        map.into_iter()
            .map(|(size, offset)| {
                size.trim()
                    .parse::<u32>()
                    .map(|size| (size, offset))
                    .map_err(|_| format!("vertical offset key '{size}' is not a pixel size"))
            })
            .collect()
    }
}

impl From<VerticalOffsets> for BTreeMap<String, i32> {
    fn from(offsets: VerticalOffsets) -> Self {
        offsets
            .iter()
            .map(|(size, offset)| (size.to_string(), offset))
            .collect()
    }
}

/// Renders glyph slots at a requested size, applying vertical offsets.
pub struct GlyphRasterizer<R> {
    renderer: R,
    offsets: VerticalOffsets,
}

impl<R: GlyphRenderer> GlyphRasterizer<R> {
    pub fn new(renderer: R, offsets: VerticalOffsets) -> Self {
        Self { renderer, offsets }
    }

    /// Renders one slot. Placeholders produce a blank bitmap.
    pub fn rasterize(&mut self, slot: &GlyphSlot, size: u32) -> Result<PixelBitmap, Error> {
        match slot.ch {
            Some(ch) => self.renderer.render(ch, size, self.offsets.get(size)),
            None => Ok(PixelBitmap::new(size)),
        }
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
