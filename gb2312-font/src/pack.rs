//! Page packing of monochrome bitmaps.
//!
//! This is the layout the display driver reads from flash: the bitmap is cut
//! into horizontal pages of eight rows, and each page is stored as one byte
//! per column, left to right, with bit 0 holding the topmost row of the
//! page. Pages follow each other top to bottom.
//!
//! For a 16px glyph:
//!
//! ```text
//! byte:   0   1   2  ..  15 | 16  17 ..  31
//! page:   0   0   0  ..   0 |  1   1 ..   1
//! column: 0   1   2  ..  15 |  0   1 ..  15
//! ```

use crate::raster::PixelBitmap;

/// The number of eight row pages needed for `size` rows.
pub const fn pages(size: u32) -> u32 {
    size.div_ceil(8)
}

/// The packed length of one glyph of the given size.
pub const fn bytes_per_char(size: u32) -> usize {
    (pages(size) * size) as usize
}

/// The packed bytes of one glyph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedGlyph(Vec<u8>);

impl PackedGlyph {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for PackedGlyph {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Packs a bitmap into column-major pages.
///
/// Rows past the bottom of the bitmap, present in the last page when the size
/// is not a multiple of eight, are left unset.
pub fn pack(bitmap: &PixelBitmap) -> PackedGlyph {
    let size = bitmap.size();
    let mut bytes = Vec::with_capacity(bytes_per_char(size));
    for page in 0..pages(size) {
        for x in 0..size {
            let byte = (0..8).fold(0u8, |byte, bit| {
                if bitmap.get(x, page * 8 + bit) {
                    byte | (1 << bit)
                } else {
                    byte
                }
            });
            bytes.push(byte);
        }
    }
    PackedGlyph(bytes)
}
