//! Embedded monochrome bitmap strikes (`EBLC`/`EBDT`).

use skrifa::{
    bitmap::{BitmapData, BitmapFormat, BitmapGlyph, BitmapStrikes, MaskData},
    raw::FontRef,
    GlyphId,
};

use super::PixelBitmap;

/// Returns the embedded bitmap for `glyph_id` from a strike of exactly
/// `size` pixels per em.
///
/// Strikes of other sizes are never scaled; the outline is used instead.
pub(crate) fn strike_glyph<'a>(
    font: &FontRef<'a>,
    size: u32,
    glyph_id: GlyphId,
) -> Option<BitmapGlyph<'a>> {
    let strikes = BitmapStrikes::with_format(font, BitmapFormat::Ebdt)?;
    strikes
        .iter()
        .filter(|strike| strike.ppem() == size as f32)
        .find_map(|strike| strike.get(glyph_id))
}

/// Draws a strike glyph with its origin on `baseline`.
///
/// Returns `false`, leaving `bitmap` untouched, for glyphs that are not
/// alpha masks.
pub(crate) fn draw_strike_glyph(
    bitmap: &mut PixelBitmap,
    glyph: &BitmapGlyph,
    baseline: i32,
) -> bool {
    let BitmapData::Mask(mask) = &glyph.data else {
        return false;
    };
    let left = glyph.inner_bearing_x as i32;
    let top = baseline - glyph.inner_bearing_y as i32;
    blit_mask(bitmap, mask, glyph.width, glyph.height, left, top);
    true
}

/// Copies a `width × height` mask into `bitmap` with its top left corner at
/// `(left, top)`. Pixels falling outside the bitmap are clipped.
///
/// Rows are read most significant bit first. A pixel is set when the top bit
/// of its value is set, so deeper masks are thresholded at half coverage.
pub(crate) fn blit_mask(
    bitmap: &mut PixelBitmap,
    mask: &MaskData,
    width: u32,
    height: u32,
    left: i32,
    top: i32,
) {
    let bpp = mask.bpp as usize;
    let row_bits = width as usize * bpp;
    let pitch = if mask.is_packed {
        row_bits
    } else {
        row_bits.div_ceil(8) * 8
    };
    for row in 0..height as usize {
        let y = top + row as i32;
        for col in 0..width as usize {
            let x = left + col as i32;
            if x < 0 || y < 0 {
                continue;
            }
            let bit = row * pitch + col * bpp;
            let Some(byte) = mask.data.get(bit / 8) else {
                return;
            };
            if byte & (0x80 >> (bit % 8)) != 0 {
                bitmap.set(x as u32, y as u32, true);
            }
        }
    }
}
