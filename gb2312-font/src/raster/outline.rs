//! Scalable font backend built on skrifa outlines.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use kurbo::{BezPath, Point, Shape};
use skrifa::{
    outline::DrawSettings,
    prelude::{LocationRef, Size},
    raw::{FileRef, FontRef},
    GlyphId, MetadataProvider,
};

use super::{strike, BezPathPen, GlyphRenderer, PixelBitmap};
use crate::Error;

enum FontBlob {
    Mapped(memmap2::Mmap),
    Owned(Vec<u8>),
}

impl AsRef<[u8]> for FontBlob {
    fn as_ref(&self) -> &[u8] {
        match self {
            FontBlob::Mapped(map) => map.as_ref(),
            FontBlob::Owned(data) => data.as_slice(),
        }
    }
}

/// Renders characters from a TrueType/OpenType font or collection.
///
/// When the font carries an embedded bitmap strike (`EBLC`/`EBDT`) of
/// exactly the requested size, the glyph is copied from the strike, as
/// FreeType does for fonts such as SimSun at 12 and 16 pixels.
///
/// Otherwise glyphs are drawn unhinted and sampled at pixel centers with the
/// nonzero winding rule, which matches the monochrome rasterizers embedded
/// toolchains have traditionally used. Characters missing from the font's
/// character map render as the `.notdef` glyph.
pub struct OutlineRenderer {
    path: PathBuf,
    data: FontBlob,
    index: u32,
}

impl OutlineRenderer {
    /// Memory maps the font at `path` and selects face `index`.
    pub fn load(path: impl AsRef<Path>, index: u32) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::font_load(path, e))?;
        // SAFETY: the mapping is only read, and the font file is an input that
        // is not modified while the generator runs.
        let map = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| Error::font_load(path, e))?;
        Self::new(path.to_owned(), FontBlob::Mapped(map), index)
    }

    /// Uses an in-memory font file.
    pub fn from_data(data: Vec<u8>, index: u32) -> Result<Self, Error> {
        Self::new(PathBuf::from("<memory>"), FontBlob::Owned(data), index)
    }

    fn new(path: PathBuf, data: FontBlob, index: u32) -> Result<Self, Error> {
        let count = match FileRef::new(data.as_ref()).map_err(|e| Error::font_load(&path, e))? {
            FileRef::Font(_) => 1,
            FileRef::Collection(collection) => collection.len(),
        };
        if index >= count {
            return Err(Error::font_load(
                &path,
                format!("face index {index} out of range, file has {count} face(s)"),
            ));
        }
        let font =
            FontRef::from_index(data.as_ref(), index).map_err(|e| Error::font_load(&path, e))?;
        if font.outline_glyphs().get(GlyphId::NOTDEF).is_none() {
            return Err(Error::font_load(&path, "font has no scalable outlines"));
        }
        log::debug!(
            "loaded face {index} of '{}' ({} glyphs)",
            path.display(),
            font.metrics(Size::unscaled(), LocationRef::default()).glyph_count
        );
        Ok(Self { path, data, index })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn font(&self) -> Result<FontRef<'_>, Error> {
        FontRef::from_index(self.data.as_ref(), self.index)
            .map_err(|e| Error::font_load(&self.path, e))
    }
}

impl GlyphRenderer for OutlineRenderer {
    fn render(&mut self, ch: char, size: u32, y_offset: i32) -> Result<PixelBitmap, Error> {
        let font = self.font()?;
        let glyph_id = font.charmap().map(ch).unwrap_or_else(|| {
            log::debug!("'{ch}' (U+{:04X}) is not in the font, drawing .notdef", ch as u32);
            GlyphId::NOTDEF
        });
        let ppem = Size::new(size as f32);
        let ascent = font.metrics(ppem, LocationRef::default()).ascent;
        let baseline = y_offset as f64 + (ascent as f64).ceil();

        if let Some(glyph) = strike::strike_glyph(&font, size, glyph_id) {
            let mut bitmap = PixelBitmap::new(size);
            if strike::draw_strike_glyph(&mut bitmap, &glyph, baseline as i32) {
                return Ok(bitmap);
            }
            log::debug!("strike glyph for '{ch}' at {size}px is not a mask, drawing outline");
        }

        let mut path = BezPath::new();
        if let Some(glyph) = font.outline_glyphs().get(glyph_id) {
            let settings = DrawSettings::unhinted(ppem, LocationRef::default());
            let drawn = glyph.draw(settings, &mut BezPathPen::new(&mut path, baseline));
            if let Err(e) = drawn {
                log::warn!("failed to draw '{ch}' at {size}px: {e}");
                path = BezPath::new();
            }
        }
        Ok(fill(&path, size))
    }
}

/// Samples `path` at every pixel center of a `size × size` grid.
pub(crate) fn fill(path: &BezPath, size: u32) -> PixelBitmap {
    let mut bitmap = PixelBitmap::new(size);
    if path.elements().is_empty() {
        return bitmap;
    }
    let bounds = path.bounding_box();
    for y in 0..size {
        for x in 0..size {
            let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if bounds.contains(center) && path.winding(center) != 0 {
                bitmap.set(x, y, true);
            }
        }
    }
    bitmap
}
