//! Settings for one generator run.

use std::{collections::HashSet, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{codepoint::CodeRange, partition::Charset, raster::VerticalOffsets, Error};

/// The largest pixel size that can be requested.
pub const MAX_SIZE: u32 = 256;

/// Everything needed to produce a font table.
///
/// Deserializes from a plan file; every field but `font` has a default.
///
/// ```toml
/// font = "simsun.ttc"
/// sizes = [12, 16]
/// partitions = 7
///
/// [vertical_offsets]
/// 12 = -2
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// TrueType/OpenType font or collection to render from.
    pub font: PathBuf,
    /// Face to use when `font` is a collection.
    pub font_index: u32,
    /// Pixel sizes, in output order.
    pub sizes: Vec<u32>,
    /// Number of `font_part_{n}.h` files to split the table across.
    pub partitions: usize,
    pub output_dir: PathBuf,
    pub vertical_offsets: VerticalOffsets,
    pub range: CodeRange,
    /// Comment each glyph line with its size, character and code.
    pub annotate: bool,
    pub charset: Charset,
    /// Also write the concatenated table to `font_table.bin`.
    pub binary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font: PathBuf::new(),
            font_index: 0,
            sizes: vec![16],
            partitions: 7,
            output_dir: PathBuf::from("."),
            vertical_offsets: VerticalOffsets::default(),
            range: CodeRange::gb2312(),
            annotate: true,
            charset: Charset::Gb2312,
            binary: false,
        }
    }
}

impl Config {
    /// Checks everything that can be checked without touching the disk.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_layout()?;
        if self.font.as_os_str().is_empty() {
            return Err(Error::config("no font file given"));
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), without requiring a font.
    pub fn validate_layout(&self) -> Result<(), Error> {
        if self.sizes.is_empty() {
            return Err(Error::config("no font sizes requested"));
        }
        let mut seen = HashSet::new();
        for size in &self.sizes {
            if *size == 0 {
                return Err(Error::config("font size must be at least 1px"));
            }
            if *size > MAX_SIZE {
                return Err(Error::config(format!(
                    "font size {size} is larger than {MAX_SIZE}px"
                )));
            }
            if !seen.insert(*size) {
                return Err(Error::config(format!("font size {size} requested twice")));
            }
        }
        if self.partitions == 0 {
            return Err(Error::config("partition count must be at least 1"));
        }
        if self.range.is_empty() {
            return Err(Error::config(format!(
                "code range {}..={} is empty",
                self.range.first, self.range.last
            )));
        }
        Ok(())
    }
}
