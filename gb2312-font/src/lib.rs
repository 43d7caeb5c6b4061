//! Generate GB2312 bitmap fonts for monochrome displays.
//!
//! Every two-byte code position of GB2312 is rendered at each requested
//! pixel size, packed into the page layout used by SSD1306-style display
//! controllers and written out as C arrays split across a fixed number of
//! files. The byte address where each size's table starts in the
//! concatenated output is reported, so firmware can look up a glyph as
//! `addr(size) + slot * bytes_per_char(size)`.
//!
//! ```no_run
//! let config = gb2312_font::Config {
//!     font: "simsun.ttc".into(),
//!     sizes: vec![12, 16],
//!     ..Default::default()
//! };
//! let report = gb2312_font::generate(&config)?;
//! println!("{report}");
//! # Ok::<_, gb2312_font::Error>(())
//! ```

pub mod codepoint;
mod config;
mod error;
pub mod pack;
pub mod partition;
pub mod plan;
pub mod raster;
mod report;

use std::{fs, path::Path};

pub use codepoint::{CodePosition, CodeRange, GlyphSlot};
pub use config::{Config, MAX_SIZE};
pub use error::Error;
pub use partition::{Charset, DirSink, EmitOptions, MemorySink, PartitionSink, PartitionWriter};
pub use plan::{BudgetPlan, OffsetMap};
pub use raster::{GlyphRasterizer, GlyphRenderer, OutlineRenderer, VerticalOffsets};
pub use report::{Report, BINARY_FILE_NAME, MANIFEST_FILE_NAME};

/// The result of [`generate_with`].
#[derive(Debug)]
pub struct Generated<S> {
    pub report: Report,
    /// The sink, holding whatever it collected.
    pub sink: S,
    /// The concatenated table, when `config.binary` is set.
    pub image: Option<Vec<u8>>,
}

/// Renders the font described by `config` into `config.output_dir`.
///
/// Writes the partition headers, the `font_parts.h` manifest and, if
/// requested, `font_table.bin`. The font is loaded before anything is
/// written; if a later step fails every file of this run is removed again.
pub fn generate(config: &Config) -> Result<Report, Error> {
    config.validate()?;
    let renderer = OutlineRenderer::load(&config.font, config.font_index)?;
    let dir = config.output_dir.as_path();
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    write_output(config, renderer, dir).inspect_err(|_| discard_output(dir, config.partitions))
}

fn write_output(config: &Config, renderer: OutlineRenderer, dir: &Path) -> Result<Report, Error> {
    let generated = generate_with(config, renderer, DirSink::new(dir))?;
    let manifest = dir.join(MANIFEST_FILE_NAME);
    fs::write(&manifest, generated.report.manifest_header())
        .map_err(|e| Error::io(&manifest, e))?;
    if let Some(image) = &generated.image {
        let path = dir.join(BINARY_FILE_NAME);
        fs::write(&path, image).map_err(|e| Error::io(&path, e))?;
        log::info!("wrote {} bytes to '{}'", image.len(), path.display());
    }
    Ok(generated.report)
}

/// Runs the pipeline with any renderer and output sink.
///
/// Only the layout part of `config` is validated; `font` and `font_index`
/// are not used.
pub fn generate_with<R, S>(config: &Config, renderer: R, sink: S) -> Result<Generated<S>, Error>
where
    R: GlyphRenderer,
    S: PartitionSink,
{
    config.validate_layout()?;
    let total_slots = config.range.len();
    let plan = BudgetPlan::new(&config.sizes, total_slots, config.partitions)?;
    let placeholders = config.range.slots().filter(GlyphSlot::is_placeholder).count();
    log::info!(
        "{total_slots} code positions ({placeholders} unassigned), {} bytes over {} parts, \
         {} bytes per part",
        plan.total_bytes(),
        plan.partitions(),
        plan.bytes_per_partition()
    );

    let options = EmitOptions {
        annotate: config.annotate,
        charset: config.charset,
    };
    let mut writer = PartitionWriter::new(sink, &plan, options)?;
    let mut rasterizer = GlyphRasterizer::new(renderer, config.vertical_offsets.clone());
    let mut image = config
        .binary
        .then(|| Vec::with_capacity(plan.total_bytes() as usize));

    for &size in plan.sizes() {
        log::info!(
            "rendering {size}x{size} ({} bytes per glyph, offset {}px)",
            pack::bytes_per_char(size),
            config.vertical_offsets.get(size)
        );
        writer.begin_size(size);
        for slot in config.range.slots() {
            let glyph = pack::pack(&rasterizer.rasterize(&slot, size)?);
            if let Some(image) = image.as_mut() {
                image.extend_from_slice(glyph.as_bytes());
            }
            writer.write_glyph(size, &slot, &glyph)?;
        }
    }

    let (summary, sink) = writer.finish()?;
    Ok(Generated {
        report: Report {
            plan,
            offsets: summary.offsets,
            partitions: summary.partitions,
            placeholders,
        },
        sink,
        image,
    })
}

/// Removes the partitions, manifest and binary image a failed run may have
/// left behind.
fn discard_output(dir: &Path, partitions: usize) {
    log::warn!("generation failed, removing partial output in '{}'", dir.display());
    let files = (0..partitions)
        .map(partition::partition_file_name)
        .chain([MANIFEST_FILE_NAME.to_string(), BINARY_FILE_NAME.to_string()]);
    for name in files {
        let path = dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => log::debug!("removed '{}'", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (),
            Err(e) => log::warn!("failed to remove '{}': {e}", path.display()),
        }
    }
}
